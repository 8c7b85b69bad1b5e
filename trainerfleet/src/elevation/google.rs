//! Google Elevation API lookup.
//!
//! # URL Pattern
//!
//! `https://maps.googleapis.com/maps/api/elevation/json?locations={lat,lon|lat,lon|...}&key={API_KEY}`
//!
//! # Batching
//!
//! The documented limit is 512 locations per request, but requests above 405
//! locations are rejected in practice, so lookups are split into batches of
//! at most [`MAX_LOCATIONS_PER_REQUEST`].

use serde::Deserialize;
use tracing::debug;

use super::http::AsyncHttpClient;
use super::types::{ElevationError, ElevationLookup};
use crate::geo::Coordinate;

/// Base URL for the JSON elevation endpoint.
pub const ELEVATION_API_URL: &str = "https://maps.googleapis.com/maps/api/elevation/json";

/// Largest number of locations sent in a single request.
pub const MAX_LOCATIONS_PER_REQUEST: usize = 405;

#[derive(Debug, Deserialize)]
struct ElevationResponse {
    #[serde(default)]
    results: Vec<ElevationResult>,
    status: String,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ElevationResult {
    elevation: f64,
}

/// Elevation lookup backed by the Google Elevation API.
///
/// Requires a Google Maps Platform API key with the Elevation API enabled.
pub struct GoogleElevationLookup<C: AsyncHttpClient> {
    http_client: C,
    api_key: String,
    batch_limit: usize,
}

impl<C: AsyncHttpClient> GoogleElevationLookup<C> {
    /// Creates a lookup using the default batch limit.
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client for making requests
    /// * `api_key` - Google Maps Platform API key
    pub fn new(http_client: C, api_key: String) -> Self {
        Self {
            http_client,
            api_key,
            batch_limit: MAX_LOCATIONS_PER_REQUEST,
        }
    }

    /// Overrides the batch limit. Values above 405 are clamped.
    pub fn with_batch_limit(mut self, batch_limit: usize) -> Self {
        self.batch_limit = batch_limit.clamp(1, MAX_LOCATIONS_PER_REQUEST);
        self
    }

    /// Builds the request URL for one batch.
    fn build_url(&self, batch: &[Coordinate]) -> String {
        let locations = batch
            .iter()
            .map(|c| format!("{:.6},{:.6}", c.latitude, c.longitude))
            .collect::<Vec<_>>()
            .join("|");
        format!(
            "{}?locations={}&key={}",
            ELEVATION_API_URL, locations, self.api_key
        )
    }

    async fn fetch_batch(&self, batch: &[Coordinate]) -> Result<Vec<f64>, ElevationError> {
        let body = self.http_client.get(&self.build_url(batch)).await?;
        let response: ElevationResponse = serde_json::from_slice(&body)
            .map_err(|e| ElevationError::InvalidResponse(e.to_string()))?;

        if response.status != "OK" {
            let status = match response.error_message {
                Some(message) => format!("{} ({})", response.status, message),
                None => response.status,
            };
            return Err(ElevationError::Status(status));
        }
        if response.results.len() != batch.len() {
            return Err(ElevationError::CountMismatch {
                expected: batch.len(),
                actual: response.results.len(),
            });
        }

        Ok(response.results.into_iter().map(|r| r.elevation).collect())
    }
}

impl<C: AsyncHttpClient> ElevationLookup for GoogleElevationLookup<C> {
    async fn elevations(&self, locations: &[Coordinate]) -> Result<Vec<f64>, ElevationError> {
        let mut elevations = Vec::with_capacity(locations.len());

        for (index, batch) in locations.chunks(self.batch_limit).enumerate() {
            debug!(batch = index, size = batch.len(), "Requesting elevations");
            elevations.extend(self.fetch_batch(batch).await?);
        }

        Ok(elevations)
    }
}
