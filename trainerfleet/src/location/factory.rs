//! Provider construction from configuration.

use super::{FixedProvider, HoneycombProvider, LocationError, LocationProvider, PolygonProvider};
use crate::elevation::{AsyncReqwestClient, ElevationLookup, GoogleElevationLookup};
use crate::geo::Coordinate;

/// Default distance between honeycomb cells in meters.
pub const DEFAULT_CELL_SPACING_M: f64 = 70.0;

/// Which coverage area the fleet sweeps.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationConfig {
    /// Scan a single point.
    Fixed { location: Coordinate },

    /// Scan hexagonal rings around `center`.
    Honeycomb {
        center: Coordinate,
        radius_m: f64,
        spacing_m: f64,
    },

    /// Scan honeycomb cells inside a polygon.
    Polygon {
        vertices: Vec<Coordinate>,
        spacing_m: f64,
        elevation_api_key: String,
    },
}

impl LocationConfig {
    /// Position workers log in at before their first coordinate arrives.
    ///
    /// Returns `None` only for a polygon without vertices.
    pub fn start_location(&self) -> Option<Coordinate> {
        match self {
            LocationConfig::Fixed { location } => Some(*location),
            LocationConfig::Honeycomb { center, .. } => Some(*center),
            LocationConfig::Polygon { vertices, .. } => vertices.first().copied(),
        }
    }

    /// Short name of the variant for logging.
    pub fn mode(&self) -> &'static str {
        match self {
            LocationConfig::Fixed { .. } => "fixed",
            LocationConfig::Honeycomb { .. } => "honeycomb",
            LocationConfig::Polygon { .. } => "polygon",
        }
    }
}

/// Builds the provider described by `config`.
///
/// Polygon providers look up altitudes through the Google Elevation API
/// using the configured key.
pub async fn build_provider(
    config: &LocationConfig,
) -> Result<Box<dyn LocationProvider>, LocationError> {
    match config {
        LocationConfig::Polygon {
            elevation_api_key, ..
        } => {
            let lookup =
                GoogleElevationLookup::new(AsyncReqwestClient::new()?, elevation_api_key.clone());
            build_provider_with(config, &lookup).await
        }
        _ => build_provider_with(config, &NoElevation).await,
    }
}

/// Builds the provider described by `config` using a caller supplied
/// elevation lookup for polygon areas.
pub async fn build_provider_with<L: ElevationLookup>(
    config: &LocationConfig,
    elevation: &L,
) -> Result<Box<dyn LocationProvider>, LocationError> {
    let provider: Box<dyn LocationProvider> = match config {
        LocationConfig::Fixed { location } => Box::new(FixedProvider::new(*location)),
        LocationConfig::Honeycomb {
            center,
            radius_m,
            spacing_m,
        } => Box::new(HoneycombProvider::new(*center, *radius_m, *spacing_m)?),
        LocationConfig::Polygon {
            vertices,
            spacing_m,
            ..
        } => Box::new(PolygonProvider::new(vertices.clone(), *spacing_m, elevation).await?),
    };
    Ok(provider)
}

/// Lookup used when the configured area never needs altitudes.
struct NoElevation;

impl ElevationLookup for NoElevation {
    async fn elevations(
        &self,
        locations: &[Coordinate],
    ) -> Result<Vec<f64>, crate::elevation::ElevationError> {
        Ok(locations.iter().map(|l| l.altitude).collect())
    }
}
