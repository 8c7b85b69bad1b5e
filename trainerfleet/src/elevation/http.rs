//! HTTP client abstraction for testability

use std::future::Future;
use std::time::Duration;

use super::types::ElevationError;

/// Default request timeout for elevation lookups.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for async HTTP GET requests.
///
/// Lets the elevation lookup be exercised against a mock in tests.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an HTTP GET request and returns the response body.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, ElevationError>> + Send;
}

/// HTTP client backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a client with the default 30 second timeout.
    pub fn new() -> Result<Self, ElevationError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, ElevationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ElevationError::HttpError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ElevationError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ElevationError::HttpError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ElevationError::HttpError(format!(
                "HTTP {} from elevation API",
                response.status()
            )));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| ElevationError::HttpError(format!("Failed to read response: {}", e)))
    }
}
