//! Elevation lookup trait and errors.

use std::future::Future;

use thiserror::Error;

use crate::geo::Coordinate;

/// Errors raised while looking up elevations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ElevationError {
    /// Transport level failure.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The response body could not be decoded.
    #[error("invalid elevation response: {0}")]
    InvalidResponse(String),

    /// The API answered with a non-OK status.
    #[error("elevation API returned status {0}")]
    Status(String),

    /// The API returned a different number of results than requested.
    #[error("expected {expected} elevations, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
}

/// Looks up ground elevation for a batch of coordinates.
///
/// Implementations return one altitude per input coordinate, in input order,
/// or an error. A partial result is never returned.
pub trait ElevationLookup: Send + Sync {
    /// Returns the elevation in meters for each of `locations`.
    fn elevations(
        &self,
        locations: &[Coordinate],
    ) -> impl Future<Output = Result<Vec<f64>, ElevationError>> + Send;
}
