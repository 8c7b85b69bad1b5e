//! Core geographic types.

use thiserror::Error;

/// Mean earth radius in meters used by all spherical calculations.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A position as reported to the remote API.
///
/// `accuracy` models GPS noise and is resampled by location providers every
/// time a coordinate is handed out (see [`resample_accuracy`](super::resample_accuracy)).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinate {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Altitude in meters.
    pub altitude: f64,
    /// Horizontal accuracy in meters.
    pub accuracy: f64,
}

impl Coordinate {
    /// Creates a coordinate at sea level with zero accuracy.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: 0.0,
            accuracy: 0.0,
        }
    }

    /// Sets the altitude.
    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = altitude;
        self
    }
}

/// Errors raised by geometry construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// Cell spacing must be a positive, finite number of meters.
    #[error("invalid cell spacing: {0} m")]
    InvalidSpacing(f64),

    /// Radius must be a non-negative, finite number of meters.
    #[error("invalid radius: {0} m")]
    InvalidRadius(f64),

    /// Radius and spacing describe more cells than [`MAX_HONEYCOMB_CELLS`](super::MAX_HONEYCOMB_CELLS).
    #[error("radius {radius_m} m with spacing {spacing_m} m exceeds the honeycomb cell limit")]
    TooManyCells { radius_m: f64, spacing_m: f64 },

    /// A polygon needs at least three vertices.
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
}
