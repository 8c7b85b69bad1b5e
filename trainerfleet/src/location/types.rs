//! Location provider trait and errors.

use thiserror::Error;

use crate::elevation::ElevationError;
use crate::geo::{Coordinate, GeoError};

/// Continuously supplies coordinates to scan.
///
/// Implementations cycle through a non-empty sequence with wraparound and
/// resample the accuracy of every coordinate they hand out.
pub trait LocationProvider: Send {
    /// Advances the cursor and returns the next coordinate.
    fn next_location(&mut self) -> Coordinate;

    /// All coordinates this provider cycles through, in order.
    fn locations(&self) -> &[Coordinate];
}

/// Errors raised while constructing a provider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    /// Invalid geometry input.
    #[error(transparent)]
    Geometry(#[from] GeoError),

    /// Radius and spacing produce no honeycomb rings.
    #[error("radius {radius_m} m with spacing {spacing_m} m yields no honeycomb rings")]
    NoRings { radius_m: f64, spacing_m: f64 },

    /// No honeycomb cell falls inside the polygon.
    #[error("polygon contains no honeycomb cells")]
    EmptyPolygon,

    /// Altitude enrichment failed; no provider was built.
    #[error("elevation enrichment failed: {0}")]
    Enrichment(#[from] ElevationError),
}
