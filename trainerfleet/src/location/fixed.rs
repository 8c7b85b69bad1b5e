//! Single-point provider.

use super::LocationProvider;
use crate::geo::{resample_accuracy, Coordinate};

/// Provider that always returns the same position.
///
/// Only the accuracy changes between calls.
#[derive(Debug, Clone)]
pub struct FixedProvider {
    location: Coordinate,
}

impl FixedProvider {
    /// Creates a provider for `location`.
    pub fn new(location: Coordinate) -> Self {
        Self { location }
    }
}

impl LocationProvider for FixedProvider {
    fn next_location(&mut self) -> Coordinate {
        resample_accuracy(&mut self.location);
        self.location
    }

    fn locations(&self) -> &[Coordinate] {
        std::slice::from_ref(&self.location)
    }
}
