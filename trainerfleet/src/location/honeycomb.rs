//! Honeycomb area provider.

use super::{LocationError, LocationProvider};
use crate::geo::{generate_honeycomb, resample_accuracy, Coordinate};

/// Cycles through hexagonal rings around a center point.
#[derive(Debug, Clone)]
pub struct HoneycombProvider {
    center: Coordinate,
    radius_m: f64,
    locations: Vec<Coordinate>,
    cursor: Option<usize>,
}

impl HoneycombProvider {
    /// Generates the honeycomb for `center`, `radius_m` and `spacing_m`.
    ///
    /// # Errors
    ///
    /// Fails when the inputs are invalid or produce zero rings.
    pub fn new(center: Coordinate, radius_m: f64, spacing_m: f64) -> Result<Self, LocationError> {
        let locations = generate_honeycomb(&center, radius_m, spacing_m)?;
        if locations.is_empty() {
            return Err(LocationError::NoRings {
                radius_m,
                spacing_m,
            });
        }

        Ok(Self {
            center,
            radius_m,
            locations,
            cursor: None,
        })
    }

    /// The honeycomb center.
    pub fn center(&self) -> Coordinate {
        self.center
    }

    /// The requested coverage radius in meters.
    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }
}

impl LocationProvider for HoneycombProvider {
    fn next_location(&mut self) -> Coordinate {
        let index = self.cursor.map_or(0, |i| (i + 1) % self.locations.len());
        self.cursor = Some(index);

        let location = &mut self.locations[index];
        resample_accuracy(location);
        *location
    }

    fn locations(&self) -> &[Coordinate] {
        &self.locations
    }
}
