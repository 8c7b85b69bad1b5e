//! Polygon-bounded honeycomb provider.
//!
//! Construction steps:
//!
//! 1. Build the polygon from the boundary vertices
//! 2. Take the largest great-circle distance from the first vertex to any
//!    vertex as the covering radius
//! 3. Generate a honeycomb of that radius around the first vertex
//! 4. Keep only cells inside the polygon
//! 5. Look up ground elevation for the kept cells
//!
//! Any failure aborts construction; a partially enriched area is never
//! returned.

use tracing::info;

use super::{LocationError, LocationProvider};
use crate::elevation::{ElevationError, ElevationLookup};
use crate::geo::{generate_honeycomb, great_circle_distance, resample_accuracy, Coordinate, Polygon};

/// Cycles through honeycomb cells that lie inside a polygon.
#[derive(Debug, Clone)]
pub struct PolygonProvider {
    polygon: Polygon,
    locations: Vec<Coordinate>,
    cursor: Option<usize>,
}

impl PolygonProvider {
    /// Fills `vertices` with honeycomb cells `spacing_m` apart and enriches
    /// them with altitudes from `elevation`.
    ///
    /// # Errors
    ///
    /// - [`LocationError::Geometry`] for fewer than three vertices or a bad spacing
    /// - [`LocationError::EmptyPolygon`] when no cell falls inside
    /// - [`LocationError::Enrichment`] when the elevation lookup fails
    pub async fn new<L: ElevationLookup>(
        vertices: Vec<Coordinate>,
        spacing_m: f64,
        elevation: &L,
    ) -> Result<Self, LocationError> {
        let polygon = Polygon::new(vertices)?;
        let origin = polygon.vertices()[0];

        let radius_m = polygon
            .vertices()
            .iter()
            .map(|v| great_circle_distance(&origin, v))
            .fold(0.0, f64::max);

        let mut locations: Vec<Coordinate> = generate_honeycomb(&origin, radius_m, spacing_m)?
            .into_iter()
            .filter(|cell| polygon.contains(cell))
            .collect();

        if locations.is_empty() {
            return Err(LocationError::EmptyPolygon);
        }

        let altitudes = elevation.elevations(&locations).await?;
        if altitudes.len() != locations.len() {
            return Err(LocationError::Enrichment(ElevationError::CountMismatch {
                expected: locations.len(),
                actual: altitudes.len(),
            }));
        }
        for (location, altitude) in locations.iter_mut().zip(altitudes) {
            location.altitude = altitude;
        }

        info!(
            vertices = polygon.vertices().len(),
            radius_m = radius_m.round(),
            cells = locations.len(),
            "Polygon coverage area ready"
        );

        Ok(Self {
            polygon,
            locations,
            cursor: None,
        })
    }

    /// The bounding polygon.
    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }
}

impl LocationProvider for PolygonProvider {
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
