//! Planar polygon containment.
//!
//! Latitude and longitude are treated as Cartesian `y`/`x`, which is adequate
//! for the few-kilometre areas a scan covers. Points lying exactly on an edge
//! or a vertex count as inside, so classification does not depend on vertex
//! order, starting vertex or winding direction.

use super::{Coordinate, GeoError};

/// Tolerance (in degrees) for deciding that a point lies on an edge.
const BOUNDARY_EPSILON: f64 = 1e-12;

/// A closed polygon described by its boundary vertices.
///
/// The closing edge from the last vertex back to the first is implicit; a
/// repeated first vertex at the end is accepted as well.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Coordinate>,
}

impl Polygon {
    /// Builds a polygon from at least three vertices.
    pub fn new(vertices: Vec<Coordinate>) -> Result<Self, GeoError> {
        if vertices.len() < 3 {
            return Err(GeoError::TooFewVertices(vertices.len()));
        }
        Ok(Self { vertices })
    }

    /// The boundary vertices in their original order.
    pub fn vertices(&self) -> &[Coordinate] {
        &self.vertices
    }

    /// Returns true when `point` is inside or on the boundary.
    pub fn contains(&self, point: &Coordinate) -> bool {
        point_in_polygon(point, &self.vertices)
    }
}

/// Even-odd containment test with inclusive boundary.
///
/// Returns false for fewer than three vertices.
pub fn point_in_polygon(point: &Coordinate, vertices: &[Coordinate]) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let (x, y) = (point.longitude, point.latitude);
    let mut inside = false;

    for (i, a) in vertices.iter().enumerate() {
        let b = &vertices[(i + 1) % vertices.len()];
        let (ax, ay) = (a.longitude, a.latitude);
        let (bx, by) = (b.longitude, b.latitude);

        if on_segment(x, y, ax, ay, bx, by) {
            return true;
        }

        // Half-open rule: an edge counts when it straddles the horizontal ray.
        if (ay > y) != (by > y) {
            let crossing_x = ax + (y - ay) * (bx - ax) / (by - ay);
            if x < crossing_x {
                inside = !inside;
            }
        }
    }

    inside
}

fn on_segment(x: f64, y: f64, ax: f64, ay: f64, bx: f64, by: f64) -> bool {
    let cross = (bx - ax) * (y - ay) - (by - ay) * (x - ax);
    let length = ((bx - ax).powi(2) + (by - ay).powi(2)).sqrt();
    if cross.abs() > BOUNDARY_EPSILON * length.max(1.0) {
        return false;
    }
    x >= ax.min(bx) - BOUNDARY_EPSILON
        && x <= ax.max(bx) + BOUNDARY_EPSILON
        && y >= ay.min(by) - BOUNDARY_EPSILON
        && y <= ay.max(by) + BOUNDARY_EPSILON
}
