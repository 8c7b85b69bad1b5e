//! Geometry engine
//!
//! Spherical-earth projection, hexagonal ("honeycomb") area tiling, polygon
//! containment and accuracy jitter. Everything here is synchronous and free of
//! I/O; location providers build on top of it.

mod honeycomb;
mod jitter;
mod polygon;
mod types;

pub use honeycomb::{generate_honeycomb, ring_count, Bearing, MAX_HONEYCOMB_CELLS};
pub use jitter::{resample_accuracy, resample_accuracy_with, ACCURACY_CHOICES};
pub use polygon::{point_in_polygon, Polygon};
pub use types::{Coordinate, GeoError, EARTH_RADIUS_M};

/// Projects `origin` by `distance_m` meters along `bearing_deg`.
///
/// Bearing is measured clockwise from true north (0 = N, 90 = E, 180 = S,
/// 270 = W). Altitude and accuracy are carried over from `origin`. The
/// resulting longitude is normalized to `[-180, 180)`.
pub fn destination_point(origin: &Coordinate, distance_m: f64, bearing_deg: f64) -> Coordinate {
    let delta = distance_m / EARTH_RADIUS_M;
    let theta = bearing_deg.to_radians();
    let phi1 = origin.latitude.to_radians();
    let lambda1 = origin.longitude.to_radians();

    let sin_phi2 = phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos();
    let phi2 = sin_phi2.clamp(-1.0, 1.0).asin();
    let lambda2 = lambda1
        + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * phi2.sin());

    Coordinate {
        latitude: phi2.to_degrees(),
        longitude: normalize_longitude(lambda2.to_degrees()),
        altitude: origin.altitude,
        accuracy: origin.accuracy,
    }
}

/// Great-circle distance between two coordinates in meters (haversine).
pub fn great_circle_distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = phi2 - phi1;
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

fn normalize_longitude(lon: f64) -> f64 {
    (lon + 540.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS_M: f64 = 0.01;

    #[test]
    fn test_destination_north_along_meridian() {
        let origin = Coordinate::new(0.0, 0.0);
        let p = destination_point(&origin, 1000.0, 0.0);

        assert!(p.longitude.abs() < 1e-9);
        assert!((great_circle_distance(&origin, &p) - 1000.0).abs() < EPS_M);
        assert!(p.latitude > 0.0);
    }

    #[test]
    fn test_destination_cardinal_directions() {
        let origin = Coordinate::new(48.137, 11.575);

        let east = destination_point(&origin, 500.0, 90.0);
        let west = destination_point(&origin, 500.0, 270.0);
        let south = destination_point(&origin, 500.0, 180.0);

        assert!(east.longitude > origin.longitude);
        assert!(west.longitude < origin.longitude);
        assert!(south.latitude < origin.latitude);
        assert!((great_circle_distance(&origin, &east) - 500.0).abs() < EPS_M);
        assert!((great_circle_distance(&origin, &south) - 500.0).abs() < EPS_M);
    }

    #[test]
    fn test_destination_preserves_altitude_and_accuracy() {
        let origin = Coordinate {
            latitude: 10.0,
            longitude: 20.0,
            altitude: 512.0,
            accuracy: 30.0,
        };
        let p = destination_point(&origin, 250.0, 45.0);

        assert_eq!(p.altitude, 512.0);
        assert_eq!(p.accuracy, 30.0);
    }

    #[test]
    fn test_destination_wraps_antimeridian() {
        let origin = Coordinate::new(0.0, 179.9999);
        let p = destination_point(&origin, 1000.0, 90.0);

        assert!(p.longitude < -179.0, "longitude {} should wrap", p.longitude);
    }

    #[test]
    fn test_great_circle_distance_symmetric() {
        let a = Coordinate::new(52.52, 13.405);
        let b = Coordinate::new(48.8566, 2.3522);

        let ab = great_circle_distance(&a, &b);
        let ba = great_circle_distance(&b, &a);

        assert!((ab - ba).abs() < 1e-6);
        // Berlin to Paris is roughly 878 km
        assert!((ab - 878_000.0).abs() < 5_000.0);
    }

    #[test]
    fn test_great_circle_distance_zero() {
        let a = Coordinate::new(-33.8688, 151.2093);
        assert_eq!(great_circle_distance(&a, &a), 0.0);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_projection_distance_consistent(
                lat in -80.0..80.0_f64,
                lon in -179.0..179.0_f64,
                distance in 1.0..5_000.0_f64,
                bearing in 0.0..360.0_f64
            ) {
                let origin = Coordinate::new(lat, lon);
                let p = destination_point(&origin, distance, bearing);
                let measured = great_circle_distance(&origin, &p);

                prop_assert!(
                    (measured - distance).abs() < 0.1,
                    "projected {} m but measured {} m",
                    distance, measured
                );
            }
        }
    }
}
