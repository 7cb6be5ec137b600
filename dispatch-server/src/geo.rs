//! Great-circle distance.
//!
//! Haversine on a sphere of radius 6,371,000 m. This is deliberately a
//! local function rather than a geodesy crate: the geofence contract is
//! defined against exactly this formula and radius, and ellipsoidal
//! corrections would move stations in or out of the 400 m fence between
//! versions.

use crate::domain::Coordinate;

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates, in meters.
///
/// Pure and deterministic; identical inputs give exactly 0.0.
pub fn distance_m(a: Coordinate, b: Coordinate) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn any_coordinate() -> impl Strategy<Value = Coordinate> {
        (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lon)| Coordinate::new(lat, lon))
    }

    proptest! {
        /// distance(A, A) is exactly zero.
        #[test]
        fn self_distance_is_zero(a in any_coordinate()) {
            prop_assert_eq!(distance_m(a, a), 0.0);
        }

        /// distance(A, B) == distance(B, A).
        #[test]
        fn symmetric(a in any_coordinate(), b in any_coordinate()) {
            prop_assert_eq!(distance_m(a, b), distance_m(b, a));
        }

        /// Distances are finite and non-negative, bounded by half the
        /// circumference.
        #[test]
        fn bounded(a in any_coordinate(), b in any_coordinate()) {
            let d = distance_m(a, b);
            prop_assert!(d.is_finite());
            prop_assert!(d >= 0.0);
            prop_assert!(d <= 6_371_000.0 * std::f64::consts::PI + 1.0);
        }
    }
}
