//! Great-circle distance on a spherical Earth.

use super::coordinate::{Coordinate, CoordinateValue};
use crate::utils::round_to;
use tracing::debug;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometers, rounded to two decimals.
///
/// No range checks are applied; see [`distance_km`] for the checked form.
pub fn haversine_km(from: &Coordinate, to: &Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (to.longitude - from.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    round_to(EARTH_RADIUS_KM * c, 2)
}

/// Distance between two coordinates, or `None` when either is out of range.
pub fn distance_km(from: &Coordinate, to: &Coordinate) -> Option<f64> {
    if let Err(reason) = from.validate().and_then(|_| to.validate()) {
        debug!(%reason, "Distance unknown");
        return None;
    }
    Some(haversine_km(from, to))
}

/// Distance between two points given as loosely typed latitude/longitude
/// values.
///
/// Returns `None` ("distance unknown") when any value is missing, not numeric
/// or outside the geographic ranges. Callers must treat `None` as an absent
/// value, never as zero.
pub fn calculate_distance(
    lat1: impl CoordinateValue,
    lon1: impl CoordinateValue,
    lat2: impl CoordinateValue,
    lon2: impl CoordinateValue,
) -> Option<f64> {
    let points = Coordinate::from_values(lat1, lon1)
        .and_then(|from| Coordinate::from_values(lat2, lon2).map(|to| (from, to)));

    match points {
        Ok((from, to)) => Some(haversine_km(&from, &to)),
        Err(reason) => {
            debug!(%reason, "Distance unknown");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_zero() {
        assert_eq!(
            calculate_distance(16.3067, 80.4365, 16.3067, 80.4365),
            Some(0.0)
        );
    }

    #[test]
    fn test_quarter_circumference() {
        let d = calculate_distance(0.0, 0.0, 0.0, 90.0).unwrap();
        assert!((d - 10007.54).abs() < 1e-9, "got {d}");
    }

    #[test]
    fn test_known_city_pair() {
        // Guntur to Vijayawada, roughly 31.6 km apart.
        let d = calculate_distance("16.3067", "80.4365", "16.5062", "80.6480").unwrap();
        assert!((d - 31.6).abs() < 0.5, "got {d}");
        assert_eq!(d, round_to(d, 2));
    }

    #[test]
    fn test_symmetry() {
        let a = Coordinate::new(51.5074, -0.1278);
        let b = Coordinate::new(40.7128, -74.0060);
        assert_eq!(haversine_km(&a, &b), haversine_km(&b, &a));
    }

    #[test]
    fn test_non_numeric_is_unknown() {
        assert_eq!(calculate_distance("abc", 80.4365, 16.3067, 80.4365), None);
        assert_eq!(calculate_distance(16.3067, 80.4365, "", "80.1"), None);
        assert_eq!(
            calculate_distance(16.3067, 80.4365, None::<&str>, Some("80.1")),
            None
        );
    }

    #[test]
    fn test_out_of_range_is_unknown() {
        assert_eq!(calculate_distance(91.0, 0.0, 0.0, 0.0), None);
        assert_eq!(
            distance_km(&Coordinate::new(0.0, 0.0), &Coordinate::new(0.0, 200.0)),
            None
        );
        assert_eq!(
            distance_km(&Coordinate::new(0.0, 0.0), &Coordinate::new(0.0, 90.0)),
            Some(10007.54)
        );
    }
}
