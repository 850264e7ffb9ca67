//! Haversine distance calculation.
//!
//! The Haversine formula calculates the great-circle distance between two points
//! on a sphere given their longitudes and latitudes. The `atan2` form used here
//! stays inside the function domain, so coincident and antipodal points never
//! produce NaN.

use crate::{Coordinate, GeoError, Result};

/// Earth's mean radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculates the great-circle distance between two coordinates in meters.
///
/// Returns an error if either coordinate contains NaN or an infinity.
///
/// # Example
/// ```
/// use seoul_services_geo::{distance, Coordinate};
///
/// let a = Coordinate::new(37.5665, 126.978);
/// assert_eq!(distance(&a, &a).unwrap(), 0.0);
/// ```
pub fn distance(from: &Coordinate, to: &Coordinate) -> Result<f64> {
    for coord in [from, to] {
        if !coord.is_finite() {
            return Err(GeoError::NonFinite(format!(
                "({}, {})",
                coord.latitude, coord.longitude
            )));
        }
    }
    Ok(haversine_meters(from, to))
}

/// Unchecked Haversine distance in meters.
///
/// Callers must guarantee finite input; [`distance`] is the checked entry point.
#[inline]
pub fn haversine_meters(from: &Coordinate, to: &Coordinate) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CITY_HALL: Coordinate = Coordinate { latitude: 37.5665, longitude: 126.978 };
    const GANGNAM: Coordinate = Coordinate { latitude: 37.498, longitude: 127.0276 };
    const BUSAN: Coordinate = Coordinate { latitude: 35.1796, longitude: 129.0756 };

    #[test]
    fn test_city_hall_to_gangnam() {
        let meters = distance(&CITY_HALL, &GANGNAM).unwrap();
        assert!(meters > 8000.0 && meters < 9000.0, "City Hall-Gangnam: {}", meters);
    }

    #[test]
    fn test_seoul_to_busan() {
        let meters = distance(&CITY_HALL, &BUSAN).unwrap();
        // Expected: ~325 km
        assert!((meters - 325_000.0).abs() < 5_000.0, "Seoul-Busan: {}", meters);
    }

    #[test]
    fn test_same_point_zero_distance() {
        assert_eq!(distance(&CITY_HALL, &CITY_HALL).unwrap(), 0.0);
    }

    #[test]
    fn test_antipodal_is_finite() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 180.0);
        let meters = distance(&a, &b).unwrap();
        assert!((meters - std::f64::consts::PI * EARTH_RADIUS_M).abs() < 1.0);
    }

    #[test]
    fn test_non_finite_rejected() {
        let bad = Coordinate::new(f64::NAN, 126.978);
        assert!(distance(&bad, &CITY_HALL).is_err());
        assert!(distance(&CITY_HALL, &bad).is_err());
    }

    proptest! {
        #[test]
        fn prop_symmetric(
            lat1 in -90.0f64..90.0, lon1 in -180.0f64..180.0,
            lat2 in -90.0f64..90.0, lon2 in -180.0f64..180.0,
        ) {
            let a = Coordinate::new(lat1, lon1);
            let b = Coordinate::new(lat2, lon2);
            let d1 = distance(&a, &b).unwrap();
            let d2 = distance(&b, &a).unwrap();
            prop_assert!((d1 - d2).abs() < 1e-6);
            prop_assert!(d1 >= 0.0);
        }

        #[test]
        fn prop_identity_zero(lat in -90.0f64..90.0, lon in -180.0f64..180.0) {
            let a = Coordinate::new(lat, lon);
            prop_assert_eq!(distance(&a, &a).unwrap(), 0.0);
        }
    }
}
