//! Geospatial helpers for Seoul public-service discovery.
//!
//! This crate provides:
//! - Haversine great-circle distance in meters
//! - Distance formatting for list and overlay display
//! - Batch distance annotation with optional parallelism
//! - WASM bindings for browser usage
//!
//! # Example
//!
//! ```
//! use seoul_services_geo::{distance, format_distance, Coordinate};
//!
//! let city_hall = Coordinate::new(37.5665, 126.978);
//! let gangnam = Coordinate::new(37.498, 127.0276);
//!
//! let meters = distance(&city_hall, &gangnam).unwrap();
//! assert!(meters > 8000.0 && meters < 9000.0);
//! assert_eq!(format_distance(1234.0).unwrap(), "1.2km");
//! ```

mod error;
mod format;
mod haversine;
pub mod batch;

#[cfg(feature = "wasm")]
mod wasm;

pub use batch::{annotate_distances, calculate_distances, DistanceResult, LocationItem};
pub use error::{GeoError, GeoErrorCode, Result};
pub use format::format_distance;
pub use haversine::{distance, haversine_meters, EARTH_RADIUS_M};

/// Seoul City Hall, used as the reference point when no position is known.
pub const SEOUL_CITY_HALL: Coordinate = Coordinate {
    latitude: 37.5665,
    longitude: 126.978,
};

/// A WGS84 coordinate with latitude and longitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate without validating it.
    #[inline]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Returns true if both components are finite numbers.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Returns true if the coordinate is finite and inside the WGS84 range.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Checks the coordinate, returning an error that names the bad component.
    pub fn validate(&self) -> Result<()> {
        if !self.is_finite() {
            return Err(GeoError::NonFinite(format!(
                "({}, {})",
                self.latitude, self.longitude
            )));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(GeoError::InvalidCoordinate(format!(
                "latitude {} out of range",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(GeoError::InvalidCoordinate(format!(
                "longitude {} out of range",
                self.longitude
            )));
        }
        Ok(())
    }

    /// Converts degrees to radians for internal calculations.
    #[inline]
    pub(crate) fn to_radians(self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

/// Anything that sits at a single coordinate.
pub trait Positioned {
    /// The position used for distance calculations.
    fn coordinate(&self) -> Coordinate;
}

impl Positioned for Coordinate {
    fn coordinate(&self) -> Coordinate {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_creation() {
        let coord = Coordinate::new(37.5665, 126.978);
        assert_eq!(coord.latitude, 37.5665);
        assert_eq!(coord.longitude, 126.978);
    }

    #[test]
    fn test_coordinate_validation() {
        assert!(Coordinate::new(0.0, 0.0).is_valid());
        assert!(Coordinate::new(90.0, 180.0).is_valid());
        assert!(Coordinate::new(-90.0, -180.0).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, 181.0).is_valid());
        assert!(!Coordinate::new(f64::NAN, 126.978).is_valid());
    }

    #[test]
    fn test_validate_reports_component() {
        let err = Coordinate::new(95.0, 126.0).validate().unwrap_err();
        assert!(err.to_string().contains("latitude"));

        let err = Coordinate::new(37.0, f64::INFINITY).validate().unwrap_err();
        assert_eq!(err.code(), GeoErrorCode::NonFinite);
    }

    #[test]
    fn test_coordinate_from_tuple() {
        let coord: Coordinate = (37.5665, 126.978).into();
        assert_eq!(coord, SEOUL_CITY_HALL);
    }
}
