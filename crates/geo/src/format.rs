//! Distance formatting for display.

use crate::{GeoError, Result};

/// Formats a distance in meters for display.
///
/// Below one kilometer the value is rounded half-up to whole meters
/// (`"123m"`); otherwise it is shown in kilometers with exactly one decimal
/// (`"1.2km"`). No thousands separators and no locale variation.
///
/// # Example
/// ```
/// use seoul_services_geo::format_distance;
///
/// assert_eq!(format_distance(123.6).unwrap(), "124m");
/// assert_eq!(format_distance(1000.0).unwrap(), "1.0km");
/// ```
pub fn format_distance(meters: f64) -> Result<String> {
    if !meters.is_finite() || meters < 0.0 {
        return Err(GeoError::InvalidDistance(meters));
    }

    if meters < 1000.0 {
        return Ok(format!("{}m", meters.round() as u64));
    }

    // Rounding on hundreds of meters keeps ties like 1250m at 1.3km.
    let tenths = (meters / 100.0).round() as u64;
    Ok(format!("{}.{}km", tenths / 10, tenths % 10))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meters() {
        assert_eq!(format_distance(0.0).unwrap(), "0m");
        assert_eq!(format_distance(100.0).unwrap(), "100m");
        assert_eq!(format_distance(123.4).unwrap(), "123m");
        assert_eq!(format_distance(123.5).unwrap(), "124m");
        assert_eq!(format_distance(999.0).unwrap(), "999m");
    }

    #[test]
    fn test_kilometers() {
        assert_eq!(format_distance(1000.0).unwrap(), "1.0km");
        assert_eq!(format_distance(1234.0).unwrap(), "1.2km");
        assert_eq!(format_distance(1250.0).unwrap(), "1.3km");
        assert_eq!(format_distance(1289.0).unwrap(), "1.3km");
        assert_eq!(format_distance(12_345.0).unwrap(), "12.3km");
        assert_eq!(format_distance(325_012.0).unwrap(), "325.0km");
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(format_distance(-1.0).is_err());
        assert!(format_distance(f64::NAN).is_err());
        assert!(format_distance(f64::INFINITY).is_err());
    }
}
