//! Error types for the geo crate.

use thiserror::Error;

/// Result type alias for geo operations.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Errors that can occur during geo operations.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Coordinate outside the WGS84 range
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// NaN or infinite input where a finite number is required
    #[error("Non-finite input: {0}")]
    NonFinite(String),

    /// Negative or non-finite distance handed to the formatter
    #[error("Invalid distance: {0} meters")]
    InvalidDistance(f64),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Error code for integration with seoul-services-core error handling.
/// Range: 10xxx for geo errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoErrorCode {
    /// Coordinate outside the WGS84 range
    InvalidCoordinate = 10001,
    /// NaN or infinite input
    NonFinite = 10002,
    /// Negative or non-finite distance
    InvalidDistance = 10003,
    /// JSON parsing error
    JsonParsing = 10004,
}

impl GeoError {
    /// Returns the error code for this error.
    pub fn code(&self) -> GeoErrorCode {
        match self {
            GeoError::InvalidCoordinate(_) => GeoErrorCode::InvalidCoordinate,
            GeoError::NonFinite(_) => GeoErrorCode::NonFinite,
            GeoError::InvalidDistance(_) => GeoErrorCode::InvalidDistance,
            GeoError::JsonError(_) => GeoErrorCode::JsonParsing,
        }
    }
}
