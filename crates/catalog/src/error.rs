//! Error types for the catalog crate.

use thiserror::Error;

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors that can occur while building or parsing catalog entities.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Category name outside the closed set
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// A required field is absent or empty
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Coordinates are missing, non-numeric or out of range
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Record is not a JSON object
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Error code for integration with seoul-services-core error handling.
/// Range: 11xxx for catalog errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogErrorCode {
    /// Unknown category
    UnknownCategory = 11001,
    /// Missing required field
    MissingField = 11002,
    /// Invalid coordinate
    InvalidCoordinate = 11003,
    /// Invalid record shape
    InvalidRecord = 11004,
    /// JSON parsing error
    JsonParsing = 11005,
}

impl CatalogError {
    /// Returns the error code for this error.
    pub fn code(&self) -> CatalogErrorCode {
        match self {
            CatalogError::UnknownCategory(_) => CatalogErrorCode::UnknownCategory,
            CatalogError::MissingField(_) => CatalogErrorCode::MissingField,
            CatalogError::InvalidCoordinate(_) => CatalogErrorCode::InvalidCoordinate,
            CatalogError::InvalidRecord(_) => CatalogErrorCode::InvalidRecord,
            CatalogError::JsonError(_) => CatalogErrorCode::JsonParsing,
        }
    }
}
