//! Error types for the cluster crate.

use thiserror::Error;

/// Result type alias for clustering operations.
pub type Result<T> = std::result::Result<T, ClusterError>;

/// Errors that can occur during clustering.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Threshold is negative or not a finite number
    #[error("Invalid cluster threshold: {0} (must be a finite, non-negative number of meters)")]
    InvalidThreshold(f64),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Error code for integration with seoul-services-core error handling.
/// Range: 12xxx for cluster errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterErrorCode {
    /// Invalid threshold
    InvalidThreshold = 12001,
    /// JSON parsing error
    JsonParsing = 12002,
}

impl ClusterError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ClusterErrorCode {
        match self {
            ClusterError::InvalidThreshold(_) => ClusterErrorCode::InvalidThreshold,
            ClusterError::JsonError(_) => ClusterErrorCode::JsonParsing,
        }
    }
}
