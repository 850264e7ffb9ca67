//! Error types for the search crate.

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during search operations.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Unknown sort key
    #[error("Invalid sort key: {0} (expected distance, name or date)")]
    InvalidSortKey(String),

    /// Page size of zero
    #[error("Invalid page size: {0}")]
    InvalidPageSize(usize),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}
