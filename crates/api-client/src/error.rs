//! Error types for the API client

use crate::location::LocationError;
use seoul_services_core::{Error as CoreError, ErrorCode};
use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// API client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller-supplied value rejected before sending
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// API returned an error response
    #[error("API error ({status}): {message}")]
    ApiResponse {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },

    /// The backend answered with `success: false`
    #[error("Request rejected by backend: {0}")]
    Rejected(String),

    /// The response body did not have the expected shape
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    /// No result for the requested address or service
    #[error("Not found: {0}")]
    NotFound(String),

    /// An upstream service could not be reached or failed on its side
    #[error("{service} is unavailable: {reason}")]
    ServiceUnavailable {
        /// Which service
        service: &'static str,
        /// Underlying failure
        reason: String,
    },

    /// Circuit breaker is open
    #[error("Circuit breaker is open - service temporarily unavailable")]
    CircuitOpen,

    /// All retry attempts exhausted
    #[error("All {attempts} retry attempts failed: {last_error}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Last error message
        last_error: String,
    },
}

/// Error code for integration with seoul-services-core error handling.
/// Range: 13xxx for API client errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    /// Transport failure
    Request = 13001,
    /// JSON encoding or decoding
    Json = 13002,
    /// Bad client configuration
    Config = 13003,
    /// Bad caller input
    InvalidInput = 13004,
    /// Non-success HTTP status
    ApiResponse = 13005,
    /// `success: false`
    Rejected = 13006,
    /// Unexpected body shape
    InvalidResponse = 13007,
    /// Nothing found
    NotFound = 13008,
    /// Upstream down
    ServiceUnavailable = 13009,
    /// Circuit open
    CircuitOpen = 13010,
    /// Retries exhausted
    RetriesExhausted = 13011,
}

impl ApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an API response error
    pub fn api_response(status: u16, message: impl Into<String>) -> Self {
        Self::ApiResponse {
            status,
            message: message.into(),
        }
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ApiErrorCode {
        match self {
            Self::Request(_) => ApiErrorCode::Request,
            Self::Json(_) => ApiErrorCode::Json,
            Self::Config(_) => ApiErrorCode::Config,
            Self::InvalidInput(_) => ApiErrorCode::InvalidInput,
            Self::ApiResponse { .. } => ApiErrorCode::ApiResponse,
            Self::Rejected(_) => ApiErrorCode::Rejected,
            Self::InvalidResponse(_) => ApiErrorCode::InvalidResponse,
            Self::NotFound(_) => ApiErrorCode::NotFound,
            Self::ServiceUnavailable { .. } => ApiErrorCode::ServiceUnavailable,
            Self::CircuitOpen => ApiErrorCode::CircuitOpen,
            Self::RetriesExhausted { .. } => ApiErrorCode::RetriesExhausted,
        }
    }

    /// Whether the client should try the same request again
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(e) => e.is_connect() || e.is_timeout(),
            // 5xx and 429
            Self::ApiResponse { status, .. } => *status >= 500 || *status == 429,
            Self::ServiceUnavailable { .. } => true,
            Self::CircuitOpen
            | Self::Config(_)
            | Self::InvalidInput(_)
            | Self::Json(_)
            | Self::Rejected(_)
            | Self::InvalidResponse(_)
            | Self::NotFound(_)
            | Self::RetriesExhausted { .. } => false,
        }
    }

    /// Whether a person could sensibly press "retry": the failure was on the
    /// network or upstream side rather than in the request itself.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.is_retryable()
            || matches!(
                self,
                Self::CircuitOpen | Self::RetriesExhausted { .. } | Self::Request(_)
            )
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiResponse { status, .. } if (400..500).contains(status))
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiResponse { status, .. } if *status >= 500)
    }

    /// Fold a transport-level failure into the geocoder's two outcomes.
    /// 404 becomes [`ApiError::NotFound`]; anything transient becomes
    /// [`ApiError::ServiceUnavailable`].
    pub(crate) fn for_service(self, service: &'static str, not_found: impl FnOnce() -> String) -> Self {
        match self {
            Self::ApiResponse { status: 404, .. } => Self::NotFound(not_found()),
            err if err.is_transient() || err.is_server_error() => Self::ServiceUnavailable {
                service,
                reason: err.to_string(),
            },
            err => err,
        }
    }
}

impl From<ApiError> for CoreError {
    fn from(err: ApiError) -> Self {
        let code = match &err {
            ApiError::Config(_) => ErrorCode::ConfigValidationError,
            ApiError::InvalidInput(_) => ErrorCode::InvalidInput,
            ApiError::NotFound(_) => ErrorCode::GeocodeNotFound,
            ApiError::InvalidResponse(_) | ApiError::Json(_) => ErrorCode::InvalidResponse,
            ApiError::ApiResponse { status: 404, .. } => ErrorCode::ServiceNotFound,
            e if e.is_transient() || e.is_server_error() => ErrorCode::UpstreamUnavailable,
            _ => ErrorCode::UpstreamError,
        };
        let message = err.to_string();
        let core = CoreError::new(code, message).with_source(err);
        if code == ErrorCode::UpstreamUnavailable {
            core.with_suggestion("Check that the backend is running and try again")
        } else {
            core
        }
    }
}

impl From<LocationError> for CoreError {
    fn from(err: LocationError) -> Self {
        let code = match err {
            LocationError::PermissionDenied => ErrorCode::LocationPermissionDenied,
            LocationError::Unavailable(_) => ErrorCode::LocationUnavailable,
            LocationError::Timeout(_) => ErrorCode::LocationTimeout,
            LocationError::Unsupported => ErrorCode::LocationUnsupported,
        };
        CoreError::location(code, err.user_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        assert!(ApiError::api_response(503, "down").is_retryable());
        assert!(ApiError::api_response(429, "slow down").is_retryable());
        assert!(!ApiError::api_response(404, "missing").is_retryable());
        assert!(!ApiError::CircuitOpen.is_retryable());
        assert!(ApiError::CircuitOpen.is_transient());
    }

    #[test]
    fn test_for_service_classification() {
        let not_found = ApiError::api_response(404, "").for_service("Geocoding", || "종로구".into());
        assert!(matches!(not_found, ApiError::NotFound(ref a) if a == "종로구"));

        let down = ApiError::api_response(502, "bad gateway").for_service("Geocoding", String::new);
        assert!(matches!(down, ApiError::ServiceUnavailable { service: "Geocoding", .. }));

        let exhausted = ApiError::RetriesExhausted { attempts: 3, last_error: "x".into() }
            .for_service("Geocoding", String::new);
        assert_eq!(exhausted.code(), ApiErrorCode::ServiceUnavailable);

        let bad = ApiError::api_response(400, "bad").for_service("Geocoding", String::new);
        assert!(bad.is_client_error());
    }

    #[test]
    fn test_core_conversion() {
        let core: CoreError = ApiError::NotFound("x".into()).into();
        assert_eq!(core.code, ErrorCode::GeocodeNotFound);

        let core: CoreError = ApiError::ServiceUnavailable { service: "Backend", reason: "refused".into() }.into();
        assert_eq!(core.code, ErrorCode::UpstreamUnavailable);
        assert!(core.is_retryable());

        let core: CoreError = LocationError::PermissionDenied.into();
        assert_eq!(core.code, ErrorCode::LocationPermissionDenied);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ApiError::CircuitOpen.code() as u32, 13010);
        assert_eq!(ApiError::Rejected("no".into()).code(), ApiErrorCode::Rejected);
    }
}
