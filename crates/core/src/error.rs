//! Structured errors with codes, context and recovery suggestions
//!
//! Library crates keep their own `thiserror` enums; this type is what the
//! workspace-level pieces (configuration, favorites, the CLI) report, and
//! what the library errors are mapped into at the edges.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Broad failure family. Decides the CLI exit code and the report label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Io,
    Config,
    Validation,
    Upstream,
    Location,
    Data,
}

impl ErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Io => "io",
            ErrorKind::Config => "config",
            ErrorKind::Validation => "validation",
            ErrorKind::Upstream => "upstream",
            ErrorKind::Location => "location",
            ErrorKind::Data => "data",
        }
    }
}

/// Stable numeric identifiers, one thousand block per [`ErrorKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    IoError = 1001,
    FileNotFound = 1002,
    PermissionDenied = 1003,

    ConfigNotFound = 2001,
    ConfigParseError = 2002,
    ConfigValidationError = 2003,

    InvalidInput = 3001,
    InvalidCoordinate = 3002,

    UpstreamError = 4001,
    UpstreamUnavailable = 4002,
    GeocodeNotFound = 4003,
    ServiceNotFound = 4004,
    InvalidResponse = 4005,

    LocationPermissionDenied = 5001,
    LocationUnavailable = 5002,
    LocationTimeout = 5003,
    LocationUnsupported = 5004,

    DataError = 6001,
    FavoritesCorrupt = 6002,
}

impl ErrorCode {
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn kind(self) -> ErrorKind {
        use ErrorCode::*;
        match self {
            IoError | FileNotFound | PermissionDenied => ErrorKind::Io,
            ConfigNotFound | ConfigParseError | ConfigValidationError => ErrorKind::Config,
            InvalidInput | InvalidCoordinate => ErrorKind::Validation,
            UpstreamError | UpstreamUnavailable | GeocodeNotFound | ServiceNotFound | InvalidResponse => {
                ErrorKind::Upstream
            }
            LocationPermissionDenied | LocationUnavailable | LocationTimeout | LocationUnsupported => {
                ErrorKind::Location
            }
            DataError | FavoritesCorrupt => ErrorKind::Data,
        }
    }

    /// Whether offering the user a retry can help.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorCode::UpstreamError
                | ErrorCode::UpstreamUnavailable
                | ErrorCode::LocationUnavailable
                | ErrorCode::LocationTimeout
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SS{}", self.code())
    }
}

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// A coded error with optional context, hint and cause
#[derive(Error, Debug)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    /// What was being attempted
    pub context: Option<String>,
    /// What the user can do about it
    pub suggestion: Option<String>,
    #[source]
    pub source: Option<BoxedSource>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{context}: ")?;
        }
        write!(f, "{} ({})", self.message, self.code)?;
        if let Some(hint) = &self.suggestion {
            write!(f, "\n  hint: {hint}")?;
        }
        Ok(())
    }
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self {
            context: Some(context.into()),
            ..self
        }
    }

    pub fn with_suggestion(self, suggestion: impl Into<String>) -> Self {
        Self {
            suggestion: Some(suggestion.into()),
            ..self
        }
    }

    pub fn with_source(self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..self
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }

    /// Flattened form for `--json-logs` output.
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code.code(),
            kind: self.kind(),
            message: self.message.clone(),
            context: self.context.clone(),
            suggestion: self.suggestion.clone(),
            cause: self.source.as_ref().map(ToString::to_string),
            retryable: self.is_retryable(),
        }
    }

    pub fn config_not_found(path: impl AsRef<std::path::Path>) -> Self {
        let path = path.as_ref().display();
        Self::new(ErrorCode::ConfigNotFound, format!("no configuration at {path}"))
            .with_suggestion("pass an existing seoul-services.toml with --config, or omit it to use defaults")
    }

    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigValidationError, message)
    }

    pub fn location(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code, message).with_suggestion("search by address, or allow location access and try again")
    }

    pub fn invalid_coordinate(latitude: f64, longitude: f64) -> Self {
        Self::new(
            ErrorCode::InvalidCoordinate,
            format!("({latitude}, {longitude}) is not a valid WGS84 coordinate"),
        )
        .with_suggestion("latitude must lie in -90..=90 and longitude in -180..=180")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: u32,
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    pub retryable: bool,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Process exit statuses of the `seoul-services` binary
pub mod exit_codes {
    use super::{ErrorCode, ErrorKind};

    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const VALIDATION_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const UPSTREAM_ERROR: i32 = 4;
    pub const LOCATION_ERROR: i32 = 5;

    pub fn for_code(code: ErrorCode) -> i32 {
        match code.kind() {
            ErrorKind::Validation => VALIDATION_ERROR,
            ErrorKind::Config => CONFIG_ERROR,
            ErrorKind::Upstream => UPSTREAM_ERROR,
            ErrorKind::Location => LOCATION_ERROR,
            ErrorKind::Io | ErrorKind::Data => FAILURE,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Self::new(code, err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::new(ErrorCode::DataError, format!("malformed JSON: {err}")).with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::new(ErrorCode::ConfigParseError, format!("malformed TOML: {}", err.message())).with_source(err)
    }
}

/// Decorate the error side of a core [`Result`]
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;
    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_suggestion(suggestion))
    }
}
