//! Device position acquisition with a timeout and a fallback reference point
//!
//! The position provider (browser geolocation, a GPS daemon, a fixed value
//! from the command line) sits behind [`PositionSource`]. Whatever it does,
//! [`acquire_position`] always produces a usable reference point: on failure
//! or timeout it falls back and reports why.

use seoul_services_geo::{Coordinate, SEOUL_CITY_HALL};
use seoul_services_telemetry::{metrics, names};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// How long to wait for a fix unless configured otherwise
pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Why no device position was obtained
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    /// The user or platform refused access
    #[error("Location permission denied")]
    PermissionDenied,

    /// The provider could not determine a position
    #[error("Location unavailable: {0}")]
    Unavailable(String),

    /// No fix within the allotted time
    #[error("Location request timed out after {0:?}")]
    Timeout(Duration),

    /// The platform has no position provider
    #[error("Location is not supported on this platform")]
    Unsupported,
}

/// Error code for integration with seoul-services-core error handling.
/// Range: 14xxx for location errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationErrorCode {
    PermissionDenied = 14001,
    Unavailable = 14002,
    Timeout = 14003,
    Unsupported = 14004,
}

impl LocationError {
    /// Returns the error code for this error.
    pub fn code(&self) -> LocationErrorCode {
        match self {
            LocationError::PermissionDenied => LocationErrorCode::PermissionDenied,
            LocationError::Unavailable(_) => LocationErrorCode::Unavailable,
            LocationError::Timeout(_) => LocationErrorCode::Timeout,
            LocationError::Unsupported => LocationErrorCode::Unsupported,
        }
    }

    /// Message shown to the user
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationError::PermissionDenied => "위치 정보 접근 권한이 거부되었습니다.",
            LocationError::Unavailable(_) => "위치 정보를 사용할 수 없습니다.",
            LocationError::Timeout(_) => "위치 정보 요청 시간이 초과되었습니다.",
            LocationError::Unsupported => "이 기기는 위치 정보를 지원하지 않습니다.",
        }
    }

    /// Whether asking again might succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, LocationError::Unavailable(_) | LocationError::Timeout(_))
    }
}

/// A provider of the device's current position
pub trait PositionSource {
    /// Resolve the current position
    fn current_position(&self) -> impl Future<Output = Result<Coordinate, LocationError>> + Send;
}

/// A position known up front, e.g. from command-line flags
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinate);

impl PositionSource for FixedPosition {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        Ok(self.0)
    }
}

/// A platform without any position provider
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPositionSource;

impl PositionSource for NoPositionSource {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        Err(LocationError::Unsupported)
    }
}

/// Where the reference point came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionOrigin {
    Device,
    Fallback,
}

/// Result of [`acquire_position`]: always a coordinate, plus the failure that
/// forced the fallback if there was one
#[derive(Debug, Clone, PartialEq)]
pub struct PositionOutcome {
    pub coordinate: Coordinate,
    pub origin: PositionOrigin,
    pub error: Option<LocationError>,
}

impl PositionOutcome {
    pub fn is_fallback(&self) -> bool {
        self.origin == PositionOrigin::Fallback
    }
}

/// Ask `source` for a position, waiting at most `timeout`.
///
/// Any failure, including an out-of-range coordinate from the provider,
/// yields `fallback` together with the reason.
pub async fn acquire_position<S: PositionSource>(
    source: &S,
    timeout: Duration,
    fallback: Coordinate,
) -> PositionOutcome {
    let result = match tokio::time::timeout(timeout, source.current_position()).await {
        Ok(Ok(coordinate)) if coordinate.is_valid() => Ok(coordinate),
        Ok(Ok(coordinate)) => Err(LocationError::Unavailable(format!(
            "provider returned ({}, {})",
            coordinate.latitude, coordinate.longitude
        ))),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(LocationError::Timeout(timeout)),
    };

    match result {
        Ok(coordinate) => {
            debug!(lat = coordinate.latitude, lon = coordinate.longitude, "Device position acquired");
            PositionOutcome {
                coordinate,
                origin: PositionOrigin::Device,
                error: None,
            }
        }
        Err(error) => {
            metrics().increment(names::LOCATION_FALLBACKS);
            warn!(error = %error, "Falling back to default reference point");
            PositionOutcome {
                coordinate: fallback,
                origin: PositionOrigin::Fallback,
                error: Some(error),
            }
        }
    }
}

/// [`acquire_position`] with the standard timeout and Seoul City Hall as the
/// fallback
pub async fn acquire_default<S: PositionSource>(source: &S) -> PositionOutcome {
    acquire_position(source, DEFAULT_LOCATION_TIMEOUT, SEOUL_CITY_HALL).await
}
