//! HTTP client for the Seoul public services backend
//!
//! This crate provides a resilient client for the nearby-search, service
//! detail and geocoding endpoints, plus device position acquisition with a
//! timeout and a fallback reference point.
//!
//! # Features
//!
//! - **Configuration**: From `seoul-services.toml`, the environment, or presets
//! - **Retry with exponential backoff**: Automatic retry for transient failures
//! - **Circuit breaker**: Stop calling a backend that keeps failing
//! - **Request correlation**: Every request carries an `X-Request-ID`
//! - **Tolerant parsing**: Bad records are dropped, the response survives
//!
//! # Example
//!
//! ```rust,no_run
//! use seoul_services_api_client::{location, NearbyQuery, SeoulServicesClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SeoulServicesClient::new()?;
//!
//!     let here = location::acquire_default(&location::NoPositionSource).await;
//!     let found = client.services().nearby(&NearbyQuery::new(here.coordinate)).await?;
//!     println!("{} services nearby", found.entities.len());
//!
//!     let place = client.geocoding().geocode("서울특별시 중구 세종대로 110").await?;
//!     println!("{} -> {:?}", place.address, place.coordinate);
//!
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod location;

pub use client::SeoulServicesClient;
pub use config::{ClientConfig, Environment};
pub use endpoints::{GeocodeResult, NearbyQuery, ReverseGeocodeResult};
pub use error::{ApiError, ApiErrorCode, ApiResult};
pub use location::{acquire_position, LocationError, PositionOutcome, PositionSource};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::SeoulServicesClient;
    pub use crate::config::{ClientConfig, Environment};
    pub use crate::endpoints::{GeocodingApi, NearbyQuery, ServicesApi};
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::location::{acquire_position, FixedPosition, LocationError, PositionOutcome, PositionSource};
}
