//! Endpoint-specific API implementations
//!
//! Each module provides a typed interface for a set of backend endpoints.
//!
//! | Module | Backend route | Description |
//! |--------|---------------|-------------|
//! | `services` | `/api/v1/services/nearby`, `/api/v1/services/{category}/{id}` | Nearby search and detail |
//! | `geocoding` | `/api/v1/geocode`, `/api/v1/geocode/reverse` | Address lookup both ways |

pub mod geocoding;
pub mod services;

pub use geocoding::{GeocodeResult, GeocodingApi, ReverseGeocodeResult};
pub use services::{NearbyQuery, ServicesApi, DEFAULT_RADIUS_M};
