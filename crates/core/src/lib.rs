//! Core utilities for the Seoul services workspace
//!
//! This crate provides shared functionality used across the workspace:
//!
//! - **Error handling**: Errors with codes, context, and recovery suggestions
//! - **Configuration**: `seoul-services.toml` with environment overrides and validation
//! - **Retry**: Exponential backoff and a circuit breaker for upstream calls
//! - **Supersession**: Latest-request-wins tickets for async fetches
//! - **Favorites**: A JSON file of saved services
//!
//! # Example
//!
//! ```rust,no_run
//! use seoul_services_core::{config::Config, favorites::FavoritesStore};
//!
//! let config = Config::load(None).expect("invalid configuration");
//! let mut favorites = FavoritesStore::open(config.schema.favorites.resolved_path())
//!     .expect("unreadable favorites");
//! favorites.toggle("lib-1", "서울도서관", "libraries").expect("write failed");
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod favorites;
pub mod retry;
pub mod supersede;

pub use error::{Error, ErrorCode, ErrorKind, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema, Environment};
    pub use crate::error::{exit_codes, Error, ErrorCode, ErrorKind, Result, ResultExt};
    pub use crate::favorites::{Favorite, FavoritesStore};
    pub use crate::retry::{Attempt, CircuitBreaker, CircuitBreakerConfig, RetryConfig};
    pub use crate::supersede::{RequestTicket, RequestTracker};
}
