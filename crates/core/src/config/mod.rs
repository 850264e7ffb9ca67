//! Configuration loading and schema definitions
//!
//! Settings come from `seoul-services.toml`, then environment overrides.

mod loader;
mod schema;

pub use loader::{Config, ENV_API_URL, ENV_ENVIRONMENT, ENV_TIMEOUT_SECS};
pub use schema::*;
