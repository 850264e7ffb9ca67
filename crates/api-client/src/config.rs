//! Configuration for the Seoul services API client
//!
//! Built from the workspace configuration file, the environment, or one of
//! the presets.

use crate::error::{ApiError, ApiResult};
use seoul_services_core::config::{ConfigSchema, ENV_API_URL, ENV_ENVIRONMENT, ENV_TIMEOUT_SECS};
use seoul_services_core::retry::{CircuitBreakerConfig, RetryConfig};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

pub use seoul_services_core::config::Environment;

/// Default backend URL for local development
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Path prefix of every backend endpoint
pub const API_PREFIX: &str = "api/v1";

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL, without the API prefix
    pub base_url: String,
    /// Request timeout
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Retry configuration
    pub retry: RetryConfig,
    /// Circuit breaker configuration
    pub circuit_breaker: CircuitBreakerConfig,
    /// Current environment
    pub environment: Environment,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl ClientConfig {
    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables:
    /// - `SEOUL_SERVICES_API_URL`: Backend base URL
    /// - `SEOUL_SERVICES_ENV`: Environment (development/staging/production)
    /// - `SEOUL_SERVICES_TIMEOUT_SECS`: Request timeout in seconds
    pub fn from_env() -> ApiResult<Self> {
        let environment = match env::var(ENV_ENVIRONMENT) {
            Ok(value) if !value.trim().is_empty() => value
                .parse::<Environment>()
                .map_err(|e| ApiError::config(e.message))?,
            _ => Environment::Development,
        };

        let mut config = Self::for_environment(environment);

        if let Ok(url) = env::var(ENV_API_URL) {
            if !url.trim().is_empty() {
                config = config.with_base_url(url.trim());
            }
        }

        if let Ok(secs) = env::var(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| ApiError::config(format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds")))?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Create configuration from a loaded configuration file. The file
    /// loader has already applied environment overrides.
    pub fn from_schema(schema: &ConfigSchema) -> Self {
        let api = &schema.api;
        Self::for_environment(api.environment)
            .with_base_url(api.base_url.clone())
            .with_timeout(Duration::from_secs(api.timeout_secs))
            .with_retry(retry_for(api.environment).with_max_attempts(api.retry_attempts))
    }

    /// Preset for an environment
    #[must_use]
    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Development => Self::development(),
            Environment::Staging => Self::staging(),
            Environment::Production => Self::production(),
        }
    }

    /// Local backend with short timeouts
    #[must_use]
    pub fn development() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            retry: retry_for(Environment::Development),
            circuit_breaker: CircuitBreakerConfig::default(),
            environment: Environment::Development,
        }
    }

    /// Staging preset. The base URL still has to be supplied.
    #[must_use]
    pub fn staging() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            retry: retry_for(Environment::Staging),
            circuit_breaker: CircuitBreakerConfig::default(),
            environment: Environment::Staging,
        }
    }

    /// Production preset. The base URL still has to be supplied.
    #[must_use]
    pub fn production() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            retry: retry_for(Environment::Production),
            circuit_breaker: CircuitBreakerConfig::default(),
            environment: Environment::Production,
        }
    }

    /// Builder-style method to set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to set retry config
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Builder-style method to set circuit breaker config
    #[must_use]
    pub fn with_circuit_breaker(mut self, circuit_breaker: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = circuit_breaker;
        self
    }

    /// Full URL of an endpoint path below the API prefix
    pub fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            API_PREFIX,
            path.trim_start_matches('/')
        )
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.base_url.is_empty() {
            return Err(ApiError::config("base_url cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::config("base_url must start with http:// or https://"));
        }

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        if self.retry.max_attempts == 0 {
            return Err(ApiError::config("retry.max_attempts must be at least 1"));
        }

        Ok(())
    }
}

fn retry_for(environment: Environment) -> RetryConfig {
    match environment {
        Environment::Development => RetryConfig::quick(),
        Environment::Staging => RetryConfig::default(),
        Environment::Production => RetryConfig::patient(),
    }
}
