//! Configuration schema definitions
//!
//! Every field has a default, so a partial file (or none at all) is valid.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Root configuration schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub map: MapConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub location: LocationConfig,

    #[serde(default)]
    pub favorites: FavoritesConfig,
}

impl ConfigSchema {
    /// Check value ranges across all sections
    pub fn validate(&self) -> Result<()> {
        self.api.validate()?;
        self.map.validate()?;
        self.search.validate()?;
        self.location.validate()?;
        Ok(())
    }
}

/// Deployment environment of the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Environment::Development),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(Error::config_invalid(format!("Unknown environment: {}", other))),
        }
    }
}

/// Backend API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend, without the `/api/v1` prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub environment: Environment,

    /// Per-request timeout in seconds
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,

    /// Attempts per request, including the first
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            environment: Environment::default(),
            timeout_secs: default_api_timeout(),
            retry_attempts: default_retry_attempts(),
        }
    }
}

impl ApiConfig {
    fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::config_invalid(format!(
                "api.base_url must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::config_invalid("api.timeout_secs must be greater than 0"));
        }
        if self.retry_attempts == 0 {
            return Err(Error::config_invalid("api.retry_attempts must be at least 1"));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_api_timeout() -> u64 {
    30
}

fn default_retry_attempts() -> u32 {
    3
}

/// Map display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Markers closer than this many meters are grouped
    #[serde(default = "default_cluster_threshold")]
    pub cluster_threshold_m: f64,

    /// Initial zoom level of the map
    #[serde(default = "default_zoom")]
    pub default_zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            cluster_threshold_m: default_cluster_threshold(),
            default_zoom: default_zoom(),
        }
    }
}

impl MapConfig {
    fn validate(&self) -> Result<()> {
        if !self.cluster_threshold_m.is_finite() || self.cluster_threshold_m < 0.0 {
            return Err(Error::config_invalid(format!(
                "map.cluster_threshold_m must be a non-negative number, got {}",
                self.cluster_threshold_m
            )));
        }
        if self.default_zoom == 0 {
            return Err(Error::config_invalid("map.default_zoom must be at least 1"));
        }
        Ok(())
    }
}

fn default_cluster_threshold() -> f64 {
    500.0
}

fn default_zoom() -> u8 {
    5
}

/// Nearby search settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search radius around the reference point, in meters
    #[serde(default = "default_radius")]
    pub radius_m: u32,

    /// List page size
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Maximum records requested from the backend
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            radius_m: default_radius(),
            page_size: default_page_size(),
            limit: default_limit(),
        }
    }
}

impl SearchConfig {
    fn validate(&self) -> Result<()> {
        if self.radius_m == 0 {
            return Err(Error::config_invalid("search.radius_m must be greater than 0"));
        }
        if self.page_size == 0 {
            return Err(Error::config_invalid("search.page_size must be greater than 0"));
        }
        if self.limit == 0 {
            return Err(Error::config_invalid("search.limit must be greater than 0"));
        }
        Ok(())
    }
}

fn default_radius() -> u32 {
    5000
}

fn default_page_size() -> usize {
    20
}

fn default_limit() -> u32 {
    500
}

/// Device location settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    /// How long to wait for a position fix
    #[serde(default = "default_location_timeout")]
    pub timeout_secs: u64,

    /// Reference latitude used when no fix is available
    #[serde(default = "default_latitude")]
    pub default_latitude: f64,

    /// Reference longitude used when no fix is available
    #[serde(default = "default_longitude")]
    pub default_longitude: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_location_timeout(),
            default_latitude: default_latitude(),
            default_longitude: default_longitude(),
        }
    }
}

impl LocationConfig {
    fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::config_invalid("location.timeout_secs must be greater than 0"));
        }
        let (lat, lon) = (self.default_latitude, self.default_longitude);
        if !(lat.is_finite() && lon.is_finite() && (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)) {
            return Err(Error::invalid_coordinate(lat, lon).with_context("location.default_latitude/default_longitude"));
        }
        Ok(())
    }
}

// Seoul City Hall
fn default_latitude() -> f64 {
    37.5665
}

fn default_longitude() -> f64 {
    126.9780
}

fn default_location_timeout() -> u64 {
    10
}

/// Favorites storage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FavoritesConfig {
    /// Override for the favorites file location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl FavoritesConfig {
    /// Configured path, or `favorites.json` under the user data directory
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("seoul-services")
                .join("favorites.json")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let schema = ConfigSchema::default();
        assert_eq!(schema.api.base_url, "http://localhost:8000");
        assert_eq!(schema.api.timeout_secs, 30);
        assert_eq!(schema.map.cluster_threshold_m, 500.0);
        assert_eq!(schema.search.radius_m, 5000);
        assert_eq!(schema.search.page_size, 20);
        assert_eq!(schema.location.timeout_secs, 10);
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let schema: ConfigSchema = toml::from_str(
            r#"
            [api]
            base_url = "https://api.example.kr"
            environment = "production"

            [map]
            cluster_threshold_m = 250.0
            "#,
        )
        .unwrap();

        assert_eq!(schema.api.environment, Environment::Production);
        assert_eq!(schema.api.timeout_secs, 30);
        assert_eq!(schema.map.cluster_threshold_m, 250.0);
        assert_eq!(schema.search, SearchConfig::default());
    }

    #[test]
    fn test_validation_failures() {
        let mut schema = ConfigSchema::default();
        schema.map.cluster_threshold_m = -1.0;
        assert!(schema.validate().is_err());

        let mut schema = ConfigSchema::default();
        schema.api.base_url = "localhost:8000".into();
        assert!(schema.validate().is_err());

        let mut schema = ConfigSchema::default();
        schema.location.default_latitude = 91.0;
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("Staging".parse::<Environment>().unwrap(), Environment::Staging);
        assert!("qa".parse::<Environment>().is_err());
    }

    #[test]
    fn test_favorites_path_override() {
        let config = FavoritesConfig { path: Some(PathBuf::from("/tmp/favs.json")) };
        assert_eq!(config.resolved_path(), PathBuf::from("/tmp/favs.json"));
        assert!(FavoritesConfig::default().resolved_path().ends_with("seoul-services/favorites.json"));
    }
}
