//! Configuration file loading

use super::schema::{ConfigSchema, Environment};
use crate::error::{Error, Result, ResultExt};
use std::path::Path;

/// Environment variable overriding `api.base_url`
pub const ENV_API_URL: &str = "SEOUL_SERVICES_API_URL";
/// Environment variable overriding `api.environment`
pub const ENV_ENVIRONMENT: &str = "SEOUL_SERVICES_ENV";
/// Environment variable overriding `api.timeout_secs`
pub const ENV_TIMEOUT_SECS: &str = "SEOUL_SERVICES_TIMEOUT_SECS";

/// Configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub schema: ConfigSchema,
    pub path: Option<String>,
}

impl Config {
    /// Load configuration from a file path or the standard locations,
    /// apply environment overrides, then validate.
    ///
    /// An explicit path that does not exist is an error; finding no file in
    /// the standard locations is not.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !Path::new(p).exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_string()),
            None => find_config_file(),
        };

        let schema = match config_path {
            Some(ref p) => load_config_file(p)?,
            None => ConfigSchema::default(),
        };

        let mut config = Self { schema, path: config_path };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.schema.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let schema: ConfigSchema = toml::from_str(content)?;
        schema.validate()?;
        Ok(Self { schema, path: None })
    }

    /// Apply overrides looked up through `lookup`. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_API_URL) {
            self.schema.api.base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(env) = get(ENV_ENVIRONMENT) {
            self.schema.api.environment = env.parse::<Environment>().context(ENV_ENVIRONMENT)?;
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            self.schema.api.timeout_secs = secs.trim().parse().map_err(|_| {
                Error::config_invalid(format!("{} must be a whole number of seconds, got '{}'", ENV_TIMEOUT_SECS, secs))
            })?;
        }
        Ok(())
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<String> {
    let candidates = [
        "seoul-services.toml",
        ".seoul-services.toml",
        ".config/seoul-services.toml",
    ];

    candidates
        .into_iter()
        .find(|candidate| Path::new(candidate).exists())
        .map(String::from)
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &str) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path)
        .map_err(Error::from)
        .context(format!("Failed to read config file {}", path))?;

    let schema: ConfigSchema = toml::from_str(&content)
        .map_err(Error::from)
        .context(format!("Failed to parse config file {}", path))?;

    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert_eq!(config.schema.search.page_size, 20);
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[search]\nradius_m = 1500\npage_size = 10").unwrap();

        let config = Config::load(file.path().to_str()).unwrap();
        assert_eq!(config.schema.search.radius_m, 1500);
        assert_eq!(config.schema.search.page_size, 10);
        assert!(config.path.is_some());
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = Config::load(Some("/nonexistent/seoul-services.toml")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[map\ncluster_threshold_m = ").unwrap();

        let err = Config::load(file.path().to_str()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
        assert!(err.context.is_some());
    }

    #[test]
    fn test_from_toml_validates() {
        assert!(Config::from_toml("[search]\npage_size = 0").is_err());
        assert!(Config::from_toml("").is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup(&[
                (ENV_API_URL, "https://api.seoul.example/"),
                (ENV_ENVIRONMENT, "staging"),
                (ENV_TIMEOUT_SECS, "12"),
            ]))
            .unwrap();

        assert_eq!(config.schema.api.base_url, "https://api.seoul.example");
        assert_eq!(config.schema.api.environment, Environment::Staging);
        assert_eq!(config.schema.api.timeout_secs, 12);
    }

    #[test]
    fn test_env_override_errors() {
        let mut config = Config::default();
        assert!(config.apply_overrides(lookup(&[(ENV_TIMEOUT_SECS, "soon")])).is_err());
        assert!(config.apply_overrides(lookup(&[(ENV_ENVIRONMENT, "qa")])).is_err());
        assert!(config.apply_overrides(lookup(&[(ENV_API_URL, "  ")])).is_ok());
        assert_eq!(config.schema.api.base_url, "http://localhost:8000");
    }
}
