//! Telemetry for the Seoul services toolkit
//!
//! This crate provides:
//! - Structured logging through `tracing`, compact or JSON, always on stderr
//! - A process-wide [`MetricsRegistry`] with JSON export
//! - [`Timer`]s that record latencies into histograms
//!
//! Library crates only emit `tracing` events and bump metrics; installing the
//! subscriber is left to binaries via [`init`] or [`init_with_config`].

mod metrics;

pub use metrics::{HistogramStats, MetricsRegistry, Timer, WINDOW};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

/// Metric names recorded across the workspace
pub mod names {
    /// Backend records rejected during parsing
    pub const RECORDS_DROPPED: &str = "records_dropped";
    /// Backend records accepted
    pub const RECORDS_PARSED: &str = "records_parsed";
    /// Clustering passes run
    pub const CLUSTERS_COMPUTED: &str = "clusters_computed";
    /// Markers produced by the last clustering pass
    pub const MARKERS_VISIBLE: &str = "markers_visible";
    /// Responses discarded because a newer request started
    pub const RESPONSES_SUPERSEDED: &str = "responses_superseded";
    /// Device location failures that fell back to the default reference
    pub const LOCATION_FALLBACKS: &str = "location_fallbacks";
    /// Upstream HTTP requests that failed after retries
    pub const UPSTREAM_FAILURES: &str = "upstream_failures";
    /// Nearby fetch latency, in milliseconds
    pub const FETCH_NEARBY_MS: &str = "fetch_nearby_ms";
    /// Clustering latency, in milliseconds
    pub const CLUSTER_MS: &str = "cluster_ms";
}

static METRICS: Lazy<MetricsRegistry> = Lazy::new(MetricsRegistry::new);

static SESSION_ID: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// The process-wide registry.
pub fn metrics() -> &'static MetricsRegistry {
    &METRICS
}

/// Random id attached to the first log line and to exported metrics.
pub fn session_id() -> &'static str {
    &SESSION_ID
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Subscriber settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_level: String,
    pub format: LogFormat,
    /// Include the emitting module in each line
    pub with_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            format: LogFormat::Compact,
            with_target: false,
        }
    }
}

impl TelemetryConfig {
    /// Level from a `-v` count: 0 warn, 1 info, 2 debug, 3+ trace.
    /// Debug and above also show targets.
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        self.log_level = match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
        .to_string();
        self.with_target = verbose >= 2;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// Installs the default subscriber.
pub fn init() -> anyhow::Result<()> {
    init_with_config(TelemetryConfig::default())
}

/// Installs a subscriber for `config`. `RUST_LOG` overrides `log_level`.
///
/// Fails if a global subscriber is already set.
pub fn init_with_config(config: TelemetryConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.with_target);

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Compact => registry.with(layer.compact()).try_init(),
        LogFormat::Json => registry.with(layer.json()).try_init(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))?;

    tracing::debug!(session_id = session_id(), version = env!("CARGO_PKG_VERSION"), "Logging started");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        let quiet = TelemetryConfig::default().with_verbosity(0);
        assert_eq!(quiet.log_level, "warn");
        assert!(!quiet.with_target);

        let debug = TelemetryConfig::default().with_verbosity(2);
        assert_eq!(debug.log_level, "debug");
        assert!(debug.with_target);

        assert_eq!(TelemetryConfig::default().with_verbosity(9).log_level, "trace");
    }

    #[test]
    fn test_log_format_serde() {
        let config: TelemetryConfig =
            serde_json::from_str(r#"{"log_level":"info","format":"json","with_target":true}"#).unwrap();
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_session_id_is_stable_uuid() {
        assert!(Uuid::parse_str(session_id()).is_ok());
        assert_eq!(session_id(), session_id());
    }

    #[test]
    fn test_global_registry() {
        metrics().increment(names::LOCATION_FALLBACKS);
        assert!(metrics().counter(names::LOCATION_FALLBACKS) >= 1);
    }
}
