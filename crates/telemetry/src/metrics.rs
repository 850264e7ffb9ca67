//! In-process metrics: counters, gauges and latency windows.
//!
//! Metric names are the `&'static str` constants in [`crate::names`]. Each
//! latency histogram keeps only its most recent [`WINDOW`] samples, so a long
//! map session does not grow without bound; the total count is kept apart.

use crate::session_id;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Samples retained per histogram.
pub const WINDOW: usize = 1024;

#[derive(Debug, Default)]
struct Samples {
    recent: VecDeque<f64>,
    observed: u64,
}

impl Samples {
    fn push(&mut self, value: f64) {
        if self.recent.len() == WINDOW {
            self.recent.pop_front();
        }
        self.recent.push_back(value);
        self.observed += 1;
    }
}

/// Counters, gauges and histograms behind read-mostly locks.
#[derive(Debug)]
pub struct MetricsRegistry {
    counters: RwLock<BTreeMap<&'static str, AtomicU64>>,
    gauges: RwLock<BTreeMap<&'static str, AtomicU64>>,
    histograms: RwLock<BTreeMap<&'static str, Samples>>,
    started: Instant,
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            counters: RwLock::new(BTreeMap::new()),
            gauges: RwLock::new(BTreeMap::new()),
            histograms: RwLock::new(BTreeMap::new()),
            started: Instant::now(),
        }
    }

    pub fn increment(&self, name: &'static str) {
        self.increment_by(name, 1);
    }

    /// Adds `value` to a counter, creating it on first use.
    pub fn increment_by(&self, name: &'static str, value: u64) {
        if value == 0 {
            return;
        }
        {
            let counters = self.counters.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(counter) = counters.get(name) {
                counter.fetch_add(value, Ordering::Relaxed);
                return;
            }
        }
        self.counters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name)
            .or_default()
            .fetch_add(value, Ordering::Relaxed);
    }

    /// 0 for a counter never incremented.
    pub fn counter(&self, name: &str) -> u64 {
        self.counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    pub fn gauge(&self, name: &'static str, value: u64) {
        self.gauges
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name)
            .or_default()
            .store(value, Ordering::Relaxed);
    }

    pub fn gauge_value(&self, name: &str) -> Option<u64> {
        self.gauges
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map(|g| g.load(Ordering::Relaxed))
    }

    /// Records one sample. Non-finite samples are ignored.
    pub fn observe(&self, name: &'static str, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.histograms
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name)
            .or_default()
            .push(value);
    }

    pub fn histogram_stats(&self, name: &str) -> Option<HistogramStats> {
        self.histograms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .and_then(HistogramStats::of)
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    /// Snapshot of everything, with names in sorted order.
    pub fn export_json(&self) -> serde_json::Value {
        let counters: BTreeMap<&str, u64> = self
            .counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, c)| (*name, c.load(Ordering::Relaxed)))
            .collect();
        let gauges: BTreeMap<&str, u64> = self
            .gauges
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, g)| (*name, g.load(Ordering::Relaxed)))
            .collect();
        let histograms: BTreeMap<&str, HistogramStats> = self
            .histograms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(|(name, samples)| HistogramStats::of(samples).map(|s| (*name, s)))
            .collect();

        serde_json::json!({
            "session_id": session_id(),
            "uptime_secs": self.uptime().as_secs(),
            "counters": counters,
            "gauges": gauges,
            "histograms": histograms,
        })
    }
}

/// Summary of a histogram's retained window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramStats {
    /// Samples ever observed, including those that left the window
    pub observed: u64,
    /// Samples the figures below are computed from
    pub window: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
}

impl HistogramStats {
    fn of(samples: &Samples) -> Option<Self> {
        let mut sorted: Vec<f64> = samples.recent.iter().copied().collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let window = sorted.len();
        let mean = sorted.iter().sum::<f64>() / window as f64;
        Some(Self {
            observed: samples.observed,
            window,
            min: sorted[0],
            max: sorted[window - 1],
            mean,
            p50: nearest_rank(&sorted, 0.50),
            p95: nearest_rank(&sorted, 0.95),
            p99: nearest_rank(&sorted, 0.99),
        })
    }
}

/// Nearest-rank percentile of a non-empty ascending slice.
fn nearest_rank(sorted: &[f64], q: f64) -> f64 {
    let rank = (q * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

/// Measures one operation into a histogram, in milliseconds.
///
/// Records exactly once: on [`Timer::stop`], or on drop if never stopped.
#[derive(Debug)]
pub struct Timer {
    name: &'static str,
    started: Instant,
    done: bool,
}

impl Timer {
    pub fn start(name: &'static str) -> Self {
        Self {
            name,
            started: Instant::now(),
            done: false,
        }
    }

    pub fn stop(mut self) -> Duration {
        self.finish()
    }

    fn finish(&mut self) -> Duration {
        let elapsed = self.started.elapsed();
        if !self.done {
            self.done = true;
            crate::metrics().observe(self.name, elapsed.as_secs_f64() * 1000.0);
            tracing::trace!(metric = self.name, elapsed_ms = elapsed.as_millis() as u64, "Timed");
        }
        elapsed
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names;

    #[test]
    fn test_counters() {
        let registry = MetricsRegistry::new();
        registry.increment(names::RECORDS_DROPPED);
        registry.increment_by(names::RECORDS_DROPPED, 3);
        registry.increment_by(names::RECORDS_PARSED, 0);

        assert_eq!(registry.counter(names::RECORDS_DROPPED), 4);
        assert_eq!(registry.counter(names::RECORDS_PARSED), 0);
        assert!(registry.export_json()["counters"].get(names::RECORDS_PARSED).is_none());
    }

    #[test]
    fn test_gauge_overwrites() {
        let registry = MetricsRegistry::new();
        registry.gauge(names::MARKERS_VISIBLE, 42);
        registry.gauge(names::MARKERS_VISIBLE, 7);

        assert_eq!(registry.gauge_value(names::MARKERS_VISIBLE), Some(7));
        assert_eq!(registry.gauge_value("missing"), None);
    }

    #[test]
    fn test_percentiles() {
        let registry = MetricsRegistry::new();
        for v in 1..=10 {
            registry.observe(names::CLUSTER_MS, f64::from(v));
        }
        registry.observe(names::CLUSTER_MS, f64::NAN);

        let stats = registry.histogram_stats(names::CLUSTER_MS).unwrap();
        assert_eq!(stats.observed, 10);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 10.0);
        assert_eq!(stats.mean, 5.5);
        assert_eq!(stats.p50, 5.0);
        assert_eq!(stats.p99, 10.0);
    }

    #[test]
    fn test_window_is_bounded() {
        let registry = MetricsRegistry::new();
        for v in 0..(WINDOW + 10) {
            registry.observe(names::FETCH_NEARBY_MS, v as f64);
        }

        let stats = registry.histogram_stats(names::FETCH_NEARBY_MS).unwrap();
        assert_eq!(stats.window, WINDOW);
        assert_eq!(stats.observed, (WINDOW + 10) as u64);
        assert_eq!(stats.min, 10.0);
    }

    #[test]
    fn test_export_json() {
        let registry = MetricsRegistry::new();
        registry.increment(names::CLUSTERS_COMPUTED);
        registry.observe(names::CLUSTER_MS, 1.5);

        let json = registry.export_json();
        assert_eq!(json["counters"][names::CLUSTERS_COMPUTED], 1);
        assert_eq!(json["histograms"][names::CLUSTER_MS]["window"], 1);
        assert_eq!(json["session_id"], session_id());
    }

    #[test]
    fn test_timer_records_once() {
        const NAME: &str = "test_timer_records_once";
        let timer = Timer::start(NAME);
        std::thread::sleep(Duration::from_millis(5));
        let elapsed = timer.stop();

        assert!(elapsed >= Duration::from_millis(5));
        assert_eq!(crate::metrics().histogram_stats(NAME).map(|s| s.observed), Some(1));
    }
}
