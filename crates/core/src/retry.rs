//! Retry pacing and a circuit breaker for upstream calls
//!
//! The HTTP client walks the schedule from [`RetryConfig::attempts`] against
//! the backend and the geocoder, and consults a shared [`CircuitBreaker`] so
//! a service that is down is left alone for a while.
//!
//! # Example
//!
//! ```rust
//! use seoul_services_core::retry::RetryConfig;
//!
//! let schedule: Vec<_> = RetryConfig::default().attempts().collect();
//! assert_eq!(schedule.len(), 3);
//! assert!(schedule[0].delay.is_zero());
//! assert!(schedule[2].is_last);
//! ```

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// How many times to try, and how long to wait in between
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, the first one included
    pub max_attempts: u32,
    /// Wait before the second attempt
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Growth factor between consecutive waits
    pub backoff_multiplier: f64,
    /// Stretch each wait by up to a quarter
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::doubling(3, Duration::from_millis(200), Duration::from_secs(5))
    }
}

impl RetryConfig {
    fn doubling(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay,
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }

    /// Development preset: fail fast
    pub fn quick() -> Self {
        Self::doubling(2, Duration::from_millis(50), Duration::from_millis(500))
    }

    /// Production preset
    pub fn patient() -> Self {
        Self::doubling(4, Duration::from_millis(500), Duration::from_secs(10))
    }

    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            jitter: false,
        }
    }

    /// Clamped to at least one attempt.
    #[must_use]
    pub fn with_max_attempts(self, max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..self
        }
    }

    /// The attempt schedule. Always yields at least one attempt, even when
    /// `max_attempts` is 0; the caller sleeps for each `delay` itself.
    pub fn attempts(&self) -> Attempts<'_> {
        Attempts { config: self, next: 0 }
    }

    /// Wait before the attempt at 0-based `index`. Index 0 never waits.
    pub fn delay_for_attempt(&self, index: u32) -> Duration {
        let Some(retry) = index.checked_sub(1) else {
            return Duration::ZERO;
        };

        let grown = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(retry.min(64) as i32);
        let mut secs = grown.min(self.max_delay.as_secs_f64());
        if self.jitter {
            secs += secs * 0.25 * unit_noise();
        }
        Duration::from_secs_f64(secs)
    }
}

/// Clock-seeded value in `0.0..1.0`. Only spreads retries apart.
fn unit_noise() -> f64 {
    use std::collections::hash_map::RandomState;
    use std::hash::BuildHasher;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    (RandomState::new().hash_one(nanos) % 1024) as f64 / 1024.0
}

/// One planned attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    /// 1-based
    pub number: u32,
    /// Wait before making this attempt
    pub delay: Duration,
    /// No attempt follows this one
    pub is_last: bool,
}

/// Iterator returned by [`RetryConfig::attempts`]
#[derive(Debug, Clone)]
pub struct Attempts<'a> {
    config: &'a RetryConfig,
    next: u32,
}

impl Attempts<'_> {
    fn total(&self) -> u32 {
        self.config.max_attempts.max(1)
    }
}

impl Iterator for Attempts<'_> {
    type Item = Attempt;

    fn next(&mut self) -> Option<Attempt> {
        let index = self.next;
        if index >= self.total() {
            return None;
        }
        self.next += 1;
        Some(Attempt {
            number: index + 1,
            delay: self.config.delay_for_attempt(index),
            is_last: self.next == self.total(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.total() - self.next.min(self.total())) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Attempts<'_> {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Requests flow
    Closed,
    /// Requests are refused until the cool-down passes
    Open,
    /// Trial requests decide between closing and reopening
    HalfOpen,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open a closed circuit
    pub failure_threshold: u32,
    /// Half-open successes that close it again
    pub success_threshold: u32,
    /// How long an open circuit refuses requests
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            reset_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug)]
struct Breaker {
    state: CircuitState,
    failures: u32,
    successes: u32,
    opened_at: Option<Instant>,
}

impl Breaker {
    fn trip(&mut self) {
        self.state = CircuitState::Open;
        self.successes = 0;
        self.opened_at = Some(Instant::now());
    }
}

/// Circuit breaker shared by every clone of a client
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<Breaker>,
}

impl CircuitBreaker {
    /// Starts closed.
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Breaker {
                state: CircuitState::Closed,
                failures: 0,
                successes: 0,
                opened_at: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Breaker> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    /// Whether a request may go out now. An open circuit past its cool-down
    /// turns half-open and admits the request.
    pub fn can_execute(&self) -> bool {
        let mut breaker = self.lock();
        if breaker.state != CircuitState::Open {
            return true;
        }
        let cooled = breaker
            .opened_at
            .is_none_or(|at| at.elapsed() >= self.config.reset_timeout);
        if cooled {
            breaker.state = CircuitState::HalfOpen;
            breaker.successes = 0;
        }
        cooled
    }

    pub fn record_success(&self) {
        let mut breaker = self.lock();
        breaker.failures = 0;
        if breaker.state == CircuitState::HalfOpen {
            breaker.successes += 1;
            if breaker.successes >= self.config.success_threshold {
                breaker.state = CircuitState::Closed;
            }
        }
    }

    pub fn record_failure(&self) {
        let mut breaker = self.lock();
        breaker.failures += 1;
        let trips = match breaker.state {
            CircuitState::Closed => breaker.failures >= self.config.failure_threshold,
            CircuitState::HalfOpen => true,
            CircuitState::Open => false,
        };
        if trips {
            breaker.trip();
        }
    }

    /// Closed, counters cleared.
    pub fn reset(&self) {
        let mut breaker = self.lock();
        breaker.state = CircuitState::Closed;
        breaker.failures = 0;
        breaker.successes = 0;
        breaker.opened_at = None;
    }
}
