//! Latest-request-wins bookkeeping for async fetches
//!
//! Outstanding requests are never cancelled. Each one takes a ticket when it
//! starts, and its response is applied only if no newer request has started
//! since.
//!
//! ```rust
//! use seoul_services_core::supersede::RequestTracker;
//!
//! let tracker = RequestTracker::new();
//! let first = tracker.begin();
//! let second = tracker.begin();
//!
//! assert!(!tracker.is_current(&first));
//! assert!(tracker.is_current(&second));
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one started request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    /// Sequence number, starting at 1
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// Hands out monotonically increasing tickets
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: AtomicU64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding every earlier ticket
    pub fn begin(&self) -> RequestTicket {
        RequestTicket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Whether `ticket` belongs to the most recently started request
    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }

    /// Supersede every outstanding ticket without starting a request
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::AcqRel);
    }

    /// Returns `value` only if `ticket` is still current
    pub fn accept<T>(&self, ticket: &RequestTicket, value: T) -> Option<T> {
        self.is_current(ticket).then_some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_latest_wins() {
        let tracker = RequestTracker::new();
        let a = tracker.begin();
        assert!(tracker.is_current(&a));

        let b = tracker.begin();
        assert!(b > a);
        assert_eq!(tracker.accept(&a, "stale"), None);
        assert_eq!(tracker.accept(&b, "fresh"), Some("fresh"));
    }

    #[test]
    fn test_invalidate() {
        let tracker = RequestTracker::new();
        let ticket = tracker.begin();
        tracker.invalidate();
        assert!(!tracker.is_current(&ticket));
    }

    #[test]
    fn test_tickets_unique_across_threads() {
        let tracker = Arc::new(RequestTracker::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                thread::spawn(move || (0..100).map(|_| tracker.begin().sequence()).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<u64> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 800);
    }
}
