//! # In-memory delivery metrics.
//!
//! [`MetricsCollector`] aggregates monotonically increasing counters keyed
//! by metric name. Names are derived deterministically from topics:
//!
//! ```text
//! published.total        one per accepted publish call
//! published.<topic>      one per accepted publish call to <topic>
//! handled.<topic>        one per terminal handler success (not per attempt)
//! failed.<topic>         one per exhausted (event, subscription) pair
//! ```
//!
//! ## Rules
//! - Counters only grow between resets.
//! - `snapshot()` is a point-in-time copy, independent of later mutation.
//! - `reset()` clears to an **empty** mapping — previously seen keys do not
//!   linger as zeros.
//! - Increments from parallel handler completions go through one mutex, so
//!   concurrent updates are never lost.
//!
//! Export/presentation is out of scope; consumers read snapshots and ship
//! them wherever they like.

use std::collections::HashMap;
use std::sync::Mutex;

/// Point-in-time copy of the counters mapping.
pub type MetricsSnapshot = HashMap<String, u64>;

/// Thread-safe counter map, optionally disabled wholesale.
pub(crate) struct MetricsCollector {
    enabled: bool,
    counters: Mutex<HashMap<String, u64>>,
}

impl MetricsCollector {
    /// Creates a collector; when `enabled` is false every operation is a
    /// no-op and snapshots are always empty.
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Adds one to the named counter, creating it at zero first if needed.
    pub(crate) fn increment(&self, name: &str) {
        if !self.enabled {
            return;
        }
        let mut counters = self.lock();
        *counters.entry(name.to_string()).or_insert(0) += 1;
    }

    /// Returns an independent copy of the current counters.
    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        self.lock().clone()
    }

    /// Clears the mapping entirely.
    pub(crate) fn reset(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, u64>> {
        self.counters.lock().expect("metrics mutex poisoned")
    }
}

/// `published.total`
pub(crate) fn published_total() -> &'static str {
    "published.total"
}

/// `published.<topic>`
pub(crate) fn published(topic: &str) -> String {
    format!("published.{topic}")
}

/// `handled.<topic>`
pub(crate) fn handled(topic: &str) -> String {
    format!("handled.{topic}")
}

/// `failed.<topic>`
pub(crate) fn failed(topic: &str) -> String {
    format!("failed.{topic}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_increment_and_snapshot() {
        let metrics = MetricsCollector::new(true);
        metrics.increment(published_total());
        metrics.increment(published_total());
        metrics.increment(&published("topic1"));

        let snap = metrics.snapshot();
        assert_eq!(snap.get("published.total"), Some(&2));
        assert_eq!(snap.get("published.topic1"), Some(&1));
    }

    #[test]
    fn test_snapshot_is_independent_of_later_mutation() {
        let metrics = MetricsCollector::new(true);
        metrics.increment("handled.t");
        let snap = metrics.snapshot();
        metrics.increment("handled.t");
        assert_eq!(snap.get("handled.t"), Some(&1));
        assert_eq!(metrics.snapshot().get("handled.t"), Some(&2));
    }

    #[test]
    fn test_reset_clears_to_empty_mapping() {
        let metrics = MetricsCollector::new(true);
        metrics.increment("published.total");
        metrics.reset();
        assert!(metrics.snapshot().is_empty());
    }

    #[test]
    fn test_disabled_collector_records_nothing() {
        let metrics = MetricsCollector::new(false);
        metrics.increment("published.total");
        assert!(metrics.snapshot().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_are_not_lost() {
        let metrics = Arc::new(MetricsCollector::new(true));
        let mut joins = Vec::new();
        for _ in 0..8 {
            let metrics = Arc::clone(&metrics);
            joins.push(tokio::spawn(async move {
                for _ in 0..250 {
                    metrics.increment("published.hot");
                }
            }));
        }
        for join in joins {
            join.await.unwrap();
        }
        assert_eq!(metrics.snapshot().get("published.hot"), Some(&2000));
    }
}
