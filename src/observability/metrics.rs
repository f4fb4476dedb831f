//! Metrics registry
//!
//! - Counters only (no gauges, no histograms)
//! - Monotonic increase
//! - Reset only on process start

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters shared by the engine and the HTTP layer
///
/// Relaxed ordering throughout; counters are independent of each other.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Patient filter requests
    filter_requests: AtomicU64,
    /// Pyramid, histogram, sex split and combined requests
    aggregation_requests: AtomicU64,
    /// Filter option and region center requests
    options_requests: AtomicU64,
    /// Store queries that returned rows
    queries_executed: AtomicU64,
    /// Store queries or acquisitions that failed
    queries_failed: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_filter_requests(&self) {
        self.filter_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_aggregation_requests(&self) {
        self.aggregation_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_options_requests(&self) {
        self.options_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_executed(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_failed(&self) {
        self.queries_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Current value of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            filter_requests: self.filter_requests.load(Ordering::Relaxed),
            aggregation_requests: self.aggregation_requests.load(Ordering::Relaxed),
            options_requests: self.options_requests.load(Ordering::Relaxed),
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            queries_failed: self.queries_failed.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of all counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub filter_requests: u64,
    pub aggregation_requests: u64,
    pub options_requests: u64,
    pub queries_executed: u64,
    pub queries_failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        let snapshot = MetricsRegistry::new().snapshot();
        assert_eq!(snapshot.filter_requests, 0);
        assert_eq!(snapshot.queries_executed, 0);
        assert_eq!(snapshot.queries_failed, 0);
    }

    #[test]
    fn test_increment_counters() {
        let registry = MetricsRegistry::new();
        registry.increment_filter_requests();
        registry.increment_aggregation_requests();
        registry.increment_aggregation_requests();
        registry.increment_options_requests();
        registry.increment_queries_executed();
        registry.increment_queries_failed();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.filter_requests, 1);
        assert_eq!(snapshot.aggregation_requests, 2);
        assert_eq!(snapshot.options_requests, 1);
        assert_eq!(snapshot.queries_executed, 1);
        assert_eq!(snapshot.queries_failed, 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let registry = MetricsRegistry::new();
        registry.increment_queries_executed();

        let json = serde_json::to_value(registry.snapshot()).unwrap();
        assert_eq!(json["queries_executed"], 1);
        assert_eq!(json["filter_requests"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..100 {
                        reg.increment_queries_executed();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.snapshot().queries_executed, 800);
    }
}
