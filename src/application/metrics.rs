//! Counters for event executions.
//!
//! Each periodic or limited event owns a [`Metrics`] handle; clones share the
//! same counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Execution statistics for a single event.
///
/// All counters use relaxed atomics and can be read at any time.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    /// Event function runs
    executed: AtomicU64,
    /// Gate invocations dropped during cooldown
    dropped: AtomicU64,
    /// Timers the deferred execution service refused to arm
    scheduling_failures: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_executed(&self) {
        self.inner.executed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.inner.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_scheduling_failure(&self) {
        self.inner
            .scheduling_failures
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Number of times the event function ran.
    pub fn executed(&self) -> u64 {
        self.inner.executed.load(Ordering::Relaxed)
    }

    /// Number of invocations dropped by a closed gate.
    pub fn dropped(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }

    /// Number of timers that could not be armed.
    pub fn scheduling_failures(&self) -> u64 {
        self.inner.scheduling_failures.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            executed: self.executed(),
            dropped: self.dropped(),
            scheduling_failures: self.scheduling_failures(),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.inner.executed.store(0, Ordering::Relaxed);
        self.inner.dropped.store(0, Ordering::Relaxed);
        self.inner.scheduling_failures.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time snapshot of [`Metrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Event function runs
    pub executed: u64,
    /// Gate invocations dropped during cooldown
    pub dropped: u64,
    /// Timers the deferred execution service refused to arm
    pub scheduling_failures: u64,
}

impl MetricsSnapshot {
    /// Total gate invocations (executed + dropped).
    pub fn invocations(&self) -> u64 {
        self.executed.saturating_add(self.dropped)
    }

    /// Fraction of invocations dropped (0.0 to 1.0).
    ///
    /// Returns 0.0 if nothing has been invoked.
    pub fn drop_rate(&self) -> f64 {
        let total = self.invocations();
        if total == 0 {
            0.0
        } else {
            self.dropped as f64 / total as f64
        }
    }
}
