//! Bridge traffic counters.
//!
//! Plain atomics shared by `Arc`; the driver logs a snapshot on shutdown and
//! the embedding process can export them however it likes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for bridge traffic.
#[derive(Debug, Default)]
pub struct BridgeMetrics {
    /// Operations accepted by `submit`.
    submitted: AtomicU64,
    /// Operations issued to the backend.
    serviced: AtomicU64,
    /// Receipts fulfilled with a terminal outcome.
    fulfilled: AtomicU64,
    /// Operations dropped unfulfilled at shutdown.
    abandoned: AtomicU64,
}

impl BridgeMetrics {
    /// Create a new shared counter set.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_serviced(&self) {
        self.serviced.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fulfilled(&self) {
        self.fulfilled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_abandoned(&self, count: u64) {
        self.abandoned.fetch_add(count, Ordering::Relaxed);
    }

    /// Point-in-time view of the counters.
    #[must_use]
    pub fn snapshot(&self) -> BridgeMetricsSnapshot {
        BridgeMetricsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            serviced: self.serviced.load(Ordering::Relaxed),
            fulfilled: self.fulfilled.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
        }
    }
}

/// One read of [`BridgeMetrics`]; fields may be skewed by in-flight updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeMetricsSnapshot {
    /// Operations accepted by `submit`.
    pub submitted: u64,
    /// Operations issued to the backend.
    pub serviced: u64,
    /// Receipts fulfilled with a terminal outcome.
    pub fulfilled: u64,
    /// Operations dropped unfulfilled at shutdown.
    pub abandoned: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = BridgeMetrics::new();

        metrics.record_submitted();
        metrics.record_submitted();
        metrics.record_serviced();
        metrics.record_fulfilled();
        metrics.record_abandoned(3);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.submitted, 2);
        assert_eq!(snapshot.serviced, 1);
        assert_eq!(snapshot.fulfilled, 1);
        assert_eq!(snapshot.abandoned, 3);
    }

    #[test]
    fn test_snapshot_is_stable_copy() {
        let metrics = BridgeMetrics::new();
        metrics.record_submitted();

        let before = metrics.snapshot();
        metrics.record_submitted();
        let after = metrics.snapshot();

        assert_eq!(before.submitted, 1);
        assert_eq!(after.submitted, 2);
    }
}
