//! Atomic counters describing buffer activity.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotone counters exposed by [`EventBuffer::metrics`](crate::EventBuffer::metrics).
///
/// Counters are observation-only: nothing in the buffer reads them back, and
/// they survive [`reset`](crate::EventBuffer::reset).
#[derive(Debug, Default)]
pub struct BufferMetrics {
    events_pushed: AtomicU64,
    events_delivered: AtomicU64,
    watchers_added: AtomicU64,
    watchers_evicted: AtomicU64,
}

impl BufferMetrics {
    /// Total events accepted by `push` / `push_batch`.
    #[must_use]
    pub fn events_pushed(&self) -> u64 {
        self.events_pushed.load(Ordering::Relaxed)
    }

    /// Total events enqueued to watcher queues.
    #[must_use]
    pub fn events_delivered(&self) -> u64 {
        self.events_delivered.load(Ordering::Relaxed)
    }

    /// Total watchers registered over the buffer's lifetime.
    #[must_use]
    pub fn watchers_added(&self) -> u64 {
        self.watchers_added.load(Ordering::Relaxed)
    }

    /// Total watchers evicted because their queue overflowed.
    #[must_use]
    pub fn watchers_evicted(&self) -> u64 {
        self.watchers_evicted.load(Ordering::Relaxed)
    }

    pub(crate) fn record_pushed(&self) {
        self.events_pushed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivered(&self) {
        self.events_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_watcher_added(&self) {
        self.watchers_added.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_watcher_evicted(&self) {
        self.watchers_evicted.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = BufferMetrics::default();
        assert_eq!(metrics.events_pushed(), 0);
        assert_eq!(metrics.events_delivered(), 0);
        assert_eq!(metrics.watchers_added(), 0);
        assert_eq!(metrics.watchers_evicted(), 0);
    }

    #[test]
    fn test_counters_accumulate() {
        let metrics = BufferMetrics::default();
        metrics.record_pushed();
        metrics.record_pushed();
        metrics.record_delivered();
        metrics.record_watcher_added();
        metrics.record_watcher_evicted();

        assert_eq!(metrics.events_pushed(), 2);
        assert_eq!(metrics.events_delivered(), 1);
        assert_eq!(metrics.watchers_added(), 1);
        assert_eq!(metrics.watchers_evicted(), 1);
    }
}
