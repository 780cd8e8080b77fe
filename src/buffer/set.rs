//! # WatcherSet: ordered watcher list with non-blocking fan-out.
//!
//! [`WatcherSet`] distributes each [`Event`](crate::events::Event) to every
//! matching watcher **without awaiting** any consumer. It runs entirely under
//! the buffer mutex, so a fan-out pass costs at most one `try_send` per
//! watcher.
//!
//! ## What it guarantees
//! - `fan_out` returns in bounded time; no retry, no blocking send.
//! - Iteration order is insertion order, and eviction preserves the relative
//!   order of the remaining watchers.
//! - Per-watcher FIFO (queue order equals push order after filtering).
//!
//! ## What it does **not** guarantee
//! - No ordering across different watchers (they drain at their own pace).
//! - No delivery to a watcher whose queue is full: the watcher is closed
//!   and removed instead of stalling the producer.
//!
//! ## Diagram
//! ```text
//!    fan_out(&Event)
//!        │                       (clone per matching watcher)
//!        ├── match prefix? ────► [queue W1] ─► consumer 1
//!        ├── match prefix? ────► [queue W2] ─► consumer 2
//!        └── match prefix? ────► [queue WN] ─► consumer N
//!                 full queue ──► close + evict
//! ```

use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::buffer::metrics::BufferMetrics;
use crate::buffer::watcher::WatcherSender;
use crate::events::Event;

/// Ordered list of registered watchers.
#[derive(Debug)]
pub(crate) struct WatcherSet {
    watchers: Vec<WatcherSender>,
}

impl WatcherSet {
    pub(crate) fn new() -> Self {
        Self {
            watchers: Vec::new(),
        }
    }

    /// Appends a watcher; it participates in fan-out from the next push on.
    pub(crate) fn add(&mut self, watcher: WatcherSender) {
        self.watchers.push(watcher);
    }

    /// Number of registered watchers.
    pub(crate) fn len(&self) -> usize {
        self.watchers.len()
    }

    /// Closes every watcher and clears the list.
    pub(crate) fn close_all(&mut self) {
        for watcher in &self.watchers {
            watcher.close();
        }
        self.watchers.clear();
    }

    /// Delivers `event` to every matching watcher.
    ///
    /// A watcher whose queue is full is closed and evicted; a watcher whose
    /// consumer is gone (token cancelled or receiver dropped) is pruned
    /// silently. The pass aborts at the next watcher boundary once `scope`
    /// is cancelled. Victims are removed after the iteration, never
    /// mid-pass.
    pub(crate) fn fan_out(
        &mut self,
        event: &Event,
        scope: &CancellationToken,
        metrics: &BufferMetrics,
    ) {
        let mut dirty = false;
        for watcher in &self.watchers {
            if scope.is_cancelled() {
                break;
            }
            if watcher.is_closed() {
                dirty = true;
                continue;
            }
            if !watcher.matches(event) {
                continue;
            }
            match watcher.try_send(event.clone()) {
                Ok(()) => {
                    metrics.record_delivered();
                }
                Err(TrySendError::Full(_)) => {
                    warn!(target: "buffer", watcher = %watcher, "closing watcher, queue overflow");
                    watcher.close();
                    metrics.record_watcher_evicted();
                    dirty = true;
                }
                Err(TrySendError::Closed(_)) => {
                    // Consumer dropped its handle; nothing left to deliver to.
                    watcher.close();
                    dirty = true;
                }
            }
        }
        if dirty {
            self.watchers.retain(|watcher| !watcher.is_closed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::watcher::{watcher_pair, BufferWatcher};
    use bytes::Bytes;

    fn pair(
        ctx: &CancellationToken,
        name: &str,
        prefixes: &[&'static str],
        queue_size: usize,
    ) -> (WatcherSender, BufferWatcher) {
        let prefixes: Vec<Bytes> = prefixes.iter().map(|p| Bytes::from(*p)).collect();
        watcher_pair(ctx, name.into(), prefixes, queue_size)
    }

    fn drain(watcher: &mut BufferWatcher) -> Vec<Event> {
        let mut out = Vec::new();
        while let Ok(event) = watcher.try_recv() {
            out.push(event);
        }
        out
    }

    // --- fan-out tests ---

    #[test]
    fn test_fan_out_respects_prefixes() {
        let ctx = CancellationToken::new();
        let scope = CancellationToken::new();
        let metrics = BufferMetrics::default();
        let mut set = WatcherSet::new();

        let (s1, mut w1) = pair(&ctx, "all", &[], 8);
        let (s2, mut w2) = pair(&ctx, "users", &["/users/"], 8);
        set.add(s1);
        set.add(s2);

        set.fan_out(&Event::put("/users/alice", ""), &scope, &metrics);
        set.fan_out(&Event::put("/nodes/n1", ""), &scope, &metrics);

        assert_eq!(drain(&mut w1).len(), 2);
        let got = drain(&mut w2);
        assert_eq!(got.len(), 1);
        assert_eq!(&got[0].item.key[..], b"/users/alice");
        assert_eq!(metrics.events_delivered(), 3);
    }

    #[test]
    fn test_overflow_evicts_watcher() {
        let ctx = CancellationToken::new();
        let scope = CancellationToken::new();
        let metrics = BufferMetrics::default();
        let mut set = WatcherSet::new();

        let (sender, mut watcher) = pair(&ctx, "slow", &[], 1);
        set.add(sender);

        set.fan_out(&Event::put("/a", ""), &scope, &metrics);
        assert_eq!(set.len(), 1);

        // Queue is full now; the next matching event evicts.
        set.fan_out(&Event::put("/b", ""), &scope, &metrics);
        assert_eq!(set.len(), 0);
        assert!(watcher.is_closed());
        assert_eq!(metrics.watchers_evicted(), 1);

        // The queued event stays readable after eviction.
        let got = drain(&mut watcher);
        assert_eq!(got.len(), 1);
        assert_eq!(&got[0].item.key[..], b"/a");
    }

    #[test]
    fn test_eviction_preserves_remaining_order() {
        let ctx = CancellationToken::new();
        let scope = CancellationToken::new();
        let metrics = BufferMetrics::default();
        let mut set = WatcherSet::new();

        let (s1, mut w1) = pair(&ctx, "first", &[], 8);
        let (s2, w2) = pair(&ctx, "slow", &[], 1);
        let (s3, mut w3) = pair(&ctx, "last", &[], 8);
        set.add(s1);
        set.add(s2);
        set.add(s3);

        set.fan_out(&Event::put("/a", ""), &scope, &metrics);
        assert_eq!(set.len(), 3);

        // "slow" is full now; the second pass evicts only it.
        set.fan_out(&Event::put("/b", ""), &scope, &metrics);
        assert_eq!(set.len(), 2);
        assert!(w2.is_closed());
        assert_eq!(drain(&mut w1).len(), 2);
        assert_eq!(drain(&mut w3).len(), 2);
    }

    #[test]
    fn test_dropped_handle_is_pruned_silently() {
        let ctx = CancellationToken::new();
        let scope = CancellationToken::new();
        let metrics = BufferMetrics::default();
        let mut set = WatcherSet::new();

        let (sender, watcher) = pair(&ctx, "gone", &[], 8);
        set.add(sender);
        drop(watcher);

        set.fan_out(&Event::put("/a", ""), &scope, &metrics);
        assert_eq!(set.len(), 0);
        assert_eq!(metrics.events_delivered(), 0);
        assert_eq!(metrics.watchers_evicted(), 0);
    }

    #[test]
    fn test_cancelled_scope_aborts_pass() {
        let ctx = CancellationToken::new();
        let scope = CancellationToken::new();
        let metrics = BufferMetrics::default();
        let mut set = WatcherSet::new();

        let (s1, mut w1) = pair(&ctx, "w1", &[], 8);
        set.add(s1);

        scope.cancel();
        set.fan_out(&Event::put("/a", ""), &scope, &metrics);
        assert!(drain(&mut w1).is_empty());
        assert_eq!(metrics.events_delivered(), 0);
    }

    // --- close_all tests ---

    #[test]
    fn test_close_all() {
        let ctx = CancellationToken::new();
        let mut set = WatcherSet::new();

        let (s1, w1) = pair(&ctx, "w1", &[], 8);
        let (s2, w2) = pair(&ctx, "w2", &[], 8);
        set.add(s1);
        set.add(s2);

        set.close_all();
        assert_eq!(set.len(), 0);
        assert!(w1.is_closed());
        assert!(w2.is_closed());
    }
}
