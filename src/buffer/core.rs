//! # EventBuffer: bounded event ring with watcher fan-out.
//!
//! [`EventBuffer`] is the coordination point between a single producer path
//! and many long-lived consumers: every pushed event lands in a fixed
//! capacity ring (overwrite-oldest) and is fanned out, in the same critical
//! section, to the bounded queue of every watcher whose prefix filter
//! matches.
//!
//! ## Architecture
//! ```text
//! producer ── push / push_batch ──► [ring] ─► fan-out (same lock)
//!                                              ├──► [queue W1] ─► consumer 1
//!                                              ├──► [queue W2] ─► consumer 2
//!                                              └──► [queue WN] ─► consumer N
//! ```
//!
//! ## Rules
//! - Producer operations never fail and never wait on a watcher: delivery is
//!   `try_send`, and a full queue evicts the watcher instead of stalling or
//!   dropping the event for everyone else.
//! - One mutex guards the ring and the watcher list together, so a batch is
//!   observed contiguously: no watcher joins, leaves or sees another push in
//!   the middle of `push_batch`.
//! - Every watcher's first event is the synthetic init marker, queued during
//!   registration as the "caught up, live deltas follow" boundary.
//! - `reset` closes every watcher and zeroes the ring; the buffer stays
//!   usable. `close` cancels the buffer scope first and then resets; the
//!   buffer stays closed.

use std::sync::Mutex;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::buffer::metrics::BufferMetrics;
use crate::buffer::ring::EventRing;
use crate::buffer::set::WatcherSet;
use crate::buffer::watcher::{watcher_pair, BufferWatcher, Watch};
use crate::error::BufferError;
use crate::events::Event;

/// In-memory bounded ring of change events with fan-out to watchers.
///
/// The buffer is volatile and self-contained: no persistence, no global
/// state, no back-references from watchers. It is `Sync`; producers and
/// watcher registration may run from any number of threads or tasks.
///
/// ## Example
/// ```rust
/// use eventring::{Event, EventBuffer, Watch};
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), eventring::BufferError> {
/// let root = CancellationToken::new();
/// let buffer = EventBuffer::new(&root, 64)?;
///
/// let mut watcher =
///     buffer.new_watcher(&root, Watch::new("cache").with_prefix("/users/"))?;
///
/// buffer.push(Event::put("/users/alice", "{}").with_revision(1));
///
/// assert!(watcher.recv().await.expect("init marker").is_init());
/// let event = watcher.recv().await.expect("live event");
/// assert_eq!(&event.item.key[..], b"/users/alice");
///
/// buffer.close();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct EventBuffer {
    /// Buffer scope, a child of the creator's token. Cancelled by `close`.
    scope: CancellationToken,
    inner: Mutex<Inner>,
    metrics: BufferMetrics,
}

/// State guarded by the buffer mutex. The ring and the watcher list always
/// change together, under the same critical section.
#[derive(Debug)]
struct Inner {
    ring: EventRing,
    watchers: WatcherSet,
}

#[allow(clippy::missing_panics_doc)] // methods panic only if the state mutex is poisoned
impl EventBuffer {
    /// Creates a buffer retaining at most `capacity` events.
    ///
    /// The buffer's scope is derived from `parent`: cancelling `parent`
    /// closes the buffer for new watchers and aborts in-flight fan-out at
    /// the next watcher boundary.
    ///
    /// # Errors
    /// Returns [`BufferError::BadParameter`] when `capacity` is zero.
    pub fn new(parent: &CancellationToken, capacity: usize) -> Result<Self, BufferError> {
        if capacity == 0 {
            return Err(BufferError::BadParameter);
        }
        Ok(Self {
            scope: parent.child_token(),
            inner: Mutex::new(Inner {
                ring: EventRing::new(capacity),
                watchers: WatcherSet::new(),
            }),
            metrics: BufferMetrics::default(),
        })
    }

    /// Appends one event and fans it out to matching watchers.
    ///
    /// Never fails and never blocks on a consumer; a watcher whose queue is
    /// full is evicted with a warning.
    pub fn push(&self, event: Event) {
        let mut inner = self.inner.lock().unwrap();
        self.push_locked(&mut inner, event);
    }

    /// Appends a batch of events under a single lock acquisition.
    ///
    /// Equivalent to `push` per element, but atomic with respect to watcher
    /// membership and other pushes: every watcher observes the batch as a
    /// contiguous run.
    pub fn push_batch(&self, events: impl IntoIterator<Item = Event>) {
        let mut inner = self.inner.lock().unwrap();
        for event in events {
            self.push_locked(&mut inner, event);
        }
    }

    fn push_locked(&self, inner: &mut Inner, event: Event) {
        inner.watchers.fan_out(&event, &self.scope, &self.metrics);
        inner.ring.push(event);
        self.metrics.record_pushed();
    }

    /// Returns a copy of the retained events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.inner.lock().unwrap().ring.snapshot()
    }

    /// Current number of retained events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().ring.len()
    }

    /// True when no events are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().ring.is_empty()
    }

    /// Ring capacity, as given at construction.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.lock().unwrap().ring.capacity()
    }

    /// Current number of registered watchers.
    #[must_use]
    pub fn watcher_count(&self) -> usize {
        self.inner.lock().unwrap().watchers.len()
    }

    /// Buffer activity counters.
    #[must_use]
    pub fn metrics(&self) -> &BufferMetrics {
        &self.metrics
    }

    /// True once the buffer has been closed (its scope cancelled).
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.scope.is_cancelled()
    }

    /// Registers a new watcher and returns its consumer handle.
    ///
    /// The watcher's close token is a child of `ctx`; cancelling `ctx`
    /// closes the watcher. `watch.queue_size == 0` is substituted with the
    /// ring capacity. The first queued event is the synthetic
    /// [`Event::init`] marker.
    ///
    /// # Errors
    /// - [`BufferError::Closed`] once the buffer's scope is cancelled.
    /// - [`BufferError::Overflow`] if the init event cannot be enqueued;
    ///   a fresh queue always has room, so this is near-unreachable.
    pub fn new_watcher(
        &self,
        ctx: &CancellationToken,
        watch: Watch,
    ) -> Result<BufferWatcher, BufferError> {
        let mut inner = self.inner.lock().unwrap();

        if self.scope.is_cancelled() {
            return Err(BufferError::Closed);
        }

        let queue_size = if watch.queue_size == 0 {
            inner.ring.capacity()
        } else {
            watch.queue_size
        };
        let (sender, watcher) = watcher_pair(ctx, watch.name, watch.prefixes, queue_size);
        debug!(target: "buffer", watcher = %sender, "add watcher");

        if sender.try_send(Event::init()).is_err() {
            warn!(target: "buffer", watcher = %sender, "closing watcher, init event overflow");
            sender.close();
            return Err(BufferError::Overflow {
                watcher: watcher.name().to_string(),
            });
        }
        if self.scope.is_cancelled() {
            // close() raced us between the entry check and the init enqueue.
            sender.close();
            return Err(BufferError::Closed);
        }

        inner.watchers.add(sender);
        self.metrics.record_watcher_added();
        Ok(watcher)
    }

    /// Closes every watcher, clears the watcher list and zeroes the ring.
    ///
    /// The buffer remains usable: new watchers and pushes are accepted
    /// afterwards.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.watchers.close_all();
        inner.ring.reset();
    }

    /// Cancels the buffer scope, then resets.
    ///
    /// Terminal: `new_watcher` fails with [`BufferError::Closed`] from here
    /// on. Safe to call more than once.
    pub fn close(&self) {
        self.scope.cancel();
        self.reset();
    }
}
