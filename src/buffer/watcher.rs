//! # Watcher handles and prefix filtering.
//!
//! A watcher is split into two connected halves:
//!
//! - [`WatcherSender`] stays inside the buffer's watcher list: identity,
//!   the bounded queue's sender, and the close token used for eviction.
//! - [`BufferWatcher`] is handed to the consumer: the queue's receiver plus
//!   the same close token, so the consumer can select between the event
//!   stream and the shutdown signal.
//!
//! Interaction is one-way. The buffer pushes into the queue and cancels the
//! token; the consumer drains the queue and may close from its side. Neither
//! half holds a reference back to the buffer.
//!
//! ## Matching rule
//! An event matches a watcher iff the watcher's prefix list is empty or at
//! least one prefix is a byte-for-byte prefix of the event's key. An empty
//! prefix inside a non-empty list matches everything.

use std::fmt;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};
use tokio_util::sync::CancellationToken;

use crate::events::Event;

/// Subscription parameters for [`EventBuffer::new_watcher`](crate::EventBuffer::new_watcher).
///
/// ## Example
/// ```rust
/// use eventring::Watch;
///
/// let watch = Watch::new("replica-tailer")
///     .with_prefix("/users/")
///     .with_prefix("/nodes/")
///     .with_queue_size(128);
///
/// assert_eq!(watch.name, "replica-tailer");
/// assert_eq!(watch.prefixes.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Watch {
    /// Free-form identifier used in diagnostics.
    pub name: String,
    /// Accepted key prefixes; empty means "accept every event".
    pub prefixes: Vec<Bytes>,
    /// Delivery queue capacity; `0` substitutes the buffer's ring capacity.
    pub queue_size: usize,
}

impl Watch {
    /// Creates parameters with the given name, no prefixes, default queue.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefixes: Vec::new(),
            queue_size: 0,
        }
    }

    /// Appends an accepted key prefix.
    pub fn with_prefix(mut self, prefix: impl Into<Bytes>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    /// Overrides the delivery queue capacity.
    pub fn with_queue_size(mut self, queue_size: usize) -> Self {
        self.queue_size = queue_size;
        self
    }
}

/// Returns true if `event`'s key starts with any of `prefixes`.
///
/// An empty `prefixes` accepts everything.
pub(crate) fn match_prefix(prefixes: &[Bytes], event: &Event) -> bool {
    if prefixes.is_empty() {
        return true;
    }
    prefixes.iter().any(|p| event.item.key.starts_with(p))
}

/// Creates the connected (buffer-side, consumer-side) halves of a watcher.
///
/// The close token is a child of `ctx`: cancelling `ctx` closes the watcher.
/// `queue_size` must already be normalized (> 0).
pub(crate) fn watcher_pair(
    ctx: &CancellationToken,
    name: String,
    prefixes: Vec<Bytes>,
    queue_size: usize,
) -> (WatcherSender, BufferWatcher) {
    let (tx, rx) = mpsc::channel(queue_size);
    let closed = ctx.child_token();

    let sender = WatcherSender {
        name: name.clone(),
        prefixes: prefixes.clone(),
        capacity: queue_size,
        sender: tx,
        closed: closed.clone(),
    };
    let watcher = BufferWatcher {
        name,
        prefixes,
        capacity: queue_size,
        receiver: rx,
        closed,
    };
    (sender, watcher)
}

fn fmt_watcher(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    prefixes: &[Bytes],
    capacity: usize,
    size: usize,
) -> fmt::Result {
    write!(f, "Watcher(name={name}, prefixes=[")?;
    for (i, prefix) in prefixes.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", String::from_utf8_lossy(prefix))?;
    }
    write!(f, "], capacity={capacity}, size={size})")
}

/// Buffer-side half of a watcher.
///
/// Lives in the buffer's watcher list; used by fan-out to match, deliver
/// and, on overflow, evict.
#[derive(Debug)]
pub(crate) struct WatcherSender {
    name: String,
    prefixes: Vec<Bytes>,
    capacity: usize,
    sender: mpsc::Sender<Event>,
    closed: CancellationToken,
}

impl WatcherSender {
    /// True if `event` passes this watcher's prefix filter.
    pub(crate) fn matches(&self, event: &Event) -> bool {
        match_prefix(&self.prefixes, event)
    }

    /// Non-blocking enqueue into the delivery queue.
    pub(crate) fn try_send(&self, event: Event) -> Result<(), TrySendError<Event>> {
        self.sender.try_send(event)
    }

    /// Signals the close token. Idempotent.
    pub(crate) fn close(&self) {
        self.closed.cancel();
    }

    /// True once the close token has been signalled from any side.
    pub(crate) fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    fn queued(&self) -> usize {
        self.capacity - self.sender.capacity()
    }
}

impl fmt::Display for WatcherSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_watcher(f, &self.name, &self.prefixes, self.capacity, self.queued())
    }
}

/// Consumer-side watcher handle.
///
/// Returned by [`EventBuffer::new_watcher`](crate::EventBuffer::new_watcher).
/// The first received event is always the synthetic init marker; live events
/// that pass the prefix filter follow in push order.
///
/// Consumers should select between [`recv`](Self::recv) and the
/// [`done`](Self::done) token:
///
/// ```rust,no_run
/// # async fn consume(mut watcher: eventring::BufferWatcher) {
/// let done = watcher.done();
/// loop {
///     tokio::select! {
///         _ = done.cancelled() => break,
///         Some(event) = watcher.recv() => {
///             let _ = event;
///         }
///     }
/// }
/// # }
/// ```
///
/// Dropping the handle closes the watcher; the buffer prunes the dead entry
/// on a later fan-out pass.
#[derive(Debug)]
pub struct BufferWatcher {
    name: String,
    prefixes: Vec<Bytes>,
    capacity: usize,
    receiver: mpsc::Receiver<Event>,
    closed: CancellationToken,
}

impl BufferWatcher {
    /// Receives the next queued event.
    ///
    /// Queued events stay readable after the watcher is closed or evicted;
    /// `None` is returned once the buffer has dropped its sender and the
    /// queue is drained.
    pub async fn recv(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Non-blocking variant of [`recv`](Self::recv).
    pub fn try_recv(&mut self) -> Result<Event, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Returns the close token.
    ///
    /// Fires exactly once when the watcher is closed by any path: self-close,
    /// creator-scope cancellation, buffer reset/close, or overflow eviction.
    /// The returned clone shares state with the watcher's own token, so
    /// cancelling it is equivalent to [`close`](Self::close).
    pub fn done(&self) -> CancellationToken {
        self.closed.clone()
    }

    /// Closes the watcher. Idempotent; signals [`done`](Self::done).
    pub fn close(&self) {
        self.closed.cancel();
    }

    /// True once the watcher has been closed by any path.
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Watcher name, as given in [`Watch`].
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Accepted key prefixes.
    pub fn prefixes(&self) -> &[Bytes] {
        &self.prefixes
    }

    /// Delivery queue capacity after zero-substitution.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current delivery queue depth.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// True when no events are queued.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl fmt::Display for BufferWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_watcher(
            f,
            &self.name,
            &self.prefixes,
            self.capacity,
            self.receiver.len(),
        )
    }
}

impl Drop for BufferWatcher {
    fn drop(&mut self) {
        self.closed.cancel();
    }
}
