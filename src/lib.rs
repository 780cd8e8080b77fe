//! # eventring
//!
//! **eventring** is an in-memory bounded event fan-out buffer.
//!
//! It lets many long-lived consumers (caches, replication tailers,
//! subsystem reloaders) observe a single authoritative stream of backend
//! change events without polling the underlying store: a fixed-capacity
//! ring retains the most recent events, and every push is fanned out to a
//! dynamic set of prefix-filtered watchers with bounded queues.
//!
//! ## Features
//!
//! | Area         | Description                                                      | Key types                            |
//! |--------------|------------------------------------------------------------------|--------------------------------------|
//! | **Buffer**   | Bounded ring, overwrite-oldest, snapshot reads.                  | [`EventBuffer`]                      |
//! | **Watchers** | Prefix-filtered subscriptions with bounded delivery queues.      | [`Watch`], [`BufferWatcher`]         |
//! | **Events**   | Change-event data model (`Init`/`Put`/`Delete` + opaque payload).| [`Event`], [`EventKind`], [`Item`]   |
//! | **Errors**   | Typed failures for construction and registration.                | [`BufferError`]                      |
//! | **Metrics**  | Monotone activity counters.                                      | [`BufferMetrics`]                    |
//!
//! ## Guarantees
//! - Producers never block on a consumer: delivery is non-blocking, and a
//!   watcher whose queue is full is evicted rather than stalling the push.
//! - Per watcher, events arrive in push order (after prefix filtering); the
//!   first event is always the synthetic init marker.
//! - Batches are contiguous: no watcher observes another push or a
//!   membership change in the middle of a `push_batch`.
//!
//! ```rust
//! use eventring::{Event, EventBuffer, Watch};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let root = CancellationToken::new();
//!     let buffer = EventBuffer::new(&root, 64)?;
//!
//!     // Subscribe to a slice of the key space.
//!     let mut watcher =
//!         buffer.new_watcher(&root, Watch::new("user-cache").with_prefix("/users/"))?;
//!
//!     // Producer side: report changes.
//!     buffer.push(Event::put("/users/alice", "{}").with_revision(1));
//!     buffer.push(Event::delete("/nodes/n1").with_revision(2));
//!
//!     // Consumer side: init marker first, then matching live events.
//!     let done = watcher.done();
//!     assert!(watcher.recv().await.expect("init").is_init());
//!     let event = watcher.recv().await.expect("live event");
//!     assert_eq!(&event.item.key[..], b"/users/alice");
//!
//!     buffer.close();
//!     done.cancelled().await; // watchers are closed with the buffer
//!     Ok(())
//! }
//! ```

mod buffer;
mod error;
mod events;

// ---- Public re-exports ----

pub use buffer::{BufferMetrics, BufferWatcher, EventBuffer, Watch};
pub use error::BufferError;
pub use events::{Event, EventKind, Item};
