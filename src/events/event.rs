//! # Backend change events.
//!
//! The [`EventKind`] enum classifies events in two categories:
//! - **External events**: changes reported by the event source (`Put`, `Delete`)
//! - **Synthetic events**: the `Init` subscription marker, created by the
//!   buffer itself and delivered exactly once as the first event on every
//!   watcher queue
//!
//! [`Event`] carries the kind plus an opaque [`Item`] payload. The buffer
//! reads only `item.key` (for prefix matching); value, revision and lease are
//! forwarded untouched.
//!
//! ## Example
//! ```rust
//! use eventring::{Event, EventKind};
//!
//! let ev = Event::put("/users/alice", "{\"role\":\"admin\"}")
//!     .with_revision(42)
//!     .with_lease(7);
//!
//! assert_eq!(ev.kind, EventKind::Put);
//! assert_eq!(&ev.item.key[..], b"/users/alice");
//! assert_eq!(ev.item.revision, 42);
//! assert_eq!(ev.item.lease, Some(7));
//! ```

use std::fmt;

use bytes::Bytes;

/// Classification of change events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Synthetic subscription marker: "caught up, live deltas follow".
    Init,
    /// A record was created or updated.
    Put,
    /// A record was removed.
    Delete,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::Init => "init",
            EventKind::Put => "put",
            EventKind::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// Key/value payload carried by an event.
///
/// Opaque to the buffer except for `key`, which drives prefix matching.
/// [`Bytes`] keeps the per-watcher clones performed during fan-out cheap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Item {
    /// Record key; may be empty for `Init`.
    pub key: Bytes,
    /// Raw value bytes.
    pub value: Bytes,
    /// Storage revision that produced the event.
    pub revision: u64,
    /// Lease id attached to the record, if any.
    pub lease: Option<i64>,
}

/// A single change event.
///
/// Events are plain values: the ring stores one copy and fan-out clones it
/// into each matching watcher queue with no ownership coupling between the
/// ring slot and the queued copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// The kind of event.
    pub kind: EventKind,
    /// Payload item.
    pub item: Item,
}

impl Event {
    /// Creates the synthetic init marker (zero item).
    pub fn init() -> Self {
        Self {
            kind: EventKind::Init,
            item: Item::default(),
        }
    }

    /// Creates a put event for `key` carrying `value`.
    pub fn put(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            kind: EventKind::Put,
            item: Item {
                key: key.into(),
                value: value.into(),
                revision: 0,
                lease: None,
            },
        }
    }

    /// Creates a delete event for `key`.
    pub fn delete(key: impl Into<Bytes>) -> Self {
        Self {
            kind: EventKind::Delete,
            item: Item {
                key: key.into(),
                value: Bytes::new(),
                revision: 0,
                lease: None,
            },
        }
    }

    /// Attaches a storage revision.
    pub fn with_revision(mut self, revision: u64) -> Self {
        self.item.revision = revision;
        self
    }

    /// Attaches a lease id.
    pub fn with_lease(mut self, lease: i64) -> Self {
        self.item.lease = Some(lease);
        self
    }

    /// True for the synthetic init marker.
    pub fn is_init(&self) -> bool {
        self.kind == EventKind::Init
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- constructor tests ---

    #[test]
    fn test_init_event() {
        let ev = Event::init();
        assert_eq!(ev.kind, EventKind::Init);
        assert!(ev.is_init());
        assert!(ev.item.key.is_empty());
        assert!(ev.item.value.is_empty());
        assert_eq!(ev.item.revision, 0);
        assert_eq!(ev.item.lease, None);
    }

    #[test]
    fn test_put_event() {
        let ev = Event::put("/nodes/n1", "payload");
        assert_eq!(ev.kind, EventKind::Put);
        assert!(!ev.is_init());
        assert_eq!(&ev.item.key[..], b"/nodes/n1");
        assert_eq!(&ev.item.value[..], b"payload");
    }

    #[test]
    fn test_delete_event() {
        let ev = Event::delete("/nodes/n1");
        assert_eq!(ev.kind, EventKind::Delete);
        assert_eq!(&ev.item.key[..], b"/nodes/n1");
        assert!(ev.item.value.is_empty());
    }

    // --- builder tests ---

    #[test]
    fn test_builders_chain() {
        let ev = Event::put("/k", "v").with_revision(9).with_lease(-1);
        assert_eq!(ev.item.revision, 9);
        assert_eq!(ev.item.lease, Some(-1));
    }

    // --- display tests ---

    #[test]
    fn test_kind_display() {
        assert_eq!(EventKind::Init.to_string(), "init");
        assert_eq!(EventKind::Put.to_string(), "put");
        assert_eq!(EventKind::Delete.to_string(), "delete");
    }
}
