//! Fixed-capacity event ring with overwrite-oldest semantics.
//!
//! The ring retains the most recent `capacity` events. Pushing into a full
//! ring advances both pointers and overwrites the oldest slot; readers get
//! an oldest→newest copy via [`EventRing::snapshot`].
//!
//! # Invariants
//! - `size <= capacity` and `capacity >= 1`.
//! - When `size > 0`, `start` and `end` are in `[0, capacity)` and
//!   `start + size ≡ end + 1 (mod capacity)`.
//! - Occupied slots are `slots[(start + i) % capacity]` for `i in 0..size`;
//!   emptiness is governed by `size == 0`.

use crate::events::Event;

/// Bounded FIFO of events; drops the oldest entry on overflow.
#[derive(Debug)]
pub(crate) struct EventRing {
    slots: Vec<Option<Event>>,
    start: usize,
    end: usize,
    size: usize,
}

impl EventRing {
    /// Creates an empty ring with a fixed `capacity`.
    ///
    /// # Panics
    /// Panics if `capacity == 0`. The public constructor
    /// [`EventBuffer::new`](crate::EventBuffer::new) rejects zero capacity
    /// before this type is ever built.
    pub(crate) fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring capacity must be > 0");
        Self {
            slots: vec![None; capacity],
            start: 0,
            end: 0,
            size: 0,
        }
    }

    /// Maximum number of events the ring retains.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Current number of retained events.
    pub(crate) fn len(&self) -> usize {
        self.size
    }

    /// True when no events are retained.
    pub(crate) fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Appends an event, overwriting the oldest entry when full.
    pub(crate) fn push(&mut self, event: Event) {
        if self.size == 0 {
            self.start = 0;
            self.end = 0;
            self.size = 1;
        } else if self.size < self.capacity() {
            self.end = (self.end + 1) % self.capacity();
            self.size += 1;
        } else {
            // Full: the slot past `end` holds the oldest event. Advance `end`
            // onto it first, then move `start` off it, so the overwritten slot
            // is the oldest and the incoming event becomes the newest.
            self.end = (self.end + 1) % self.capacity();
            self.start = (self.start + 1) % self.capacity();
        }
        self.slots[self.end] = Some(event);
    }

    /// Returns a copy of the retained events, oldest first.
    pub(crate) fn snapshot(&self) -> Vec<Event> {
        let mut out = Vec::with_capacity(self.size);
        for i in 0..self.size {
            let index = (self.start + i) % self.capacity();
            if let Some(event) = &self.slots[index] {
                out.push(event.clone());
            }
        }
        out
    }

    /// Drops every retained event and returns the ring to the empty state.
    pub(crate) fn reset(&mut self) {
        self.start = 0;
        self.end = 0;
        self.size = 0;
        for slot in &mut self.slots {
            *slot = None;
        }
    }
}
