//! Change events: the buffer's data model.
//!
//! This module groups the event **data model** fanned out by the
//! [`EventBuffer`](crate::EventBuffer).
//!
//! ## Contents
//! - [`EventKind`], [`Event`], [`Item`] event classification and payload
//!
//! ## Quick reference
//! - **Producers**: the event source calls
//!   [`EventBuffer::push`](crate::EventBuffer::push) /
//!   [`push_batch`](crate::EventBuffer::push_batch) with `Put`/`Delete`
//!   events.
//! - **Synthetic**: [`Event::init`] is created by the buffer and queued as
//!   the first event of every watcher.

mod event;

pub use event::{Event, EventKind, Item};
