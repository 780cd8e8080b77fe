//! # Error types for the event buffer.
//!
//! [`BufferError`] covers the failure surface of
//! [`EventBuffer`](crate::EventBuffer): construction with a bad capacity and
//! watcher registration against a closed or misconfigured buffer.
//!
//! Producer operations (`push`, `push_batch`) have no error path by contract:
//! a watcher that cannot keep up is evicted (with a warning), never reported
//! back to the producer. `reset` and `close` never fail either.

use thiserror::Error;

/// # Errors produced by the event buffer.
///
/// Only construction and watcher registration can fail.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BufferError {
    /// Buffer was constructed with a zero capacity.
    #[error("buffer capacity should be > 0")]
    BadParameter,

    /// Watcher registration was attempted after the buffer was closed.
    #[error("buffer is closed")]
    Closed,

    /// The initial init event could not be enqueued into the watcher's queue.
    ///
    /// The queue of a freshly registered watcher is empty and at least one
    /// slot deep, so this arm is not expected to fire under normal use.
    #[error("buffer overflow: failed to enqueue init event for watcher '{watcher}'")]
    Overflow {
        /// Name of the watcher that could not be registered.
        watcher: String,
    },
}

impl BufferError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            BufferError::BadParameter => "buffer_bad_parameter",
            BufferError::Closed => "buffer_closed",
            BufferError::Overflow { .. } => "buffer_overflow",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(BufferError::BadParameter.as_label(), "buffer_bad_parameter");
        assert_eq!(BufferError::Closed.as_label(), "buffer_closed");
        let overflow = BufferError::Overflow {
            watcher: "w1".into(),
        };
        assert_eq!(overflow.as_label(), "buffer_overflow");
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(
            BufferError::BadParameter.to_string(),
            "buffer capacity should be > 0"
        );
        assert_eq!(BufferError::Closed.to_string(), "buffer is closed");
        let overflow = BufferError::Overflow {
            watcher: "cache".into(),
        };
        assert_eq!(
            overflow.to_string(),
            "buffer overflow: failed to enqueue init event for watcher 'cache'"
        );
    }
}
