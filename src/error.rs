//! Error types returned by the hub and its subscriptions.
//!
//! - [`HubError`] — every failure an operation on [`Hub`](crate::Hub) or
//!   [`Subscription`](crate::Subscription) can report to its immediate caller.
//!
//! All variants are local and recoverable; the hub never aborts and never loses
//! an already-accepted value because some other caller failed.

use thiserror::Error;

/// # Errors produced by hub operations.
///
/// Returned directly to the caller of `publish`, `subscribe` or a cancellable `next`.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubError {
    /// The hub was closed; no further values are accepted (or, for `subscribe`,
    /// every subscriber has already drained).
    #[error("hub closed")]
    HubClosed,

    /// The `Fail` overflow policy rejected a publish because at least one
    /// subscriber's delivery queue was full. Nothing was delivered.
    #[error("buffer overflow: a subscriber queue is full")]
    BufferOverflow,

    /// A suspended operation was cancelled before it completed.
    #[error("operation cancelled")]
    Cancelled,
}

impl HubError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use replaybus::HubError;
    ///
    /// assert_eq!(HubError::BufferOverflow.as_label(), "hub_buffer_overflow");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HubError::HubClosed => "hub_closed",
            HubError::BufferOverflow => "hub_buffer_overflow",
            HubError::Cancelled => "hub_cancelled",
        }
    }

    /// Indicates whether retrying the same call later may succeed.
    ///
    /// Only [`HubError::BufferOverflow`] is retryable: the queues may drain.
    /// A closed hub stays closed, and cancellation is the caller's own decision.
    ///
    /// # Example
    /// ```
    /// use replaybus::HubError;
    ///
    /// assert!(HubError::BufferOverflow.is_retryable());
    /// assert!(!HubError::HubClosed.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, HubError::BufferOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(HubError::HubClosed.as_label(), "hub_closed");
        assert_eq!(HubError::BufferOverflow.as_label(), "hub_buffer_overflow");
        assert_eq!(HubError::Cancelled.as_label(), "hub_cancelled");
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(HubError::HubClosed.to_string(), "hub closed");
        assert_eq!(HubError::Cancelled.to_string(), "operation cancelled");
    }

    #[test]
    fn test_only_overflow_is_retryable() {
        assert!(HubError::BufferOverflow.is_retryable());
        assert!(!HubError::Cancelled.is_retryable());
        assert!(!HubError::HubClosed.is_retryable());
    }
}
