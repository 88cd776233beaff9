//! # Overflow policy for full delivery queues.
//!
//! [`OverflowPolicy`] decides what `publish` does when a subscriber's delivery
//! queue has no room for the new value.
//!
//! - [`OverflowPolicy::Suspend`] the producer waits until every subscriber has room (default).
//! - [`OverflowPolicy::DropOldest`] the subscriber's oldest undelivered value is evicted.
//! - [`OverflowPolicy::DropNewest`] the new value is skipped for that subscriber only.
//! - [`OverflowPolicy::Fail`] the publish is rejected for everyone with `BufferOverflow`.
//!
//! ## Choosing the right policy
//!
//! **Lossless fan-out** (slowest consumer sets the pace):
//! ```text
//! OverflowPolicy::Suspend     → publish waits, nothing is dropped
//! ```
//!
//! **Latest-value-wins** (state holders, UI updates):
//! ```text
//! OverflowPolicy::DropOldest  → slow subscribers skip ahead, producer never waits
//! ```
//!
//! **Keep-what-you-have** (sampling, rate limiting):
//! ```text
//! OverflowPolicy::DropNewest  → slow subscribers keep their backlog, new values skip them
//! ```
//!
//! **Caller decides**:
//! ```text
//! OverflowPolicy::Fail        → publish returns Err(BufferOverflow), nothing delivered
//! ```

/// Policy applied when a subscriber's delivery queue is full at publish time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OverflowPolicy {
    /// Block the producer until every subscriber's queue has room (default).
    #[default]
    Suspend,
    /// Evict the subscriber's oldest undelivered value to make room.
    DropOldest,
    /// Discard the new value for the full subscriber only.
    DropNewest,
    /// Reject the whole publish with `HubError::BufferOverflow`.
    Fail,
}

impl OverflowPolicy {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            OverflowPolicy::Suspend => "suspend",
            OverflowPolicy::DropOldest => "drop_oldest",
            OverflowPolicy::DropNewest => "drop_newest",
            OverflowPolicy::Fail => "fail",
        }
    }

    /// Returns `true` if `publish` may suspend under this policy.
    #[inline]
    pub fn may_suspend(&self) -> bool {
        matches!(self, OverflowPolicy::Suspend)
    }
}
