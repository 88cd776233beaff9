//! # Hub configuration.
//!
//! Provides [`HubConfig`] the construction settings for a [`Hub`](crate::Hub).
//!
//! ## Sentinel values
//! - `replay = 0` → no replay (new subscribers only see values published after they subscribe)
//! - `replay + extra_buffer = 0` → rendezvous delivery under `Suspend`
//!   (a publish completes once every subscriber has taken the value)

use crate::policies::OverflowPolicy;

/// Construction settings for a hub.
///
/// ## Field semantics
/// - `replay`: how many of the most recent values a new subscriber receives first
/// - `extra_buffer`: per-subscriber slots on top of `replay` before overflow kicks in
/// - `overflow`: what to do with a full delivery queue
///
/// The per-subscriber delivery queue holds `replay + extra_buffer` values, so with
/// `extra_buffer = 0` the history a newcomer sees and the distance a slow consumer may
/// fall behind are the same number.
///
/// ## Notes
/// All fields are public for flexibility. Prefer using the helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HubConfig {
    /// Replay buffer capacity.
    pub replay: usize,

    /// Delivery queue slots beyond `replay`.
    pub extra_buffer: usize,

    /// Policy applied when a subscriber's delivery queue is full.
    pub overflow: OverflowPolicy,
}

impl HubConfig {
    /// Creates a config from its three knobs.
    pub fn new(replay: usize, extra_buffer: usize, overflow: OverflowPolicy) -> Self {
        Self {
            replay,
            extra_buffer,
            overflow,
        }
    }

    /// State-holder preset: the latest value is replayed and always overwrites.
    ///
    /// `replay = 1`, `extra_buffer = 0`, `overflow = DropOldest`.
    pub fn state() -> Self {
        Self::new(1, 0, OverflowPolicy::DropOldest)
    }

    /// Returns the configured per-subscriber delivery queue bound.
    #[inline]
    pub fn queue_capacity(&self) -> usize {
        self.replay.saturating_add(self.extra_buffer)
    }

    /// Returns `true` when values are handed off without any buffering.
    ///
    /// Only meaningful under [`OverflowPolicy::Suspend`]; other policies clamp
    /// their capacity to 1 (see [`Self::effective_queue_capacity`]).
    #[inline]
    pub fn is_rendezvous(&self) -> bool {
        self.overflow.may_suspend() && self.queue_capacity() == 0
    }

    /// Returns the delivery queue bound the hub actually enforces.
    ///
    /// - `Suspend` with zero capacity → 1 slot, used as the hand-off slot of a rendezvous
    /// - drop/fail policies → clamped to a minimum of 1 (they need a slot to drop from)
    /// - otherwise → [`Self::queue_capacity`]
    #[inline]
    pub fn effective_queue_capacity(&self) -> usize {
        self.queue_capacity().max(1)
    }
}

impl Default for HubConfig {
    /// Default configuration:
    ///
    /// - `replay = 0` (no history)
    /// - `extra_buffer = 0` (no slack)
    /// - `overflow = OverflowPolicy::Suspend` (lossless)
    ///
    /// Together these describe a rendezvous hub.
    fn default() -> Self {
        Self::new(0, 0, OverflowPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_rendezvous() {
        let cfg = HubConfig::default();
        assert_eq!(cfg.queue_capacity(), 0);
        assert!(cfg.is_rendezvous());
        assert_eq!(cfg.effective_queue_capacity(), 1);
    }

    #[test]
    fn test_queue_capacity_sums_replay_and_extra() {
        let cfg = HubConfig::new(3, 5, OverflowPolicy::Fail);
        assert_eq!(cfg.queue_capacity(), 8);
        assert_eq!(cfg.effective_queue_capacity(), 8);
        assert!(!cfg.is_rendezvous());
    }

    #[test]
    fn test_lossy_zero_capacity_is_clamped() {
        let cfg = HubConfig::new(0, 0, OverflowPolicy::DropOldest);
        assert!(!cfg.is_rendezvous());
        assert_eq!(cfg.effective_queue_capacity(), 1);
    }

    #[test]
    fn test_state_preset() {
        let cfg = HubConfig::state();
        assert_eq!(cfg.replay, 1);
        assert_eq!(cfg.overflow, OverflowPolicy::DropOldest);
        assert_eq!(cfg.effective_queue_capacity(), 1);
    }

    #[test]
    fn test_capacity_saturates() {
        let cfg = HubConfig::new(usize::MAX, 10, OverflowPolicy::Suspend);
        assert_eq!(cfg.queue_capacity(), usize::MAX);
    }
}
