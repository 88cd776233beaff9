//! # Conflated state holder built on a [`Hub`].
//!
//! [`StateHub`] keeps one current value. New subscribers receive it first, slow
//! subscribers only ever see the latest one, and setting a value equal to the current
//! one is a no-op.
//!
//! ## Rules
//! - **Latest wins**: backed by [`HubConfig::state`] (`replay = 1`, `DropOldest`).
//! - **Distinct**: a value equal to the current one is not published.
//! - **Atomic update**: [`StateHub::update`] reads and replaces the value under the hub lock.
//!
//! ## Example
//! ```rust
//! use replaybus::StateHub;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), replaybus::HubError> {
//! let counter = StateHub::with_value(0u32);
//! let mut sub = counter.subscribe()?;
//!
//! counter.update(|n| n.copied().unwrap_or(0) + 1)?;
//! assert!(!counter.set(1)?, "unchanged value is skipped");
//!
//! assert_eq!(sub.next().await, Some(1));
//! assert_eq!(counter.value(), Some(1));
//! # Ok(())
//! # }
//! ```

use std::fmt;

use crate::core::config::HubConfig;
use crate::core::hub::{Hub, HubState};
use crate::core::state::Offer;
use crate::error::HubError;
use crate::subscribers::Subscription;

/// Hub holding a single current value.
///
/// Cheap to clone; all clones share the same value. Dropping the last clone closes it.
pub struct StateHub<T> {
    hub: Hub<T>,
}

impl<T> Clone for StateHub<T> {
    fn clone(&self) -> Self {
        Self {
            hub: self.hub.clone(),
        }
    }
}

impl<T> fmt::Debug for StateHub<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateHub").field("hub", &self.hub).finish()
    }
}

impl<T> Default for StateHub<T>
where
    T: Clone + PartialEq + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StateHub<T>
where
    T: Clone + PartialEq + Send + 'static,
{
    /// Creates a state holder without a value.
    #[must_use]
    pub fn new() -> Self {
        Self {
            hub: Hub::with_config(HubConfig::state()),
        }
    }

    /// Creates a state holder whose current value is `initial`.
    #[must_use]
    pub fn with_value(initial: T) -> Self {
        let state = Self::new();
        // A fresh hub is open and has no subscribers, so the offer is always accepted.
        state.offer_locked(|_| initial).ok();
        state
    }

    /// Returns a copy of the current value, if one was ever set.
    pub fn value(&self) -> Option<T> {
        self.hub.shared.lock().latest().cloned()
    }

    /// Replaces the current value.
    ///
    /// Returns `Ok(false)` if `value` equals the current value; nothing is delivered.
    ///
    /// ### Errors
    /// [`HubError::HubClosed`] once closed.
    pub fn set(&self, value: T) -> Result<bool, HubError> {
        self.offer_locked(|_| value)
    }

    /// Computes the new value from the current one and publishes it, atomically.
    ///
    /// `f` runs under the hub lock: concurrent updates never overwrite each other.
    /// It must not call back into this state holder. Returns `Ok(false)` if the
    /// result equals the current value.
    ///
    /// ### Errors
    /// [`HubError::HubClosed`] once closed; `f` is not called.
    pub fn update<F>(&self, f: F) -> Result<bool, HubError>
    where
        F: FnOnce(Option<&T>) -> T,
    {
        self.offer_locked(f)
    }

    fn offer_locked<F>(&self, f: F) -> Result<bool, HubError>
    where
        F: FnOnce(Option<&T>) -> T,
    {
        let mut state = self.hub.shared.lock();
        if state.is_closed() {
            return Err(HubError::HubClosed);
        }
        let next = f(state.latest());
        if state.latest() == Some(&next) {
            tracing::trace!("state unchanged, publish skipped");
            return Ok(false);
        }
        match state.offer(next, &self.hub.shared.cfg) {
            Offer::Accepted { .. } => Ok(true),
            // DropOldest never blocks; kept for exhaustiveness.
            Offer::Blocked(_) => Err(HubError::BufferOverflow),
            Offer::Rejected(err) => Err(err),
        }
    }

    /// Attaches a subscriber; it receives the current value first, if any.
    ///
    /// ### Errors
    /// [`HubError::HubClosed`] once the holder is closed and drained.
    pub fn subscribe(&self) -> Result<Subscription<T>, HubError> {
        self.hub.subscribe()
    }

    /// Closes the state holder; idempotent. The last value stays readable.
    pub fn close(&self) {
        self.hub.close();
    }

    /// Returns the number of attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.hub.subscriber_count()
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> HubState {
        self.hub.state()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures::FutureExt;
    use tokio::time::timeout;

    use super::*;

    const LONG: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_equal_value_is_not_redelivered() {
        let state = StateHub::new();
        let mut sub = state.subscribe().unwrap();

        assert_eq!(state.set(1), Ok(true));
        assert_eq!(state.set(1), Ok(false));
        assert_eq!(sub.next().await, Some(1));
        assert!(sub.next().now_or_never().is_none(), "repeat must be skipped");

        assert_eq!(state.set(2), Ok(true));
        assert_eq!(sub.next().await, Some(2));
    }

    #[tokio::test]
    async fn test_value_and_late_subscriber() {
        let state = StateHub::<&str>::new();
        assert_eq!(state.value(), None);
        assert_eq!(state.subscribe().unwrap().pending(), 0);

        state.set("a").unwrap();
        state.set("b").unwrap();
        assert_eq!(state.value(), Some("b"));

        let mut late = state.subscribe().unwrap();
        assert_eq!(late.next().await, Some("b"));
    }

    #[tokio::test]
    async fn test_slow_subscriber_sees_latest_only() {
        let state = StateHub::with_value(0);
        let mut sub = state.subscribe().unwrap();
        for v in 1..=5 {
            state.set(v).unwrap();
        }
        assert_eq!(sub.next().await, Some(5));
        assert_eq!(sub.dropped(), 5);
    }

    #[tokio::test]
    async fn test_update_to_same_value_delivers_nothing() {
        let state = StateHub::with_value(3);
        let mut sub = state.subscribe().unwrap();
        assert_eq!(sub.next().await, Some(3));

        assert_eq!(state.update(|v| v.copied().unwrap_or(0)), Ok(false));
        assert_eq!(sub.pending(), 0);
    }

    #[tokio::test]
    async fn test_closed_rejects_update_and_keeps_value() {
        let state = StateHub::with_value(1);
        state.close();

        let mut called = false;
        let res = state.update(|_| {
            called = true;
            2
        });
        assert_eq!(res, Err(HubError::HubClosed));
        assert!(!called);
        assert_eq!(state.value(), Some(1));
        assert_eq!(state.state(), HubState::Closed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_are_not_lost() {
        let state = StateHub::with_value(0u32);
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let state = state.clone();
                tokio::spawn(async move {
                    for _ in 0..100 {
                        state.update(|n| n.copied().unwrap_or(0) + 1).unwrap();
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();
        for w in workers {
            timeout(LONG, w).await.unwrap().unwrap();
        }
        assert_eq!(state.value(), Some(800));
    }

    #[tokio::test]
    async fn test_dropping_last_clone_ends_subscribers() {
        let state = StateHub::with_value(1);
        let mut sub = state.subscribe().unwrap();
        drop(state);
        assert_eq!(sub.next().await, Some(1));
        assert_eq!(sub.next().await, None);
    }
}
