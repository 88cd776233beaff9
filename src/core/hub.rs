//! # Broadcast hub with bounded replay and overflow handling.
//!
//! [`Hub`] owns the replay buffer and the set of live subscribers. Producers call
//! [`Hub::publish`]; consumers call [`Hub::subscribe`] and pull values from the
//! returned [`Subscription`].
//!
//! ## Architecture
//! ```text
//! Producers (many):                               Subscriptions (many):
//!   task 1 ──┐                                ┌──► [queue 1] ──► next()
//!   task 2 ──┼──► publish(v) ──► Hub (lock) ──┼──► [queue 2] ──► next()
//!   task N ──┘          │          │          └──► [queue N] ──► next()
//!                       │          └──► replay buffer (last `replay` values)
//!                       └── Suspend: wait on `space` until every queue has room
//!
//! subscribe() ──► new queue seeded with a copy of the replay buffer
//! ```
//!
//! ## Rules
//! - **Total order**: every publish is serialized by the hub lock; all subscribers
//!   observe accepted values in the same relative order.
//! - **Replay is history only**: trimming the replay buffer never removes a value
//!   already queued for an attached subscriber.
//! - **Per-subscriber bound**: each delivery queue holds `replay + extra_buffer`
//!   values before the [`OverflowPolicy`](crate::OverflowPolicy) applies.
//! - **Suspend wakes on any drain**: a blocked producer re-checks all queues
//!   whenever any subscriber dequeues, detaches, or the hub closes.
//! - **Close drains**: after [`Hub::close`] subscribers still receive what is queued,
//!   then end-of-stream.
//!
//! ## State machine
//! ```text
//! Open ──close()──► Closing ──(every subscriber drained)──► Closed
//! subscribe(): allowed in Open and Closing, fails with HubClosed in Closed
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use tokio_util::sync::CancellationToken;

use crate::core::config::HubConfig;
use crate::core::state::{Offer, Shared};
use crate::core::wait::notified_or_cancelled;
use crate::error::HubError;
use crate::policies::OverflowPolicy;
use crate::subscribers::Subscription;

/// Observable lifecycle state of a hub.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HubState {
    /// Accepting publishes and subscribers.
    Open,
    /// Closed for publishing; some subscriber still has queued values.
    Closing,
    /// Closed and fully drained; `subscribe` fails.
    Closed,
}

/// Single-lock broadcast hub.
///
/// Cheap to clone: every clone refers to the same hub, so producers on different
/// tasks are handed an explicit clone instead of reaching for global state.
///
/// Dropping the last `Hub` handle closes the hub, so subscribers drain and then
/// observe end-of-stream instead of waiting forever. Subscriptions do not count
/// as handles.
///
/// # Example
/// ```rust
/// use replaybus::{Hub, OverflowPolicy};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), replaybus::HubError> {
/// let hub = Hub::new(2, 0, OverflowPolicy::DropOldest);
/// for v in ["1", "2", "3"] {
///     hub.publish(v).await?;
/// }
///
/// let mut sub = hub.subscribe()?;
/// assert_eq!(sub.next().await, Some("2"));
/// assert_eq!(sub.next().await, Some("3"));
///
/// hub.close();
/// assert_eq!(sub.next().await, None);
/// # Ok(())
/// # }
/// ```
pub struct Hub<T> {
    pub(super) shared: Arc<Shared<T>>,
}

impl<T> Clone for Hub<T> {
    fn clone(&self) -> Self {
        self.shared.handles.fetch_add(1, Ordering::Relaxed);
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Drop for Hub<T> {
    fn drop(&mut self) {
        if self.shared.handles.fetch_sub(1, Ordering::AcqRel) == 1 && self.shared.close() {
            tracing::debug!("last hub handle dropped");
        }
    }
}

impl<T> fmt::Debug for Hub<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("Hub")
            .field("config", &self.shared.cfg)
            .field("subscribers", &state.subscriber_count())
            .field("closed", &state.is_closed())
            .finish()
    }
}

impl<T> Default for Hub<T>
where
    T: Clone + Send + 'static,
{
    /// Rendezvous hub: no replay, no buffer, `Suspend`.
    fn default() -> Self {
        Self::with_config(HubConfig::default())
    }
}

impl<T> Hub<T>
where
    T: Clone + Send + 'static,
{
    /// Creates a hub from its three knobs.
    ///
    /// - `replay`: replay buffer capacity (`0` = no replay)
    /// - `extra_buffer`: per-subscriber slots beyond `replay`
    /// - `policy`: what to do when a delivery queue is full
    #[must_use]
    pub fn new(replay: usize, extra_buffer: usize, policy: OverflowPolicy) -> Self {
        Self::with_config(HubConfig::new(replay, extra_buffer, policy))
    }

    /// Creates a hub from a [`HubConfig`].
    #[must_use]
    pub fn with_config(cfg: HubConfig) -> Self {
        Self {
            shared: Arc::new(Shared::new(cfg)),
        }
    }

    /// Returns the configuration this hub was built with.
    pub fn config(&self) -> HubConfig {
        self.shared.cfg
    }

    /// Publishes `value` to every attached subscriber.
    ///
    /// ### Behavior per policy
    /// - `Suspend`: waits until every subscriber's queue has room, then delivers to all.
    ///   With zero capacity it additionally waits until every receiver has taken the value.
    /// - `DropOldest` / `DropNewest`: never waits; full subscribers lose a value.
    /// - `Fail`: returns [`HubError::BufferOverflow`] if any queue is full; nothing is delivered.
    ///
    /// ### Errors
    /// - [`HubError::HubClosed`] if the hub is closed (also while waiting).
    /// - [`HubError::BufferOverflow`] under `Fail`.
    ///
    /// ### Cancellation
    /// Dropping the returned future while it waits for room delivers nothing.
    /// Use [`Self::publish_until`] to get an explicit [`HubError::Cancelled`].
    pub async fn publish(&self, value: T) -> Result<(), HubError> {
        self.publish_inner(value, None).await
    }

    /// Like [`Self::publish`], but gives up with [`HubError::Cancelled`] once `cancel` fires.
    ///
    /// Cancellation while waiting for room leaves no trace: no subscriber receives the value.
    /// For a rendezvous hub, cancellation after the value was handed to the subscribers'
    /// queues returns `Ok(())`, since the value has been accepted.
    pub async fn publish_until(&self, value: T, cancel: &CancellationToken) -> Result<(), HubError> {
        self.publish_inner(value, Some(cancel)).await
    }

    /// Publishes without ever waiting.
    ///
    /// Under `Suspend`, returns [`HubError::BufferOverflow`] instead of waiting for room.
    /// A rendezvous hub accepts the value if every queue is empty, without waiting for
    /// the hand-off. Other policies behave exactly like [`Self::publish`].
    pub fn try_publish(&self, value: T) -> Result<(), HubError> {
        match self.shared.lock().offer(value, &self.shared.cfg) {
            Offer::Accepted { .. } => Ok(()),
            Offer::Blocked(_) => Err(HubError::BufferOverflow),
            Offer::Rejected(err) => Err(err),
        }
    }

    async fn publish_inner(
        &self,
        mut value: T,
        cancel: Option<&CancellationToken>,
    ) -> Result<(), HubError> {
        loop {
            let notified = self.shared.space.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let offer = self.shared.lock().offer(value, &self.shared.cfg);
            match offer {
                Offer::Accepted { seq, receivers } => {
                    if self.shared.cfg.is_rendezvous() && receivers > 0 {
                        self.hand_off(seq, cancel).await;
                    }
                    return Ok(());
                }
                Offer::Blocked(v) => value = v,
                Offer::Rejected(err) => return Err(err),
            }

            notified_or_cancelled(notified, cancel).await?;
        }
    }

    /// Waits until every live subscriber has taken the value `seq` (rendezvous only).
    ///
    /// Returns early on cancellation or close; the value stays queued either way.
    async fn hand_off(&self, seq: u64, cancel: Option<&CancellationToken>) {
        loop {
            let notified = self.shared.space.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.shared.lock().is_handed_off(seq) {
                return;
            }
            if notified_or_cancelled(notified, cancel).await.is_err() {
                return;
            }
        }
    }

    /// Attaches a new subscriber.
    ///
    /// The subscription's queue is seeded with a copy of the current replay buffer,
    /// so it first observes up to `replay` of the most recent values, then live ones.
    ///
    /// ### Errors
    /// [`HubError::HubClosed`] once the hub is [`HubState::Closed`]. While
    /// [`HubState::Closing`] a subscriber may still attach; it receives the replay
    /// snapshot and then end-of-stream.
    pub fn subscribe(&self) -> Result<Subscription<T>, HubError> {
        let (id, wake) = self.shared.lock().attach()?;
        tracing::debug!(subscriber = id, "subscriber attached");
        Ok(Subscription::new(id, wake, Arc::clone(&self.shared)))
    }

    /// Closes the hub; idempotent.
    ///
    /// Further publishes fail with [`HubError::HubClosed`]. Subscribers are not detached:
    /// they drain their queues and then observe end-of-stream. Producers suspended in
    /// `publish` are released with [`HubError::HubClosed`].
    pub fn close(&self) {
        self.shared.close();
    }

    /// Returns the number of attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.shared.lock().subscriber_count()
    }

    /// Returns `true` once [`Self::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.shared.lock().is_closed()
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> HubState {
        let state = self.shared.lock();
        if !state.is_closed() {
            HubState::Open
        } else if state.is_terminated() {
            HubState::Closed
        } else {
            HubState::Closing
        }
    }

    /// Returns a copy of the replay buffer, oldest first.
    pub fn replay_cache(&self) -> Vec<T> {
        self.shared.lock().replay_snapshot()
    }

    /// Clears the replay buffer.
    ///
    /// Values already queued for attached subscribers are kept; only future
    /// subscribers are affected.
    pub fn reset_replay_cache(&self) {
        self.shared.lock().reset_replay();
        tracing::debug!("replay cache reset");
    }
}
