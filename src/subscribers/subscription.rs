//! # Per-subscriber pull handle.
//!
//! A [`Subscription`] is returned by [`Hub::subscribe`](crate::Hub::subscribe). It owns
//! the consumer side of one delivery queue inside the hub.
//!
//! ## Rules
//! - **FIFO**: [`Subscription::next`] returns queued values oldest first, in publish order.
//! - **Suspends only when empty**: an empty queue on an open hub waits for the next publish.
//! - **End-of-stream is sticky**: once `next` returns `None`, every later call does too.
//! - **RAII**: dropping the subscription detaches it.
//!
//! ## Example
//! ```rust
//! use futures::StreamExt;
//! use replaybus::{Hub, OverflowPolicy};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), replaybus::HubError> {
//! let hub = Hub::new(0, 8, OverflowPolicy::Suspend);
//! let sub = hub.subscribe()?;
//!
//! for v in 1..=3 {
//!     hub.publish(v).await?;
//! }
//! hub.close();
//!
//! let values: Vec<i32> = sub.into_stream().collect().await;
//! assert_eq!(values, vec![1, 2, 3]);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use futures::Stream;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::core::state::{Detach, Shared, SubscriberId, Take};
use crate::core::wait::notified_or_cancelled;
use crate::error::HubError;
use crate::subscribers::DetachHandle;

/// Consumer handle for one subscriber of a hub.
pub struct Subscription<T> {
    id: SubscriberId,
    wake: Arc<Notify>,
    shared: Arc<Shared<T>>,
    /// Set once end-of-stream was observed or `detach` was called.
    finished: bool,
}

impl<T> Subscription<T> {
    pub(crate) fn new(id: SubscriberId, wake: Arc<Notify>, shared: Arc<Shared<T>>) -> Self {
        Self {
            id,
            wake,
            shared,
            finished: false,
        }
    }

    /// Returns the next value, or `None` at end-of-stream.
    ///
    /// - Queue non-empty → the oldest queued value, immediately.
    /// - Queue empty, hub open → waits for a publish, a close or a detach.
    /// - Queue empty, hub closed (or detached) → `None`, now and forever.
    ///
    /// Dropping the returned future is safe: no value is taken unless it is returned.
    /// Use [`Self::next_until`] for an explicit cancellation token.
    pub async fn next(&mut self) -> Option<T> {
        // Without a token the wait can only end by notification.
        self.recv(None).await.unwrap_or(None)
    }

    /// Like [`Self::next`], but returns [`HubError::Cancelled`] once `cancel` fires.
    ///
    /// A cancelled call takes nothing from the queue.
    pub async fn next_until(&mut self, cancel: &CancellationToken) -> Result<Option<T>, HubError> {
        self.recv(Some(cancel)).await
    }

    async fn recv(&mut self, cancel: Option<&CancellationToken>) -> Result<Option<T>, HubError> {
        if self.finished {
            return Ok(None);
        }
        loop {
            let notified = self.wake.notified();
            tokio::pin!(notified);

            match self.shared.take(self.id) {
                Take::Value(v) => return Ok(Some(v)),
                Take::End => {
                    self.finished = true;
                    return Ok(None);
                }
                Take::Empty => {}
            }

            notified_or_cancelled(notified, cancel).await?;
        }
    }

    /// Detaches from the hub; idempotent.
    ///
    /// Queued values are discarded and no further values are delivered. Subsequent
    /// calls to [`Self::next`] return `None`.
    pub fn detach(&mut self) {
        if !self.finished {
            self.finished = true;
            self.shared.remove_subscriber(self.id);
        }
    }

    /// Returns `true` while this subscription is attached to its hub.
    pub fn is_attached(&self) -> bool {
        !self.finished && self.shared.lock().is_attached(self.id)
    }

    /// Returns the number of values waiting in the delivery queue.
    pub fn pending(&self) -> usize {
        self.shared.lock().pending(self.id)
    }

    /// Returns how many values this subscriber lost to a drop policy.
    ///
    /// Always `0` under `Suspend` and `Fail`; `0` once detached.
    pub fn dropped(&self) -> u64 {
        self.shared.lock().dropped(self.id)
    }
}

impl<T> Subscription<T>
where
    T: Send + 'static,
{
    /// Returns a clonable handle that can detach this subscription from another task.
    ///
    /// Detaching through the handle releases a consumer currently waiting in
    /// [`Self::next`], which then returns `None`.
    pub fn detach_handle(&self) -> DetachHandle {
        let hub: Arc<dyn Detach> = Arc::clone(&self.shared) as Arc<dyn Detach>;
        DetachHandle::new(self.id, hub)
    }

    /// Converts the subscription into a [`Stream`] that ends at end-of-stream.
    pub fn into_stream(self) -> impl Stream<Item = T> + Send {
        futures::stream::unfold(self, |mut sub| async move {
            let value = sub.next().await?;
            Some((value, sub))
        })
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.detach();
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("finished", &self.finished)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures::{FutureExt, StreamExt};
    use tokio::time::timeout;

    use crate::{Hub, HubError, OverflowPolicy};

    const SHORT: Duration = Duration::from_millis(50);
    const LONG: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_next_waits_for_publish() {
        let hub = Hub::new(0, 4, OverflowPolicy::Suspend);
        let mut sub = hub.subscribe().unwrap();

        let consumer = tokio::spawn(async move { sub.next().await });
        tokio::time::sleep(SHORT).await;
        assert!(!consumer.is_finished());

        hub.publish(42).await.unwrap();
        assert_eq!(timeout(LONG, consumer).await.unwrap().unwrap(), Some(42));
    }

    #[tokio::test]
    async fn test_close_wakes_waiting_consumer() {
        let hub = Hub::<u32>::new(0, 4, OverflowPolicy::Suspend);
        let mut sub = hub.subscribe().unwrap();

        let consumer = tokio::spawn(async move { sub.next().await });
        tokio::time::sleep(SHORT).await;
        hub.close();
        assert_eq!(timeout(LONG, consumer).await.unwrap().unwrap(), None);
    }

    #[tokio::test]
    async fn test_detach_handle_releases_waiting_consumer() {
        let hub = Hub::<u32>::new(0, 4, OverflowPolicy::Suspend);
        let mut sub = hub.subscribe().unwrap();
        let handle = sub.detach_handle();

        let consumer = tokio::spawn(async move {
            let first = sub.next().await;
            let second = sub.next().await;
            (first, second)
        });
        tokio::time::sleep(SHORT).await;
        handle.detach();
        handle.detach();

        let (first, second) = timeout(LONG, consumer).await.unwrap().unwrap();
        assert_eq!(first, None);
        assert_eq!(second, None);
        assert_eq!(hub.subscriber_count(), 0);
        hub.publish(1).await.unwrap();
    }

    #[tokio::test]
    async fn test_detached_subscription_receives_nothing() {
        let hub = Hub::new(1, 4, OverflowPolicy::Suspend);
        let mut sub = hub.subscribe().unwrap();
        hub.publish(1).await.unwrap();
        sub.detach();

        assert!(!sub.is_attached());
        hub.publish(2).await.unwrap();
        assert_eq!(sub.pending(), 0);
        assert_eq!(sub.next().await, None);
    }

    #[tokio::test]
    async fn test_next_until_cancelled_takes_nothing() {
        let hub = Hub::new(0, 4, OverflowPolicy::Suspend);
        let mut sub = hub.subscribe().unwrap();
        let token = tokio_util::sync::CancellationToken::new();

        let waiter = {
            let token = token.clone();
            tokio::spawn(async move {
                let res = sub.next_until(&token).await;
                (res, sub)
            })
        };
        tokio::time::sleep(SHORT).await;
        token.cancel();

        let (res, mut sub) = timeout(LONG, waiter).await.unwrap().unwrap();
        assert_eq!(res, Err(HubError::Cancelled));
        assert!(sub.is_attached(), "cancellation does not detach");

        hub.publish(5).await.unwrap();
        assert_eq!(sub.next().await, Some(5));
    }

    #[tokio::test]
    async fn test_next_returns_queued_value_without_waiting() {
        let hub = Hub::new(0, 2, OverflowPolicy::Suspend);
        let mut sub = hub.subscribe().unwrap();
        hub.publish("a").await.unwrap();
        assert_eq!(sub.next().now_or_never(), Some(Some("a")));
        assert_eq!(sub.next().now_or_never(), None);
    }

    #[tokio::test]
    async fn test_into_stream_ends_on_close() {
        let hub = Hub::new(2, 0, OverflowPolicy::DropOldest);
        for v in 1..=4 {
            hub.publish(v).await.unwrap();
        }
        let stream = hub.subscribe().unwrap().into_stream();
        hub.close();
        let values: Vec<i32> = stream.collect().await;
        assert_eq!(values, vec![3, 4]);
    }

    #[tokio::test]
    async fn test_dropping_stream_detaches() {
        let hub = Hub::<u8>::new(0, 2, OverflowPolicy::Suspend);
        let stream = hub.subscribe().unwrap().into_stream();
        assert_eq!(hub.subscriber_count(), 1);
        drop(stream);
        assert_eq!(hub.subscriber_count(), 0);
    }
}
