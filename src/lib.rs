//! # replaybus
//!
//! **Replaybus** is a multi-subscriber broadcast hub for async Rust with a bounded
//! replay buffer and configurable overflow handling.
//!
//! A single [`Hub`] delivers every published value to all current subscribers, replays
//! the most recent values to newcomers, and applies an [`OverflowPolicy`] when a slow
//! subscriber's queue is full.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  producer 1  │   │  producer 2  │   │  producer N  │
//!     │ (Hub clone)  │   │ (Hub clone)  │   │ (Hub clone)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼ publish(v)       ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Hub (one lock, total order of publishes)                         │
//! │  - replay buffer   (last `replay` values, for new subscribers)    │
//! │  - subscriber table (one bounded delivery queue each)             │
//! │  - overflow policy  (Suspend / DropOldest / DropNewest / Fail)    │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ Subscription │   │ Subscription │   │ Subscription │
//!     │   next()     │   │   next()     │   │ into_stream()│
//!     └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! ### Publish
//! ```text
//! publish(v)
//!   ├─► hub closed?                       ─► Err(HubClosed)
//!   ├─► any queue full?
//!   │     ├─ Suspend    ─► wait until every queue has room (any dequeue re-checks)
//!   │     ├─ Fail       ─► Err(BufferOverflow), nothing delivered
//!   │     ├─ DropOldest ─► evict that queue's oldest value
//!   │     └─ DropNewest ─► skip that queue
//!   ├─► enqueue v to every remaining queue, wake its consumer
//!   ├─► append v to replay buffer (evict oldest beyond `replay`)
//!   └─► rendezvous (Suspend, no buffer): wait until every receiver took v
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types                          |
//! |-------------------|--------------------------------------------------------------|------------------------------------|
//! | **Hub**           | Publish, subscribe, close, replay snapshot.                  | [`Hub`], [`HubState`]              |
//! | **State holder**  | Current value, atomic update, repeats skipped.               | [`StateHub`]                       |
//! | **Subscriptions** | Pull values, stream view, cancellation, detach.              | [`Subscription`], [`DetachHandle`] |
//! | **Policies**      | Behavior of full delivery queues.                            | [`OverflowPolicy`]                 |
//! | **Configuration** | Replay size, extra buffer, policy.                           | [`HubConfig`]                      |
//! | **Errors**        | Typed, recoverable errors.                                   | [`HubError`]                       |
//!
//! ## Logging
//! The crate emits [`tracing`] events (`debug` for lifecycle and overflow, `trace` per
//! publish) and installs no subscriber of its own.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use replaybus::{Hub, HubConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), replaybus::HubError> {
//!     // Latest value is replayed and overwritten, like a state holder.
//!     let hub = Hub::with_config(HubConfig::state());
//!     hub.publish("booting").await?;
//!
//!     let mut sub = hub.subscribe()?;
//!     let producer = {
//!         let hub = hub.clone();
//!         tokio::spawn(async move {
//!             tokio::time::sleep(Duration::from_millis(10)).await;
//!             hub.publish("ready").await?;
//!             hub.close();
//!             Ok::<_, replaybus::HubError>(())
//!         })
//!     };
//!
//!     while let Some(status) = sub.next().await {
//!         println!("status: {status}");
//!     }
//!     producer.await.expect("producer panicked")?;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod policies;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{Hub, HubConfig, HubState, StateHub};
pub use error::HubError;
pub use policies::OverflowPolicy;
pub use subscribers::{DetachHandle, Subscription};
