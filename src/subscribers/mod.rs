//! # Consumer side of a hub.
//!
//! This module provides the handles a consumer holds after calling
//! [`Hub::subscribe`](crate::Hub::subscribe).
//!
//! ## Contents
//! - [`Subscription`] pulls values (`next`, `next_until`, `into_stream`) and detaches
//! - [`DetachHandle`] detaches a subscription from another task
//!
//! ## Lifecycle
//! ```text
//! subscribe() ──► Attached ──next()──► Attached
//!                    │
//!                    ├── detach() / DetachHandle::detach() / drop ──► Detached ──► next() = None
//!                    └── hub closed + queue drained ──────────────────► Ended    ──► next() = None
//! ```

mod detach;
mod subscription;

pub use detach::DetachHandle;
pub use subscription::Subscription;
