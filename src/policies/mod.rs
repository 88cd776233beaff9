//! Overflow policies.
//!
//! This module groups the knob that controls **what happens** when a
//! subscriber falls behind far enough to fill its delivery queue.
//!
//! ## Contents
//! - [`OverflowPolicy`] suspend / drop-oldest / drop-newest / fail
//!
//! ## Quick wiring
//! ```text
//! HubConfig { replay, extra_buffer, overflow: OverflowPolicy }
//!      └─► core::hub::Hub uses:
//!           - overflow to decide wait / evict / skip / reject per full queue
//! ```
//!
//! ## Defaults
//! - `OverflowPolicy::Suspend` (lossless; the slowest subscriber throttles producers).

mod overflow;

pub use overflow::OverflowPolicy;
