//! Hub core: configuration, shared state and the publish/subscribe entry points.
//!
//! The public API from this module is [`Hub`], its [`HubState`], the
//! [`HubConfig`] it is built from and the [`StateHub`] wrapper.
//!
//! Internal modules:
//! - [`config`]: construction knobs and their sentinel helpers;
//! - [`hub`]: publish, subscribe, close and observation;
//! - [`state`]: the lock-guarded replay buffer and subscriber table;
//! - [`state_hub`]: single-value holder with distinct, atomic updates;
//! - [`wait`]: cancellable suspension shared by producers and consumers.

mod config;
mod hub;
pub(crate) mod state;
mod state_hub;
pub(crate) mod wait;

pub use config::HubConfig;
pub use hub::{Hub, HubState};
pub use state_hub::StateHub;
