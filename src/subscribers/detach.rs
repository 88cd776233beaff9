//! Detaching a subscription from outside its consumer task.

use std::fmt;
use std::sync::Arc;

use crate::core::state::{Detach, SubscriberId};

/// Clonable handle that detaches one subscription; idempotent.
///
/// Obtained from [`Subscription::detach_handle`](crate::Subscription::detach_handle).
/// Useful when the consumer is parked in `next()` on another task: detaching releases
/// it with end-of-stream.
#[derive(Clone)]
pub struct DetachHandle {
    id: SubscriberId,
    hub: Arc<dyn Detach>,
}

impl DetachHandle {
    pub(crate) fn new(id: SubscriberId, hub: Arc<dyn Detach>) -> Self {
        Self { id, hub }
    }

    /// Removes the subscription from its hub and wakes its consumer.
    pub fn detach(&self) {
        self.hub.detach(self.id);
    }
}

impl fmt::Debug for DetachHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetachHandle").field("id", &self.id).finish()
    }
}
