//! # Shared hub state guarded by a single lock.
//!
//! Every mutation of the replay buffer, the subscriber table and any delivery
//! queue happens inside one [`Shared::lock`] critical section. Sections are short,
//! never await, and never panic, so a poisoned lock is simply recovered.
//!
//! ## Sequence numbers
//! Each accepted value gets a hub-wide sequence number (`seq`, starting at 1).
//! Every slot records the `seq` of the last value it handed out (`consumed`),
//! which is what a rendezvous publish waits on.
//!
//! ## Wake-ups
//! - `Slot::wake` (one per subscriber): `notify_one` after a value is queued,
//!   on detach by handle and on close. A stored permit covers the race with a
//!   consumer that has not started waiting yet.
//! - `Shared::space` (all producers): `notify_waiters` after every dequeue,
//!   detach and close. Producers `enable()` their `Notified` before checking state.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::AtomicUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

use crate::core::config::HubConfig;
use crate::error::HubError;
use crate::policies::OverflowPolicy;

/// Identifier of a subscriber slot, unique per hub.
pub(crate) type SubscriberId = u64;

/// Value tagged with its hub-wide sequence number.
#[derive(Clone)]
pub(crate) struct Entry<T> {
    pub(crate) seq: u64,
    pub(crate) value: T,
}

/// Per-subscriber delivery state owned by the hub.
pub(crate) struct Slot<T> {
    queue: VecDeque<Entry<T>>,
    /// `seq` of the last value taken by the consumer (or skipped before it subscribed).
    consumed: u64,
    /// Values lost to `DropOldest`/`DropNewest`.
    dropped: u64,
    wake: Arc<Notify>,
}

impl<T> Slot<T> {
    #[inline]
    fn is_full(&self, capacity: usize) -> bool {
        self.queue.len() >= capacity
    }
}

/// Result of offering a value to the hub under the lock.
pub(crate) enum Offer<T> {
    /// Value accepted; `receivers` is the number of queues it was placed in.
    Accepted { seq: u64, receivers: usize },
    /// `Suspend` policy and some queue is full; the value is handed back.
    Blocked(T),
    /// Value rejected (`HubClosed` or `BufferOverflow`).
    Rejected(HubError),
}

/// Result of a dequeue attempt.
pub(crate) enum Take<T> {
    Value(T),
    /// Queue is empty and the hub is still open.
    Empty,
    /// Detached, or the hub is closed and the queue is drained.
    End,
}

/// Mutable hub state.
pub(crate) struct State<T> {
    replay: VecDeque<Entry<T>>,
    slots: HashMap<SubscriberId, Slot<T>>,
    next_id: SubscriberId,
    last_seq: u64,
    closed: bool,
}

impl<T> State<T> {
    fn new() -> Self {
        Self {
            replay: VecDeque::new(),
            slots: HashMap::new(),
            next_id: 0,
            last_seq: 0,
            closed: false,
        }
    }

    /// `true` once closed and every remaining subscriber has drained its queue.
    pub(crate) fn is_terminated(&self) -> bool {
        self.closed && self.slots.values().all(|s| s.queue.is_empty())
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.slots.len()
    }

    /// Most recent value still held by the replay buffer.
    pub(crate) fn latest(&self) -> Option<&T> {
        self.replay.back().map(|e| &e.value)
    }
}

impl<T: Clone> State<T> {
    /// Offers `value` to every live subscriber according to `cfg.overflow`.
    ///
    /// All-or-nothing for `Suspend` and `Fail`: either every queue has room and the
    /// value is placed everywhere, or nothing changes.
    pub(crate) fn offer(&mut self, value: T, cfg: &HubConfig) -> Offer<T> {
        if self.closed {
            return Offer::Rejected(HubError::HubClosed);
        }
        let capacity = cfg.effective_queue_capacity();
        let any_full = || self.slots.values().any(|s| s.is_full(capacity));

        match cfg.overflow {
            OverflowPolicy::Suspend if any_full() => return Offer::Blocked(value),
            OverflowPolicy::Fail if any_full() => {
                tracing::debug!(
                    policy = cfg.overflow.as_label(),
                    "publish rejected: delivery queue full"
                );
                return Offer::Rejected(HubError::BufferOverflow);
            }
            _ => {}
        }

        self.last_seq += 1;
        let seq = self.last_seq;
        let mut receivers = 0;

        for (id, slot) in self.slots.iter_mut() {
            if slot.is_full(capacity) {
                match cfg.overflow {
                    OverflowPolicy::DropOldest => {
                        slot.queue.pop_front();
                        slot.dropped += 1;
                        tracing::debug!(
                            subscriber = *id,
                            policy = cfg.overflow.as_label(),
                            "evicted oldest undelivered value"
                        );
                    }
                    OverflowPolicy::DropNewest => {
                        slot.dropped += 1;
                        tracing::debug!(
                            subscriber = *id,
                            policy = cfg.overflow.as_label(),
                            "skipped newest value"
                        );
                        continue;
                    }
                    // Guarded above: full queues never reach here under these policies.
                    OverflowPolicy::Suspend | OverflowPolicy::Fail => continue,
                }
            }
            slot.queue.push_back(Entry {
                seq,
                value: value.clone(),
            });
            slot.wake.notify_one();
            receivers += 1;
        }

        if cfg.replay > 0 {
            self.replay.push_back(Entry { seq, value });
            while self.replay.len() > cfg.replay {
                self.replay.pop_front();
            }
        }

        tracing::trace!(seq, receivers, "value published");
        Offer::Accepted { seq, receivers }
    }

    /// Registers a new subscriber seeded with the current replay buffer.
    pub(crate) fn attach(&mut self) -> Result<(SubscriberId, Arc<Notify>), HubError> {
        if self.is_terminated() {
            return Err(HubError::HubClosed);
        }
        let id = self.next_id;
        self.next_id += 1;

        let queue: VecDeque<Entry<T>> = self.replay.iter().cloned().collect();
        let consumed = queue
            .front()
            .map_or(self.last_seq, |first| first.seq.saturating_sub(1));
        let wake = Arc::new(Notify::new());

        self.slots.insert(
            id,
            Slot {
                queue,
                consumed,
                dropped: 0,
                wake: Arc::clone(&wake),
            },
        );
        Ok((id, wake))
    }

    pub(crate) fn replay_snapshot(&self) -> Vec<T> {
        self.replay.iter().map(|e| e.value.clone()).collect()
    }
}

impl<T> State<T> {
    /// Pops the oldest queued value for `id`.
    ///
    /// A slot that reaches end-of-stream after close is removed here.
    pub(crate) fn take(&mut self, id: SubscriberId) -> Take<T> {
        let Some(slot) = self.slots.get_mut(&id) else {
            return Take::End;
        };
        if let Some(entry) = slot.queue.pop_front() {
            slot.consumed = entry.seq;
            return Take::Value(entry.value);
        }
        if self.closed {
            self.slots.remove(&id);
            return Take::End;
        }
        Take::Empty
    }

    /// Removes the slot for `id`, returning its wake handle if it was still attached.
    pub(crate) fn detach(&mut self, id: SubscriberId) -> Option<Arc<Notify>> {
        self.slots.remove(&id).map(|slot| slot.wake)
    }

    /// Marks the hub closed; returns `false` if it already was.
    pub(crate) fn close(&mut self) -> bool {
        !std::mem::replace(&mut self.closed, true)
    }

    /// Wakes every consumer so that drained ones observe end-of-stream.
    pub(crate) fn wake_all(&self) {
        for slot in self.slots.values() {
            slot.wake.notify_one();
        }
    }

    /// `true` if every live subscriber has taken the value with sequence `seq`.
    pub(crate) fn is_handed_off(&self, seq: u64) -> bool {
        self.closed || self.slots.values().all(|s| s.consumed >= seq)
    }

    pub(crate) fn reset_replay(&mut self) {
        self.replay.clear();
    }

    pub(crate) fn pending(&self, id: SubscriberId) -> usize {
        self.slots.get(&id).map_or(0, |s| s.queue.len())
    }

    pub(crate) fn dropped(&self, id: SubscriberId) -> u64 {
        self.slots.get(&id).map_or(0, |s| s.dropped)
    }

    pub(crate) fn is_attached(&self, id: SubscriberId) -> bool {
        self.slots.contains_key(&id)
    }
}

/// State shared between a hub, its clones and all of its subscriptions.
pub(crate) struct Shared<T> {
    pub(crate) cfg: HubConfig,
    state: Mutex<State<T>>,
    /// Producers waiting for queue room or for a rendezvous hand-off.
    pub(crate) space: Notify,
    /// Live `Hub` handles; the hub closes when the last one is dropped.
    pub(crate) handles: AtomicUsize,
}

impl<T> Shared<T> {
    pub(crate) fn new(cfg: HubConfig) -> Self {
        Self {
            cfg,
            state: Mutex::new(State::new()),
            space: Notify::new(),
            handles: AtomicUsize::new(1),
        }
    }

    /// Acquires the hub lock.
    #[inline]
    pub(crate) fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Dequeues for `id` and, on success, wakes producers waiting for room.
    pub(crate) fn take(&self, id: SubscriberId) -> Take<T> {
        let taken = self.lock().take(id);
        if !matches!(taken, Take::Empty) {
            self.space.notify_waiters();
        }
        taken
    }

    /// Marks the hub closed and releases every waiter; returns `false` if it already was.
    pub(crate) fn close(&self) -> bool {
        let first = {
            let mut state = self.lock();
            let first = state.close();
            if first {
                state.wake_all();
            }
            first
        };
        if first {
            tracing::debug!("hub closed");
            self.space.notify_waiters();
        }
        first
    }

    /// Detaches `id`; idempotent.
    ///
    /// The slot leaves the subscriber table before anyone is woken, so no publish
    /// can observe a half-detached subscriber.
    pub(crate) fn remove_subscriber(&self, id: SubscriberId) {
        let removed = self.lock().detach(id);
        if let Some(wake) = removed {
            tracing::debug!(subscriber = id, "subscriber detached");
            wake.notify_one();
            self.space.notify_waiters();
        }
    }
}

/// Type-erased detach entry point, so handles need not carry the value type.
pub(crate) trait Detach: Send + Sync {
    fn detach(&self, id: SubscriberId);
}

impl<T: Send> Detach for Shared<T> {
    fn detach(&self, id: SubscriberId) {
        self.remove_subscriber(id);
    }
}
