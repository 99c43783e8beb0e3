//! The fork: an exclusive-use token shared by two adjacent philosophers.
//!
//! Contention is resolved by a FIFO waiter queue with direct handoff:
//! `release` transfers ownership to the oldest waiter *before* waking it, so
//! a contested fork can never be stolen out of turn. That per-fork FIFO is
//! the starvation-freedom half of the arbitration story; the deadlock half
//! lives in [`crate::arbiter`].

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::oneshot;

use crate::error::TableError;
use crate::events::{EventLog, ForkEventKind};

/// Index of a fork around the table, `0..n`.
pub type ForkId = usize;

/// Index of a philosopher's seat around the table, `0..n`.
pub type PhilosopherId = usize;

/// Table-wide snapshot gate. Mutations hold a read guard for the duration of
/// their synchronous critical section; `snapshot()` holds the write guard.
/// Lock order is always gate, then fork interior.
pub(crate) type SnapshotGate = RwLock<()>;

struct Waiter {
    who: PhilosopherId,
    tx: oneshot::Sender<()>,
}

struct ForkInner {
    holder: Option<PhilosopherId>,
    waiters: VecDeque<Waiter>,
    retired: bool,
}

/// An exclusive-use fork with FIFO acquisition.
pub struct Fork {
    id: ForkId,
    inner: Mutex<ForkInner>,
    gate: Arc<SnapshotGate>,
    events: Arc<EventLog>,
}

impl Fork {
    pub(crate) fn new(id: ForkId, gate: Arc<SnapshotGate>, events: Arc<EventLog>) -> Self {
        Self {
            id,
            inner: Mutex::new(ForkInner {
                holder: None,
                waiters: VecDeque::new(),
                retired: false,
            }),
            gate,
            events,
        }
    }

    pub fn id(&self) -> ForkId {
        self.id
    }

    /// The current holder, if any. Reads the fork interior only; callers that
    /// need a cross-fork consistent view go through the table snapshot.
    pub fn holder(&self) -> Option<PhilosopherId> {
        self.inner.lock().unwrap().holder
    }

    /// Acquire exclusive ownership for `by`, waiting behind earlier requests.
    ///
    /// Resolves once ownership has been granted. Fails only if the fork has
    /// been retired (teardown); contention never produces an error.
    pub async fn acquire(&self, by: PhilosopherId) -> Result<(), TableError> {
        let rx = {
            let _mutating = self.gate.read().unwrap();
            let mut inner = self.inner.lock().unwrap();
            if inner.retired {
                return Err(TableError::ForkRetired(self.id));
            }
            if inner.holder.is_none() && inner.waiters.is_empty() {
                inner.holder = Some(by);
                self.events.record(self.id, by, ForkEventKind::Acquired);
                return Ok(());
            }
            let (tx, rx) = oneshot::channel();
            inner.waiters.push_back(Waiter { who: by, tx });
            rx
        };

        tracing::trace!(fork = self.id, philosopher = by, "waiting for fork");
        // The releaser assigns ownership before firing the channel, so a
        // woken waiter already holds the fork. The sender is dropped without
        // firing only when the fork is retired.
        rx.await.map_err(|_| TableError::ForkRetired(self.id))
    }

    /// Give up ownership. Hands the fork directly to the oldest waiter, or
    /// leaves it free if the queue is empty.
    ///
    /// Returns [`TableError::OwnershipViolation`] if `by` is not the holder;
    /// that is a broken invariant, not a recoverable condition.
    pub fn release(&self, by: PhilosopherId) -> Result<(), TableError> {
        let _mutating = self.gate.read().unwrap();
        let mut inner = self.inner.lock().unwrap();
        match inner.holder {
            Some(holder) if holder == by => {}
            holder => {
                return Err(TableError::OwnershipViolation {
                    fork: self.id,
                    by,
                    holder,
                })
            }
        }
        self.events.record(self.id, by, ForkEventKind::Released);
        loop {
            match inner.waiters.pop_front() {
                Some(next) => {
                    inner.holder = Some(next.who);
                    if next.tx.send(()).is_ok() {
                        self.events.record(self.id, next.who, ForkEventKind::Acquired);
                        break;
                    }
                    // Waiter dropped its acquire future; skip it.
                }
                None => {
                    inner.holder = None;
                    break;
                }
            }
        }
        Ok(())
    }

    /// Permanently retire the fork. Queued and future acquires fail with
    /// [`TableError::ForkRetired`]. Used by the coordinator at teardown.
    pub(crate) fn retire(&self) {
        let _mutating = self.gate.read().unwrap();
        let mut inner = self.inner.lock().unwrap();
        inner.retired = true;
        inner.waiters.clear();
    }
}

impl std::fmt::Debug for Fork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fork")
            .field("id", &self.id)
            .field("holder", &self.holder())
            .finish()
    }
}
