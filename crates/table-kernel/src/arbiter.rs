//! Arbitration: the deadlock-avoidance half of the coordination story.
//!
//! A naive philosopher grabs its left fork, then its right. With all N doing
//! that at once, each holds one fork and waits forever for the other: the
//! classic circular wait. The arbiter breaks the cycle in one of two ways:
//!
//! - [`ArbitrationPolicy::OrderedForks`]: every philosopher acquires its
//!   lower-indexed fork first. Around the ring only the seam seat (seat n-1,
//!   between fork n-1 and fork 0) reverses its relative order, which imposes
//!   a total order on acquisitions; a cycle in the wait-for graph would need
//!   an edge from a higher-indexed fork to a lower one, and none exists.
//! - [`ArbitrationPolicy::SeatLimit`]: a FIFO semaphore with n-1 permits
//!   gates the hungry phase. With at most n-1 philosophers competing for n
//!   forks, some philosopher always finds both of its forks reachable.
//!
//! Starvation freedom comes from FIFO queuing at both choke points: the
//! semaphore admits hungry philosophers in arrival order, and each fork hands
//! itself to its oldest waiter on release (see [`crate::fork`]).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::fork::Fork;

/// Which deadlock-avoidance scheme a table runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArbitrationPolicy {
    /// Acquire the lower-indexed fork first (total acquisition order).
    OrderedForks,
    /// Admit at most n-1 philosophers to the hungry phase at once.
    SeatLimit,
}

/// Shared arbitration state for one table.
pub struct Arbiter {
    policy: ArbitrationPolicy,
    /// `Some` only under [`ArbitrationPolicy::SeatLimit`].
    hungry_seats: Option<Arc<Semaphore>>,
}

impl Arbiter {
    pub fn new(policy: ArbitrationPolicy, seats: usize) -> Self {
        let hungry_seats = match policy {
            ArbitrationPolicy::OrderedForks => None,
            // The table validates seats >= 2, but this constructor is public;
            // saturate rather than underflow on a zero-seat call.
            ArbitrationPolicy::SeatLimit => Some(Arc::new(Semaphore::new(seats.saturating_sub(1)))),
        };
        Self {
            policy,
            hungry_seats,
        }
    }

    pub fn policy(&self) -> ArbitrationPolicy {
        self.policy
    }

    /// Wait for admission to the hungry phase. Under `OrderedForks` this is
    /// a no-op; under `SeatLimit` the returned permit must be held until both
    /// forks are back on the table.
    pub async fn admit(&self) -> Option<OwnedSemaphorePermit> {
        match &self.hungry_seats {
            Some(seats) => {
                // The semaphore is never closed.
                let permit = Arc::clone(seats).acquire_owned().await.ok();
                debug_assert!(permit.is_some());
                permit
            }
            None => None,
        }
    }

    /// The order in which a philosopher takes its two forks.
    pub fn acquisition_order<'a>(
        &self,
        left: &'a Arc<Fork>,
        right: &'a Arc<Fork>,
    ) -> (&'a Arc<Fork>, &'a Arc<Fork>) {
        match self.policy {
            ArbitrationPolicy::OrderedForks => {
                if left.id() <= right.id() {
                    (left, right)
                } else {
                    (right, left)
                }
            }
            // Seat-limit admission already rules out circular wait, so the
            // natural left-then-right order is fine.
            ArbitrationPolicy::SeatLimit => (left, right),
        }
    }
}

impl std::fmt::Debug for Arbiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arbiter")
            .field("policy", &self.policy)
            .finish()
    }
}
