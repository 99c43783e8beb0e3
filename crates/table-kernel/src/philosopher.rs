//! The philosopher state machine: think, go hungry, eat, repeat.
//!
//! One tokio task per philosopher. The only blocking points are the timed
//! think/eat waits and the fork acquisitions; a philosopher never waits for
//! anything while holding a fork except during its own eating interval.

use std::sync::{Arc, Mutex};

use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time;

use crate::arbiter::Arbiter;
use crate::config::IntervalRange;
use crate::error::TableError;
use crate::fork::{Fork, PhilosopherId, SnapshotGate};

/// Lifecycle state of one philosopher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhilosopherState {
    /// Working independently; holds no forks.
    Thinking,
    /// Requested forks, not yet holding both.
    Hungry,
    /// Holding both forks.
    Eating,
}

/// Snapshot-visible state for one seat: current lifecycle state plus the
/// number of completed meals. Mutated only under a snapshot-gate read guard.
#[derive(Debug)]
pub(crate) struct SeatCell {
    slot: Mutex<(PhilosopherState, u64)>,
}

impl SeatCell {
    pub(crate) fn new() -> Self {
        Self {
            slot: Mutex::new((PhilosopherState::Thinking, 0)),
        }
    }

    pub(crate) fn set_state(&self, state: PhilosopherState) {
        self.slot.lock().unwrap().0 = state;
    }

    /// Eating is over: back to Thinking, one more meal on the tally.
    pub(crate) fn complete_meal(&self) {
        let mut slot = self.slot.lock().unwrap();
        slot.0 = PhilosopherState::Thinking;
        slot.1 += 1;
    }

    pub(crate) fn read(&self) -> (PhilosopherState, u64) {
        *self.slot.lock().unwrap()
    }
}

/// One philosopher's seat, forks, timing policy, and stop signal.
pub(crate) struct Philosopher {
    id: PhilosopherId,
    left: Arc<Fork>,
    right: Arc<Fork>,
    cell: Arc<SeatCell>,
    gate: Arc<SnapshotGate>,
    arbiter: Arc<Arbiter>,
    think: IntervalRange,
    eat: IntervalRange,
    rng: ChaCha8Rng,
    stop: watch::Receiver<bool>,
}

impl Philosopher {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: PhilosopherId,
        left: Arc<Fork>,
        right: Arc<Fork>,
        cell: Arc<SeatCell>,
        gate: Arc<SnapshotGate>,
        arbiter: Arc<Arbiter>,
        think: IntervalRange,
        eat: IntervalRange,
        rng: ChaCha8Rng,
        stop: watch::Receiver<bool>,
    ) -> Self {
        Self {
            id,
            left,
            right,
            cell,
            gate,
            arbiter,
            think,
            eat,
            rng,
            stop,
        }
    }

    /// Drive the Thinking → Hungry → Eating cycle until a stop request is
    /// observed at a Thinking→Hungry boundary.
    pub(crate) async fn run(mut self) -> Result<(), TableError> {
        loop {
            let think_for = self.think.sample(&mut self.rng);
            // The stop signal only shortens thinking; it never interrupts a
            // philosopher that is holding forks.
            tokio::select! {
                _ = time::sleep(think_for) => {}
                changed = self.stop.changed() => {
                    if changed.is_err() {
                        // Coordinator dropped; no stop signal can ever arrive.
                        return Ok(());
                    }
                }
            }
            if *self.stop.borrow_and_update() {
                tracing::debug!(philosopher = self.id, "stop observed, leaving the table");
                return Ok(());
            }

            self.set_state(PhilosopherState::Hungry);
            let _seat_permit = self.arbiter.admit().await;
            let (first, second) = self.arbiter.acquisition_order(&self.left, &self.right);
            first.acquire(self.id).await?;
            if let Err(err) = second.acquire(self.id).await {
                // Never sit on one fork while failing on the other; that is
                // the exact pattern that deadlocks a ring.
                first.release(self.id)?;
                return Err(err);
            }
            self.set_state(PhilosopherState::Eating);
            tracing::trace!(philosopher = self.id, "eating");

            let eat_for = self.eat.sample(&mut self.rng);
            time::sleep(eat_for).await;

            // Back to Thinking before the forks go down, so a snapshot can
            // never catch a fork-less seat still marked Eating.
            self.finish_meal();
            self.left.release(self.id)?;
            self.right.release(self.id)?;
        }
    }

    fn set_state(&self, state: PhilosopherState) {
        let _mutating = self.gate.read().unwrap();
        self.cell.set_state(state);
    }

    fn finish_meal(&self) {
        let _mutating = self.gate.read().unwrap();
        self.cell.complete_meal();
    }
}
