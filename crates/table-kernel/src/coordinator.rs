//! The table coordinator: owns the philosophers' tasks and the run lifecycle.

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::arbiter::Arbiter;
use crate::config::TableConfig;
use crate::error::TableError;
use crate::events::EventLog;
use crate::fork::PhilosopherId;
use crate::philosopher::{Philosopher, PhilosopherState};
use crate::table::Table;

/// A consistent cross-actor view of the table, taken under the snapshot gate
/// so it can never observe a torn mid-transition state.
#[derive(Debug, Clone, Serialize)]
pub struct TableSnapshot {
    /// Lifecycle state per seat.
    pub states: Vec<PhilosopherState>,
    /// Current holder per fork.
    pub holders: Vec<Option<PhilosopherId>>,
    /// Completed meals per seat.
    pub meals: Vec<u64>,
}

impl TableSnapshot {
    /// True when every seat is Thinking and every fork is on the table.
    pub fn everyone_idle(&self) -> bool {
        self.states.iter().all(|s| *s == PhilosopherState::Thinking)
            && self.holders.iter().all(Option::is_none)
    }

    pub fn total_meals(&self) -> u64 {
        self.meals.iter().sum()
    }
}

/// Runs one table: builds the ring, spawns one task per seat, and offers
/// cooperative shutdown plus consistent inspection while running.
///
/// Must be started from within a tokio runtime. Dropping the coordinator
/// without calling [`TableCoordinator::stop`] leaves the philosopher tasks
/// running detached until the runtime shuts down.
pub struct TableCoordinator {
    table: Arc<Table>,
    stop_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<Result<(), TableError>>>,
}

impl std::fmt::Debug for TableCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableCoordinator")
            .field("seats", &self.table.seats())
            .field("running_tasks", &self.tasks.len())
            .finish()
    }
}

impl TableCoordinator {
    /// Build the ring for `config.seats` and launch one philosopher task per
    /// seat. Returns as soon as every task is spawned.
    pub fn start(config: TableConfig) -> Result<Self, TableError> {
        let table = Arc::new(Table::new(config.seats)?);
        let arbiter = Arc::new(Arbiter::new(config.policy, config.seats));
        let (stop_tx, stop_rx) = watch::channel(false);

        let mut tasks = Vec::with_capacity(config.seats);
        for seat in 0..config.seats {
            let rng = match config.seed {
                // Decorrelate seats while keeping the run reproducible.
                Some(seed) => {
                    ChaCha8Rng::seed_from_u64(seed ^ (seat as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15))
                }
                None => ChaCha8Rng::from_entropy(),
            };
            let philosopher = Philosopher::new(
                seat,
                table.left_fork(seat).clone(),
                table.right_fork(seat).clone(),
                table.cell(seat).clone(),
                table.gate().clone(),
                arbiter.clone(),
                config.think,
                config.eat,
                rng,
                stop_rx.clone(),
            );
            tasks.push(tokio::spawn(philosopher.run()));
        }

        info!(
            seats = config.seats,
            policy = ?config.policy,
            "table running"
        );
        Ok(Self {
            table,
            stop_tx,
            tasks,
        })
    }

    /// Request cooperative shutdown and wait for every philosopher to leave.
    ///
    /// Each task exits at its next Thinking→Hungry boundary; a philosopher
    /// mid-Eating always finishes releasing its forks first. Surfaces the
    /// first task error, if any, and retires the forks afterwards.
    pub async fn stop(&mut self) -> Result<(), TableError> {
        // Idempotent: a second call finds no tasks left to join.
        let _ = self.stop_tx.send(true);
        debug!("stop requested");

        let mut first_err = None;
        for task in self.tasks.drain(..) {
            let outcome = match task.await {
                Ok(result) => result,
                Err(join_err) => Err(TableError::TaskFailed(join_err.to_string())),
            };
            if let Err(err) = outcome {
                first_err.get_or_insert(err);
            }
        }
        self.table.retire_forks();
        info!("table stopped");
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// A consistent view of every seat's state and every fork's holder.
    ///
    /// Taken under the table-wide gate (a mechanism distinct from the
    /// per-fork locks), so no in-flight transition can be half-observed.
    pub fn snapshot(&self) -> TableSnapshot {
        let _barrier = self.table.gate().write().unwrap();
        let mut states = Vec::with_capacity(self.table.seats());
        let mut meals = Vec::with_capacity(self.table.seats());
        for cell in self.table.cells() {
            let (state, count) = cell.read();
            states.push(state);
            meals.push(count);
        }
        let holders = self.table.forks().iter().map(|f| f.holder()).collect();
        TableSnapshot {
            states,
            holders,
            meals,
        }
    }

    /// Completed meals per seat.
    pub fn meal_counts(&self) -> Vec<u64> {
        self.snapshot().meals
    }

    /// The fork ownership event log.
    pub fn events(&self) -> &Arc<EventLog> {
        self.table.events()
    }

    /// The underlying table, for topology inspection.
    pub fn table(&self) -> &Table {
        &self.table
    }
}
