//! Error types for the table kernel.

use thiserror::Error;

use crate::fork::{ForkId, PhilosopherId};

/// Errors surfaced by table construction and the fork ownership contract.
///
/// Cancellation is deliberately absent: the stop signal travels over a watch
/// channel and is observed cooperatively, it is never an `Err`.
#[derive(Debug, Error)]
pub enum TableError {
    /// A ring needs at least two seats; one philosopher cannot have two
    /// distinct neighbors.
    #[error("a table needs at least 2 seats, got {0}")]
    InvalidParticipantCount(usize),

    /// A release was attempted by a philosopher that does not hold the fork.
    /// This is a broken invariant, not a runtime condition to recover from.
    #[error("fork {fork} released by philosopher {by}, but holder is {holder:?}")]
    OwnershipViolation {
        fork: ForkId,
        by: PhilosopherId,
        holder: Option<PhilosopherId>,
    },

    /// Acquire on a fork that has been permanently retired (teardown only).
    #[error("fork {0} has been retired")]
    ForkRetired(ForkId),

    /// A philosopher task panicked or was aborted before joining.
    #[error("philosopher task failed: {0}")]
    TaskFailed(String),
}
