//! Table kernel: deadlock-free coordination for a ring of philosophers.
//!
//! This crate implements the classic dining-philosophers coordination problem
//! as a small async kernel: N philosopher tasks cycle between thinking and
//! eating, where eating requires exclusive ownership of the two forks adjacent
//! to the philosopher's seat. The kernel guarantees freedom from deadlock and
//! starvation via a selectable arbitration policy (see [`ArbitrationPolicy`]).

pub mod arbiter;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod fork;
pub mod philosopher;
pub mod table;

pub use arbiter::{Arbiter, ArbitrationPolicy};
pub use config::{IntervalRange, TableConfig};
pub use coordinator::{TableCoordinator, TableSnapshot};
pub use error::TableError;
pub use events::{EventLog, ForkEvent, ForkEventKind};
pub use fork::{Fork, ForkId, PhilosopherId};
pub use philosopher::PhilosopherState;
pub use table::Table;
