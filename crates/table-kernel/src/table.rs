//! Ring topology: N seats, N forks, one closed circle.
//!
//! The table owns the fork arena and the per-seat state cells; philosophers
//! hold `Arc`s into it rather than references to each other (index-based
//! lookup, no bidirectional object graph). The binding is fixed at
//! construction: seat i's left fork is fork i, its right fork is fork
//! (i+1) mod n, so every fork is shared by exactly two adjacent seats.

use std::sync::Arc;

use crate::error::TableError;
use crate::events::EventLog;
use crate::fork::{Fork, ForkId, SnapshotGate};
use crate::philosopher::SeatCell;

/// The aggregate of forks, seat cells, and the shared observation machinery.
pub struct Table {
    forks: Vec<Arc<Fork>>,
    cells: Vec<Arc<SeatCell>>,
    gate: Arc<SnapshotGate>,
    events: Arc<EventLog>,
}

impl Table {
    /// Build the ring. Fails with [`TableError::InvalidParticipantCount`]
    /// for fewer than two seats.
    pub fn new(seats: usize) -> Result<Self, TableError> {
        if seats < 2 {
            return Err(TableError::InvalidParticipantCount(seats));
        }
        let gate = Arc::new(SnapshotGate::new(()));
        let events = Arc::new(EventLog::new());
        let forks = (0..seats)
            .map(|id| Arc::new(Fork::new(id, gate.clone(), events.clone())))
            .collect();
        let cells = (0..seats).map(|_| Arc::new(SeatCell::new())).collect();
        Ok(Self {
            forks,
            cells,
            gate,
            events,
        })
    }

    /// Number of seats (and forks) around the table.
    pub fn seats(&self) -> usize {
        self.forks.len()
    }

    /// Seat i's left fork: fork i.
    pub fn left_fork(&self, seat: usize) -> &Arc<Fork> {
        &self.forks[seat]
    }

    /// Seat i's right fork: fork (i+1) mod n.
    pub fn right_fork(&self, seat: usize) -> &Arc<Fork> {
        &self.forks[(seat + 1) % self.forks.len()]
    }

    pub fn fork(&self, id: ForkId) -> &Arc<Fork> {
        &self.forks[id]
    }

    pub fn forks(&self) -> &[Arc<Fork>] {
        &self.forks
    }

    /// The table-wide fork ownership log.
    pub fn events(&self) -> &Arc<EventLog> {
        &self.events
    }

    pub(crate) fn cell(&self, seat: usize) -> &Arc<SeatCell> {
        &self.cells[seat]
    }

    pub(crate) fn cells(&self) -> &[Arc<SeatCell>] {
        &self.cells
    }

    pub(crate) fn gate(&self) -> &Arc<SnapshotGate> {
        &self.gate
    }

    pub(crate) fn retire_forks(&self) {
        for fork in &self.forks {
            fork.retire();
        }
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("seats", &self.seats())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn too_few_seats_is_rejected() {
        assert!(matches!(
            Table::new(0),
            Err(TableError::InvalidParticipantCount(0))
        ));
        assert!(matches!(
            Table::new(1),
            Err(TableError::InvalidParticipantCount(1))
        ));
    }

    #[test]
    fn cardinality_matches_seat_count() {
        for n in [2, 3, 5, 8] {
            let table = Table::new(n).unwrap();
            assert_eq!(table.seats(), n);
            assert_eq!(table.forks().len(), n);
            assert_eq!(table.cells().len(), n);
        }
    }

    #[test]
    fn left_and_right_follow_the_ring_rule() {
        let n = 5;
        let table = Table::new(n).unwrap();
        for seat in 0..n {
            assert_eq!(table.left_fork(seat).id(), seat);
            assert_eq!(table.right_fork(seat).id(), (seat + 1) % n);
            assert!(
                !Arc::ptr_eq(table.left_fork(seat), table.right_fork(seat)),
                "seat {seat} must not hold the same fork in both hands"
            );
        }
    }

    #[test]
    fn ring_is_closed() {
        let n = 8;
        let table = Table::new(n).unwrap();
        for seat in 0..n {
            assert!(Arc::ptr_eq(
                table.right_fork(seat),
                table.left_fork((seat + 1) % n)
            ));
        }
    }

    #[test]
    fn every_fork_is_shared_by_exactly_two_seats() {
        let n = 5;
        let table = Table::new(n).unwrap();
        for fork in table.forks() {
            let references = (0..n)
                .filter(|&seat| {
                    Arc::ptr_eq(table.left_fork(seat), fork)
                        || Arc::ptr_eq(table.right_fork(seat), fork)
                })
                .count();
            assert_eq!(references, 2, "fork {} must have two neighbors", fork.id());
        }
    }
}
