//! Liveness: under either arbitration policy the table never deadlocks, and
//! every philosopher completes full Thinking→Hungry→Eating→Thinking cycles.
//!
//! Paused-clock runs use tokio's virtual time, so the "generous timeout" is
//! generous in simulated milliseconds while the test itself stays fast. A
//! run that deadlocks stops producing meals and trips the timeout.

use table_kernel::{ArbitrationPolicy, IntervalRange, TableConfig, TableCoordinator, TableError};
use tokio::time::{sleep, timeout, Duration};

fn config(seats: usize, policy: ArbitrationPolicy) -> TableConfig {
    TableConfig {
        seats,
        policy,
        think: IntervalRange::new(1, 5),
        eat: IntervalRange::new(1, 3),
        seed: Some(42),
    }
}

async fn wait_for_meals(coord: &TableCoordinator, per_seat: u64) {
    loop {
        if coord.meal_counts().iter().all(|&m| m >= per_seat) {
            return;
        }
        sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test(start_paused = true)]
async fn every_seat_eats_under_ordered_forks() {
    for seats in [2, 5, 8] {
        let mut coord =
            TableCoordinator::start(config(seats, ArbitrationPolicy::OrderedForks)).unwrap();
        timeout(Duration::from_secs(60), wait_for_meals(&coord, 1))
            .await
            .unwrap_or_else(|_| panic!("deadlock with {seats} seats under ordered forks"));
        coord.stop().await.unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn every_seat_eats_under_seat_limit() {
    for seats in [2, 5, 8] {
        let mut coord =
            TableCoordinator::start(config(seats, ArbitrationPolicy::SeatLimit)).unwrap();
        timeout(Duration::from_secs(60), wait_for_meals(&coord, 1))
            .await
            .unwrap_or_else(|_| panic!("deadlock with {seats} seats under seat limit"));
        coord.stop().await.unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn a_table_keeps_cycling_over_a_long_run() {
    let mut coord = TableCoordinator::start(config(5, ArbitrationPolicy::OrderedForks)).unwrap();
    timeout(Duration::from_secs(600), wait_for_meals(&coord, 20))
        .await
        .expect("simulation stalled before 20 meals per seat");
    coord.stop().await.unwrap();
}

// Real clock and real worker threads: genuine parallelism, small intervals,
// wall-clock timeout.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_smoke_run() {
    let mut coord = TableCoordinator::start(config(5, ArbitrationPolicy::OrderedForks)).unwrap();
    timeout(Duration::from_secs(30), wait_for_meals(&coord, 3))
        .await
        .expect("deadlock on the multi-threaded runtime");
    coord.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn starting_with_too_few_seats_fails() {
    let err = TableCoordinator::start(config(1, ArbitrationPolicy::OrderedForks)).unwrap_err();
    assert!(matches!(err, TableError::InvalidParticipantCount(1)));
}

#[tokio::test(start_paused = true)]
async fn coordinator_debug_shows_seats_and_tasks() {
    let mut coord = TableCoordinator::start(config(2, ArbitrationPolicy::OrderedForks)).unwrap();
    let rendered = format!("{coord:?}");
    assert!(rendered.contains("TableCoordinator"));
    assert!(rendered.contains("seats: 2"));
    coord.stop().await.unwrap();
}
