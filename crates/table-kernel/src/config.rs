//! Configuration types for a table run.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::time::Duration;

use crate::arbiter::ArbitrationPolicy;

/// An inclusive range of milliseconds, sampled once per think/eat interval.
///
/// A degenerate range (`min_ms == max_ms`) gives fully deterministic timing,
/// which the scenario tests rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl IntervalRange {
    /// Range over `min_ms..=max_ms`. A reversed pair is normalized rather
    /// than rejected.
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: min_ms.max(max_ms),
        }
    }

    /// A fixed, deterministic interval.
    pub fn fixed(ms: u64) -> Self {
        Self {
            min_ms: ms,
            max_ms: ms,
        }
    }

    pub(crate) fn sample(&self, rng: &mut impl Rng) -> Duration {
        let ms = if self.min_ms == self.max_ms {
            self.min_ms
        } else {
            rng.gen_range(self.min_ms..=self.max_ms)
        };
        Duration::from_millis(ms)
    }
}

/// Top-level configuration for a table run.
///
/// Loaded from TOML/JSON by the harness or built in code by tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// Number of seats (philosophers) and forks. Must be at least 2.
    pub seats: usize,

    /// Deadlock/starvation-avoidance policy.
    pub policy: ArbitrationPolicy,

    /// How long a philosopher thinks between meals.
    pub think: IntervalRange,

    /// How long a philosopher holds both forks while eating.
    pub eat: IntervalRange,

    /// Seed for the per-philosopher interval RNGs. `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            seats: 5,
            policy: ArbitrationPolicy::OrderedForks,
            think: IntervalRange::new(5, 15),
            eat: IntervalRange::new(5, 10),
            seed: None,
        }
    }
}
