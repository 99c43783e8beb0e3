//! Report collection and JSON output for simulation runs.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use table_kernel::{TableConfig, TableCoordinator};

/// Per-seat fairness summary: minimum, mean, and min/mean ratio (1.0 means
/// perfectly even).
fn summarize(meals: &[u64]) -> (u64, f64, f64) {
    let min = meals.iter().copied().min().unwrap_or(0);
    let total: u64 = meals.iter().sum();
    let mean = if meals.is_empty() {
        0.0
    } else {
        total as f64 / meals.len() as f64
    };
    let ratio = if mean > 0.0 { min as f64 / mean } else { 1.0 };
    (min, mean, ratio)
}

/// Results from one simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    /// Configuration echo, so a report is self-describing.
    pub config: TableConfig,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Completed meals per seat.
    pub meals: Vec<u64>,
    pub total_meals: u64,
    /// Total fork ownership transitions recorded.
    pub fork_events: usize,
    pub min_meals: u64,
    pub mean_meals: f64,
    /// min/mean; a starved seat drags this toward zero.
    pub fairness_ratio: f64,
}

impl SimReport {
    pub fn collect(
        config: TableConfig,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        coordinator: &TableCoordinator,
    ) -> Self {
        let meals = coordinator.meal_counts();
        let total_meals = meals.iter().sum();
        let fork_events = coordinator.events().len();
        let (min_meals, mean_meals, fairness_ratio) = summarize(&meals);
        Self {
            config,
            started_at,
            ended_at,
            meals,
            total_meals,
            fork_events,
            min_meals,
            mean_meals,
            fairness_ratio,
        }
    }

    pub fn log_summary(&self) {
        info!(
            seats = self.config.seats,
            policy = ?self.config.policy,
            total_meals = self.total_meals,
            min_meals = self.min_meals,
            mean_meals = format!("{:.1}", self.mean_meals),
            fairness = format!("{:.2}", self.fairness_ratio),
            "run complete"
        );
        for (seat, count) in self.meals.iter().enumerate() {
            info!(seat, meals = count, "seat summary");
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("serializing report")?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}
