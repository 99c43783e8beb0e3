//! Dining-table simulation CLI.
//!
//! Runs the table kernel for a bounded wall-clock window and reports
//! per-philosopher meal statistics, optionally as a JSON file.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use table_kernel::{ArbitrationPolicy, IntervalRange, TableConfig, TableCoordinator};

mod results;

use results::SimReport;

/// Generate a timestamped output path from the given path.
/// e.g., "report.json" -> "report-20260829-010530.json"
fn timestamped_path(path: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d-%H%M%S");
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("report");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("json");
    let parent = path.parent().unwrap_or(Path::new("."));
    parent.join(format!("{}-{}.{}", stem, timestamp, ext))
}

fn parse_policy(name: &str) -> Result<ArbitrationPolicy> {
    match name {
        "ordered_forks" | "ordered" => Ok(ArbitrationPolicy::OrderedForks),
        "seat_limit" | "waiter" => Ok(ArbitrationPolicy::SeatLimit),
        other => bail!("unknown policy '{other}' (expected ordered_forks or seat_limit)"),
    }
}

#[derive(Parser)]
#[command(name = "dining-sim")]
#[command(version)]
#[command(about = "Dining philosophers coordination simulator")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation for a bounded window
    Run {
        /// Number of philosophers (and forks)
        #[arg(long, default_value = "5")]
        seats: usize,

        /// Arbitration policy: ordered_forks | seat_limit
        #[arg(long, default_value = "ordered_forks")]
        policy: String,

        /// Minimum think interval (ms)
        #[arg(long, default_value = "5")]
        think_min_ms: u64,

        /// Maximum think interval (ms)
        #[arg(long, default_value = "15")]
        think_max_ms: u64,

        /// Minimum eat interval (ms)
        #[arg(long, default_value = "5")]
        eat_min_ms: u64,

        /// Maximum eat interval (ms)
        #[arg(long, default_value = "10")]
        eat_max_ms: u64,

        /// How long to run (ms)
        #[arg(long, default_value = "2000")]
        duration_ms: u64,

        /// Random seed for reproducible interval sampling
        #[arg(long)]
        seed: Option<u64>,

        /// Output file for the JSON report (timestamped)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    match cli.command {
        Commands::Run {
            seats,
            policy,
            think_min_ms,
            think_max_ms,
            eat_min_ms,
            eat_max_ms,
            duration_ms,
            seed,
            output,
        } => {
            let config = TableConfig {
                seats,
                policy: parse_policy(&policy)?,
                think: IntervalRange::new(think_min_ms, think_max_ms),
                eat: IntervalRange::new(eat_min_ms, eat_max_ms),
                seed,
            };

            let started_at = Utc::now();
            let mut coordinator = TableCoordinator::start(config.clone())?;

            // Sleep the window out in slices so progress shows up in the log.
            let mut elapsed = 0;
            while elapsed < duration_ms {
                let step = 500.min(duration_ms - elapsed);
                tokio::time::sleep(tokio::time::Duration::from_millis(step)).await;
                elapsed += step;
                let snapshot = coordinator.snapshot();
                debug!(
                    elapsed_ms = elapsed,
                    total_meals = snapshot.total_meals(),
                    "progress"
                );
            }

            coordinator.stop().await?;
            let ended_at = Utc::now();

            let report = SimReport::collect(config, started_at, ended_at, &coordinator);
            report.log_summary();

            if let Some(output) = output {
                let path = timestamped_path(&output);
                report.save(&path)?;
                tracing::info!(path = %path.display(), "report written");
            }
        }
    }

    Ok(())
}
