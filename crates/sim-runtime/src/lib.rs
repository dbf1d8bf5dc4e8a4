//! # Simulator Runtime
//!
//! Glue between the command line and the coordinator.
//!
//! ## Run Sequence
//!
//! 1. Read the settings file and parse it into a [`SimConfig`]
//!    (validation is part of parsing)
//! 2. Apply command-line overrides (`--seed`)
//! 3. Run the simulation to completion
//! 4. Serialize the [`SimulationReport`] to a file or stdout

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use cs_06_coordinator::{simulate, SimConfig, SimulationReport};
use tracing::info;

/// Blockchain fork-choice and finalization simulator
///
/// Runs one discrete-event simulation. Given the same settings and seed,
/// produces an identical report every run.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "sim-runtime")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// JSON settings file
    #[arg(short = 'c', long)]
    pub config: PathBuf,

    /// Random seed, overrides the settings file
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the JSON report here instead of stdout
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Print Prometheus counters to stderr after the run
    #[arg(long)]
    pub print_metrics: bool,
}

/// Parse settings text and apply command-line overrides.
pub fn parse_config(text: &str, seed: Option<u64>) -> Result<SimConfig> {
    let mut config = SimConfig::from_json_str(text).context("Invalid simulation settings")?;
    if let Some(seed) = seed {
        config.seed = seed;
    }
    Ok(config)
}

/// Read and parse the settings file at `path`.
pub fn load_config(path: &Path, seed: Option<u64>) -> Result<SimConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    parse_config(&text, seed).with_context(|| format!("Failed to load {}", path.display()))
}

/// Run one simulation.
pub fn run(config: SimConfig) -> Result<SimulationReport> {
    info!(
        fork_choice_rule = %config.fork_choice_rule,
        nodes = config.num_nodes,
        adversaries = config.num_adversaries,
        duration = config.duration,
        seed = config.seed,
        "Starting simulation"
    );
    let report = simulate(config).context("Simulation aborted")?;
    info!(
        finalization_depth = report.finalization_depth,
        main_chain_length = report.main_chain_length,
        common_prefix_length = report.common_prefix_length,
        finalized_blocks = report.finalized_blocks(),
        completed_transactions = report.completed_transactions(),
        throughput = report.throughput_tx_per_sec,
        "Simulation complete"
    );
    Ok(report)
}

/// Serialize `report` to `output`, or return it when no path is given.
pub fn write_report(report: &SimulationReport, output: Option<&Path>) -> Result<Option<String>> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    match output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!(path = %path.display(), "Report written");
            Ok(None)
        }
        None => Ok(Some(json)),
    }
}
