//! `sim-runtime` entry point.
//!
//! ```bash
//! sim-runtime --config settings/prism.json --seed 7 --output report.json
//! SIM_JSON_LOGS=1 sim-runtime -c settings/ghost.json --print-metrics
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use sim_runtime::{load_config, run, write_report, Args};
use sim_telemetry::{init_telemetry, render_metrics, TelemetryConfig};

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args.config, args.seed)?;

    let telemetry = if config.logging_enabled {
        TelemetryConfig::from_env()
    } else {
        TelemetryConfig::from_env_or_level("warn")
    };
    let _guard = init_telemetry(telemetry).context("Failed to initialize logging")?;

    let report = run(config)?;
    if let Some(json) = write_report(&report, args.output.as_deref())? {
        println!("{json}");
    }

    if args.print_metrics {
        let metrics = render_metrics().context("Failed to render metrics")?;
        eprintln!("{metrics}");
    }
    Ok(())
}
