//! # Simulator Telemetry
//!
//! Logging and metrics plumbing shared by the simulator binaries.
//!
//! ## Components
//!
//! - **Logs**: a `tracing-subscriber` fmt layer, compact text or JSON,
//!   filtered through `EnvFilter`
//! - **Metrics**: the consensus crates register their counters in the
//!   default Prometheus registry; [`render_metrics`] dumps it in text
//!   exposition format
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sim_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! // run the simulation
//! println!("{}", sim_telemetry::render_metrics()?);
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SIM_LOG_LEVEL` | `RUST_LOG`, then `info` | Filter directive |
//! | `SIM_JSON_LOGS` | `false` | Emit one JSON object per event |
//! | `SIM_LOG_TARGETS` | `true` | Include the module target in each line |

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::render_metrics;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter '{directive}': {reason}")]
    InvalidFilter { directive: String, reason: String },

    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Failed to encode metrics: {0}")]
    MetricsEncode(String),
}

/// Install the global subscriber described by `config`.
///
/// Returns a guard that logs shutdown when dropped. Calling this twice in
/// one process fails with [`TelemetryError::SubscriberInit`].
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    init_logging(&config)?;
    tracing::debug!(
        service = %config.service_name,
        level = %config.log_level,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );
    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active for the lifetime of the run.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::debug!(service = %self.service_name, "Shutting down telemetry");
    }
}
