//! Structured logging.
//!
//! Events are written to stderr so that a report printed on stdout stays
//! machine-readable. JSON mode emits one object per event with the
//! `tracing` fields flattened in.

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::EnvFilter;

/// Build the filter for `config.log_level`.
pub(crate) fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.log_level).map_err(|e| TelemetryError::InvalidFilter {
        directive: config.log_level.clone(),
        reason: e.to_string(),
    })
}

/// Install the global fmt subscriber.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.log_targets)
        .with_writer(std::io::stderr);

    let installed = if config.json_logs {
        builder.json().flatten_event(true).try_init()
    } else {
        builder.compact().try_init()
    };
    installed.map_err(|e| TelemetryError::SubscriberInit(e.to_string()))
}
