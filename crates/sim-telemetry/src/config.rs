//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Name attached to start-up and shutdown events
    pub service_name: String,

    /// `EnvFilter` directive, e.g. `info` or `warn,cs_06_coordinator=debug`
    pub log_level: String,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Whether each line carries its module target
    pub log_targets: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "chainsim".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            log_targets: true,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SIM_LOG_LEVEL` or `RUST_LOG`: filter directive (default: info)
    /// - `SIM_JSON_LOGS`: enable JSON logs (default: false)
    /// - `SIM_LOG_TARGETS`: include module targets (default: true)
    pub fn from_env() -> Self {
        Self::from_lookup("info", |key| env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) but with a different level when
    /// neither `SIM_LOG_LEVEL` nor `RUST_LOG` is set.
    pub fn from_env_or_level(default_level: &str) -> Self {
        Self::from_lookup(default_level, |key| env::var(key).ok())
    }

    fn from_lookup<F>(default_level: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            service_name: defaults.service_name,

            log_level: lookup("SIM_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or_else(|| default_level.to_string()),

            json_logs: lookup("SIM_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.json_logs),

            log_targets: lookup("SIM_LOG_TARGETS")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.log_targets),
        }
    }
}
