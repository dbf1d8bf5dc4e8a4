//! Prometheus text rendering.
//!
//! The consensus crates register their counters (`cs_<crate>_<metric>`) in
//! the default registry when built with their `metrics` feature.

use crate::TelemetryError;
use prometheus::{Encoder, TextEncoder};

/// Encode every metric in the default registry as Prometheus text format.
pub fn render_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsEncode(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsEncode(e.to_string()))
}
