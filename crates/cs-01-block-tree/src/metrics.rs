//! # Block Tree Metrics
//!
//! Prometheus counters for orphan handling.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! cs-01-block-tree = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `cs_tree_orphans_buffered_total` - Blocks buffered because a dependency was missing
//! - `cs_tree_orphans_resolved_total` - Buffered blocks later linked by a retry pass

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, IntCounter};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total orphans buffered
    pub static ref ORPHANS_BUFFERED: IntCounter = register_int_counter!(
        "cs_tree_orphans_buffered_total",
        "Total number of blocks buffered as orphans"
    )
    .expect("Failed to create ORPHANS_BUFFERED metric");

    /// Total orphans resolved
    pub static ref ORPHANS_RESOLVED: IntCounter = register_int_counter!(
        "cs_tree_orphans_resolved_total",
        "Total number of orphans linked on retry"
    )
    .expect("Failed to create ORPHANS_RESOLVED metric");
}

/// Record an orphan being buffered
#[cfg(feature = "metrics")]
pub fn record_orphan_buffered() {
    ORPHANS_BUFFERED.inc();
}

/// Record orphans linked by a retry pass
#[cfg(feature = "metrics")]
pub fn record_orphans_resolved(count: u64) {
    ORPHANS_RESOLVED.inc_by(count);
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_orphan_buffered() {}

#[cfg(not(feature = "metrics"))]
pub fn record_orphans_resolved(_count: u64) {}
