//! # Fork-Choice Metrics
//!
//! Prometheus counters for fork-choice edge cases.
//!
//! ## Metrics Exported
//!
//! - `cs_fork_choice_epoch_truncations_total` - Conflux epoch traversals cut at the depth bound

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, IntCounter};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total truncated epoch traversals
    pub static ref EPOCH_TRUNCATIONS: IntCounter = register_int_counter!(
        "cs_fork_choice_epoch_truncations_total",
        "Total number of Conflux epoch traversals truncated at the depth bound"
    )
    .expect("Failed to create EPOCH_TRUNCATIONS metric");
}

/// Record a truncated epoch traversal
#[cfg(feature = "metrics")]
pub fn record_epoch_truncation() {
    EPOCH_TRUNCATIONS.inc();
}

#[cfg(not(feature = "metrics"))]
pub fn record_epoch_truncation() {}
