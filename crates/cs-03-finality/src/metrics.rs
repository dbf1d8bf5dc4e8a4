//! # Finality Metrics
//!
//! Enable with the `metrics` feature:
//! ```toml
//! cs-03-finality = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `cs_finality_blocks_finalized_total` - Blocks judged final

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, IntCounter};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total blocks finalized
    pub static ref BLOCKS_FINALIZED: IntCounter = register_int_counter!(
        "cs_finality_blocks_finalized_total",
        "Total number of blocks judged final"
    )
    .expect("Failed to create BLOCKS_FINALIZED metric");
}

/// Record a block judged final
#[cfg(feature = "metrics")]
pub fn record_block_finalized() {
    BLOCKS_FINALIZED.inc();
}

#[cfg(not(feature = "metrics"))]
pub fn record_block_finalized() {}
