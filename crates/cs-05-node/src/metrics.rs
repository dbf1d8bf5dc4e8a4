//! # Node Metrics
//!
//! ## Metrics Exported
//!
//! - `cs_node_messages_delivered_total{kind}` - Messages delivered to nodes, by payload kind

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter_vec, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Messages delivered, labeled by payload kind
    pub static ref MESSAGES_DELIVERED: IntCounterVec = register_int_counter_vec!(
        "cs_node_messages_delivered_total",
        "Total number of messages delivered to nodes",
        &["kind"]
    )
    .expect("Failed to create MESSAGES_DELIVERED metric");
}

/// Record a delivered message
#[cfg(feature = "metrics")]
pub fn record_message_delivered(kind: &str) {
    MESSAGES_DELIVERED.with_label_values(&[kind]).inc();
}

#[cfg(not(feature = "metrics"))]
pub fn record_message_delivered(_kind: &str) {}
