//! # cs-04-network-model
//!
//! Pure latency functions consumed when a node broadcasts.
//!
//! | Model | Delay for `s` bytes |
//! |-------|---------------------|
//! | `Zero` | `0` |
//! | `Constant-Decker-Wattenhorf` | `per_kb_delay * s / 1000` |
//! | `Decker-Wattenhorf` | `2 * (link_latency + 8 s / bandwidth)` |
//!
//! Nodes depend on the [`LatencyModel`] port, not on the enum, so tests can
//! plug in their own delays.

pub mod domain;
pub mod error;
pub mod ports;

pub use domain::*;
pub use error::{NetworkError, NetworkResult};
pub use ports::LatencyModel;
