//! Network latency domain

pub mod model;

pub use model::*;
