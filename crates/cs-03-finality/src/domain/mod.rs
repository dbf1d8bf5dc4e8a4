//! Finality domain

pub mod analyzer;
pub mod depth;

pub use analyzer::*;
pub use depth::*;
