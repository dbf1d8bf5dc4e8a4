//! Domain layer for the block tree
//!
//! - tree: arena, adjacency and depth index
//! - orphans: out-of-order arrival buffer
//! - error: tree errors

mod error;
mod orphans;
mod tree;

pub use error::*;
pub use orphans::*;
pub use tree::*;
