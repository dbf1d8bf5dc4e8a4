//! Node domain

pub mod inbox;
pub mod node;
pub mod pending;

pub use inbox::*;
pub use node::*;
pub use pending::*;
