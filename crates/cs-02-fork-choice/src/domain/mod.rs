//! Fork-choice domain: algorithms, templates and shared helpers

pub mod algorithm;
pub mod conflux;
pub mod error;
pub mod ghost;
pub mod longest_chain;
pub mod pool;
pub mod prefix;
pub mod prism;
pub mod template;

pub use algorithm::*;
pub use conflux::*;
pub use error::*;
pub use ghost::*;
pub use longest_chain::*;
pub use pool::*;
pub use prefix::*;
pub use prism::*;
pub use template::{Admission, BlockTemplate};
