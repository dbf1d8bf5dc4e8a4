//! # cs-03-finality
//!
//! Turns a security parameter into a finalization depth and judges blocks
//! against it.
//!
//! ## Model
//!
//! With `q = num_adversaries / num_nodes` of the proposal power held by an
//! adversary, [`compute_finalization_depth`] searches for the smallest `k`
//! such that the adversary's chance of ever overtaking a block `k` deep is
//! at most `epsilon`. The search is monotone in `k` and bounded by
//! [`MAX_FINALIZATION_DEPTH`]; parameters for which it cannot terminate
//! fail with [`FinalityError::InvalidSecurityParameters`].
//!
//! ```text
//!   (epsilon, nodes, adversaries) ──► compute_finalization_depth ──► k
//!                                                                   │
//!   (block depth, head depth, rng) ──► FinalizationAnalyzer ◄───────┘
//!                                          │
//!                       head - depth >= k  AND  coin < 1 - epsilon
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use cs_03_finality::FinalizationAnalyzer;
//! use rand::SeedableRng;
//!
//! let analyzer = FinalizationAnalyzer::new(1e-3, 10, 1).unwrap();
//! assert_eq!(analyzer.depth(), 5);
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! assert!(!analyzer.is_finalized(4, 6, &mut rng));
//! ```

pub mod domain;
pub mod error;
pub mod metrics;

pub use domain::*;
pub use error::{FinalityError, FinalityResult};
