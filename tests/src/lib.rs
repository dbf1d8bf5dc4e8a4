//! # Fork-Choice Simulator Test Suite
//!
//! Unified test crate for behaviour that spans more than one crate.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── properties.rs       # Tree, fork-choice and finality properties
//! │   ├── orphan_ordering.rs  # Out-of-order delivery converges
//! │   └── end_to_end.rs       # Full runs: determinism, every protocol
//! └── benches/
//!     └── fork_choice_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p cs-tests
//!
//! # By category
//! cargo test -p cs-tests integration::properties
//! cargo test -p cs-tests integration::end_to_end
//!
//! # Benchmarks
//! cargo bench -p cs-tests
//! ```

pub mod integration;
