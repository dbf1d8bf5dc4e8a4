//! # cs-02-fork-choice
//!
//! Fork-choice rules over a [`cs_01_block_tree::BlockTree`].
//!
//! ## Algorithms
//!
//! | Variant | Heads | Main chain |
//! |---------|-------|------------|
//! | [`LongestChain`] | all blocks at max depth | path genesis -> head |
//! | [`Ghost`] | descend into heaviest subtree, ties branch | path genesis -> head |
//! | [`Prism`] | proposer tree heads | voted leader sequence |
//! | [`Conflux`] | GHOST pivot heads | concatenated epochs |
//! | [`PooledLongestChain`] | longest chain heads | path with pool blocks spliced |
//!
//! BitcoinNG runs on [`LongestChain`]; only the proposal schedule differs.
//!
//! ## Tie policy
//!
//! "More votes" and "bigger subtree" compare strictly, so exact ties
//! produce several heads. Callers that need one head pick it themselves;
//! [`ForkChoiceAlgorithm::add_block`] picks uniformly with the caller's RNG.
//!
//! ## Usage
//!
//! ```rust
//! use cs_02_fork_choice::{BlockTemplate, ForkChoiceAlgorithm, ForkChoiceKind, ForkChoiceParams};
//! use rand::SeedableRng;
//! use shared_types::{BlockId, ProposalType};
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let mut algo = ForkChoiceAlgorithm::new(ForkChoiceKind::Ghost, &ForkChoiceParams::default());
//! let block = algo
//!     .add_block(BlockTemplate::new(BlockId::from_u128(1), ProposalType::Tree, 0.5), &mut rng)
//!     .unwrap();
//!
//! assert_eq!(algo.fork_choice_rule(), vec![block.id]);
//! assert_eq!(algo.common_prefix(), vec![BlockId::GENESIS, block.id]);
//! ```

pub mod domain;
pub mod metrics;

pub use domain::*;
