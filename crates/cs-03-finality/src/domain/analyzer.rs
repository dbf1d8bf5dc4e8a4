//! Finality judgement for individual blocks

use super::depth::compute_finalization_depth;
use crate::error::FinalityResult;
use crate::metrics;
use rand::Rng;
use shared_types::Block;
use tracing::info;

/// Judges whether blocks are final, given a security parameter.
///
/// A block is final once it sits at least `k` below the current head and a
/// residual-error coin, drawn from the caller's RNG, lands below
/// `1 - epsilon`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalizationAnalyzer {
    epsilon: f64,
    depth: u64,
}

impl FinalizationAnalyzer {
    pub fn new(epsilon: f64, num_nodes: usize, num_adversaries: usize) -> FinalityResult<Self> {
        let depth = compute_finalization_depth(epsilon, num_nodes, num_adversaries)?;
        info!(epsilon, num_nodes, num_adversaries, depth, "Finalization depth computed");
        Ok(Self { epsilon, depth })
    }

    /// Analyzer with a fixed depth, skipping the search.
    pub fn with_depth(epsilon: f64, depth: u64) -> Self {
        Self { epsilon, depth }
    }

    /// Finalization depth `k`.
    pub fn depth(&self) -> u64 {
        self.depth
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// `head_depth - block_depth >= k`, with no randomness involved.
    pub fn is_deep_enough(&self, block_depth: u64, head_depth: u64) -> bool {
        head_depth
            .checked_sub(block_depth)
            .is_some_and(|buried| buried >= self.depth)
    }

    /// Depth check followed by the error coin. The coin is only drawn for
    /// blocks that are deep enough.
    pub fn is_finalized<R: Rng + ?Sized>(&self, block_depth: u64, head_depth: u64, rng: &mut R) -> bool {
        if !self.is_deep_enough(block_depth, head_depth) {
            return false;
        }
        let finalized = rng.gen::<f64>() < 1.0 - self.epsilon;
        if finalized {
            metrics::record_block_finalized();
        }
        finalized
    }

    pub fn is_block_finalized<R: Rng + ?Sized>(&self, block: &Block, head_depth: u64, rng: &mut R) -> bool {
        self.is_finalized(block.depth, head_depth, rng)
    }
}
