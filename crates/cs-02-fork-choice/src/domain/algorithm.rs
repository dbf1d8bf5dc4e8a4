//! Closed set of fork-choice algorithms behind one interface

use super::conflux::{Conflux, DEFAULT_MAX_EPOCH_DEPTH};
use super::ghost::Ghost;
use super::longest_chain::LongestChain;
use super::pool::PooledLongestChain;
use super::prefix::common_prefix;
use super::prism::{Prism, DEFAULT_VOTER_CHAINS};
use super::{Admission, BlockTemplate, ForkChoiceError, ForkChoiceResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use shared_types::{Block, BlockId, ProposalType, SimTime, TxId};
use std::collections::HashSet;
use std::fmt;

/// Protocol selector as spelled in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForkChoiceKind {
    #[serde(rename = "longest-chain")]
    LongestChain,
    #[serde(rename = "GHOST")]
    Ghost,
    Prism,
    Conflux,
    #[serde(rename = "BitcoinNG")]
    BitcoinNg,
    #[serde(rename = "longest-chain-with-pool")]
    LongestChainWithPool,
}

impl ForkChoiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForkChoiceKind::LongestChain => "longest-chain",
            ForkChoiceKind::Ghost => "GHOST",
            ForkChoiceKind::Prism => "Prism",
            ForkChoiceKind::Conflux => "Conflux",
            ForkChoiceKind::BitcoinNg => "BitcoinNG",
            ForkChoiceKind::LongestChainWithPool => "longest-chain-with-pool",
        }
    }

    /// Proposal type scheduled at the primary proposal rate.
    pub fn primary_proposal(&self) -> ProposalType {
        match self {
            ForkChoiceKind::BitcoinNg => ProposalType::Key,
            _ => ProposalType::Tree,
        }
    }

    /// Proposal type scheduled at the secondary rate, if the protocol has one.
    pub fn secondary_proposal(&self) -> Option<ProposalType> {
        match self {
            ForkChoiceKind::BitcoinNg => Some(ProposalType::Micro),
            ForkChoiceKind::LongestChainWithPool => Some(ProposalType::Pool),
            _ => None,
        }
    }
}

impl fmt::Display for ForkChoiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Protocol-specific knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForkChoiceParams {
    /// Prism voter chains (K).
    pub voter_chains: usize,
    /// Conflux epoch traversal bound.
    pub max_epoch_depth: usize,
}

impl Default for ForkChoiceParams {
    fn default() -> Self {
        Self {
            voter_chains: DEFAULT_VOTER_CHAINS,
            max_epoch_depth: DEFAULT_MAX_EPOCH_DEPTH,
        }
    }
}

/// A fork-choice algorithm together with the tree(s) it selects over.
#[derive(Debug, Clone)]
pub enum ForkChoiceAlgorithm {
    /// Longest-Chain and BitcoinNG.
    LongestChain(LongestChain),
    Ghost(Ghost),
    Prism(Prism),
    Conflux(Conflux),
    Pooled(PooledLongestChain),
}

impl ForkChoiceAlgorithm {
    pub fn new(kind: ForkChoiceKind, params: &ForkChoiceParams) -> Self {
        match kind {
            ForkChoiceKind::LongestChain | ForkChoiceKind::BitcoinNg => Self::LongestChain(LongestChain::new()),
            ForkChoiceKind::Ghost => Self::Ghost(Ghost::new()),
            ForkChoiceKind::Prism => Self::Prism(Prism::new(params.voter_chains)),
            ForkChoiceKind::Conflux => Self::Conflux(Conflux::new(params.max_epoch_depth)),
            ForkChoiceKind::LongestChainWithPool => Self::Pooled(PooledLongestChain::new()),
        }
    }

    /// Current head(s). Never empty: a genesis-only tree yields `[genesis]`.
    pub fn fork_choice_rule(&self) -> Vec<BlockId> {
        match self {
            Self::LongestChain(a) => a.fork_choice_rule(),
            Self::Ghost(a) => a.fork_choice_rule(),
            Self::Prism(a) => a.fork_choice_rule(),
            Self::Conflux(a) => a.fork_choice_rule(),
            Self::Pooled(a) => a.fork_choice_rule(),
        }
    }

    /// Ordered block sequences, one per competing head. Each starts at genesis.
    pub fn main_chains(&self) -> Vec<Vec<BlockId>> {
        match self {
            Self::LongestChain(a) => a.main_chains(),
            Self::Ghost(a) => a.main_chains(),
            Self::Prism(a) => a.main_chains(),
            Self::Conflux(a) => a.main_chains(),
            Self::Pooled(a) => a.main_chains(),
        }
    }

    pub fn common_prefix(&self) -> Vec<BlockId> {
        common_prefix(&self.main_chains())
    }

    /// Build a block from `template`, choose its parent and link it.
    pub fn add_block<R: Rng + ?Sized>(&mut self, template: BlockTemplate, rng: &mut R) -> ForkChoiceResult<Block> {
        match self {
            Self::LongestChain(a) => a.add_block(template, rng),
            Self::Ghost(a) => a.add_block(template, rng),
            Self::Prism(a) => a.add_block(template, rng),
            Self::Conflux(a) => a.add_block(template, rng),
            Self::Pooled(a) => a.add_block(template, rng),
        }
    }

    /// Offer a block built elsewhere. Blocks whose parent or references are
    /// missing come back as [`Admission::Orphan`].
    pub fn insert_block(&mut self, block: Block) -> ForkChoiceResult<Admission> {
        if self.contains(&block.id) {
            return Ok(Admission::Duplicate);
        }
        match self {
            Self::LongestChain(a) => a.insert_block(block),
            Self::Ghost(a) => a.insert_block(block),
            Self::Prism(a) => a.insert_block(block),
            Self::Conflux(a) => a.insert_block(block),
            Self::Pooled(a) => a.insert_block(block),
        }
    }

    pub fn lookup(&self, id: &BlockId) -> Option<&Block> {
        match self {
            Self::LongestChain(a) => a.tree().lookup(id),
            Self::Ghost(a) => a.tree().lookup(id),
            Self::Prism(a) => a.lookup(id),
            Self::Conflux(a) => a.tree().lookup(id),
            Self::Pooled(a) => a.lookup(id),
        }
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.lookup(id).is_some()
    }

    /// Depth on the chain finality is judged against. `None` for blocks
    /// outside it (Prism votes, pool blocks); those inherit the depth of
    /// the chain block they are spliced before.
    pub fn depth_of(&self, id: &BlockId) -> Option<u64> {
        match self {
            Self::LongestChain(a) => a.tree().depth_of(id),
            Self::Ghost(a) => a.tree().depth_of(id),
            Self::Prism(a) => a.proposer_tree().depth_of(id),
            Self::Conflux(a) => a.tree().depth_of(id),
            Self::Pooled(a) => a.tree().depth_of(id),
        }
    }

    /// Deepest head depth.
    pub fn head_depth(&self) -> u64 {
        self.fork_choice_rule()
            .iter()
            .filter_map(|head| self.depth_of(head))
            .max()
            .unwrap_or(0)
    }

    /// Every accepted block except genesis.
    pub fn blocks(&self) -> Box<dyn Iterator<Item = &Block> + '_> {
        match self {
            Self::LongestChain(a) => Box::new(a.tree().iter().filter(|b| !b.is_genesis())),
            Self::Ghost(a) => Box::new(a.tree().iter().filter(|b| !b.is_genesis())),
            Self::Prism(a) => Box::new(a.blocks()),
            Self::Conflux(a) => Box::new(a.tree().iter().filter(|b| !b.is_genesis())),
            Self::Pooled(a) => Box::new(a.blocks()),
        }
    }

    /// Stamp a block final. `Ok(false)` if it already was.
    pub fn mark_finalized(&mut self, id: &BlockId, timestamp: SimTime) -> ForkChoiceResult<bool> {
        let marked = match self {
            Self::LongestChain(a) => a.tree_mut().mark_finalized(id, timestamp)?,
            Self::Ghost(a) => a.tree_mut().mark_finalized(id, timestamp)?,
            Self::Prism(a) => return a.mark_finalized(id, timestamp),
            Self::Conflux(a) => a.tree_mut().mark_finalized(id, timestamp)?,
            Self::Pooled(a) => return a.mark_finalized(id, timestamp),
        };
        Ok(marked)
    }

    /// Transactions already carried by a main chain, plus those in pool
    /// blocks waiting to be referenced. A proposer must not include these.
    pub fn committed_transactions(&self) -> HashSet<TxId> {
        let mut committed: HashSet<TxId> = self
            .main_chains()
            .iter()
            .flatten()
            .filter_map(|id| self.lookup(id))
            .flat_map(|block| block.transactions.iter().copied())
            .collect();
        if let Self::Pooled(a) = self {
            committed.extend(a.pending_blocks().flat_map(|b| b.transactions.iter().copied()));
        }
        committed
    }

    /// Conflux epoch truncations so far; zero for other algorithms.
    pub fn epoch_truncations(&self) -> u64 {
        match self {
            Self::Conflux(a) => a.epoch_truncations(),
            _ => 0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::LongestChain(_) => "longest-chain",
            Self::Ghost(_) => "GHOST",
            Self::Prism(_) => "Prism",
            Self::Conflux(_) => "Conflux",
            Self::Pooled(_) => "longest-chain-with-pool",
        }
    }

    /// Look up a block or fail with [`ForkChoiceError::UnknownBlock`].
    pub fn require(&self, id: &BlockId) -> ForkChoiceResult<&Block> {
        self.lookup(id).ok_or(ForkChoiceError::UnknownBlock(*id))
    }
}
