//! Longest-Chain (Nakamoto) fork choice, also used for BitcoinNG

use super::template::pick_head;
use super::{Admission, BlockTemplate, ForkChoiceResult};
use cs_01_block_tree::{BlockTree, Linkage, TreeError};
use rand::Rng;
use shared_types::{Block, BlockId, BlockType, ProposalType};

/// Heads are all blocks at the maximum depth, in first-seen order.
///
/// BitcoinNG runs on this rule unchanged: key and micro blocks both extend
/// the deepest chain, leader continuity is handled by the proposer schedule.
#[derive(Debug, Clone, Default)]
pub struct LongestChain {
    tree: BlockTree,
}

impl LongestChain {
    pub fn new() -> Self {
        Self {
            tree: BlockTree::new(),
        }
    }

    pub fn tree(&self) -> &BlockTree {
        &self.tree
    }

    pub(crate) fn tree_mut(&mut self) -> &mut BlockTree {
        &mut self.tree
    }

    pub fn fork_choice_rule(&self) -> Vec<BlockId> {
        self.tree.deepest()
    }

    /// One path genesis -> head per head.
    pub fn main_chains(&self) -> Vec<Vec<BlockId>> {
        self.fork_choice_rule()
            .iter()
            .filter_map(|head| self.tree.path_to_root(head))
            .collect()
    }

    /// Key blocks only elect a leader and carry no transactions.
    pub fn add_block<R: Rng + ?Sized>(&mut self, mut template: BlockTemplate, rng: &mut R) -> ForkChoiceResult<Block> {
        if template.kind == ProposalType::Key {
            template.transactions.clear();
        }
        let block_type = match template.kind {
            ProposalType::Key => BlockType::Key,
            ProposalType::Micro => BlockType::Micro,
            ProposalType::Tree | ProposalType::Pool => BlockType::Tree,
        };
        let parent = pick_head(&self.fork_choice_rule(), rng)?;
        self.extend(parent, template.into_block(None, block_type))
    }

    /// Link `block` under an already chosen parent and hand back the stored copy.
    pub(crate) fn extend(&mut self, parent: BlockId, block: Block) -> ForkChoiceResult<Block> {
        let id = block.id;
        self.tree.insert_by_parent(parent, block)?;
        self.tree
            .lookup(&id)
            .cloned()
            .ok_or_else(|| TreeError::UnknownBlock(id).into())
    }

    pub fn insert_block(&mut self, block: Block) -> ForkChoiceResult<Admission> {
        if self.tree.contains(&block.id) {
            return Ok(Admission::Duplicate);
        }
        Ok(match self.tree.insert_by_parent_id(block)? {
            Linkage::Inserted { .. } => Admission::Inserted,
            Linkage::Orphan(block) => Admission::Orphan(block),
        })
    }
}
