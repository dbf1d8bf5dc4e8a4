//! GHOST: heaviest-subtree fork choice

use super::longest_chain::LongestChain;
use super::template::pick_head;
use super::{Admission, BlockTemplate, ForkChoiceResult};
use cs_01_block_tree::BlockTree;
use rand::Rng;
use shared_types::{Block, BlockId, BlockType};
use std::collections::HashMap;

/// Greedy Heaviest-Observed Sub-Tree.
///
/// Starting at genesis, repeatedly descend into the child whose subtree
/// holds the most descendants. Every child tied at the maximum is followed,
/// so a tie anywhere on the path produces several heads.
#[derive(Debug, Clone, Default)]
pub struct Ghost {
    chain: LongestChain,
    /// Descendant count per block, excluding the block itself.
    subtree_size: HashMap<BlockId, u64>,
}

impl Ghost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self) -> &BlockTree {
        self.chain.tree()
    }

    pub(crate) fn tree_mut(&mut self) -> &mut BlockTree {
        self.chain.tree_mut()
    }

    pub fn subtree_size(&self, id: &BlockId) -> u64 {
        self.subtree_size.get(id).copied().unwrap_or(0)
    }

    pub fn fork_choice_rule(&self) -> Vec<BlockId> {
        let tree = self.tree();
        let mut heads = Vec::new();
        let mut stack = vec![BlockId::GENESIS];
        while let Some(current) = stack.pop() {
            let children = tree.children_of(&current);
            let Some(heaviest) = children.iter().map(|c| self.subtree_size(c)).max() else {
                heads.push(current);
                continue;
            };
            // reversed so the first-seen child is explored first
            stack.extend(
                children
                    .into_iter()
                    .filter(|c| self.subtree_size(c) == heaviest)
                    .rev(),
            );
        }
        heads
    }

    pub fn main_chains(&self) -> Vec<Vec<BlockId>> {
        self.fork_choice_rule()
            .iter()
            .filter_map(|head| self.tree().path_to_root(head))
            .collect()
    }

    pub fn add_block<R: Rng + ?Sized>(&mut self, template: BlockTemplate, rng: &mut R) -> ForkChoiceResult<Block> {
        let parent = pick_head(&self.fork_choice_rule(), rng)?;
        self.extend(parent, template.into_block(None, BlockType::Tree))
    }

    pub(crate) fn extend(&mut self, parent: BlockId, block: Block) -> ForkChoiceResult<Block> {
        let inserted = self.chain.extend(parent, block)?;
        self.record_descendant(&inserted.id);
        Ok(inserted)
    }

    pub fn insert_block(&mut self, block: Block) -> ForkChoiceResult<Admission> {
        let id = block.id;
        let admission = self.chain.insert_block(block)?;
        if admission.is_inserted() {
            self.record_descendant(&id);
        }
        Ok(admission)
    }

    fn record_descendant(&mut self, id: &BlockId) {
        for ancestor in self.chain.tree().ancestors(id) {
            *self.subtree_size.entry(ancestor).or_insert(0) += 1;
        }
    }
}
