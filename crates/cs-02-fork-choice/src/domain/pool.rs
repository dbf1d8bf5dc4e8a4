//! Longest chain whose tree blocks absorb a side pool of content blocks

use super::longest_chain::LongestChain;
use super::template::pick_head;
use super::{Admission, BlockTemplate, ForkChoiceResult};
use cs_01_block_tree::BlockTree;
use rand::Rng;
use shared_types::{Block, BlockId, BlockType, ProposalType, SimTime};
use std::collections::HashMap;

/// Longest-Chain-with-pool.
///
/// Pool blocks carry transactions but live outside the tree. Each tree
/// block references every pool block still pending at proposal time and
/// the main chain splices those references, in insertion order, right
/// before the tree block that consumed them.
#[derive(Debug, Clone, Default)]
pub struct PooledLongestChain {
    chain: LongestChain,
    pool: Vec<Block>,
    pool_index: HashMap<BlockId, usize>,
    /// Pool blocks not yet referenced by any tree block.
    pending: Vec<BlockId>,
}

impl PooledLongestChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self) -> &BlockTree {
        self.chain.tree()
    }

    pub fn pool_blocks(&self) -> &[Block] {
        &self.pool
    }

    pub fn pending(&self) -> &[BlockId] {
        &self.pending
    }

    pub fn pending_blocks(&self) -> impl Iterator<Item = &Block> {
        self.pending.iter().filter_map(|id| self.lookup_pool(id))
    }

    pub fn fork_choice_rule(&self) -> Vec<BlockId> {
        self.chain.fork_choice_rule()
    }

    pub fn main_chains(&self) -> Vec<Vec<BlockId>> {
        self.chain
            .main_chains()
            .into_iter()
            .map(|path| self.splice(path))
            .collect()
    }

    pub fn add_block<R: Rng + ?Sized>(&mut self, template: BlockTemplate, rng: &mut R) -> ForkChoiceResult<Block> {
        if template.kind == ProposalType::Pool {
            let block = template.into_block(None, BlockType::Pool);
            self.admit_pool_block(block.clone());
            return Ok(block);
        }
        let parent = pick_head(&self.fork_choice_rule(), rng)?;
        let references = std::mem::take(&mut self.pending);
        let block = template
            .into_block(None, BlockType::Tree)
            .with_references(references);
        self.chain.extend(parent, block)
    }

    pub fn insert_block(&mut self, block: Block) -> ForkChoiceResult<Admission> {
        if block.block_type == BlockType::Pool {
            return Ok(if self.admit_pool_block(block) {
                Admission::Inserted
            } else {
                Admission::Duplicate
            });
        }
        if !block.reference_ids.iter().all(|r| self.pool_index.contains_key(r)) {
            return Ok(Admission::Orphan(block));
        }
        let references = block.reference_ids.clone();
        let admission = self.chain.insert_block(block)?;
        if admission.is_inserted() {
            self.pending.retain(|id| !references.contains(id));
        }
        Ok(admission)
    }

    pub fn lookup(&self, id: &BlockId) -> Option<&Block> {
        self.chain.tree().lookup(id).or_else(|| self.lookup_pool(id))
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.lookup(id).is_some()
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.chain
            .tree()
            .iter()
            .filter(|b| !b.is_genesis())
            .chain(self.pool.iter())
    }

    pub fn mark_finalized(&mut self, id: &BlockId, timestamp: SimTime) -> ForkChoiceResult<bool> {
        if let Some(&idx) = self.pool_index.get(id) {
            return Ok(self.pool[idx].mark_finalized(timestamp));
        }
        Ok(self.chain.tree_mut().mark_finalized(id, timestamp)?)
    }

    fn lookup_pool(&self, id: &BlockId) -> Option<&Block> {
        self.pool_index.get(id).map(|&idx| &self.pool[idx])
    }

    fn admit_pool_block(&mut self, block: Block) -> bool {
        if self.pool_index.contains_key(&block.id) {
            return false;
        }
        self.pool_index.insert(block.id, self.pool.len());
        self.pending.push(block.id);
        self.pool.push(block);
        true
    }

    fn splice(&self, path: Vec<BlockId>) -> Vec<BlockId> {
        let mut sequence = Vec::with_capacity(path.len());
        for id in path {
            if let Some(block) = self.chain.tree().lookup(&id) {
                sequence.extend(block.reference_ids.iter().copied());
            }
            sequence.push(id);
        }
        sequence
    }
}
