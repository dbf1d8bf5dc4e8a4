//! # Orphan Pool
//!
//! Buffers blocks whose causal dependencies have not arrived yet.
//!
//! Blocks may reach a node in any order because each network edge applies
//! its own delay. An orphan is held here until a retry pass manages to link
//! it. Retrying is a fixpoint: every pass walks the whole pool and the loop
//! stops once a pass links nothing, since a linked block can unblock orphans
//! that were already skipped earlier in the same pass.

use super::{BlockTree, Linkage};
use crate::metrics;
use shared_types::{Block, BlockId};
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Result of one attempt to link an orphan.
#[derive(Debug)]
pub enum Resolution {
    /// The block is now part of the tree.
    Linked,
    /// Dependencies still missing; keep buffering.
    Pending(Block),
    /// The block can never be linked (e.g. duplicate) and is dropped.
    Discarded,
}

/// FIFO buffer of orphan blocks, deduplicated by id.
#[derive(Debug, Default, Clone)]
pub struct OrphanPool {
    orphans: VecDeque<Block>,
    ids: HashSet<BlockId>,
}

impl OrphanPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer an orphan. Returns `false` if a block with the same id is
    /// already buffered.
    pub fn push(&mut self, block: Block) -> bool {
        if !self.ids.insert(block.id) {
            return false;
        }
        debug!(block = %block.id, pending = self.orphans.len() + 1, "Buffering orphan");
        metrics::record_orphan_buffered();
        self.orphans.push_back(block);
        true
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.ids.contains(id)
    }

    /// Buffered ids in arrival order.
    pub fn ids(&self) -> Vec<BlockId> {
        self.orphans.iter().map(|b| b.id).collect()
    }

    pub fn len(&self) -> usize {
        self.orphans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orphans.is_empty()
    }

    /// Retry every orphan through `try_link` until a full pass links
    /// nothing. Returns the linked ids in link order.
    pub fn resolve<F>(&mut self, mut try_link: F) -> Vec<BlockId>
    where
        F: FnMut(Block) -> Resolution,
    {
        let mut linked = Vec::new();
        let mut progress = true;
        while progress && !self.orphans.is_empty() {
            progress = false;
            for _ in 0..self.orphans.len() {
                let Some(block) = self.orphans.pop_front() else {
                    break;
                };
                let id = block.id;
                match try_link(block) {
                    Resolution::Linked => {
                        self.ids.remove(&id);
                        linked.push(id);
                        progress = true;
                    }
                    Resolution::Pending(block) => self.orphans.push_back(block),
                    Resolution::Discarded => {
                        self.ids.remove(&id);
                        progress = true;
                    }
                }
            }
        }
        if !linked.is_empty() {
            debug!(linked = linked.len(), remaining = self.orphans.len(), "Resolved orphans");
            metrics::record_orphans_resolved(linked.len() as u64);
        }
        linked
    }

    /// Fixpoint resolution directly against a plain tree.
    pub fn resolve_into(&mut self, tree: &mut BlockTree) -> Vec<BlockId> {
        self.resolve(|block| match tree.insert_by_parent_id(block) {
            Ok(Linkage::Inserted { .. }) => Resolution::Linked,
            Ok(Linkage::Orphan(block)) => Resolution::Pending(block),
            Err(_) => Resolution::Discarded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::BlockType;

    fn id(n: u128) -> BlockId {
        BlockId::from_u128(n)
    }

    fn block(n: u128, parent: BlockId) -> Block {
        Block::new(id(n), Some(parent), BlockType::Tree, n as f64)
    }

    #[test]
    fn test_push_deduplicates() {
        let mut pool = OrphanPool::new();
        assert!(pool.push(block(2, id(1))));
        assert!(!pool.push(block(2, id(1))));
        assert_eq!(pool.len(), 1);
        assert!(pool.contains(&id(2)));
    }

    #[test]
    fn test_chain_resolves_in_reverse_arrival() {
        // c, b arrive before a: a single pass with a present links b then c
        let mut tree = BlockTree::new();
        let mut pool = OrphanPool::new();
        pool.push(block(3, id(2)));
        pool.push(block(2, id(1)));

        assert!(pool.resolve_into(&mut tree).is_empty());
        assert_eq!(pool.len(), 2);

        tree.insert_by_parent_id(block(1, BlockId::GENESIS)).unwrap();
        let linked = pool.resolve_into(&mut tree);
        assert_eq!(linked, vec![id(2), id(3)]);
        assert!(pool.is_empty());
        assert_eq!(tree.depth_of(&id(3)), Some(3));
    }

    #[test]
    fn test_unresolvable_orphans_remain() {
        let mut tree = BlockTree::new();
        let mut pool = OrphanPool::new();
        pool.push(block(5, id(4)));
        pool.push(block(6, BlockId::GENESIS));

        let linked = pool.resolve_into(&mut tree);
        assert_eq!(linked, vec![id(6)]);
        assert_eq!(pool.ids(), vec![id(5)]);
    }

    #[test]
    fn test_discarded_blocks_leave_pool() {
        let mut tree = BlockTree::new();
        tree.insert_by_parent_id(block(1, BlockId::GENESIS)).unwrap();
        let mut pool = OrphanPool::new();
        pool.push(block(1, BlockId::GENESIS));

        assert!(pool.resolve_into(&mut tree).is_empty());
        assert!(pool.is_empty());
        assert!(!pool.contains(&id(1)));
    }
}
