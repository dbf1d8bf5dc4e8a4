//! Block tree arena
//!
//! Blocks are stored in insertion order; the position of a block in the arena
//! is its node index. All adjacency is expressed in node indices so that
//! walks never hash.

use super::{TreeError, TreeResult};
use shared_types::{Block, BlockId, SimTime};
use std::collections::HashMap;
use tracing::trace;

/// Outcome of linking a block by its declared parent.
#[derive(Debug, Clone, PartialEq)]
pub enum Linkage {
    /// Linked under `parent` at `depth`.
    Inserted { parent: BlockId, depth: u64 },
    /// Parent not yet known. Nothing was mutated; the block is handed back
    /// so the caller can buffer it and retry.
    Orphan(Block),
}

impl Linkage {
    /// The parent the block was linked under, `None` for an orphan.
    pub fn parent(&self) -> Option<BlockId> {
        match self {
            Linkage::Inserted { parent, .. } => Some(*parent),
            Linkage::Orphan(_) => None,
        }
    }

    pub fn is_orphan(&self) -> bool {
        matches!(self, Linkage::Orphan(_))
    }
}

/// Arena of blocks rooted at genesis.
#[derive(Debug, Clone)]
pub struct BlockTree {
    /// node-index -> block
    blocks: Vec<Block>,
    /// id -> node-index
    index: HashMap<BlockId, usize>,
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    /// node-index -> depth
    depths: Vec<u64>,
    /// depth -> node-indices in insertion order
    by_depth: Vec<Vec<usize>>,
}

impl BlockTree {
    /// Create a tree holding only the genesis block.
    pub fn new() -> Self {
        let mut index = HashMap::new();
        index.insert(BlockId::GENESIS, 0);
        Self {
            blocks: vec![Block::genesis()],
            index,
            parents: vec![None],
            children: vec![Vec::new()],
            depths: vec![0],
            by_depth: vec![vec![0]],
        }
    }

    /// Link `new_block` under `parent_id`, which the caller has already
    /// resolved (typically through a fork-choice rule).
    ///
    /// Overwrites `new_block.parent_id` and `new_block.depth`. Returns the
    /// parent block.
    pub fn insert_by_parent(&mut self, parent_id: BlockId, mut new_block: Block) -> TreeResult<&Block> {
        let parent_idx = *self
            .index
            .get(&parent_id)
            .ok_or(TreeError::UnknownParent(parent_id))?;
        if self.index.contains_key(&new_block.id) {
            return Err(TreeError::DuplicateBlock(new_block.id));
        }

        let depth = self.depths[parent_idx] + 1;
        new_block.parent_id = Some(parent_id);
        new_block.depth = depth;

        let idx = self.blocks.len();
        trace!(block = %new_block.id, parent = %parent_id, depth, "Linking block");
        self.index.insert(new_block.id, idx);
        self.blocks.push(new_block);
        self.parents.push(Some(parent_idx));
        self.children.push(Vec::new());
        self.children[parent_idx].push(idx);
        self.depths.push(depth);
        if self.by_depth.len() <= depth as usize {
            self.by_depth.resize_with(depth as usize + 1, Vec::new);
        }
        self.by_depth[depth as usize].push(idx);

        Ok(&self.blocks[parent_idx])
    }

    /// Link `new_block` under the parent named by `new_block.parent_id`.
    ///
    /// If the parent is not present the tree is left untouched and the block
    /// comes back as [`Linkage::Orphan`].
    pub fn insert_by_parent_id(&mut self, new_block: Block) -> TreeResult<Linkage> {
        let parent_id = new_block
            .parent_id
            .ok_or(TreeError::MissingParent(new_block.id))?;
        if !self.index.contains_key(&parent_id) {
            return Ok(Linkage::Orphan(new_block));
        }
        let parent = self.insert_by_parent(parent_id, new_block)?;
        Ok(Linkage::Inserted {
            parent: parent.id,
            depth: parent.depth + 1,
        })
    }

    pub fn lookup(&self, id: &BlockId) -> Option<&Block> {
        self.index.get(id).map(|&idx| &self.blocks[idx])
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.index.contains_key(id)
    }

    pub fn depth_of(&self, id: &BlockId) -> Option<u64> {
        self.index.get(id).map(|&idx| self.depths[idx])
    }

    /// Insertion position of a block; genesis is 0.
    pub fn position(&self, id: &BlockId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn parent_of(&self, id: &BlockId) -> Option<BlockId> {
        let idx = *self.index.get(id)?;
        self.parents[idx].map(|p| self.blocks[p].id)
    }

    /// Children in insertion order.
    pub fn children_of(&self, id: &BlockId) -> Vec<BlockId> {
        self.index
            .get(id)
            .map(|&idx| self.children[idx].iter().map(|&c| self.blocks[c].id).collect())
            .unwrap_or_default()
    }

    pub fn has_children(&self, id: &BlockId) -> bool {
        self.index
            .get(id)
            .map(|&idx| !self.children[idx].is_empty())
            .unwrap_or(false)
    }

    /// Ids of all blocks without children, in insertion order.
    pub fn leaves(&self) -> Vec<BlockId> {
        self.children
            .iter()
            .enumerate()
            .filter(|(_, kids)| kids.is_empty())
            .map(|(idx, _)| self.blocks[idx].id)
            .collect()
    }

    /// Ordered path genesis -> `id`, `None` for an unknown id.
    pub fn path_to_root(&self, id: &BlockId) -> Option<Vec<BlockId>> {
        let mut idx = *self.index.get(id)?;
        let mut path = Vec::with_capacity(self.depths[idx] as usize + 1);
        loop {
            path.push(self.blocks[idx].id);
            match self.parents[idx] {
                Some(parent) => idx = parent,
                None => break,
            }
        }
        path.reverse();
        Some(path)
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: &BlockId) -> Vec<BlockId> {
        let Some(&start) = self.index.get(id) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(self.depths[start] as usize);
        let mut cursor = self.parents[start];
        while let Some(idx) = cursor {
            out.push(self.blocks[idx].id);
            cursor = self.parents[idx];
        }
        out
    }

    pub fn max_depth(&self) -> u64 {
        (self.by_depth.len() - 1) as u64
    }

    /// Blocks at `depth`, in insertion order (first-seen first).
    pub fn blocks_at_depth(&self, depth: u64) -> Vec<BlockId> {
        self.by_depth
            .get(depth as usize)
            .map(|level| level.iter().map(|&idx| self.blocks[idx].id).collect())
            .unwrap_or_default()
    }

    /// All blocks at the maximum depth.
    pub fn deepest(&self) -> Vec<BlockId> {
        self.blocks_at_depth(self.max_depth())
    }

    /// Set the finalization timestamp once. Returns whether it was newly set.
    pub fn mark_finalized(&mut self, id: &BlockId, timestamp: SimTime) -> TreeResult<bool> {
        let idx = *self.index.get(id).ok_or(TreeError::UnknownBlock(*id))?;
        Ok(self.blocks[idx].mark_finalized(timestamp))
    }

    /// Blocks in insertion order, genesis first.
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// A tree always holds genesis.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for BlockTree {
    fn default() -> Self {
        Self::new()
    }
}
