//! Conflux: GHOST pivot chain plus a reference DAG ordered in epochs

use super::ghost::Ghost;
use super::template::pick_head;
use super::{Admission, BlockTemplate, ForkChoiceResult};
use crate::metrics;
use cs_01_block_tree::BlockTree;
use rand::Rng;
use shared_types::{Block, BlockId, BlockType};
use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use tracing::warn;

/// Default bound on the epoch traversal depth.
pub const DEFAULT_MAX_EPOCH_DEPTH: usize = 1000;

/// Blocks attributed to one pivot block, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Epoch {
    pub pivot: BlockId,
    pub blocks: Vec<BlockId>,
    /// The traversal hit the depth bound and stopped early.
    pub truncated: bool,
}

/// Conflux fork choice.
///
/// The pivot chain is plain GHOST. On top of it every new block references
/// all currently unlinked blocks (not yet a parent or reference of anyone)
/// except its own parent, so no block stays outside the DAG for long.
///
/// A pivot block's epoch is everything reachable from it over parent and
/// reference edges that is not already in an earlier epoch. The traversal
/// is breadth-first from the pivot and bounded by `max_epoch_depth`;
/// hitting the bound truncates the epoch, which is logged and counted once
/// per pivot however often the epoch is rebuilt.
#[derive(Debug, Clone)]
pub struct Conflux {
    ghost: Ghost,
    /// Unlinked tips, oldest first.
    unlinked: Vec<BlockId>,
    max_epoch_depth: usize,
    /// Pivots whose epoch has already been reported as truncated.
    truncated_pivots: RefCell<HashSet<BlockId>>,
}

impl Default for Conflux {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EPOCH_DEPTH)
    }
}

impl Conflux {
    pub fn new(max_epoch_depth: usize) -> Self {
        Self {
            ghost: Ghost::new(),
            unlinked: vec![BlockId::GENESIS],
            max_epoch_depth,
            truncated_pivots: RefCell::new(HashSet::new()),
        }
    }

    pub fn tree(&self) -> &BlockTree {
        self.ghost.tree()
    }

    pub(crate) fn tree_mut(&mut self) -> &mut BlockTree {
        self.ghost.tree_mut()
    }

    pub fn unlinked(&self) -> &[BlockId] {
        &self.unlinked
    }

    /// Number of pivots whose epoch was cut short by the depth bound.
    pub fn epoch_truncations(&self) -> u64 {
        self.truncated_pivots.borrow().len() as u64
    }

    /// Heads of the GHOST pivot chain.
    pub fn fork_choice_rule(&self) -> Vec<BlockId> {
        self.ghost.fork_choice_rule()
    }

    /// One ordered sequence per pivot head: the epochs of its pivot chain,
    /// concatenated.
    pub fn main_chains(&self) -> Vec<Vec<BlockId>> {
        self.fork_choice_rule()
            .iter()
            .map(|head| self.epochs(head).into_iter().flat_map(|epoch| epoch.blocks).collect())
            .collect()
    }

    /// Epochs along the pivot chain ending at `head`, genesis first.
    pub fn epochs(&self, head: &BlockId) -> Vec<Epoch> {
        let Some(pivots) = self.tree().path_to_root(head) else {
            return Vec::new();
        };
        let mut claimed = HashSet::new();
        pivots
            .into_iter()
            .map(|pivot| {
                let epoch = self.epoch(pivot, &claimed);
                claimed.extend(epoch.blocks.iter().copied());
                epoch
            })
            .collect()
    }

    pub fn add_block<R: Rng + ?Sized>(&mut self, template: BlockTemplate, rng: &mut R) -> ForkChoiceResult<Block> {
        let parent = pick_head(&self.fork_choice_rule(), rng)?;
        let references = self
            .unlinked
            .iter()
            .copied()
            .filter(|id| *id != parent)
            .collect();
        let block = template
            .into_block(None, BlockType::Tree)
            .with_references(references);
        let inserted = self.ghost.extend(parent, block)?;
        self.link(&inserted);
        Ok(inserted)
    }

    /// Accept a received block once its parent and every reference are known.
    pub fn insert_block(&mut self, block: Block) -> ForkChoiceResult<Admission> {
        if !block.reference_ids.iter().all(|r| self.tree().contains(r)) {
            return Ok(Admission::Orphan(block));
        }
        let linked = block.clone();
        let admission = self.ghost.insert_block(block)?;
        if admission.is_inserted() {
            self.link(&linked);
        }
        Ok(admission)
    }

    fn link(&mut self, block: &Block) {
        let covered: HashSet<BlockId> = block.dependencies().collect();
        self.unlinked.retain(|id| !covered.contains(id));
        self.unlinked.push(block.id);
    }

    /// Collect the epoch of `pivot`, skipping anything in `claimed`.
    fn epoch(&self, pivot: BlockId, claimed: &HashSet<BlockId>) -> Epoch {
        let tree = self.tree();
        let mut members = HashSet::from([pivot]);
        let mut frontier = VecDeque::from([(pivot, 0usize)]);
        let mut truncated = false;

        // breadth-first, so a block's recorded depth is its shortest distance
        while let Some((id, depth)) = frontier.pop_front() {
            let Some(block) = tree.lookup(&id) else {
                continue;
            };
            for dep in block.dependencies() {
                if claimed.contains(&dep) || members.contains(&dep) {
                    continue;
                }
                if depth >= self.max_epoch_depth {
                    truncated = true;
                    continue;
                }
                members.insert(dep);
                frontier.push_back((dep, depth + 1));
            }
        }

        if truncated && self.truncated_pivots.borrow_mut().insert(pivot) {
            warn!(
                pivot = %pivot,
                max_depth = self.max_epoch_depth,
                collected = members.len(),
                "Epoch traversal hit depth bound, truncating"
            );
            metrics::record_epoch_truncation();
        }

        Epoch {
            pivot,
            blocks: self.order(members),
            truncated,
        }
    }

    /// Emit members so that each comes after its parent and references.
    /// Dependencies outside the set count as already emitted.
    fn order(&self, members: HashSet<BlockId>) -> Vec<BlockId> {
        let tree = self.tree();
        let mut pending: Vec<BlockId> = members.iter().copied().collect();
        pending.sort_by_key(|id| tree.position(id));

        let mut emitted = Vec::with_capacity(pending.len());
        let mut done = HashSet::new();
        while !pending.is_empty() {
            let before = pending.len();
            pending.retain(|id| {
                let ready = tree.lookup(id).map_or(true, |block| {
                    block
                        .dependencies()
                        .all(|dep| !members.contains(&dep) || done.contains(&dep))
                });
                if ready {
                    done.insert(*id);
                    emitted.push(*id);
                }
                !ready
            });
            if pending.len() == before {
                // unreachable for a well-formed DAG; keep the order total anyway
                emitted.append(&mut pending);
            }
        }
        emitted
    }
}
