//! Prism: one proposer chain ordered by K voter chains

use super::longest_chain::LongestChain;
use super::template::pick_head;
use super::{Admission, BlockTemplate, ForkChoiceError, ForkChoiceResult};
use cs_01_block_tree::BlockTree;
use rand::Rng;
use shared_types::{Block, BlockId, BlockType, SimTime};
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Default number of voter chains.
pub const DEFAULT_VOTER_CHAINS: usize = 10;

/// Prism fork choice.
///
/// Every new block lands in a random lane: lane 0 is the proposer tree,
/// lane `i > 0` is voter chain `i - 1`. Voter chains are independent
/// longest chains whose blocks vote on proposer depths.
///
/// ## Voting
///
/// A voter block at depth `d` votes for every proposer depth in
/// `(last_voted(parent), d]` that exists, picking the first-seen proposer
/// block at each depth.
///
/// ## Leader sequence
///
/// Walking proposer depths from 1, the block with the most distinct votes
/// wins (first-seen on ties). Its voters are emitted right before it. The
/// walk stops at the first depth nobody has voted on.
#[derive(Debug, Clone)]
pub struct Prism {
    proposer: LongestChain,
    voters: Vec<LongestChain>,
    /// proposer block -> voter blocks referencing it, in arrival order
    votes: HashMap<BlockId, Vec<BlockId>>,
    /// voter block -> deepest proposer depth voted by it or its ancestors
    last_voted: HashMap<BlockId, u64>,
}

impl Default for Prism {
    fn default() -> Self {
        Self::new(DEFAULT_VOTER_CHAINS)
    }
}

impl Prism {
    pub fn new(voter_chains: usize) -> Self {
        Self {
            proposer: LongestChain::new(),
            voters: (0..voter_chains).map(|_| LongestChain::new()).collect(),
            votes: HashMap::new(),
            last_voted: HashMap::new(),
        }
    }

    pub fn voter_chains(&self) -> usize {
        self.voters.len()
    }

    pub fn proposer_tree(&self) -> &BlockTree {
        self.proposer.tree()
    }

    pub fn voter_tree(&self, chain: usize) -> Option<&BlockTree> {
        self.voters.get(chain).map(LongestChain::tree)
    }

    /// Distinct voter blocks referencing a proposer block.
    pub fn vote_count(&self, proposer_block: &BlockId) -> usize {
        self.votes.get(proposer_block).map_or(0, Vec::len)
    }

    pub fn voters_of(&self, proposer_block: &BlockId) -> &[BlockId] {
        self.votes.get(proposer_block).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Heads of the proposer tree.
    pub fn fork_choice_rule(&self) -> Vec<BlockId> {
        self.proposer.fork_choice_rule()
    }

    pub fn main_chains(&self) -> Vec<Vec<BlockId>> {
        vec![self.leader_sequence()]
    }

    /// Place a block in a uniformly drawn lane.
    pub fn add_block<R: Rng + ?Sized>(&mut self, template: BlockTemplate, rng: &mut R) -> ForkChoiceResult<Block> {
        let lane = rng.gen_range(0..=self.voters.len());
        self.add_block_to_lane(template, lane, rng)
    }

    /// Place a block in an explicit lane (0 = proposer, `i` = voter chain `i - 1`).
    ///
    /// Voter blocks carry votes only; any transactions in the template are
    /// dropped.
    pub fn add_block_to_lane<R: Rng + ?Sized>(
        &mut self,
        mut template: BlockTemplate,
        lane: usize,
        rng: &mut R,
    ) -> ForkChoiceResult<Block> {
        let Some(chain) = lane.checked_sub(1) else {
            let parent = pick_head(&self.proposer.fork_choice_rule(), rng)?;
            return self
                .proposer
                .extend(parent, template.into_block(None, BlockType::Proposer));
        };
        let voter = self.voters.get(chain).ok_or(ForkChoiceError::WrongLane {
            chain,
            chains: self.voters.len(),
        })?;

        template.transactions.clear();
        let parent = pick_head(&voter.fork_choice_rule(), rng)?;
        let depth = voter.tree().depth_of(&parent).unwrap_or(0) + 1;
        let ballot = self.ballot(self.last_voted_depth(&parent), depth);
        let block = template
            .into_block(None, BlockType::Voter { chain })
            .with_references(ballot);

        let inserted = self.voters[chain].extend(parent, block)?;
        self.record_votes(&inserted);
        Ok(inserted)
    }

    pub fn insert_block(&mut self, block: Block) -> ForkChoiceResult<Admission> {
        match block.block_type {
            BlockType::Proposer => self.proposer.insert_block(block),
            BlockType::Voter { chain } => {
                let chains = self.voters.len();
                if chain >= chains {
                    return Err(ForkChoiceError::WrongLane { chain, chains });
                }
                let tree = self.proposer.tree();
                if !block.reference_ids.iter().all(|r| tree.contains(r)) {
                    return Ok(Admission::Orphan(block));
                }
                let id = block.id;
                let admission = self.voters[chain].insert_block(block)?;
                if admission.is_inserted() {
                    if let Some(inserted) = self.voters[chain].tree().lookup(&id).cloned() {
                        self.record_votes(&inserted);
                    }
                }
                Ok(admission)
            }
            block_type => Err(ForkChoiceError::UnexpectedBlockType {
                block: block.id,
                block_type,
                protocol: "Prism",
            }),
        }
    }

    pub fn lookup(&self, id: &BlockId) -> Option<&Block> {
        self.trees().find_map(|tree| tree.lookup(id))
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.trees().flat_map(|tree| tree.iter().filter(|b| !b.is_genesis()))
    }

    pub fn mark_finalized(&mut self, id: &BlockId, timestamp: SimTime) -> ForkChoiceResult<bool> {
        if self.proposer.tree().contains(id) {
            return Ok(self.proposer.tree_mut().mark_finalized(id, timestamp)?);
        }
        for voter in &mut self.voters {
            if voter.tree().contains(id) {
                return Ok(voter.tree_mut().mark_finalized(id, timestamp)?);
            }
        }
        Err(ForkChoiceError::UnknownBlock(*id))
    }

    /// Genesis, then per proposer depth the voters of the winning block
    /// followed by the winner.
    fn leader_sequence(&self) -> Vec<BlockId> {
        let tree = self.proposer.tree();
        let mut sequence = vec![BlockId::GENESIS];
        let mut emitted = HashSet::new();

        for depth in 1..=tree.max_depth() {
            let mut leader: Option<(BlockId, usize)> = None;
            for candidate in tree.blocks_at_depth(depth) {
                let count = self.vote_count(&candidate);
                if count > leader.map_or(0, |(_, best)| best) {
                    leader = Some((candidate, count));
                }
            }
            let Some((winner, _)) = leader else {
                break;
            };
            sequence.extend(
                self.voters_of(&winner)
                    .iter()
                    .filter(|voter| emitted.insert(**voter))
                    .copied(),
            );
            sequence.push(winner);
        }
        sequence
    }

    fn trees(&self) -> impl Iterator<Item = &BlockTree> {
        std::iter::once(self.proposer.tree()).chain(self.voters.iter().map(LongestChain::tree))
    }

    fn last_voted_depth(&self, voter_block: &BlockId) -> u64 {
        self.last_voted.get(voter_block).copied().unwrap_or(0)
    }

    /// First-seen proposer block at each depth in `(after, up_to]`.
    fn ballot(&self, after: u64, up_to: u64) -> Vec<BlockId> {
        let tree = self.proposer.tree();
        (after + 1..=up_to.min(tree.max_depth()))
            .filter_map(|depth| tree.blocks_at_depth(depth).first().copied())
            .collect()
    }

    fn record_votes(&mut self, voter_block: &Block) {
        let inherited = voter_block
            .parent_id
            .map_or(0, |parent| self.last_voted_depth(&parent));
        let mut deepest = inherited;
        let mut seen = HashSet::new();
        for target in voter_block.reference_ids.iter().filter(|target| seen.insert(**target)) {
            self.votes.entry(*target).or_default().push(voter_block.id);
            if let Some(depth) = self.proposer.tree().depth_of(target) {
                deepest = deepest.max(depth);
            }
        }
        trace!(voter = %voter_block.id, votes = seen.len(), deepest, "Recorded votes");
        self.last_voted.insert(voter_block.id, deepest);
    }
}
