//! Block templates and shared selection helpers

use super::{ForkChoiceError, ForkChoiceResult};
use rand::Rng;
use shared_types::{Block, BlockId, BlockType, NodeId, ProposalType, SimTime, TxId};

/// Everything a proposer decides before the fork-choice rule runs.
///
/// The algorithm fills in the parent, block type and references.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockTemplate {
    pub id: BlockId,
    pub kind: ProposalType,
    pub transactions: Vec<TxId>,
    pub proposal_timestamp: SimTime,
    pub proposer: Option<NodeId>,
}

impl BlockTemplate {
    pub fn new(id: BlockId, kind: ProposalType, proposal_timestamp: SimTime) -> Self {
        Self {
            id,
            kind,
            transactions: Vec::new(),
            proposal_timestamp,
            proposer: None,
        }
    }

    pub fn with_transactions(mut self, transactions: Vec<TxId>) -> Self {
        self.transactions = transactions;
        self
    }

    pub fn with_proposer(mut self, proposer: NodeId) -> Self {
        self.proposer = Some(proposer);
        self
    }

    pub(crate) fn into_block(self, parent_id: Option<BlockId>, block_type: BlockType) -> Block {
        let mut block = Block::new(self.id, parent_id, block_type, self.proposal_timestamp)
            .with_transactions(self.transactions);
        block.proposer = self.proposer;
        block
    }
}

/// Outcome of offering a received block to an algorithm.
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    Inserted,
    /// A parent or reference is not known yet; buffer and retry.
    Orphan(Block),
    /// Already known; nothing changed.
    Duplicate,
}

impl Admission {
    pub fn is_inserted(&self) -> bool {
        matches!(self, Admission::Inserted)
    }
}

/// Uniform pick among equally eligible heads. A single head is returned
/// without consuming randomness.
pub(crate) fn pick_head<R: Rng + ?Sized>(heads: &[BlockId], rng: &mut R) -> ForkChoiceResult<BlockId> {
    match heads {
        [] => Err(ForkChoiceError::NoHeads),
        [only] => Ok(*only),
        many => Ok(many[rng.gen_range(0..many.len())]),
    }
}
