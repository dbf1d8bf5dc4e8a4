//! # Core Domain Entities
//!
//! Defines the simulation entities consumed by every consensus crate.
//!
//! ## Clusters
//!
//! - **Identity**: [`BlockId`], [`TxId`], [`NodeId`], [`SimTime`]
//! - **Chain**: [`Block`], [`BlockType`], [`Transaction`]
//! - **Scheduling**: [`Proposal`], [`ProposalType`]

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// Simulation time in seconds on the coordinator's logical clock.
pub type SimTime = f64;

/// Opaque, globally unique block identifier.
///
/// Identifiers are drawn from the simulation's seeded RNG so that two runs
/// with the same seed produce the same ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub Uuid);

impl BlockId {
    /// Reserved sentinel id of the genesis block.
    pub const GENESIS: BlockId = BlockId(Uuid::nil());

    /// Draw a fresh id from the given random source.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(uuid::Builder::from_random_bytes(rng.gen()).into_uuid())
    }

    /// Build a fixed id, mostly useful for hand-built trees.
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    pub fn is_genesis(&self) -> bool {
        *self == Self::GENESIS
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_genesis() {
            write!(f, "Genesis")
        } else {
            write!(f, "{}", self.0.simple())
        }
    }
}

/// Opaque, globally unique transaction identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TxId(pub Uuid);

impl TxId {
    /// Draw a fresh id from the given random source.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(uuid::Builder::from_random_bytes(rng.gen()).into_uuid())
    }

    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Index of a participant in the simulated network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

// =============================================================================
// CLUSTER B: THE CHAIN
// =============================================================================

/// Role of a block under the active protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum BlockType {
    /// Plain block-tree block (Longest-Chain, GHOST, Conflux).
    Tree,
    /// Prism proposer block, carries content.
    Proposer,
    /// Prism voter block on voter chain `chain`.
    Voter { chain: usize },
    /// BitcoinNG key block (leader election).
    Key,
    /// BitcoinNG micro block issued by the current leader.
    Micro,
    /// Pool block held outside the tree until a tree block references it.
    Pool,
}

/// A proposed block.
///
/// Blocks are immutable once accepted by a tree, except for the
/// set-once `finalization_timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    /// `None` only for genesis and for pool blocks.
    pub parent_id: Option<BlockId>,
    /// Transaction ids carried by the block. Order only matters for size
    /// accounting.
    pub transactions: Vec<TxId>,
    pub proposal_timestamp: SimTime,
    pub finalization_timestamp: Option<SimTime>,
    pub block_type: BlockType,
    /// Extra causal links (Prism votes, Conflux references, pool splices).
    pub reference_ids: Vec<BlockId>,
    /// Distance from genesis along parent links. Set by the tree on insert.
    pub depth: u64,
    pub proposer: Option<NodeId>,
}

impl Block {
    /// The genesis block every tree is rooted at.
    pub fn genesis() -> Self {
        Self {
            id: BlockId::GENESIS,
            parent_id: None,
            transactions: Vec::new(),
            proposal_timestamp: 0.0,
            finalization_timestamp: None,
            block_type: BlockType::Tree,
            reference_ids: Vec::new(),
            depth: 0,
            proposer: None,
        }
    }

    /// Create an unlinked block. The owning tree fills in `depth`.
    pub fn new(
        id: BlockId,
        parent_id: Option<BlockId>,
        block_type: BlockType,
        proposal_timestamp: SimTime,
    ) -> Self {
        Self {
            id,
            parent_id,
            transactions: Vec::new(),
            proposal_timestamp,
            finalization_timestamp: None,
            block_type,
            reference_ids: Vec::new(),
            depth: 0,
            proposer: None,
        }
    }

    pub fn with_transactions(mut self, transactions: Vec<TxId>) -> Self {
        self.transactions = transactions;
        self
    }

    pub fn with_references(mut self, reference_ids: Vec<BlockId>) -> Self {
        self.reference_ids = reference_ids;
        self
    }

    pub fn with_proposer(mut self, proposer: NodeId) -> Self {
        self.proposer = Some(proposer);
        self
    }

    pub fn is_genesis(&self) -> bool {
        self.id.is_genesis()
    }

    /// Ids this block causally depends on: its parent and all references.
    pub fn dependencies(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.parent_id.iter().copied().chain(self.reference_ids.iter().copied())
    }

    /// Record finalization. Returns `false` if the block was already final;
    /// the first timestamp is never overwritten.
    pub fn mark_finalized(&mut self, timestamp: SimTime) -> bool {
        if self.finalization_timestamp.is_some() {
            return false;
        }
        self.finalization_timestamp = Some(timestamp);
        true
    }

    /// Wire size used by the latency models.
    pub fn size_bytes(&self, header_bytes: u64, tx_size_bytes: u64) -> u64 {
        header_bytes + self.transactions.len() as u64 * tx_size_bytes
    }
}

/// A transaction and its lifecycle timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TxId,
    pub source: NodeId,
    /// Generation time.
    pub timestamp: SimTime,
    pub main_chain_arrival_timestamp: Option<SimTime>,
    /// A transaction can be finalized once per covering block.
    pub finalization_timestamps: Vec<SimTime>,
    pub complete: bool,
}

impl Transaction {
    pub fn new(id: TxId, source: NodeId, timestamp: SimTime) -> Self {
        Self {
            id,
            source,
            timestamp,
            main_chain_arrival_timestamp: None,
            finalization_timestamps: Vec::new(),
            complete: false,
        }
    }

    /// Stamp the first time the transaction is seen on a main chain.
    pub fn record_main_chain_arrival(&mut self, timestamp: SimTime) -> bool {
        if self.main_chain_arrival_timestamp.is_some() {
            return false;
        }
        self.main_chain_arrival_timestamp = Some(timestamp);
        true
    }

    pub fn record_finalization(&mut self, timestamp: SimTime) {
        self.finalization_timestamps.push(timestamp);
        self.complete = true;
    }

    /// Latency to the first finalization, if any.
    pub fn finalization_latency(&self) -> Option<SimTime> {
        self.finalization_timestamps
            .first()
            .map(|finalized| finalized - self.timestamp)
    }
}

// =============================================================================
// CLUSTER C: SCHEDULING
// =============================================================================

/// Kind of proposal slot drawn by the proposal generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalType {
    Tree,
    Pool,
    Key,
    Micro,
}

/// A scheduled proposal slot. The block is attached once a node fills it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub timestamp: SimTime,
    pub proposal_type: ProposalType,
    pub block: Option<Block>,
    /// Visualisation bookkeeping only. Never read by the consensus code.
    pub added: bool,
}

impl Proposal {
    pub fn new(timestamp: SimTime, proposal_type: ProposalType) -> Self {
        Self {
            timestamp,
            proposal_type,
            block: None,
            added: false,
        }
    }

    pub fn set_block(&mut self, block: Block) {
        self.block = Some(block);
    }
}
