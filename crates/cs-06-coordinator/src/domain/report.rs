//! Pull-based run results

use cs_02_fork_choice::ForkChoiceKind;
use serde::{Deserialize, Serialize};
use shared_types::{Block, BlockId, BlockType, NodeId, SimTime, Transaction, TxId};

/// Per-block export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub id: BlockId,
    pub parent_id: Option<BlockId>,
    pub block_type: BlockType,
    pub proposal_timestamp: SimTime,
    pub finalization_timestamp: Option<SimTime>,
    pub depth: u64,
    pub transactions: Vec<TxId>,
    pub reference_ids: Vec<BlockId>,
    pub proposer: Option<NodeId>,
    pub size_bytes: u64,
}

impl BlockRecord {
    pub fn new(block: &Block, header_bytes: u64, tx_size_bytes: u64) -> Self {
        Self {
            id: block.id,
            parent_id: block.parent_id,
            block_type: block.block_type,
            proposal_timestamp: block.proposal_timestamp,
            finalization_timestamp: block.finalization_timestamp,
            depth: block.depth,
            transactions: block.transactions.clone(),
            reference_ids: block.reference_ids.clone(),
            proposer: block.proposer,
            size_bytes: block.size_bytes(header_bytes, tx_size_bytes),
        }
    }
}

/// Per-transaction export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TxId,
    pub source: NodeId,
    pub timestamp: SimTime,
    pub main_chain_arrival_timestamp: Option<SimTime>,
    pub finalization_timestamps: Vec<SimTime>,
    pub complete: bool,
}

impl From<&Transaction> for TransactionRecord {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id,
            source: tx.source,
            timestamp: tx.timestamp,
            main_chain_arrival_timestamp: tx.main_chain_arrival_timestamp,
            finalization_timestamps: tx.finalization_timestamps.clone(),
            complete: tx.complete,
        }
    }
}

/// Everything a run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub fork_choice_rule: ForkChoiceKind,
    pub seed: u64,
    pub duration: SimTime,
    pub finalization_depth: u64,
    /// Blocks shared by every global main chain, genesis included.
    pub common_prefix_length: usize,
    /// Length of the longest global main chain, genesis included.
    pub main_chain_length: usize,
    pub blocks: Vec<BlockRecord>,
    pub transactions: Vec<TransactionRecord>,
    /// Finalized transactions per simulated second.
    pub throughput_tx_per_sec: f64,
    /// Mean seconds from generation to first finalization.
    pub mean_finalization_latency: Option<f64>,
    /// Mean seconds from generation to first main-chain appearance.
    pub mean_main_chain_latency: Option<f64>,
    /// Blocks still parked as orphans across all nodes after the final drain.
    pub orphans_outstanding: usize,
    pub epoch_truncations: u64,
}

impl SimulationReport {
    pub fn finalized_blocks(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| b.finalization_timestamp.is_some())
            .count()
    }

    pub fn completed_transactions(&self) -> usize {
        self.transactions.iter().filter(|t| t.complete).count()
    }
}

/// Arithmetic mean, `None` when empty.
pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
