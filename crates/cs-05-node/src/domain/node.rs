//! A participant's local replica

use super::inbox::Inbox;
use super::pending::{PendingQueue, SchedulingRule};
use crate::error::NodeResult;
use crate::metrics;
use cs_01_block_tree::{OrphanPool, Resolution};
use cs_02_fork_choice::{Admission, BlockTemplate, ForkChoiceAlgorithm};
use cs_04_network_model::LatencyModel;
use rand::Rng;
use shared_types::{Block, BlockId, Envelope, Message, NodeId, Payload, Proposal, SimTime, TxId};
use tracing::{debug, trace, warn};

/// Block-building and wire-size settings shared by every node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeConfig {
    /// Maximum transactions per block.
    pub max_block_size: usize,
    pub scheduling: SchedulingRule,
    pub block_header_bytes: u64,
    pub tx_size_bytes: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            max_block_size: 100,
            scheduling: SchedulingRule::Fifo,
            block_header_bytes: 80,
            tx_size_bytes: 250,
        }
    }
}

/// What one `process_buffer` call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferStats {
    pub delivered: usize,
    pub transactions: usize,
    pub blocks_linked: usize,
    pub orphaned: usize,
    /// Previously buffered orphans linked by the retry pass.
    pub orphans_resolved: usize,
}

/// A simulated participant.
///
/// Owns a fork-choice algorithm over its local tree, an inbox of messages
/// not yet due, the pending transactions it knows about and the blocks it
/// received before their dependencies.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    config: NodeConfig,
    algorithm: ForkChoiceAlgorithm,
    inbox: Inbox,
    pending: PendingQueue,
    orphans: OrphanPool,
    neighbors: Vec<NodeId>,
}

impl Node {
    pub fn new(id: NodeId, config: NodeConfig, algorithm: ForkChoiceAlgorithm) -> Self {
        Self {
            id,
            config,
            algorithm,
            inbox: Inbox::new(),
            pending: PendingQueue::new(),
            orphans: OrphanPool::new(),
            neighbors: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn algorithm(&self) -> &ForkChoiceAlgorithm {
        &self.algorithm
    }

    pub fn neighbors(&self) -> &[NodeId] {
        &self.neighbors
    }

    pub fn add_neighbor(&mut self, neighbor: NodeId) {
        if neighbor != self.id && !self.neighbors.contains(&neighbor) {
            self.neighbors.push(neighbor);
        }
    }

    pub fn pending(&self) -> &PendingQueue {
        &self.pending
    }

    pub fn inbox_len(&self) -> usize {
        self.inbox.len()
    }

    pub fn orphan_ids(&self) -> Vec<BlockId> {
        self.orphans.ids()
    }

    pub fn orphans_outstanding(&self) -> usize {
        self.orphans.len()
    }

    /// Queue a message; it becomes visible once the clock reaches
    /// `message.deliver_at`.
    pub fn receive_and_buffer(&mut self, message: Message) {
        trace!(node = %self.id, kind = message.payload.label(), at = message.deliver_at, "Buffered message");
        self.inbox.push(message);
    }

    /// Learn a transaction. Returns `false` if it was already known.
    pub fn add_to_local_txs(&mut self, id: TxId, timestamp: SimTime) -> bool {
        self.pending.insert(id, timestamp)
    }

    /// Deliver every message due at or before `cutoff`, in delivery order,
    /// then retry buffered orphans until nothing more links.
    pub fn process_buffer(&mut self, cutoff: SimTime) -> NodeResult<BufferStats> {
        let mut stats = BufferStats::default();
        while let Some(message) = self.inbox.pop_due(cutoff) {
            stats.delivered += 1;
            metrics::record_message_delivered(message.payload.label());
            match message.payload {
                Payload::Transaction { id, timestamp } => {
                    if self.add_to_local_txs(id, timestamp) {
                        stats.transactions += 1;
                    }
                }
                Payload::Block(block) => match self.algorithm.insert_block(block)? {
                    Admission::Inserted => stats.blocks_linked += 1,
                    Admission::Orphan(block) => {
                        debug!(node = %self.id, block = %block.id, "Buffering orphan block");
                        if self.orphans.push(block) {
                            stats.orphaned += 1;
                        }
                    }
                    Admission::Duplicate => {}
                },
            }
        }

        if !self.orphans.is_empty() {
            stats.orphans_resolved = self.resolve_orphans();
        }
        Ok(stats)
    }

    /// Deliver everything still in flight.
    pub fn drain(&mut self) -> NodeResult<BufferStats> {
        self.process_buffer(f64::INFINITY)
    }

    /// Fill `proposal` with a new block built on the local view.
    ///
    /// Catches up on every message due by the proposal time first, then
    /// takes pending transactions that no main chain carries yet.
    pub fn propose<R: Rng + ?Sized>(&mut self, proposal: &mut Proposal, rng: &mut R) -> NodeResult<Block> {
        self.process_buffer(proposal.timestamp)?;

        let parked = self.pending.settle(&self.algorithm.committed_transactions());
        if parked > 0 {
            trace!(node = %self.id, parked, queued = self.pending.len(), "Settled committed transactions");
        }
        let transactions = self
            .pending
            .select(self.config.scheduling, self.config.max_block_size, rng);
        let template = BlockTemplate::new(BlockId::random(rng), proposal.proposal_type, proposal.timestamp)
            .with_transactions(transactions)
            .with_proposer(self.id);

        let block = self.algorithm.add_block(template, rng)?;
        debug!(
            node = %self.id,
            block = %block.id,
            parent = ?block.parent_id,
            depth = block.depth,
            txs = block.transactions.len(),
            "Proposed block"
        );
        proposal.set_block(block.clone());
        Ok(block)
    }

    /// One envelope per neighbor, each delayed by the latency model.
    pub fn broadcast<L: LatencyModel + ?Sized>(&self, payload: &Payload, sent_at: SimTime, network: &L) -> Vec<Envelope> {
        let size = payload.size_bytes(self.config.block_header_bytes, self.config.tx_size_bytes);
        self.neighbors
            .iter()
            .map(|&to| Envelope {
                to,
                message: Message {
                    deliver_at: sent_at + network.delay(size),
                    sender: self.id,
                    payload: payload.clone(),
                },
            })
            .collect()
    }

    fn resolve_orphans(&mut self) -> usize {
        let node = self.id;
        let algorithm = &mut self.algorithm;
        let linked = self.orphans.resolve(|block| match algorithm.insert_block(block) {
            Ok(Admission::Inserted) => Resolution::Linked,
            Ok(Admission::Orphan(block)) => Resolution::Pending(block),
            Ok(Admission::Duplicate) => Resolution::Discarded,
            Err(error) => {
                warn!(node = %node, %error, "Dropping orphan rejected by fork choice");
                Resolution::Discarded
            }
        });
        linked.len()
    }
}
