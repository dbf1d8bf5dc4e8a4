//! The simulation loop

use super::generators::{count_by_type, generate_proposals, generate_transactions};
use super::report::{mean, BlockRecord, SimulationReport, TransactionRecord};
use super::topology::connect_complete;
use crate::config::SimConfig;
use crate::error::{CoordinatorError, CoordinatorResult};
use cs_02_fork_choice::{Admission, ForkChoiceAlgorithm};
use cs_03_finality::FinalizationAnalyzer;
use cs_04_network_model::Network;
use cs_05_node::Node;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use shared_types::{BlockId, Envelope, NodeId, Payload, Proposal, ProposalType, SimTime, Transaction, TxId};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Counters kept while the loop runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub transactions_processed: usize,
    pub proposals_processed: usize,
    pub messages_sent: usize,
}

/// Drives a whole simulation.
///
/// Owns the nodes, the global ground-truth view and both event streams.
/// The clock only moves forward, to the timestamp of the event being
/// handled; nothing reads time from anywhere else.
#[derive(Debug)]
pub struct Coordinator {
    config: SimConfig,
    rng: ChaCha8Rng,
    network: Network,
    analyzer: FinalizationAnalyzer,
    global: ForkChoiceAlgorithm,
    nodes: Vec<Node>,
    transactions: Vec<Transaction>,
    tx_index: HashMap<TxId, usize>,
    proposals: Vec<Proposal>,
    /// BitcoinNG leader elected by the latest key block.
    leader: Option<NodeId>,
    /// Main-chain blocks whose transactions already got an arrival stamp.
    arrived: HashSet<BlockId>,
    clock: SimTime,
    stats: RunStats,
}

impl Coordinator {
    /// Validate `config`, build the network and generate both event streams.
    pub fn new(config: SimConfig) -> CoordinatorResult<Self> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let transactions = generate_transactions(
            config.transaction_dataset,
            config.transaction_rate,
            config.duration,
            config.num_nodes,
            &mut rng,
        );
        let proposals = generate_proposals(
            config.fork_choice_rule,
            config.proposal_rate,
            config.secondary_proposal_rate,
            config.duration,
            &mut rng,
        );
        Self::with_events(config, rng, transactions, proposals)
    }

    /// Build a coordinator over explicit event streams. Both must be sorted
    /// by timestamp.
    pub fn with_events(
        config: SimConfig,
        rng: ChaCha8Rng,
        transactions: Vec<Transaction>,
        proposals: Vec<Proposal>,
    ) -> CoordinatorResult<Self> {
        config.validate()?;
        let analyzer = FinalizationAnalyzer::new(config.tx_error_prob, config.num_nodes, config.num_adversaries)?;

        let params = config.fork_choice_params();
        let mut nodes: Vec<Node> = (0..config.num_nodes)
            .map(|i| {
                Node::new(
                    NodeId(i),
                    config.node_config(),
                    ForkChoiceAlgorithm::new(config.fork_choice_rule, &params),
                )
            })
            .collect();
        connect_complete(&mut nodes);

        if let Some(tx) = transactions.iter().find(|tx| tx.source.0 >= nodes.len()) {
            return Err(CoordinatorError::UnknownNode(tx.source));
        }

        info!(
            fork_choice = %config.fork_choice_rule,
            network = config.network_model.as_str(),
            nodes = config.num_nodes,
            adversaries = config.num_adversaries,
            transactions = transactions.len(),
            proposals = proposals.len(),
            micro = count_by_type(&proposals, ProposalType::Micro),
            pool = count_by_type(&proposals, ProposalType::Pool),
            k = analyzer.depth(),
            "Simulation initialised"
        );

        let tx_index = transactions.iter().enumerate().map(|(i, tx)| (tx.id, i)).collect();
        Ok(Self {
            network: config.network(),
            global: ForkChoiceAlgorithm::new(config.fork_choice_rule, &params),
            config,
            rng,
            analyzer,
            nodes,
            transactions,
            tx_index,
            proposals,
            leader: None,
            arrived: HashSet::new(),
            clock: 0.0,
            stats: RunStats::default(),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn analyzer(&self) -> &FinalizationAnalyzer {
        &self.analyzer
    }

    pub fn global(&self) -> &ForkChoiceAlgorithm {
        &self.global
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn proposals(&self) -> &[Proposal] {
        &self.proposals
    }

    pub fn clock(&self) -> SimTime {
        self.clock
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Merge both streams in time order, then drain every node.
    ///
    /// On equal timestamps the proposal goes first.
    pub fn run(&mut self) -> CoordinatorResult<()> {
        let (mut tx_i, mut p_i) = (0, 0);
        while tx_i < self.transactions.len() || p_i < self.proposals.len() {
            let take_tx = match (self.transactions.get(tx_i), self.proposals.get(p_i)) {
                (Some(tx), Some(proposal)) => tx.timestamp < proposal.timestamp,
                (Some(_), None) => true,
                _ => false,
            };
            if take_tx {
                self.process_transaction(tx_i)?;
                tx_i += 1;
            } else {
                self.process_proposal(p_i)?;
                p_i += 1;
            }
        }

        for node in &mut self.nodes {
            node.drain()?;
        }
        info!(
            clock = self.clock,
            transactions = self.stats.transactions_processed,
            proposals = self.stats.proposals_processed,
            messages = self.stats.messages_sent,
            "Simulation finished"
        );
        Ok(())
    }

    fn process_transaction(&mut self, index: usize) -> CoordinatorResult<()> {
        let tx = &self.transactions[index];
        let (id, source, timestamp) = (tx.id, tx.source, tx.timestamp);
        self.clock = timestamp;

        let node = self
            .nodes
            .get_mut(source.0)
            .ok_or(CoordinatorError::UnknownNode(source))?;
        node.add_to_local_txs(id, timestamp);
        let envelopes = node.broadcast(&Payload::Transaction { id, timestamp }, timestamp, &self.network);
        self.deliver(envelopes)?;
        self.stats.transactions_processed += 1;
        Ok(())
    }

    fn process_proposal(&mut self, index: usize) -> CoordinatorResult<()> {
        let timestamp = self.proposals[index].timestamp;
        self.clock = timestamp;
        let proposer = self.choose_proposer(self.proposals[index].proposal_type);

        let mut proposal = self.proposals[index].clone();
        let block = {
            let Self { nodes, rng, .. } = self;
            let node = nodes
                .get_mut(proposer.0)
                .ok_or(CoordinatorError::UnknownNode(proposer))?;
            node.propose(&mut proposal, rng)?
        };

        match self.global.insert_block(block.clone())? {
            Admission::Inserted => {}
            Admission::Orphan(_) => {
                return Err(CoordinatorError::Divergence {
                    proposer,
                    block: block.id,
                    reason: "has dependencies unknown to the global view",
                })
            }
            Admission::Duplicate => {
                return Err(CoordinatorError::Divergence {
                    proposer,
                    block: block.id,
                    reason: "was already present",
                })
            }
        }

        let envelopes = self.nodes[proposer.0].broadcast(&Payload::Block(block), timestamp, &self.network);
        self.deliver(envelopes)?;

        proposal.added = true;
        self.proposals[index] = proposal;
        self.stats.proposals_processed += 1;

        self.update_main_chain_arrivals(timestamp);
        self.update_finalized_blocks(timestamp)?;
        Ok(())
    }

    /// Uniform choice, except that micro blocks reuse the current leader.
    fn choose_proposer(&mut self, kind: ProposalType) -> NodeId {
        match (kind, self.leader) {
            (ProposalType::Micro, Some(leader)) => leader,
            _ => {
                let chosen = NodeId(self.rng.gen_range(0..self.nodes.len()));
                if kind == ProposalType::Key {
                    debug!(leader = %chosen, "New leader elected");
                    self.leader = Some(chosen);
                }
                chosen
            }
        }
    }

    fn deliver(&mut self, envelopes: Vec<Envelope>) -> CoordinatorResult<()> {
        self.stats.messages_sent += envelopes.len();
        for envelope in envelopes {
            self.node_mut(envelope.to)?.receive_and_buffer(envelope.message);
        }
        Ok(())
    }

    fn node_mut(&mut self, id: NodeId) -> CoordinatorResult<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(CoordinatorError::UnknownNode(id))
    }

    /// Stamp transactions reaching any global main chain for the first time.
    fn update_main_chain_arrivals(&mut self, timestamp: SimTime) {
        let chains = self.global.main_chains();
        for id in chains.iter().flatten() {
            if !self.arrived.insert(*id) {
                continue;
            }
            let Some(block) = self.global.lookup(id) else {
                continue;
            };
            for tx in &block.transactions {
                if let Some(&i) = self.tx_index.get(tx) {
                    self.transactions[i].record_main_chain_arrival(timestamp);
                }
            }
        }
    }

    /// Walk the common prefix from its tip and finalize every block that
    /// is deep enough and passes the error coin. Blocks without a chain
    /// depth of their own take the depth of the next chain block after them.
    fn update_finalized_blocks(&mut self, timestamp: SimTime) -> CoordinatorResult<()> {
        let prefix = self.global.common_prefix();
        let head_depth = self.global.head_depth();
        let mut carried = None;

        for id in prefix.iter().rev() {
            let depth = self.global.depth_of(id).or(carried);
            carried = depth;
            let Some(depth) = depth else {
                continue;
            };
            if id.is_genesis() || !self.analyzer.is_deep_enough(depth, head_depth) {
                continue;
            }
            let already_final = self
                .global
                .require(id)?
                .finalization_timestamp
                .is_some();
            if already_final || !self.analyzer.is_finalized(depth, head_depth, &mut self.rng) {
                continue;
            }

            self.global.mark_finalized(id, timestamp)?;
            let transactions = self.global.require(id)?.transactions.clone();
            debug!(block = %id, depth, head_depth, txs = transactions.len(), "Block finalized");
            for tx in transactions {
                if let Some(&i) = self.tx_index.get(&tx) {
                    self.transactions[i].record_finalization(timestamp);
                }
            }
        }
        Ok(())
    }

    /// Snapshot of everything the run produced so far.
    pub fn report(&self) -> SimulationReport {
        let chains = self.global.main_chains();
        let header = self.config.block_header_bytes;
        let tx_size = self.config.tx_size_bytes;
        let completed = self.transactions.iter().filter(|tx| tx.complete).count();

        SimulationReport {
            fork_choice_rule: self.config.fork_choice_rule,
            seed: self.config.seed,
            duration: self.config.duration,
            finalization_depth: self.analyzer.depth(),
            common_prefix_length: cs_02_fork_choice::common_prefix(&chains).len(),
            main_chain_length: chains.iter().map(Vec::len).max().unwrap_or(0),
            blocks: self
                .global
                .blocks()
                .map(|block| BlockRecord::new(block, header, tx_size))
                .collect(),
            transactions: self.transactions.iter().map(TransactionRecord::from).collect(),
            throughput_tx_per_sec: completed as f64 / self.config.duration,
            mean_finalization_latency: mean(self.transactions.iter().filter_map(Transaction::finalization_latency)),
            mean_main_chain_latency: mean(
                self.transactions
                    .iter()
                    .filter_map(|tx| tx.main_chain_arrival_timestamp.map(|t| t - tx.timestamp)),
            ),
            orphans_outstanding: self.nodes.iter().map(Node::orphans_outstanding).sum(),
            epoch_truncations: self.global.epoch_truncations(),
        }
    }
}

/// Build, run and report in one call.
pub fn simulate(config: SimConfig) -> CoordinatorResult<SimulationReport> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run()?;
    Ok(coordinator.report())
}
