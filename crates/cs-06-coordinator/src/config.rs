//! # Simulation Configuration
//!
//! Field names follow the short snake_case spelling; every field also
//! accepts the long key used by experiment parameter files, e.g.
//! `"Number of nodes"` or `"Block size (txs)"`. A file of the shape
//! `{"setting-name": "x", "x": {...}}` is unwrapped before parsing.

use cs_02_fork_choice::{ForkChoiceKind, ForkChoiceParams, DEFAULT_MAX_EPOCH_DEPTH, DEFAULT_VOTER_CHAINS};
use cs_04_network_model::{LinkParams, Network, NetworkError, NetworkModel};
use cs_05_node::{NodeConfig, SchedulingRule};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transaction arrival process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionDataset {
    /// Exponential inter-arrival times.
    #[default]
    Poisson,
    /// Fixed inter-arrival time `1 / transaction_rate`.
    Deterministic,
}

/// Configuration errors. All are fatal at start-up.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Settings file names '{0}' but has no such entry")]
    MissingSetting(String),

    #[error("Invalid configuration field {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("Invalid network parameters: {0}")]
    Network(#[from] NetworkError),
}

/// Complete parameter set of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(alias = "Number of nodes")]
    pub num_nodes: usize,

    #[serde(alias = "Number of adversaries")]
    pub num_adversaries: usize,

    /// Maximum transactions per block.
    #[serde(alias = "Block size (txs)")]
    pub max_block_size: usize,

    /// Error bound epsilon for finalization.
    #[serde(alias = "Probability of error in transaction confirmation")]
    pub tx_error_prob: f64,

    /// Tree (or key) block proposal rate, per second.
    #[serde(alias = "Block proposal rate parameter", alias = "Block tree proposal rate parameter")]
    pub proposal_rate: f64,

    /// Second proposal stream: BitcoinNG micro blocks or pool blocks.
    #[serde(
        default,
        alias = "micro_proposal_rate",
        alias = "pool_proposal_rate",
        alias = "Block micro proposal rate parameter",
        alias = "Block pool proposal rate parameter"
    )]
    pub secondary_proposal_rate: Option<f64>,

    #[serde(default = "default_transaction_rate", alias = "Transaction rate parameter")]
    pub transaction_rate: f64,

    #[serde(alias = "Fork choice rule")]
    pub fork_choice_rule: ForkChoiceKind,

    #[serde(alias = "Network model")]
    pub network_model: NetworkModel,

    /// Simulated seconds of event generation.
    #[serde(alias = "Duration (sec)")]
    pub duration: f64,

    #[serde(alias = "Transaction dataset")]
    pub transaction_dataset: TransactionDataset,

    #[serde(alias = "Transaction scheduling rule")]
    pub transaction_scheduling_rule: SchedulingRule,

    #[serde(default)]
    pub seed: u64,

    #[serde(default = "default_voter_chains", alias = "Number of voter chains")]
    pub prism_voter_chains: usize,

    #[serde(default = "default_max_epoch_depth")]
    pub conflux_max_epoch_depth: usize,

    #[serde(default)]
    pub network: LinkParams,

    #[serde(default = "default_tx_size_bytes")]
    pub tx_size_bytes: u64,

    #[serde(default = "default_block_header_bytes")]
    pub block_header_bytes: u64,

    /// Whether the runtime should log at info level by default.
    #[serde(default = "default_logging_enabled", alias = "Logging enabled")]
    pub logging_enabled: bool,
}

fn default_transaction_rate() -> f64 {
    1.0
}

fn default_voter_chains() -> usize {
    DEFAULT_VOTER_CHAINS
}

fn default_max_epoch_depth() -> usize {
    DEFAULT_MAX_EPOCH_DEPTH
}

fn default_tx_size_bytes() -> u64 {
    250
}

fn default_block_header_bytes() -> u64 {
    80
}

fn default_logging_enabled() -> bool {
    true
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_nodes: 10,
            num_adversaries: 1,
            max_block_size: 50,
            tx_error_prob: 0.01,
            proposal_rate: 0.1,
            secondary_proposal_rate: None,
            transaction_rate: default_transaction_rate(),
            fork_choice_rule: ForkChoiceKind::LongestChain,
            network_model: NetworkModel::DeckerWattenhofer,
            duration: 100.0,
            transaction_dataset: TransactionDataset::Poisson,
            transaction_scheduling_rule: SchedulingRule::Fifo,
            seed: 0,
            prism_voter_chains: DEFAULT_VOTER_CHAINS,
            conflux_max_epoch_depth: DEFAULT_MAX_EPOCH_DEPTH,
            network: LinkParams::default(),
            tx_size_bytes: default_tx_size_bytes(),
            block_header_bytes: default_block_header_bytes(),
            logging_enabled: true,
        }
    }
}

impl SimConfig {
    /// Parse a JSON document, unwrapping a `setting-name` wrapper, then validate.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut value: serde_json::Value = serde_json::from_str(json)?;
        if let Some(name) = value.get("setting-name").and_then(|v| v.as_str()).map(str::to_owned) {
            value = value
                .get_mut(&name)
                .map(serde_json::Value::take)
                .ok_or(ConfigError::MissingSetting(name))?;
        }
        let config: SimConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject parameter sets the simulation cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: &str| {
            Err(ConfigError::Invalid {
                field,
                reason: reason.to_owned(),
            })
        };
        if self.num_nodes == 0 {
            return invalid("num_nodes", "must be at least 1");
        }
        if self.num_adversaries >= self.num_nodes {
            return invalid("num_adversaries", "must be fewer than num_nodes");
        }
        if !(self.tx_error_prob > 0.0 && self.tx_error_prob < 1.0) {
            return invalid("tx_error_prob", "must lie in (0, 1)");
        }
        if self.max_block_size == 0 {
            return invalid("max_block_size", "must be at least 1");
        }
        for (field, value) in [
            ("proposal_rate", self.proposal_rate),
            ("transaction_rate", self.transaction_rate),
            ("duration", self.duration),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return invalid(field, "must be positive and finite");
            }
        }
        if let Some(rate) = self.secondary_proposal_rate {
            if !(rate.is_finite() && rate > 0.0) {
                return invalid("secondary_proposal_rate", "must be positive and finite");
            }
        }
        if self.fork_choice_rule.secondary_proposal().is_some() && self.secondary_proposal_rate.is_none() {
            return Err(ConfigError::Invalid {
                field: "secondary_proposal_rate",
                reason: format!("required by {}", self.fork_choice_rule),
            });
        }
        if self.fork_choice_rule == ForkChoiceKind::Prism && self.prism_voter_chains == 0 {
            return invalid("prism_voter_chains", "Prism needs at least one voter chain");
        }
        if self.fork_choice_rule == ForkChoiceKind::Conflux && self.conflux_max_epoch_depth == 0 {
            return invalid("conflux_max_epoch_depth", "must be at least 1");
        }
        self.network.validate()?;
        Ok(())
    }

    pub fn fork_choice_params(&self) -> ForkChoiceParams {
        ForkChoiceParams {
            voter_chains: self.prism_voter_chains,
            max_epoch_depth: self.conflux_max_epoch_depth,
        }
    }

    pub fn node_config(&self) -> NodeConfig {
        NodeConfig {
            max_block_size: self.max_block_size,
            scheduling: self.transaction_scheduling_rule,
            block_header_bytes: self.block_header_bytes,
            tx_size_bytes: self.tx_size_bytes,
        }
    }

    pub fn network(&self) -> Network {
        Network::new(self.network_model, self.network)
    }
}
