//! Error types for the coordinator

use crate::config::ConfigError;
use cs_02_fork_choice::ForkChoiceError;
use cs_03_finality::FinalityError;
use cs_05_node::NodeError;
use shared_types::{BlockId, NodeId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Finality error: {0}")]
    Finality(#[from] FinalityError),

    #[error("Node error: {0}")]
    Node(#[from] NodeError),

    #[error("Fork choice error: {0}")]
    ForkChoice(#[from] ForkChoiceError),

    /// The global tree could not link a block its proposer had linked.
    #[error("Global tree diverged from {proposer}: block {block} {reason}")]
    Divergence {
        proposer: NodeId,
        block: BlockId,
        reason: &'static str,
    },

    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),
}

pub type CoordinatorResult<T> = Result<T, CoordinatorError>;
