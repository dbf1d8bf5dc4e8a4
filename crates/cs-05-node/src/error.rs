//! Error types for node replicas

use cs_02_fork_choice::ForkChoiceError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NodeError {
    #[error("Fork choice rejected block: {0}")]
    ForkChoice(#[from] ForkChoiceError),
}

pub type NodeResult<T> = Result<T, NodeError>;
