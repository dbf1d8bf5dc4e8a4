//! Error types for fork-choice algorithms

use cs_01_block_tree::TreeError;
use shared_types::{BlockId, BlockType};

/// Fork-choice error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForkChoiceError {
    #[error("Unknown block: {0}")]
    UnknownBlock(BlockId),

    #[error("Voter chain {chain} out of range, protocol has {chains} voter chains")]
    WrongLane { chain: usize, chains: usize },

    #[error("Block {block} of type {block_type:?} is not accepted by {protocol}")]
    UnexpectedBlockType {
        block: BlockId,
        block_type: BlockType,
        protocol: &'static str,
    },

    #[error("Fork-choice rule returned no head")]
    NoHeads,

    #[error("Block tree error: {0}")]
    Tree(#[from] TreeError),
}

/// Result type for fork-choice operations
pub type ForkChoiceResult<T> = Result<T, ForkChoiceError>;
