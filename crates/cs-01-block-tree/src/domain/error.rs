//! Error types for the block tree

use shared_types::BlockId;

/// Block tree error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The caller claimed a parent the tree does not hold.
    #[error("Unknown parent block: {0}")]
    UnknownParent(BlockId),

    #[error("Unknown block: {0}")]
    UnknownBlock(BlockId),

    #[error("Block already present: {0}")]
    DuplicateBlock(BlockId),

    /// A non-genesis block without a parent id can never be linked.
    #[error("Block {0} has no parent id")]
    MissingParent(BlockId),
}

/// Result type for tree operations
pub type TreeResult<T> = Result<T, TreeError>;
