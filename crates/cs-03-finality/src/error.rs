//! Error types for the finality analysis

use thiserror::Error;

/// Finality errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FinalityError {
    /// The depth search cannot terminate for these parameters
    #[error(
        "Invalid security parameters: epsilon={epsilon}, nodes={num_nodes}, adversaries={num_adversaries} ({reason})"
    )]
    InvalidSecurityParameters {
        epsilon: f64,
        num_nodes: usize,
        num_adversaries: usize,
        reason: &'static str,
    },

    /// No depth up to the search limit met the error bound
    #[error("No finalization depth up to {limit} satisfies epsilon={epsilon}")]
    SearchExhausted { epsilon: f64, limit: u64 },
}

/// Result type for finality operations
pub type FinalityResult<T> = Result<T, FinalityError>;
