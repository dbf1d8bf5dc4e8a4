//! Error types for network models

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    #[error("Invalid link parameter {name}={value}: must be finite and {requirement}")]
    InvalidLinkParameter {
        name: &'static str,
        value: f64,
        requirement: &'static str,
    },
}

pub type NetworkResult<T> = Result<T, NetworkError>;
