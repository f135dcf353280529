use thiserror::Error;

/// Consensus engine errors.
#[derive(Debug, Error)]
pub enum ConsensusError {
    #[error("invalid orderer metadata: {0}")]
    InvalidMetadata(String),

    #[error("chain creation failed: {0}")]
    Creation(String),

    #[error("chain is halted")]
    Halted,

    #[error("message rejected: {0}")]
    Rejected(String),

    #[error("block write failed: {0}")]
    Write(String),
}
