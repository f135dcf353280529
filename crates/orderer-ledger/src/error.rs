//! Ledger error types

use thiserror::Error;

/// Ledger errors
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("block {number} not found (height {height})")]
    NotFound { number: u64, height: u64 },

    #[error("ledger is empty")]
    Empty,

    #[error("out-of-order append: expected block {expected}, got {got}")]
    OutOfOrder { expected: u64, got: u64 },

    #[error("block {number} does not chain to its predecessor")]
    PreviousHashMismatch { number: u64 },

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;
