//! Block ledger seams.
//!
//! The ordering core only reads and appends blocks; the physical storage
//! format belongs to whatever implements [`ReadWriter`]. The crate provides
//! an in-memory implementation suitable for development and testing.

#![deny(unsafe_code)]

pub mod error;
pub mod memory;

pub use error::{LedgerError, Result};
pub use memory::MemoryLedger;

use orderer_types::Block;

/// Read access to a channel's block ledger.
pub trait Reader: Send + Sync {
    /// Number of blocks in the ledger. The newest block is `height() - 1`.
    fn height(&self) -> u64;

    /// Retrieve block `number`.
    fn block(&self, number: u64) -> Result<Block>;
}

/// Append access to a channel's block ledger.
pub trait Writer: Send + Sync {
    /// Append `block` as the next block of the chain.
    fn append(&self, block: Block) -> Result<()>;
}

pub trait ReadWriter: Reader + Writer {}

impl<T: Reader + Writer> ReadWriter for T {}

/// Retrieve the newest block, failing on an empty ledger.
pub fn last_block<R: Reader + ?Sized>(reader: &R) -> Result<Block> {
    match reader.height() {
        0 => Err(LedgerError::Empty),
        height => reader.block(height - 1),
    }
}
