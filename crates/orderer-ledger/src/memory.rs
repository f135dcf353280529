//! In-memory block ledger
//!
//! Suitable for development and testing. Production deployments should use a
//! persistent backend implementing the same traits.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use orderer_types::Block;
use tracing::debug;

use crate::error::{LedgerError, Result};
use crate::{Reader, Writer};

/// Append-only in-memory ledger.
///
/// Appends must carry the next block number and chain to the previous
/// block's header hash.
pub struct MemoryLedger {
    blocks: RwLock<Vec<Block>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(Vec::new()),
        }
    }

    // Appends push a fully checked block or nothing, so a poisoned lock still
    // guards a consistent chain.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Block>> {
        self.blocks.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Block>> {
        self.blocks.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a ledger holding `genesis` as block 0.
    pub fn with_genesis(genesis: Block) -> Result<Self> {
        let ledger = Self::new();
        ledger.append(genesis)?;
        Ok(ledger)
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl Reader for MemoryLedger {
    fn height(&self) -> u64 {
        self.read().len() as u64
    }

    fn block(&self, number: u64) -> Result<Block> {
        let blocks = self.read();
        usize::try_from(number)
            .ok()
            .and_then(|index| blocks.get(index))
            .cloned()
            .ok_or(LedgerError::NotFound {
                number,
                height: blocks.len() as u64,
            })
    }
}

impl Writer for MemoryLedger {
    fn append(&self, block: Block) -> Result<()> {
        let mut blocks = self.write();

        let expected = blocks.len() as u64;
        if block.header.number != expected {
            return Err(LedgerError::OutOfOrder {
                expected,
                got: block.header.number,
            });
        }

        if let Some(previous) = blocks.last() {
            if block.header.previous_hash != previous.header.hash() {
                return Err(LedgerError::PreviousHashMismatch {
                    number: block.header.number,
                });
            }
        }

        debug!(number = block.header.number, "Block appended");
        blocks.push(block);
        Ok(())
    }
}
