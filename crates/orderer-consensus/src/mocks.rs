use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use orderer_types::{Envelope, Metadata};

use crate::error::ConsensusError;
use crate::traits::{Chain, Consenter, ConsenterSupport};

/// Mock consenter for testing.
///
/// Records the orderer metadata each chain was created with. Can be
/// configured to fail every chain creation.
pub struct MockConsenter {
    failure: Option<String>,
    chains: Mutex<Vec<Arc<MockChain>>>,
}

impl MockConsenter {
    pub fn new() -> Self {
        Self {
            failure: None,
            chains: Mutex::new(Vec::new()),
        }
    }

    /// A consenter whose `handle_chain` always fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            chains: Mutex::new(Vec::new()),
        }
    }

    /// Chains created so far, oldest first.
    pub fn chains(&self) -> Vec<Arc<MockChain>> {
        self.chains
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_chain(&self) -> Option<Arc<MockChain>> {
        self.chains().pop()
    }
}

impl Default for MockConsenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Consenter for MockConsenter {
    fn handle_chain(
        &self,
        support: Arc<dyn ConsenterSupport>,
        metadata: &Metadata,
    ) -> Result<Arc<dyn Chain>, ConsensusError> {
        if let Some(reason) = &self.failure {
            return Err(ConsensusError::Creation(reason.clone()));
        }

        let chain = Arc::new(MockChain::new(support, metadata.clone()));
        self.chains
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(chain.clone());
        Ok(chain)
    }
}

/// Mock chain for testing.
///
/// Orders synchronously on the caller's thread: every message goes through
/// the block cutter and each cut batch is written immediately.
pub struct MockChain {
    support: Arc<dyn ConsenterSupport>,
    metadata: Metadata,
    starts: AtomicUsize,
    halted: AtomicBool,
}

impl MockChain {
    fn new(support: Arc<dyn ConsenterSupport>, metadata: Metadata) -> Self {
        Self {
            support,
            metadata,
            starts: AtomicUsize::new(0),
            halted: AtomicBool::new(false),
        }
    }

    /// Orderer metadata the chain was created with.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    fn check_running(&self) -> Result<(), ConsensusError> {
        if self.is_halted() {
            return Err(ConsensusError::Halted);
        }
        Ok(())
    }

    fn write_batch(&self, batch: Vec<Envelope>) -> Result<(), ConsensusError> {
        let block = self.support.create_next_block(batch)?;
        self.support.write_block(block, &[])
    }
}

impl Chain for MockChain {
    fn order(&self, env: Envelope, _config_seq: u64) -> Result<(), ConsensusError> {
        self.check_running()?;
        let (batches, _) = self.support.block_cutter().ordered(env);
        batches
            .into_iter()
            .try_for_each(|batch| self.write_batch(batch))
    }

    fn configure(&self, config: Envelope, _config_seq: u64) -> Result<(), ConsensusError> {
        self.check_running()?;
        let pending = self.support.block_cutter().cut();
        if !pending.is_empty() {
            self.write_batch(pending)?;
        }
        let block = self.support.create_next_block(vec![config])?;
        self.support.write_config_block(block, &[])
    }

    fn start(&self) {
        self.starts.fetch_add(1, Ordering::SeqCst);
    }

    fn halt(&self) {
        self.halted.store(true, Ordering::SeqCst);
    }
}
