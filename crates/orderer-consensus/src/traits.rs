use std::sync::Arc;

use orderer_blockcutter::Receiver;
use orderer_configtx::SharedConfig;
use orderer_crypto::LocalSigner;
use orderer_msgprocessor::Processor;
use orderer_types::{Block, ChannelId, Envelope, Metadata};

use crate::error::ConsensusError;

/// A running consensus instance for one channel.
pub trait Chain: Send + Sync {
    /// Submit a normal message validated against `config_seq`.
    fn order(&self, env: Envelope, config_seq: u64) -> Result<(), ConsensusError>;

    /// Submit a config message validated against `config_seq`.
    fn configure(&self, config: Envelope, config_seq: u64) -> Result<(), ConsensusError>;

    /// Begin ordering. Called once, after bootstrap has published the channel.
    fn start(&self);

    fn halt(&self);
}

/// The channel as a consensus engine sees it.
pub trait ConsenterSupport: Send + Sync {
    fn channel_id(&self) -> ChannelId;

    fn sequence(&self) -> u64;

    /// Ledger height.
    fn height(&self) -> u64;

    /// Current shared config; never cached by the support.
    fn shared_config(&self) -> SharedConfig;

    fn signer(&self) -> Arc<dyn LocalSigner>;

    fn processor(&self) -> &dyn Processor;

    fn block_cutter(&self) -> &dyn Receiver;

    /// Build the block following the last one created, holding `messages`.
    fn create_next_block(&self, messages: Vec<Envelope>) -> Result<Block, ConsensusError>;

    /// Commit a block of normal messages, recording `encoded_metadata` as orderer metadata.
    fn write_block(&self, block: Block, encoded_metadata: &[u8]) -> Result<(), ConsensusError>;

    /// Commit a config block, installing the configuration it carries.
    fn write_config_block(
        &self,
        block: Block,
        encoded_metadata: &[u8],
    ) -> Result<(), ConsensusError>;
}

/// Factory for chains of one consensus type.
pub trait Consenter: Send + Sync {
    /// Build a chain for the channel behind `support`, resuming from `metadata`.
    ///
    /// `metadata` is empty for a channel the engine has never written to.
    fn handle_chain(
        &self,
        support: Arc<dyn ConsenterSupport>,
        metadata: &Metadata,
    ) -> Result<Arc<dyn Chain>, ConsensusError>;
}
