use std::sync::Arc;

use orderer_blockcutter::Receiver;
use orderer_configtx::{SharedConfig, SharedConfigSource};
use orderer_consensus::{ConsensusError, ConsenterSupport};
use orderer_crypto::LocalSigner;
use orderer_ledger::Reader;
use orderer_msgprocessor::{Processor, StandardChannel};
use orderer_types::{Block, ChannelId, Envelope};

use crate::blockwriter::BlockWriter;
use crate::channel::ChannelCore;
use crate::error::BlockWriterError;

/// A channel core with its processor and block writer attached.
///
/// This is the view of the channel handed to its consensus engine.
pub struct ChannelSupport {
    core: Arc<ChannelCore>,
    processor: StandardChannel,
    writer: BlockWriter,
}

impl ChannelSupport {
    pub fn new(core: Arc<ChannelCore>, processor: StandardChannel, writer: BlockWriter) -> Self {
        Self {
            core,
            processor,
            writer,
        }
    }

    pub fn core(&self) -> &Arc<ChannelCore> {
        &self.core
    }

    pub fn block_writer(&self) -> &BlockWriter {
        &self.writer
    }
}

fn write_error(e: BlockWriterError) -> ConsensusError {
    ConsensusError::Write(e.to_string())
}

impl ConsenterSupport for ChannelSupport {
    fn channel_id(&self) -> ChannelId {
        self.core.channel_id()
    }

    fn sequence(&self) -> u64 {
        self.core.resources().configtx_validator().sequence()
    }

    fn height(&self) -> u64 {
        self.core.resources().height()
    }

    fn shared_config(&self) -> SharedConfig {
        self.core.resources().shared_config()
    }

    fn signer(&self) -> Arc<dyn LocalSigner> {
        self.core.signer().clone()
    }

    fn processor(&self) -> &dyn Processor {
        &self.processor
    }

    fn block_cutter(&self) -> &dyn Receiver {
        self.core.block_cutter()
    }

    fn create_next_block(&self, messages: Vec<Envelope>) -> Result<Block, ConsensusError> {
        self.writer.create_next_block(messages).map_err(write_error)
    }

    fn write_block(&self, block: Block, encoded_metadata: &[u8]) -> Result<(), ConsensusError> {
        self.writer
            .write_block(block, encoded_metadata)
            .map_err(write_error)
    }

    fn write_config_block(
        &self,
        block: Block,
        encoded_metadata: &[u8],
    ) -> Result<(), ConsensusError> {
        self.writer
            .write_config_block(block, encoded_metadata)
            .map_err(write_error)
    }
}
