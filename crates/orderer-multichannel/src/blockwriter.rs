use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use orderer_types::{
    encode, last_config_index_from_block, Block, BlockMetadataIndex, ConfigEnvelope, Envelope,
    HeaderType, LastConfig, Metadata, MetadataError, MetadataSignature, TypesError,
};
use tracing::{debug, info};

use crate::channel::ChannelCore;
use crate::error::BlockWriterError;

struct WriterState {
    last_block: Block,
    last_config_block: u64,
}

/// Builds, signs and appends the channel's blocks.
///
/// Tracks the newest block written and the number of the newest config
/// block, which every written block records in its last-config slot. Both
/// only move once the ledger has accepted a block.
pub struct BlockWriter {
    core: Arc<ChannelCore>,
    state: Mutex<WriterState>,
}

impl BlockWriter {
    /// Resume writing after `last_block`.
    ///
    /// Fails if the block's last-config slot cannot be read.
    pub fn new(last_block: Block, core: Arc<ChannelCore>) -> Result<Self, MetadataError> {
        let last_config_block = last_config_index_from_block(&last_block)?;
        debug!(
            parent: core.span(),
            last_block = last_block.number(),
            last_config_block,
            "Block writer resumed"
        );
        Ok(Self {
            core,
            state: Mutex::new(WriterState {
                last_block,
                last_config_block,
            }),
        })
    }

    // Every update replaces whole fields, so a poisoned state is still consistent.
    fn state(&self) -> MutexGuard<'_, WriterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn last_config_block(&self) -> u64 {
        self.state().last_config_block
    }

    /// Build the block following the newest one written, holding `messages`.
    ///
    /// Blocks are chained to the last written block, so a block that fails
    /// to write is simply rebuilt.
    pub fn create_next_block(&self, messages: Vec<Envelope>) -> Result<Block, BlockWriterError> {
        let data = messages
            .iter()
            .map(Envelope::encode)
            .collect::<Result<Vec<_>, _>>()?;

        let state = self.state();
        let mut block = Block::new(
            state.last_block.number() + 1,
            state.last_block.header.hash(),
        );
        block.data.data = data;
        block.header.data_hash = block.data.hash();
        Ok(block)
    }

    /// Commit a block of normal messages.
    pub fn write_block(&self, block: Block, encoded_metadata: &[u8]) -> Result<(), BlockWriterError> {
        let mut state = self.state();
        let last_config = state.last_config_block;
        self.commit_block(&mut state, block, encoded_metadata, last_config)
    }

    /// Commit `block`, then apply the configuration it carries.
    ///
    /// The configuration is checked to be the channel's next one before the
    /// block is appended and only installed once the append succeeded.
    pub fn write_config_block(
        &self,
        block: Block,
        encoded_metadata: &[u8],
    ) -> Result<(), BlockWriterError> {
        let mut state = self.state();

        let raw = block.data.data.first().ok_or(TypesError::EmptyBlock {
            number: block.number(),
        })?;
        let payload = Envelope::decode(raw)?.payload()?;
        let header_type = payload.header.channel_header.header_type;
        if header_type != HeaderType::Config {
            return Err(BlockWriterError::UnsupportedConfigType(header_type));
        }

        let config_env = ConfigEnvelope::decode(&payload.data)?;
        let resources = self.core.resources();
        let bundle = resources.create_bundle(config_env.config)?;
        resources.check_update(&bundle)?;

        let number = block.number();
        let sequence = bundle.sequence();
        info!(
            parent: self.core.span(),
            number,
            sequence,
            "Writing config block"
        );
        self.commit_block(&mut state, block, encoded_metadata, number)?;
        resources.update(bundle)?;
        Ok(())
    }

    fn commit_block(
        &self,
        state: &mut WriterState,
        mut block: Block,
        encoded_metadata: &[u8],
        last_config_block: u64,
    ) -> Result<(), BlockWriterError> {
        let last_config = encode(&LastConfig {
            index: last_config_block,
        })?;
        block.set_metadata(
            BlockMetadataIndex::LastConfig,
            &Metadata::with_value(last_config.clone()),
        )?;
        block.set_metadata(
            BlockMetadataIndex::Orderer,
            &Metadata::with_value(encoded_metadata.to_vec()),
        )?;

        let signer = self.core.signer();
        let signature_header = encode(&signer.new_signature_header()?)?;
        let mut message = last_config.clone();
        message.extend_from_slice(&signature_header);
        message.extend_from_slice(&block.header.to_bytes());
        let signature = signer.sign(&message)?;
        block.set_metadata(
            BlockMetadataIndex::Signatures,
            &Metadata {
                value: last_config,
                signatures: vec![MetadataSignature {
                    signature_header,
                    signature,
                }],
            },
        )?;

        let number = block.number();
        self.core.resources().append(block.clone())?;
        state.last_block = block;
        state.last_config_block = last_config_block;
        debug!(parent: self.core.span(), number, "Wrote block");
        Ok(())
    }
}
