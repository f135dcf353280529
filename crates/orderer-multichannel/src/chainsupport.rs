use std::sync::Arc;

use orderer_blockcutter::Receiver;
use orderer_configtx::{ConfigError, SharedConfigSource};
use orderer_consensus::{Chain, ConsenterRegistry, ConsenterSupport};
use orderer_crypto::LocalSigner;
use orderer_ledger::{last_block, LedgerError, Reader};
use orderer_msgprocessor::{Processor, RuleSet, StandardChannel};
use orderer_types::{
    metadata_from_block, BlockMetadataIndex, ChannelId, Config, ConfigEnvelope, Envelope,
};
use tracing::{debug, info, info_span, Span};

use crate::blockwriter::BlockWriter;
use crate::channel::ChannelCore;
use crate::config::MultichannelConfig;
use crate::error::{BootstrapError, ConfigUpdateError};
use crate::resources::LedgerResources;
use crate::support::ChannelSupport;

/// The runtime of one channel: ledger, signer, batching handle, message
/// processor, block writer and consensus chain.
///
/// Built once per channel by [`ChainSupport::bootstrap`]. All accessors are
/// safe to call concurrently once it has been returned.
pub struct ChainSupport {
    support: Arc<ChannelSupport>,
    chain: Arc<dyn Chain>,
    system_channel: bool,
    span: Span,
}

impl std::fmt::Debug for ChainSupport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainSupport")
            .field("system_channel", &self.system_channel)
            .finish_non_exhaustive()
    }
}

impl ChainSupport {
    /// Resume a channel from the newest block of its ledger.
    ///
    /// Reads the orderer metadata from the last block, wires the channel's
    /// collaborators and asks the consenter registered for the channel's
    /// consensus type to build its chain. The chain is not started.
    pub fn bootstrap(
        resources: Arc<LedgerResources>,
        consenters: &ConsenterRegistry,
        signer: Arc<dyn LocalSigner>,
        config: &MultichannelConfig,
    ) -> Result<Self, BootstrapError> {
        let channel = resources.channel_id();
        let span = info_span!("channel", channel = %channel);
        span.in_scope(|| Self::assemble(channel, resources, consenters, signer, config, &span))
    }

    fn assemble(
        channel: ChannelId,
        resources: Arc<LedgerResources>,
        consenters: &ConsenterRegistry,
        signer: Arc<dyn LocalSigner>,
        config: &MultichannelConfig,
        span: &Span,
    ) -> Result<Self, BootstrapError> {
        let last = last_block(resources.as_ref()).map_err(|source| match source {
            LedgerError::Empty => BootstrapError::EmptyLedger {
                channel: channel.clone(),
            },
            source => BootstrapError::LedgerRead {
                channel: channel.clone(),
                source,
            },
        })?;

        // A block built with `Block::new` has an empty orderer slot, which decodes fine.
        let metadata = metadata_from_block(&last, BlockMetadataIndex::Orderer).map_err(|source| {
            BootstrapError::Corruption {
                channel: channel.clone(),
                source,
            }
        })?;
        debug!(
            last_block = last.number(),
            metadata_bytes = metadata.value.len(),
            "Read orderer metadata"
        );

        let core = Arc::new(ChannelCore::new(
            resources.clone(),
            signer,
            config.capabilities.clone(),
            span.clone(),
        ));
        let processor = StandardChannel::new(core.clone(), RuleSet::standard(resources.clone()));
        let writer = BlockWriter::new(last, core.clone()).map_err(|source| {
            BootstrapError::Corruption {
                channel: channel.clone(),
                source,
            }
        })?;
        let support = Arc::new(ChannelSupport::new(core, processor, writer));

        let consensus_type = resources.shared_config().consensus_type().to_string();
        let consenter =
            consenters
                .get(&consensus_type)
                .ok_or_else(|| BootstrapError::Misconfiguration {
                    channel: channel.clone(),
                    consensus_type: consensus_type.clone(),
                    available: consenters.types(),
                })?;

        let chain = consenter
            .handle_chain(support.clone(), &metadata)
            .map_err(|source| BootstrapError::ConsenterCreation {
                channel: channel.clone(),
                consensus_type: consensus_type.clone(),
                source,
            })?;

        info!(
            consensus_type = %consensus_type,
            height = resources.height(),
            sequence = resources.configtx_validator().sequence(),
            "Done creating channel support resources"
        );

        Ok(Self {
            support,
            chain,
            system_channel: config.is_system_channel(channel.as_str()),
            span: span.clone(),
        })
    }

    pub fn channel_id(&self) -> ChannelId {
        self.support.core().channel_id()
    }

    /// The channel's ledger, read-only.
    pub fn reader(&self) -> &dyn Reader {
        self.support.core().resources().as_ref()
    }

    pub fn height(&self) -> u64 {
        self.reader().height()
    }

    pub fn signer(&self) -> Arc<dyn LocalSigner> {
        self.support.core().signer().clone()
    }

    pub fn block_cutter(&self) -> &dyn Receiver {
        self.support.core().block_cutter()
    }

    pub fn processor(&self) -> &dyn Processor {
        self.support.processor()
    }

    pub fn chain(&self) -> &Arc<dyn Chain> {
        &self.chain
    }

    pub fn block_writer(&self) -> &BlockWriter {
        self.support.block_writer()
    }

    /// Start the consensus chain.
    pub fn start(&self) {
        let _entered = self.span.enter();
        info!("Starting chain");
        self.chain.start();
    }

    /// Halt the consensus chain.
    pub fn halt(&self) {
        let _entered = self.span.enter();
        info!("Halting chain");
        self.chain.halt();
    }

    /// The current committed configuration.
    pub fn config_proto(&self) -> Config {
        self.resources().configtx_validator().config_proto()
    }

    /// Sequence of the current committed configuration.
    pub fn sequence(&self) -> u64 {
        self.resources().configtx_validator().sequence()
    }

    pub fn validate(&self, config_env: &ConfigEnvelope) -> Result<(), ConfigError> {
        self.resources().configtx_validator().validate(config_env)
    }

    /// Validate a config update against the channel and return the config
    /// envelope to order. The committed configuration is not changed.
    pub fn propose_config_update(
        &self,
        env: &Envelope,
    ) -> Result<ConfigEnvelope, ConfigUpdateError> {
        self.support.core().propose_config_update(env)
    }

    /// Release the sequence claimed by a proposal that will not be ordered.
    pub fn release_config_update(&self, config_env: &ConfigEnvelope) {
        self.support.core().release_config_update(config_env)
    }

    /// Log the system channel's configuration. Changes nothing and never fails.
    pub fn log_system_channel_info(&self) {
        let _entered = self.span.enter();
        if !self.system_channel {
            debug!("Not the system channel, nothing to log");
            return;
        }

        let bundle = self.resources().bundle();
        let channel_config = bundle.channel_config();
        info!(
            sequence = bundle.sequence(),
            consensus_type = %channel_config.orderer.consensus.name,
            capabilities = ?channel_config.capabilities,
            policies = ?channel_config.policies.keys().collect::<Vec<_>>(),
            "System channel config"
        );
        match bundle.application_config() {
            Some(application) => info!(
                organizations = ?application.organizations.keys().collect::<Vec<_>>(),
                capabilities = ?application.capabilities,
                "System channel application config"
            ),
            None => info!("System channel has no application config"),
        }
    }

    fn resources(&self) -> &Arc<LedgerResources> {
        self.support.core().resources()
    }
}
