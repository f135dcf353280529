use std::sync::Arc;

use orderer_blockcutter::{CuttingReceiver, Receiver};
use orderer_configtx::{SharedConfig, SharedConfigSource};
use orderer_crypto::LocalSigner;
use orderer_msgprocessor::{ProcessorError, StandardChannelSupport};
use orderer_types::{ChannelId, ConfigEnvelope, Envelope};
use tracing::{debug, warn, Span};

use crate::compat::check_resources;
use crate::config::CapabilitiesConfig;
use crate::error::ConfigUpdateError;
use crate::resources::LedgerResources;

/// The part of a channel runtime that exists before its processor, block
/// writer and consensus chain are attached.
///
/// Those collaborators hold it as their back-reference into the channel.
pub struct ChannelCore {
    resources: Arc<LedgerResources>,
    signer: Arc<dyn LocalSigner>,
    cutter: CuttingReceiver,
    capabilities: CapabilitiesConfig,
    span: Span,
}

impl ChannelCore {
    pub fn new(
        resources: Arc<LedgerResources>,
        signer: Arc<dyn LocalSigner>,
        capabilities: CapabilitiesConfig,
        span: Span,
    ) -> Self {
        let cutter = CuttingReceiver::new(resources.clone());
        Self {
            resources,
            signer,
            cutter,
            capabilities,
            span,
        }
    }

    pub fn channel_id(&self) -> ChannelId {
        self.resources.channel_id()
    }

    pub fn resources(&self) -> &Arc<LedgerResources> {
        &self.resources
    }

    pub fn signer(&self) -> &Arc<dyn LocalSigner> {
        &self.signer
    }

    pub fn block_cutter(&self) -> &dyn Receiver {
        &self.cutter
    }

    /// Span every event about this channel is recorded in.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Validate a config update and return the config envelope it produces.
    ///
    /// The candidate is built into a bundle, checked for compatibility with
    /// this orderer, and finally validated against the current sequence,
    /// which claims the next sequence for it. Nothing is committed.
    pub fn propose_config_update(
        &self,
        env: &Envelope,
    ) -> Result<ConfigEnvelope, ConfigUpdateError> {
        let _entered = self.span.enter();

        let config_env = self
            .resources
            .configtx_validator()
            .propose_config_update(env)?;

        let bundle = self.resources.create_bundle(config_env.config.clone())?;

        if let Err(e) = check_resources(&bundle, &self.capabilities) {
            warn!(
                sequence = bundle.sequence(),
                error = %e,
                "Rejected incompatible config update"
            );
            return Err(ConfigUpdateError::Incompatible(e));
        }

        self.resources.validate_new(&bundle)?;
        debug!(sequence = bundle.sequence(), "Config update accepted");
        Ok(config_env)
    }

    /// Give up the sequence claimed by a proposal that will not be ordered.
    pub fn release_config_update(&self, config_env: &ConfigEnvelope) {
        let _entered = self.span.enter();
        self.resources
            .configtx_validator()
            .release(&config_env.config);
    }
}

impl StandardChannelSupport for ChannelCore {
    fn channel_id(&self) -> ChannelId {
        ChannelCore::channel_id(self)
    }

    fn sequence(&self) -> u64 {
        self.resources.configtx_validator().sequence()
    }

    fn shared_config(&self) -> SharedConfig {
        self.resources.shared_config()
    }

    fn signer(&self) -> Arc<dyn LocalSigner> {
        self.signer.clone()
    }

    fn propose_config_update(&self, env: &Envelope) -> Result<ConfigEnvelope, ProcessorError> {
        ChannelCore::propose_config_update(self, env)
            .map_err(|e| ProcessorError::ConfigUpdate(Box::new(e)))
    }

    fn release_config_update(&self, config_env: &ConfigEnvelope) {
        ChannelCore::release_config_update(self, config_env)
    }
}
