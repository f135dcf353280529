use std::sync::Arc;

use orderer_configtx::{
    Bundle, BundleSource, ConfigError, ConfigtxValidator, SharedConfig, SharedConfigSource,
};
use orderer_ledger::{last_block, LedgerError, ReadWriter, Reader};
use orderer_types::{last_config_index_from_block, Block, ChannelId, Config};
use tracing::info;

use crate::configblock::config_envelope_from_block;
use crate::error::LedgerResourcesError;

/// A channel's block ledger together with its current configuration.
pub struct LedgerResources {
    config: BundleSource,
    ledger: Arc<dyn ReadWriter>,
}

impl LedgerResources {
    pub fn new(config: BundleSource, ledger: Arc<dyn ReadWriter>) -> Self {
        Self { config, ledger }
    }

    /// Load the current configuration from the newest config block of `ledger`.
    pub fn from_ledger(ledger: Arc<dyn ReadWriter>) -> Result<Self, LedgerResourcesError> {
        let last = last_block(ledger.as_ref())?;
        let config_index = last_config_index_from_block(&last)?;
        let config_block = ledger.block(config_index)?;
        let (channel_id, config_env) = config_envelope_from_block(&config_block)?;

        info!(
            channel = %channel_id,
            height = ledger.height(),
            config_block = config_index,
            sequence = config_env.config.sequence,
            "Loaded channel resources from ledger"
        );

        let config = BundleSource::from_config(channel_id, config_env.config)?;
        Ok(Self::new(config, ledger))
    }

    pub fn channel_id(&self) -> ChannelId {
        self.config.validator().channel_id()
    }

    pub fn configtx_validator(&self) -> &Arc<dyn ConfigtxValidator> {
        self.config.validator()
    }

    pub fn bundle(&self) -> Arc<Bundle> {
        self.config.bundle()
    }

    pub fn create_bundle(&self, config: Config) -> Result<Bundle, ConfigError> {
        self.config.create_bundle(config)
    }

    /// Final validation of `bundle` against the current configuration.
    pub fn validate_new(&self, bundle: &Bundle) -> Result<(), ConfigError> {
        self.config.validate_new(bundle)
    }

    /// Check that `bundle` may be committed next, without changing anything.
    pub fn check_update(&self, bundle: &Bundle) -> Result<(), ConfigError> {
        self.config.check_update(bundle)
    }

    /// Commit `bundle` as the channel's configuration.
    pub fn update(&self, bundle: Bundle) -> Result<(), ConfigError> {
        self.config.update(bundle)
    }

    pub fn append(&self, block: Block) -> Result<(), LedgerError> {
        self.ledger.append(block)
    }
}

impl Reader for LedgerResources {
    fn height(&self) -> u64 {
        self.ledger.height()
    }

    fn block(&self, number: u64) -> Result<Block, LedgerError> {
        self.ledger.block(number)
    }
}

impl SharedConfigSource for LedgerResources {
    fn shared_config(&self) -> SharedConfig {
        self.config.shared_config()
    }
}
