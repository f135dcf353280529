use std::collections::BTreeSet;
use std::time::Duration;

use orderer_types::{
    ApplicationGroup, BatchSize, ChannelGroup, ChannelId, Config, ConsensusState, ConsensusType,
};

use crate::error::ConfigError;

/// The orderer section of a bundle, as the consensus engine and block cutter see it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SharedConfig {
    consensus: ConsensusType,
    batch_size: BatchSize,
    batch_timeout: Duration,
    capabilities: BTreeSet<String>,
}

impl SharedConfig {
    pub fn consensus_type(&self) -> &str {
        &self.consensus.name
    }

    pub fn consensus_metadata(&self) -> &[u8] {
        &self.consensus.metadata
    }

    pub fn consensus_state(&self) -> ConsensusState {
        self.consensus.state
    }

    pub fn batch_size(&self) -> BatchSize {
        self.batch_size
    }

    pub fn batch_timeout(&self) -> Duration {
        self.batch_timeout
    }

    pub fn capabilities(&self) -> &BTreeSet<String> {
        &self.capabilities
    }
}

/// Anything that can hand out the channel's current orderer config.
pub trait SharedConfigSource: Send + Sync {
    fn shared_config(&self) -> SharedConfig;
}

/// Immutable, validated snapshot of one channel configuration.
#[derive(Clone, Debug)]
pub struct Bundle {
    channel_id: ChannelId,
    config: Config,
    shared: SharedConfig,
}

impl Bundle {
    /// Build a bundle, rejecting configurations that cannot drive an orderer.
    pub fn new(channel_id: ChannelId, config: Config) -> Result<Self, ConfigError> {
        check_structure(&config.channel)?;

        let orderer = &config.channel.orderer;
        let shared = SharedConfig {
            consensus: orderer.consensus.clone(),
            batch_size: orderer.batch_size,
            batch_timeout: orderer.batch_timeout,
            capabilities: orderer.capabilities.clone(),
        };

        Ok(Self {
            channel_id,
            config,
            shared,
        })
    }

    pub fn channel_id(&self) -> &ChannelId {
        &self.channel_id
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sequence(&self) -> u64 {
        self.config.sequence
    }

    pub fn shared_config(&self) -> &SharedConfig {
        &self.shared
    }

    pub fn channel_config(&self) -> &ChannelGroup {
        &self.config.channel
    }

    /// `None` on orderer-only channels.
    pub fn application_config(&self) -> Option<&ApplicationGroup> {
        self.config.channel.application.as_ref()
    }
}

fn check_structure(group: &ChannelGroup) -> Result<(), ConfigError> {
    let orderer = &group.orderer;
    if orderer.consensus.name.is_empty() {
        return Err(ConfigError::Invalid("consensus type name is empty".into()));
    }

    let batch = &orderer.batch_size;
    if batch.max_message_count == 0 {
        return Err(ConfigError::Invalid(
            "batch size max_message_count must be positive".into(),
        ));
    }
    if batch.absolute_max_bytes == 0 {
        return Err(ConfigError::Invalid(
            "batch size absolute_max_bytes must be positive".into(),
        ));
    }
    if batch.preferred_max_bytes == 0 || batch.preferred_max_bytes > batch.absolute_max_bytes {
        return Err(ConfigError::Invalid(format!(
            "batch size preferred_max_bytes {} must be in 1..={}",
            batch.preferred_max_bytes, batch.absolute_max_bytes
        )));
    }
    if orderer.batch_timeout.is_zero() {
        return Err(ConfigError::Invalid("batch timeout must be positive".into()));
    }

    if let Some(application) = &group.application {
        if let Some((name, _)) = application
            .organizations
            .iter()
            .find(|(_, org)| org.msp_id.is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "application organization {name} has no MSP id"
            )));
        }
    }

    Ok(())
}
