//! Error types for the channel core

use orderer_configtx::ConfigError;
use orderer_consensus::ConsensusError;
use orderer_crypto::CryptoError;
use orderer_ledger::LedgerError;
use orderer_types::{ChannelId, HeaderType, MetadataError, TypesError};
use thiserror::Error;

/// Fatal conditions while bootstrapping one channel.
///
/// Each is fatal to the affected channel only. Whether that halts the
/// process is the caller's decision.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("channel {channel}: ledger is empty, there is no block to resume from")]
    EmptyLedger { channel: ChannelId },

    #[error("channel {channel}: failed to read last block: {source}")]
    LedgerRead {
        channel: ChannelId,
        #[source]
        source: LedgerError,
    },

    #[error("channel {channel}: corrupt metadata in last block: {source}")]
    Corruption {
        channel: ChannelId,
        #[source]
        source: MetadataError,
    },

    #[error("channel {channel}: consensus type {consensus_type:?} is not registered (available: {available:?})")]
    Misconfiguration {
        channel: ChannelId,
        consensus_type: String,
        available: Vec<String>,
    },

    #[error("channel {channel}: error creating consenter of type {consensus_type:?}: {source}")]
    ConsenterCreation {
        channel: ChannelId,
        consensus_type: String,
        #[source]
        source: ConsensusError,
    },
}

impl BootstrapError {
    pub fn channel(&self) -> &ChannelId {
        match self {
            BootstrapError::EmptyLedger { channel }
            | BootstrapError::LedgerRead { channel, .. }
            | BootstrapError::Corruption { channel, .. }
            | BootstrapError::Misconfiguration { channel, .. }
            | BootstrapError::ConsenterCreation { channel, .. } => channel,
        }
    }

    /// Persisted data is bad.
    pub fn is_corruption(&self) -> bool {
        matches!(self, BootstrapError::Corruption { .. })
    }

    /// The orderer is configured wrong for the channel's data.
    pub fn is_misconfiguration(&self) -> bool {
        matches!(self, BootstrapError::Misconfiguration { .. })
    }
}

/// A resource-compatibility failure of a candidate configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResourceError {
    #[error("{scope} capability {name} is required but not supported by this orderer")]
    UnsupportedCapability { scope: &'static str, name: String },

    #[error("channel policy {policy} references sub-policy {sub_policy} which the {group} group does not define")]
    MissingSubPolicy {
        policy: String,
        sub_policy: String,
        group: String,
    },

    #[error("orderer group does not define the {0} policy")]
    MissingOrdererPolicy(String),
}

/// Rejection of a proposed config update. The channel keeps running unchanged.
#[derive(Debug, Error)]
pub enum ConfigUpdateError {
    #[error(transparent)]
    Rejected(#[from] ConfigError),

    #[error("config update is not compatible: {0}")]
    Incompatible(#[source] ResourceError),
}

impl ConfigUpdateError {
    /// Whether the update lost the race for its sequence.
    pub fn is_stale_sequence(&self) -> bool {
        matches!(self, ConfigUpdateError::Rejected(e) if e.is_stale_sequence())
    }
}

/// Block writing errors
#[derive(Debug, Error)]
pub enum BlockWriterError {
    #[error("block encoding failed: {0}")]
    Encoding(#[from] TypesError),

    #[error("ledger append failed: {0}")]
    Ledger(#[from] LedgerError),

    #[error("config block rejected: {0}")]
    Config(#[from] ConfigError),

    #[error("block signing failed: {0}")]
    Signing(#[from] CryptoError),

    #[error("config block carries a {0} transaction, which this channel cannot apply")]
    UnsupportedConfigType(HeaderType),
}

/// Errors loading a channel's resources from its ledger.
#[derive(Debug, Error)]
pub enum LedgerResourcesError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("last config index unreadable: {0}")]
    Metadata(#[from] MetadataError),

    #[error("config block unreadable: {0}")]
    Encoding(#[from] TypesError),

    #[error("stored config is invalid: {0}")]
    Config(#[from] ConfigError),
}
