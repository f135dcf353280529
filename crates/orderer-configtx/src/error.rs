use orderer_types::{ChannelId, HeaderType, TypesError};
use thiserror::Error;

/// Rejections from configuration validation.
///
/// Every variant is recoverable: the channel keeps its current configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("malformed config update: {0}")]
    Malformed(String),

    #[error("expected a {expected} envelope, got {got}")]
    UnexpectedHeaderType {
        expected: HeaderType,
        got: HeaderType,
    },

    #[error("config update for channel {got} submitted to channel {expected}")]
    WrongChannel { expected: ChannelId, got: ChannelId },

    #[error("config update built against sequence {built_against} is stale: current sequence is {current}")]
    StaleSequence { built_against: u64, current: u64 },

    #[error("config sequence {sequence} is already claimed by another pending update")]
    SequenceClaimed { sequence: u64 },

    #[error("config update does not modify the channel configuration")]
    NoChanges,

    #[error("config envelope does not match the config its update produces")]
    ConfigMismatch,

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("attempted to change consensus type from {from} to {to} outside maintenance mode")]
    ConsensusTypeChange { from: String, to: String },
}

impl ConfigError {
    /// Whether the rejection means the update lost the race for its sequence.
    pub fn is_stale_sequence(&self) -> bool {
        matches!(
            self,
            ConfigError::StaleSequence { .. } | ConfigError::SequenceClaimed { .. }
        )
    }
}

impl From<TypesError> for ConfigError {
    fn from(e: TypesError) -> Self {
        ConfigError::Malformed(e.to_string())
    }
}
