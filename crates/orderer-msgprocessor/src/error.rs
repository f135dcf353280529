use orderer_crypto::CryptoError;
use orderer_types::{HeaderType, TypesError};
use thiserror::Error;

/// Why a message was refused by the channel's processor.
#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("message was empty")]
    EmptyMessage,

    #[error("message payload is {size} bytes and exceeds maximum allowed {max} bytes")]
    MessageTooLarge { size: usize, max: usize },

    #[error("malformed message: {0}")]
    Malformed(String),

    #[error("header type {0} cannot be processed as a config message")]
    NotConfig(HeaderType),

    #[error("normal transactions are rejected: channel is in maintenance mode")]
    Maintenance,

    #[error("config update rejected: {0}")]
    ConfigUpdate(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("signing failed: {0}")]
    Signing(#[from] CryptoError),
}

impl From<TypesError> for ProcessorError {
    fn from(e: TypesError) -> Self {
        ProcessorError::Malformed(e.to_string())
    }
}
