use orderer_types::TypesError;
use thiserror::Error;

/// Errors from signing operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("signature verification failed")]
    VerificationFailed,

    #[error("encoding error: {0}")]
    Encoding(#[from] TypesError),
}
