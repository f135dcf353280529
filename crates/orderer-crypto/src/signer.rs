use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier as _, VerifyingKey};
use orderer_types::SignatureHeader;

use crate::error::CryptoError;

/// Nonce length carried in every signature header.
const NONCE_LEN: usize = 24;

/// The orderer's local signing identity.
pub trait LocalSigner: Send + Sync {
    /// A fresh signature header: creator identity plus a random nonce.
    fn new_signature_header(&self) -> Result<SignatureHeader, CryptoError>;

    /// Sign `message` with the local identity.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// Ed25519 signer. The creator identity is the 32-byte verifying key.
pub struct Ed25519Signer {
    key: SigningKey,
}

impl Ed25519Signer {
    /// Generate a signer from fresh random key material.
    pub fn generate() -> Self {
        let secret: [u8; 32] = rand::random();
        Self::from_secret(&secret)
    }

    pub fn from_secret(secret: &[u8; 32]) -> Self {
        Self {
            key: SigningKey::from_bytes(secret),
        }
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.key.verifying_key().to_bytes()
    }
}

impl std::fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

impl LocalSigner for Ed25519Signer {
    fn new_signature_header(&self) -> Result<SignatureHeader, CryptoError> {
        let nonce: Vec<u8> = (0..NONCE_LEN).map(|_| rand::random::<u8>()).collect();
        Ok(SignatureHeader {
            creator: self.public_key().to_vec(),
            nonce,
        })
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(self.key.sign(message).to_bytes().to_vec())
    }
}

/// Verify an Ed25519 `signature` over `message` by `creator`.
pub fn verify(creator: &[u8], message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
    let key_bytes: [u8; 32] = creator
        .try_into()
        .map_err(|_| CryptoError::InvalidKey(format!("expected 32 bytes, got {}", creator.len())))?;
    let key =
        VerifyingKey::from_bytes(&key_bytes).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    let sig_bytes: [u8; 64] = signature
        .try_into()
        .map_err(|_| CryptoError::VerificationFailed)?;
    key.verify(message, &Signature::from_bytes(&sig_bytes))
        .map_err(|_| CryptoError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify() {
        let signer = Ed25519Signer::from_secret(&[7u8; 32]);
        let sig = signer.sign(b"block-bytes").unwrap();
        assert!(verify(&signer.public_key(), b"block-bytes", &sig).is_ok());
        assert!(matches!(
            verify(&signer.public_key(), b"other-bytes", &sig),
            Err(CryptoError::VerificationFailed)
        ));
    }

    #[test]
    fn signature_header_carries_creator_and_fresh_nonce() {
        let signer = Ed25519Signer::generate();
        let a = signer.new_signature_header().unwrap();
        let b = signer.new_signature_header().unwrap();
        assert_eq!(a.creator, signer.public_key().to_vec());
        assert_eq!(a.nonce.len(), NONCE_LEN);
        assert_ne!(a.nonce, b.nonce);
    }

    #[test]
    fn short_creator_is_rejected() {
        assert!(matches!(
            verify(&[1, 2, 3], b"msg", &[0u8; 64]),
            Err(CryptoError::InvalidKey(_))
        ));
    }
}
