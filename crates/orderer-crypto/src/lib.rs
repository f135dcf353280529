//! Local signing identity for the ordering core.
//!
//! - **LocalSigner**: the signing seam every channel runtime exposes
//! - **Ed25519Signer**: reference signer backed by ed25519-dalek
//! - **create_signed_envelope**: builds and signs an envelope around an encoded body

pub mod envelope;
pub mod error;
pub mod signer;

pub use envelope::create_signed_envelope;
pub use error::CryptoError;
pub use signer::{verify, Ed25519Signer, LocalSigner};
