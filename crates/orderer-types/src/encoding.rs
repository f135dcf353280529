//! Canonical byte encoding for everything stored in blocks and envelopes.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::TypesError;

/// Encode a value into its canonical byte form.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, TypesError> {
    serde_json::to_vec(value).map_err(|e| TypesError::Encode(e.to_string()))
}

/// Decode a value from its canonical byte form.
///
/// `what` names the decoded structure in the error message.
pub fn decode<T: DeserializeOwned>(what: &'static str, bytes: &[u8]) -> Result<T, TypesError> {
    serde_json::from_slice(bytes).map_err(|e| TypesError::Decode {
        what,
        reason: e.to_string(),
    })
}
