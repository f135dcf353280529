use thiserror::Error;

use crate::block::BlockMetadataIndex;

/// Errors from encoding or decoding shared types.
#[derive(Error, Debug)]
pub enum TypesError {
    #[error("encoding error: {0}")]
    Encode(String),

    #[error("decoding {what} failed: {reason}")]
    Decode { what: &'static str, reason: String },

    #[error("invalid channel id: {0:?}")]
    InvalidChannelId(String),

    #[error("block {number} carries no transactions")]
    EmptyBlock { number: u64 },
}

/// Errors extracting metadata from a block's reserved slots.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("block {number} has no metadata slot {index:?} ({slots} slots present)")]
    MissingSlot {
        number: u64,
        index: BlockMetadataIndex,
        slots: usize,
    },

    #[error("malformed metadata in slot {index:?} of block {number}: {reason}")]
    Malformed {
        number: u64,
        index: BlockMetadataIndex,
        reason: String,
    },
}
