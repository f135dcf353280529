use serde::{Deserialize, Serialize};

use crate::encoding::{decode, encode};
use crate::error::{MetadataError, TypesError};

/// Reserved metadata slots carried by every block.
///
/// The discriminant is the slot's position in [`BlockMetadata::metadata`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockMetadataIndex {
    Signatures = 0,
    LastConfig = 1,
    TransactionsFilter = 2,
    Orderer = 3,
}

impl BlockMetadataIndex {
    /// Number of reserved slots.
    pub const COUNT: usize = 4;

    pub fn position(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub number: u64,
    pub previous_hash: Vec<u8>,
    pub data_hash: Vec<u8>,
}

impl BlockHeader {
    /// BLAKE3 hash chaining this header to its successor.
    pub fn hash(&self) -> Vec<u8> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.number.to_be_bytes());
        hasher.update(&(self.previous_hash.len() as u64).to_be_bytes());
        hasher.update(&self.previous_hash);
        hasher.update(&self.data_hash);
        hasher.finalize().as_bytes().to_vec()
    }

    /// Canonical bytes of the header, the message block signatures cover.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + self.previous_hash.len() + self.data_hash.len());
        out.extend_from_slice(&self.number.to_be_bytes());
        out.extend_from_slice(&self.previous_hash);
        out.extend_from_slice(&self.data_hash);
        out
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockData {
    /// Encoded envelopes, in order.
    pub data: Vec<Vec<u8>>,
}

impl BlockData {
    pub fn hash(&self) -> Vec<u8> {
        let mut hasher = blake3::Hasher::new();
        for tx in &self.data {
            hasher.update(&(tx.len() as u64).to_be_bytes());
            hasher.update(tx);
        }
        hasher.finalize().as_bytes().to_vec()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMetadata {
    /// One encoded [`Metadata`] per reserved slot. Empty bytes mean an empty slot.
    pub metadata: Vec<Vec<u8>>,
}

/// A block of the append-only channel ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub data: BlockData,
    pub metadata: BlockMetadata,
}

impl Block {
    /// Create an empty block with every reserved metadata slot allocated and empty.
    pub fn new(number: u64, previous_hash: Vec<u8>) -> Self {
        Self {
            header: BlockHeader {
                number,
                previous_hash,
                data_hash: Vec::new(),
            },
            data: BlockData::default(),
            metadata: BlockMetadata {
                metadata: vec![Vec::new(); BlockMetadataIndex::COUNT],
            },
        }
    }

    pub fn number(&self) -> u64 {
        self.header.number
    }

    /// Store `metadata` in the reserved slot `index`, growing the slot list if needed.
    pub fn set_metadata(
        &mut self,
        index: BlockMetadataIndex,
        metadata: &Metadata,
    ) -> Result<(), TypesError> {
        let position = index.position();
        if self.metadata.metadata.len() <= position {
            self.metadata.metadata.resize(BlockMetadataIndex::COUNT, Vec::new());
        }
        self.metadata.metadata[position] = metadata.encode()?;
        Ok(())
    }
}

/// Signature over a block's metadata value and header.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataSignature {
    /// Encoded [`crate::SignatureHeader`].
    pub signature_header: Vec<u8>,
    pub signature: Vec<u8>,
}

/// Content of a metadata slot.
///
/// For the orderer slot, `value` is consensus-engine resumption state and is
/// legitimately empty for a freshly created channel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub value: Vec<u8>,
    pub signatures: Vec<MetadataSignature>,
}

impl Metadata {
    pub fn with_value(value: Vec<u8>) -> Self {
        Self {
            value,
            signatures: Vec::new(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, TypesError> {
        encode(self)
    }

    /// Decode slot content. An empty slot decodes to empty metadata.
    pub fn decode(raw: &[u8]) -> Result<Self, TypesError> {
        if raw.is_empty() {
            return Ok(Self::default());
        }
        decode("block metadata", raw)
    }
}

/// Value of the last-config slot: number of the newest configuration block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastConfig {
    pub index: u64,
}

/// Extract the metadata stored in slot `index` of `block`.
///
/// Never fails on an empty slot. Fails if the slot is absent or its content
/// does not decode.
pub fn metadata_from_block(
    block: &Block,
    index: BlockMetadataIndex,
) -> Result<Metadata, MetadataError> {
    let raw = block
        .metadata
        .metadata
        .get(index.position())
        .ok_or(MetadataError::MissingSlot {
            number: block.number(),
            index,
            slots: block.metadata.metadata.len(),
        })?;

    Metadata::decode(raw).map_err(|e| MetadataError::Malformed {
        number: block.number(),
        index,
        reason: e.to_string(),
    })
}

/// Extract the last-config index recorded in `block`. An empty slot reads as 0.
pub fn last_config_index_from_block(block: &Block) -> Result<u64, MetadataError> {
    let metadata = metadata_from_block(block, BlockMetadataIndex::LastConfig)?;
    if metadata.value.is_empty() {
        return Ok(0);
    }
    let last_config: LastConfig =
        decode("last config", &metadata.value).map_err(|e| MetadataError::Malformed {
            number: block.number(),
            index: BlockMetadataIndex::LastConfig,
            reason: e.to_string(),
        })?;
    Ok(last_config.index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_block_has_all_slots_empty() {
        let block = Block::new(0, vec![]);
        assert_eq!(block.metadata.metadata.len(), BlockMetadataIndex::COUNT);
        assert!(block.metadata.metadata.iter().all(|m| m.is_empty()));
    }

    #[test]
    fn empty_orderer_slot_yields_empty_metadata() {
        let block = Block::new(7, vec![1, 2, 3]);
        let metadata = metadata_from_block(&block, BlockMetadataIndex::Orderer).unwrap();
        assert!(metadata.value.is_empty());
        assert!(metadata.signatures.is_empty());
    }

    #[test]
    fn stored_metadata_is_extracted() {
        let mut block = Block::new(3, vec![]);
        block
            .set_metadata(
                BlockMetadataIndex::Orderer,
                &Metadata::with_value(b"raft-index:42".to_vec()),
            )
            .unwrap();
        let metadata = metadata_from_block(&block, BlockMetadataIndex::Orderer).unwrap();
        assert_eq!(metadata.value, b"raft-index:42");
    }

    #[test]
    fn malformed_slot_is_an_error() {
        let mut block = Block::new(5, vec![]);
        block.metadata.metadata[BlockMetadataIndex::Orderer.position()] = vec![0xde, 0xad];
        let err = metadata_from_block(&block, BlockMetadataIndex::Orderer).unwrap_err();
        assert!(matches!(err, MetadataError::Malformed { number: 5, .. }));
    }

    #[test]
    fn missing_slot_is_an_error() {
        let mut block = Block::new(2, vec![]);
        block.metadata.metadata.truncate(1);
        let err = metadata_from_block(&block, BlockMetadataIndex::Orderer).unwrap_err();
        assert!(matches!(err, MetadataError::MissingSlot { slots: 1, .. }));
    }

    #[test]
    fn last_config_defaults_to_zero() {
        let block = Block::new(9, vec![]);
        assert_eq!(last_config_index_from_block(&block).unwrap(), 0);

        let mut block = Block::new(9, vec![]);
        let value = encode(&LastConfig { index: 4 }).unwrap();
        block
            .set_metadata(BlockMetadataIndex::LastConfig, &Metadata::with_value(value))
            .unwrap();
        assert_eq!(last_config_index_from_block(&block).unwrap(), 4);
    }

    #[test]
    fn header_hash_depends_on_chain() {
        let a = Block::new(1, vec![0; 32]);
        let b = Block::new(1, vec![1; 32]);
        assert_ne!(a.header.hash(), b.header.hash());
    }

    proptest! {
        #[test]
        fn arbitrary_values_survive_a_slot(value in proptest::collection::vec(any::<u8>(), 0..256)) {
            let mut block = Block::new(1, vec![]);
            block
                .set_metadata(BlockMetadataIndex::Orderer, &Metadata::with_value(value.clone()))
                .unwrap();
            let metadata = metadata_from_block(&block, BlockMetadataIndex::Orderer).unwrap();
            prop_assert_eq!(metadata.value, value);
        }

        #[test]
        fn non_json_garbage_never_decodes(raw in proptest::collection::vec(0x80u8..=0xff, 1..64)) {
            // Bytes >= 0x80 can never start a valid JSON document.
            let mut block = Block::new(1, vec![]);
            block.metadata.metadata[BlockMetadataIndex::Orderer.position()] = raw;
            let is_malformed = matches!(
                metadata_from_block(&block, BlockMetadataIndex::Orderer),
                Err(MetadataError::Malformed { .. })
            );
            prop_assert!(is_malformed);
        }
    }
}
