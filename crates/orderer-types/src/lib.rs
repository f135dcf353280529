//! Core type definitions for the channel ordering core.
//!
//! This crate provides the shared data model. No business logic, just types
//! and their byte encodings. Every orderer crate depends on this crate.

pub mod block;
pub mod config;
pub mod encoding;
pub mod envelope;
pub mod error;
pub mod ids;

// Re-export primary types at crate root for ergonomic use.
pub use block::{
    last_config_index_from_block, metadata_from_block, Block, BlockData, BlockHeader,
    BlockMetadata, BlockMetadataIndex, LastConfig, Metadata, MetadataSignature,
};
pub use config::{
    policy_names, ApplicationGroup, BatchSize, ChannelGroup, Config, ConfigEnvelope, ConfigSignature,
    ConfigUpdate, ConfigUpdateEnvelope, ConsensusState, ConsensusType, ImplicitMetaRule,
    OrdererGroup, Organization, Policy,
};
pub use encoding::{decode, encode};
pub use envelope::{ChannelHeader, Envelope, Header, HeaderType, Payload, SignatureHeader};
pub use error::{MetadataError, TypesError};
pub use ids::ChannelId;

/// Well-known consensus type names used as consenter registry keys.
pub mod consensus_types {
    /// Single-node orderer.
    pub const SOLO: &str = "solo";
    /// Leader-based crash-fault-tolerant orderer.
    pub const ETCDRAFT: &str = "etcdraft";
    /// Byzantine-fault-tolerant orderer.
    pub const BFT: &str = "BFT";
}
