use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::encoding::{decode, encode};
use crate::error::TypesError;
use crate::ids::ChannelId;

/// Kind of message an envelope carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeaderType {
    /// Ordinary transaction.
    Message,
    /// Full configuration (a `ConfigEnvelope`), produced by the orderer.
    Config,
    /// Proposed configuration change (a `ConfigUpdateEnvelope`), submitted by clients.
    ConfigUpdate,
    /// System-channel transaction wrapping another channel's config.
    OrdererTransaction,
}

impl std::fmt::Display for HeaderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HeaderType::Message => "MESSAGE",
            HeaderType::Config => "CONFIG",
            HeaderType::ConfigUpdate => "CONFIG_UPDATE",
            HeaderType::OrdererTransaction => "ORDERER_TRANSACTION",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelHeader {
    pub header_type: HeaderType,
    pub channel_id: ChannelId,
    pub tx_id: String,
    pub timestamp: DateTime<Utc>,
    pub epoch: u64,
}

/// Identity and replay-protection nonce of the message creator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureHeader {
    pub creator: Vec<u8>,
    pub nonce: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub channel_header: ChannelHeader,
    pub signature_header: SignatureHeader,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub header: Header,
    /// Encoded body; its type is determined by `header.channel_header.header_type`.
    pub data: Vec<u8>,
}

impl Payload {
    pub fn encode(&self) -> Result<Vec<u8>, TypesError> {
        encode(self)
    }
}

/// Signed wrapper around an encoded [`Payload`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
}

impl Envelope {
    /// Decode the payload this envelope carries.
    pub fn payload(&self) -> Result<Payload, TypesError> {
        decode("payload", &self.payload)
    }

    /// Decode only the channel header.
    pub fn channel_header(&self) -> Result<ChannelHeader, TypesError> {
        Ok(self.payload()?.header.channel_header)
    }

    pub fn encode(&self) -> Result<Vec<u8>, TypesError> {
        encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, TypesError> {
        decode("envelope", bytes)
    }

    /// Total encoded size, as counted by batch size limits.
    pub fn size_bytes(&self) -> usize {
        self.payload.len() + self.signature.len()
    }
}
