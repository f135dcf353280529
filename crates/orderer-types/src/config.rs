use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::encoding::{decode, encode};
use crate::envelope::Envelope;
use crate::error::TypesError;
use crate::ids::ChannelId;

/// Policy names every channel is expected to define.
pub mod policy_names {
    pub const READERS: &str = "Readers";
    pub const WRITERS: &str = "Writers";
    pub const ADMINS: &str = "Admins";
    pub const BLOCK_VALIDATION: &str = "BlockValidation";
}

/// How an implicit-meta policy combines the same-named sub-policies of child groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImplicitMetaRule {
    Any,
    All,
    Majority,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Policy {
    /// At least `n_out_of` of the listed identities must sign.
    Signature {
        n_out_of: u32,
        identities: Vec<String>,
    },
    /// Evaluates `sub_policy` in every child group and combines the results.
    ImplicitMeta {
        rule: ImplicitMetaRule,
        sub_policy: String,
    },
}

impl Policy {
    pub fn implicit_meta(rule: ImplicitMetaRule, sub_policy: impl Into<String>) -> Self {
        Policy::ImplicitMeta {
            rule,
            sub_policy: sub_policy.into(),
        }
    }
}

/// Whether the consensus engine is ordering normally or frozen for maintenance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsensusState {
    #[default]
    Normal,
    Maintenance,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusType {
    /// Consenter registry key, e.g. `etcdraft`.
    pub name: String,
    /// Engine-specific configuration.
    pub metadata: Vec<u8>,
    pub state: ConsensusState,
}

/// Batch cutting parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSize {
    pub max_message_count: u32,
    pub absolute_max_bytes: u32,
    pub preferred_max_bytes: u32,
}

impl Default for BatchSize {
    fn default() -> Self {
        Self {
            max_message_count: 500,
            absolute_max_bytes: 10 * 1024 * 1024,
            preferred_max_bytes: 2 * 1024 * 1024,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdererGroup {
    pub consensus: ConsensusType,
    pub batch_size: BatchSize,
    pub batch_timeout: Duration,
    pub capabilities: BTreeSet<String>,
    pub policies: BTreeMap<String, Policy>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub msp_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationGroup {
    pub organizations: BTreeMap<String, Organization>,
    pub capabilities: BTreeSet<String>,
    pub policies: BTreeMap<String, Policy>,
}

/// Root of a channel's configuration tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelGroup {
    pub capabilities: BTreeSet<String>,
    pub policies: BTreeMap<String, Policy>,
    pub orderer: OrdererGroup,
    pub application: Option<ApplicationGroup>,
}

impl ChannelGroup {
    /// A well-formed orderer-only channel group using `consensus_type`.
    ///
    /// Channel policies are implicit-meta over the orderer group's policies.
    pub fn standard(consensus_type: impl Into<String>) -> Self {
        use policy_names::*;

        let mut channel_policies = BTreeMap::new();
        channel_policies.insert(
            READERS.to_string(),
            Policy::implicit_meta(ImplicitMetaRule::Any, READERS),
        );
        channel_policies.insert(
            WRITERS.to_string(),
            Policy::implicit_meta(ImplicitMetaRule::Any, WRITERS),
        );
        channel_policies.insert(
            ADMINS.to_string(),
            Policy::implicit_meta(ImplicitMetaRule::Majority, ADMINS),
        );

        let member = |n: u32| Policy::Signature {
            n_out_of: n,
            identities: vec!["OrdererMSP.member".to_string()],
        };
        let mut orderer_policies = BTreeMap::new();
        orderer_policies.insert(READERS.to_string(), member(1));
        orderer_policies.insert(WRITERS.to_string(), member(1));
        orderer_policies.insert(
            ADMINS.to_string(),
            Policy::Signature {
                n_out_of: 1,
                identities: vec!["OrdererMSP.admin".to_string()],
            },
        );
        orderer_policies.insert(
            BLOCK_VALIDATION.to_string(),
            Policy::implicit_meta(ImplicitMetaRule::Any, WRITERS),
        );

        Self {
            capabilities: BTreeSet::from(["V2_0".to_string()]),
            policies: channel_policies,
            orderer: OrdererGroup {
                consensus: ConsensusType {
                    name: consensus_type.into(),
                    metadata: Vec::new(),
                    state: ConsensusState::Normal,
                },
                batch_size: BatchSize::default(),
                batch_timeout: Duration::from_secs(2),
                capabilities: BTreeSet::from(["V2_0".to_string()]),
                policies: orderer_policies,
            },
            application: None,
        }
    }
}

/// A full channel configuration at a given sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub sequence: u64,
    pub channel: ChannelGroup,
}

impl Config {
    /// BLAKE3 digest over the canonical encoding; identifies a candidate configuration.
    pub fn digest(&self) -> Result<[u8; 32], TypesError> {
        let bytes = encode(self)?;
        Ok(*blake3::hash(&bytes).as_bytes())
    }
}

/// A configuration together with the update envelope that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEnvelope {
    pub config: Config,
    pub last_update: Envelope,
}

impl ConfigEnvelope {
    pub fn encode(&self) -> Result<Vec<u8>, TypesError> {
        encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, TypesError> {
        decode("config envelope", bytes)
    }
}

/// A proposed replacement of the channel group, built against `base_sequence`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    pub channel_id: ChannelId,
    pub base_sequence: u64,
    pub write_set: ChannelGroup,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSignature {
    pub signature_header: Vec<u8>,
    pub signature: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigUpdateEnvelope {
    pub config_update: ConfigUpdate,
    pub signatures: Vec<ConfigSignature>,
}

impl ConfigUpdateEnvelope {
    pub fn encode(&self) -> Result<Vec<u8>, TypesError> {
        encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, TypesError> {
        decode("config update envelope", bytes)
    }
}
