//! Shared fixtures for the channel core integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use orderer_configtx::BundleSource;
use orderer_consensus::mocks::MockConsenter;
use orderer_consensus::ConsenterRegistry;
use orderer_crypto::{create_signed_envelope, Ed25519Signer, LocalSigner};
use orderer_ledger::{MemoryLedger, ReadWriter};
use orderer_multichannel::{
    genesis_block, BootstrapError, ChainSupport, LedgerResources, MultichannelConfig,
};
use orderer_types::{
    consensus_types, ChannelGroup, ChannelId, Config, ConfigUpdate, ConfigUpdateEnvelope,
    Envelope, HeaderType,
};

pub fn channel() -> ChannelId {
    ChannelId::from("mychannel")
}

pub fn genesis_config() -> Config {
    Config {
        sequence: 0,
        channel: ChannelGroup::standard(consensus_types::ETCDRAFT),
    }
}

/// A ledger holding only the genesis block of [`channel`].
pub fn genesis_ledger() -> Arc<MemoryLedger> {
    ledger_with(genesis_config())
}

/// A ledger whose genesis block carries `config`.
pub fn ledger_with(config: Config) -> Arc<MemoryLedger> {
    let genesis = genesis_block(&channel(), config).unwrap();
    Arc::new(MemoryLedger::with_genesis(genesis).unwrap())
}

/// Resources loaded from `ledger`'s newest config block.
pub fn resources(ledger: Arc<dyn ReadWriter>) -> Arc<LedgerResources> {
    Arc::new(LedgerResources::from_ledger(ledger).unwrap())
}

/// Resources at the genesis config over an arbitrary ledger, bypassing the ledger's own config.
pub fn resources_over(ledger: Arc<dyn ReadWriter>) -> Arc<LedgerResources> {
    let source = BundleSource::from_config(channel(), genesis_config()).unwrap();
    Arc::new(LedgerResources::new(source, ledger))
}

pub fn registry() -> (ConsenterRegistry, Arc<MockConsenter>) {
    let consenter = Arc::new(MockConsenter::new());
    let registry = ConsenterRegistry::new().with(consensus_types::ETCDRAFT, consenter.clone());
    (registry, consenter)
}

pub fn signer() -> Arc<dyn LocalSigner> {
    Arc::new(Ed25519Signer::generate())
}

pub fn bootstrap(
    resources: Arc<LedgerResources>,
    registry: &ConsenterRegistry,
) -> Result<ChainSupport, BootstrapError> {
    ChainSupport::bootstrap(resources, registry, signer(), &MultichannelConfig::default())
}

/// A signed config update built against `base_sequence`, applying `change` to the genesis group.
pub fn config_update(base_sequence: u64, change: impl FnOnce(&mut ChannelGroup)) -> Envelope {
    update_from(&genesis_config().channel, base_sequence, change)
}

/// A signed config update applying `change` to `base`.
pub fn update_from(
    base: &ChannelGroup,
    base_sequence: u64,
    change: impl FnOnce(&mut ChannelGroup),
) -> Envelope {
    let mut write_set = base.clone();
    change(&mut write_set);
    let update = ConfigUpdateEnvelope {
        config_update: ConfigUpdate {
            channel_id: channel(),
            base_sequence,
            write_set,
        },
        signatures: vec![],
    };
    create_signed_envelope(
        HeaderType::ConfigUpdate,
        &channel(),
        &Ed25519Signer::generate(),
        &update,
    )
    .unwrap()
}

/// Update that only changes the batch message count.
pub fn batch_count_update(base_sequence: u64, max_message_count: u32) -> Envelope {
    config_update(base_sequence, |group| {
        group.orderer.batch_size.max_message_count = max_message_count;
    })
}
