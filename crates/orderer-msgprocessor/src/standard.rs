use std::sync::Arc;

use orderer_configtx::SharedConfig;
use orderer_crypto::{create_signed_envelope, LocalSigner};
use orderer_types::{
    ChannelHeader, ChannelId, ConfigEnvelope, ConsensusState, Envelope, HeaderType,
};
use tracing::debug;

use crate::error::ProcessorError;
use crate::filter::RuleSet;

/// How the channel treats a message, derived from its header type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    /// Ordinary transaction.
    NormalMsg,
    /// Proposed change to the channel configuration.
    ConfigUpdateMsg,
    /// Complete configuration, already proposed.
    ConfigMsg,
}

/// Message handling a consensus engine relies on.
///
/// Each `process_*` call returns the config sequence the message was
/// validated against, so the engine can revalidate if the sequence moves
/// before the message is ordered.
pub trait Processor: Send + Sync {
    fn classify_msg(&self, header: &ChannelHeader) -> Classification;

    fn process_normal_msg(&self, env: &Envelope) -> Result<u64, ProcessorError>;

    /// Turn a config update into a signed config envelope.
    fn process_config_update_msg(&self, env: &Envelope) -> Result<(Envelope, u64), ProcessorError>;

    /// Revalidate a config envelope by re-proposing the update it carries.
    fn process_config_msg(&self, env: &Envelope) -> Result<(Envelope, u64), ProcessorError>;
}

/// What the standard processor needs from its channel.
pub trait StandardChannelSupport: Send + Sync {
    fn channel_id(&self) -> ChannelId;

    fn sequence(&self) -> u64;

    fn shared_config(&self) -> SharedConfig;

    fn signer(&self) -> Arc<dyn LocalSigner>;

    fn propose_config_update(&self, env: &Envelope) -> Result<ConfigEnvelope, ProcessorError>;

    /// Give up the sequence claimed by a proposal that will not be ordered.
    fn release_config_update(&self, config_env: &ConfigEnvelope);
}

/// Processor for application channels.
pub struct StandardChannel {
    support: Arc<dyn StandardChannelSupport>,
    rules: RuleSet,
}

impl StandardChannel {
    pub fn new(support: Arc<dyn StandardChannelSupport>, rules: RuleSet) -> Self {
        Self { support, rules }
    }

    fn wrap_config(
        &self,
        channel_id: &ChannelId,
        config_env: &ConfigEnvelope,
    ) -> Result<Envelope, ProcessorError> {
        let signer = self.support.signer();
        let config =
            create_signed_envelope(HeaderType::Config, channel_id, signer.as_ref(), config_env)?;

        // The resulting config may itself be too large for the channel.
        self.rules.apply(&config)?;
        Ok(config)
    }
}

impl Processor for StandardChannel {
    fn classify_msg(&self, header: &ChannelHeader) -> Classification {
        match header.header_type {
            HeaderType::ConfigUpdate => Classification::ConfigUpdateMsg,
            HeaderType::Config | HeaderType::OrdererTransaction => Classification::ConfigMsg,
            HeaderType::Message => Classification::NormalMsg,
        }
    }

    fn process_normal_msg(&self, env: &Envelope) -> Result<u64, ProcessorError> {
        if self.support.shared_config().consensus_state() == ConsensusState::Maintenance {
            return Err(ProcessorError::Maintenance);
        }

        let sequence = self.support.sequence();
        self.rules.apply(env)?;
        Ok(sequence)
    }

    fn process_config_update_msg(&self, env: &Envelope) -> Result<(Envelope, u64), ProcessorError> {
        let channel_id = self.support.channel_id();
        debug!(channel = %channel_id, "Processing config update message");

        let sequence = self.support.sequence();
        self.rules.apply(env)?;

        let config_env = self.support.propose_config_update(env)?;
        match self.wrap_config(&channel_id, &config_env) {
            Ok(config) => Ok((config, sequence)),
            Err(e) => {
                debug!(
                    channel = %channel_id,
                    sequence = config_env.config.sequence,
                    error = %e,
                    "Releasing config update rejected after proposal"
                );
                self.support.release_config_update(&config_env);
                Err(e)
            }
        }
    }

    fn process_config_msg(&self, env: &Envelope) -> Result<(Envelope, u64), ProcessorError> {
        let payload = env.payload()?;
        let header_type = payload.header.channel_header.header_type;
        if header_type != HeaderType::Config {
            return Err(ProcessorError::NotConfig(header_type));
        }

        let config_env = ConfigEnvelope::decode(&payload.data)?;
        self.process_config_update_msg(&config_env.last_update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderer_configtx::{BundleSource, SharedConfigSource};
    use orderer_crypto::Ed25519Signer;
    use orderer_types::{ChannelGroup, Config, ConfigUpdate, ConfigUpdateEnvelope};

    struct TestSupport {
        source: BundleSource,
        signer: Arc<Ed25519Signer>,
    }

    impl StandardChannelSupport for TestSupport {
        fn channel_id(&self) -> ChannelId {
            self.source.validator().channel_id()
        }

        fn sequence(&self) -> u64 {
            self.source.validator().sequence()
        }

        fn shared_config(&self) -> SharedConfig {
            self.source.shared_config()
        }

        fn signer(&self) -> Arc<dyn LocalSigner> {
            self.signer.clone()
        }

        fn propose_config_update(&self, env: &Envelope) -> Result<ConfigEnvelope, ProcessorError> {
            self.source
                .validator()
                .propose_config_update(env)
                .map_err(|e| ProcessorError::ConfigUpdate(Box::new(e)))
        }

        fn release_config_update(&self, config_env: &ConfigEnvelope) {
            self.source.validator().release(&config_env.config);
        }
    }

    fn channel() -> ChannelId {
        ChannelId::from("mychannel")
    }

    fn processor(group: ChannelGroup) -> (StandardChannel, Arc<TestSupport>) {
        let source = BundleSource::from_config(
            channel(),
            Config {
                sequence: 0,
                channel: group,
            },
        )
        .unwrap();
        let support = Arc::new(TestSupport {
            source,
            signer: Arc::new(Ed25519Signer::generate()),
        });
        let shared: Arc<dyn SharedConfigSource> = Arc::new(
            BundleSource::from_config(
                channel(),
                Config {
                    sequence: 0,
                    channel: ChannelGroup::standard("solo"),
                },
            )
            .unwrap(),
        );
        (
            StandardChannel::new(support.clone(), RuleSet::standard(shared)),
            support,
        )
    }

    fn config_update(base_sequence: u64) -> Envelope {
        let mut write_set = ChannelGroup::standard("solo");
        write_set.orderer.batch_size.max_message_count = 42;
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

    #[test]
    fn classifies_by_header_type() {
        let (processor, _) = processor(ChannelGroup::standard("solo"));
        let env = config_update(0);
        let header = env.channel_header().unwrap();
        assert_eq!(
            processor.classify_msg(&header),
            Classification::ConfigUpdateMsg
        );

        let mut header = header;
        header.header_type = HeaderType::OrdererTransaction;
        assert_eq!(processor.classify_msg(&header), Classification::ConfigMsg);
        header.header_type = HeaderType::Message;
        assert_eq!(processor.classify_msg(&header), Classification::NormalMsg);
    }

    #[test]
    fn config_update_becomes_signed_config() {
        let (processor, support) = processor(ChannelGroup::standard("solo"));
        let (config, sequence) = processor.process_config_update_msg(&config_update(0)).unwrap();
        assert_eq!(sequence, 0);

        let payload = config.payload().unwrap();
        assert_eq!(payload.header.channel_header.header_type, HeaderType::Config);
        let config_env = ConfigEnvelope::decode(&payload.data).unwrap();
        assert_eq!(config_env.config.sequence, 1);
        assert_eq!(
            config_env.config.channel.orderer.batch_size.max_message_count,
            42
        );
        orderer_crypto::verify(
            &support.signer.public_key(),
            &config.payload,
            &config.signature,
        )
        .unwrap();

        // Reprocessing the config re-proposes its last update.
        let (again, _) = processor.process_config_msg(&config).unwrap();
        let again = ConfigEnvelope::decode(&again.payload().unwrap().data).unwrap();
        assert_eq!(again.config, config_env.config);
    }

    #[test]
    fn stale_update_is_rejected() {
        let (processor, _) = processor(ChannelGroup::standard("solo"));
        assert!(matches!(
            processor.process_config_update_msg(&config_update(5)),
            Err(ProcessorError::ConfigUpdate(_))
        ));
    }

    #[test]
    fn config_msg_requires_config_header() {
        let (processor, _) = processor(ChannelGroup::standard("solo"));
        assert!(matches!(
            processor.process_config_msg(&config_update(0)),
            Err(ProcessorError::NotConfig(HeaderType::ConfigUpdate))
        ));
    }

    #[test]
    fn normal_messages_blocked_in_maintenance() {
        let mut group = ChannelGroup::standard("solo");
        group.orderer.consensus.state = ConsensusState::Maintenance;
        let (processor, _) = processor(group);
        let env = Envelope {
            payload: vec![1; 4],
            signature: vec![],
        };
        assert!(matches!(
            processor.process_normal_msg(&env),
            Err(ProcessorError::Maintenance)
        ));

        let (processor, _) = self::processor(ChannelGroup::standard("solo"));
        assert_eq!(processor.process_normal_msg(&env).unwrap(), 0);
    }
}
