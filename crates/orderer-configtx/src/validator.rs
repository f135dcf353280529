use std::sync::{Mutex, MutexGuard, PoisonError};

use orderer_types::{
    ChannelId, Config, ConfigEnvelope, ConfigUpdateEnvelope, Envelope, HeaderType,
};
use tracing::{debug, info, warn};

use crate::error::ConfigError;

/// Owner of a channel's configuration sequence.
pub trait ConfigtxValidator: Send + Sync {
    /// Channel this validator guards.
    fn channel_id(&self) -> ChannelId;

    /// Sequence of the current committed configuration.
    fn sequence(&self) -> u64;

    /// The current committed configuration.
    fn config_proto(&self) -> Config;

    /// Check that `config_env` is exactly what its `last_update` produces
    /// against the current configuration.
    fn validate(&self, config_env: &ConfigEnvelope) -> Result<(), ConfigError>;

    /// Validate an update envelope and compute the candidate configuration.
    ///
    /// Mutates nothing.
    fn propose_config_update(&self, update: &Envelope) -> Result<ConfigEnvelope, ConfigError>;

    /// Final validation: atomically check that `candidate` takes the next
    /// sequence and that no other candidate already holds it, then claim it.
    fn validate_new(&self, candidate: &Config) -> Result<(), ConfigError>;

    /// Install `config` as the current configuration, advancing the sequence by one.
    ///
    /// Commit follows the ordered ledger path, so it supersedes any claim on
    /// the same sequence; a superseded claimant later fails as stale.
    fn commit(&self, config: &Config) -> Result<(), ConfigError>;

    /// Drop the claim `candidate` holds, if any, without committing it.
    fn release(&self, candidate: &Config);
}

struct PendingClaim {
    sequence: u64,
    digest: [u8; 32],
}

struct ValidatorState {
    config: Config,
    pending: Option<PendingClaim>,
}

/// Sequence-tracking validator keeping all state behind one mutex.
pub struct StandardValidator {
    channel_id: ChannelId,
    state: Mutex<ValidatorState>,
}

impl StandardValidator {
    /// Create a validator whose current configuration is `config`.
    pub fn new(channel_id: ChannelId, config: Config) -> Self {
        Self {
            channel_id,
            state: Mutex::new(ValidatorState {
                config,
                pending: None,
            }),
        }
    }

    // Every mutation is a single assignment, so a poisoned state is still consistent.
    fn state(&self) -> MutexGuard<'_, ValidatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_next_sequence(candidate: &Config, current: u64) -> Result<(), ConfigError> {
        if candidate.sequence != current + 1 {
            return Err(ConfigError::StaleSequence {
                built_against: candidate.sequence.saturating_sub(1),
                current,
            });
        }
        Ok(())
    }

    fn check_claim(
        state: &ValidatorState,
        sequence: u64,
        digest: &[u8; 32],
    ) -> Result<(), ConfigError> {
        match &state.pending {
            Some(claim) if claim.sequence == sequence && &claim.digest != digest => {
                Err(ConfigError::SequenceClaimed { sequence })
            }
            _ => Ok(()),
        }
    }
}

impl ConfigtxValidator for StandardValidator {
    fn channel_id(&self) -> ChannelId {
        self.channel_id.clone()
    }

    fn sequence(&self) -> u64 {
        self.state().config.sequence
    }

    fn config_proto(&self) -> Config {
        self.state().config.clone()
    }

    fn validate(&self, config_env: &ConfigEnvelope) -> Result<(), ConfigError> {
        let expected = self.propose_config_update(&config_env.last_update)?;
        if expected.config != config_env.config {
            return Err(ConfigError::ConfigMismatch);
        }
        Ok(())
    }

    fn propose_config_update(&self, update: &Envelope) -> Result<ConfigEnvelope, ConfigError> {
        let payload = update.payload()?;
        let header = &payload.header.channel_header;

        if header.header_type != HeaderType::ConfigUpdate {
            return Err(ConfigError::UnexpectedHeaderType {
                expected: HeaderType::ConfigUpdate,
                got: header.header_type,
            });
        }
        if header.channel_id != self.channel_id {
            return Err(ConfigError::WrongChannel {
                expected: self.channel_id.clone(),
                got: header.channel_id.clone(),
            });
        }

        let update_env = ConfigUpdateEnvelope::decode(&payload.data)?;
        let config_update = update_env.config_update;
        if config_update.channel_id != self.channel_id {
            return Err(ConfigError::WrongChannel {
                expected: self.channel_id.clone(),
                got: config_update.channel_id,
            });
        }

        let state = self.state();
        let current = state.config.sequence;
        if config_update.base_sequence != current {
            return Err(ConfigError::StaleSequence {
                built_against: config_update.base_sequence,
                current,
            });
        }
        if config_update.write_set == state.config.channel {
            return Err(ConfigError::NoChanges);
        }

        debug!(
            channel = %self.channel_id,
            sequence = current + 1,
            "Config update proposed"
        );

        Ok(ConfigEnvelope {
            config: Config {
                sequence: current + 1,
                channel: config_update.write_set,
            },
            last_update: update.clone(),
        })
    }

    fn validate_new(&self, candidate: &Config) -> Result<(), ConfigError> {
        let digest = candidate.digest()?;
        let mut state = self.state();

        Self::check_next_sequence(candidate, state.config.sequence)?;
        Self::check_claim(&state, candidate.sequence, &digest)?;

        state.pending = Some(PendingClaim {
            sequence: candidate.sequence,
            digest,
        });
        debug!(
            channel = %self.channel_id,
            sequence = candidate.sequence,
            "Config sequence claimed"
        );
        Ok(())
    }

    fn commit(&self, config: &Config) -> Result<(), ConfigError> {
        let mut state = self.state();
        Self::check_next_sequence(config, state.config.sequence)?;

        if let Some(claim) = &state.pending {
            if claim.digest != config.digest()? {
                warn!(
                    channel = %self.channel_id,
                    sequence = config.sequence,
                    "Committed config supersedes a pending claim"
                );
            }
        }

        state.config = config.clone();
        state.pending = None;
        info!(
            channel = %self.channel_id,
            sequence = config.sequence,
            "Config committed"
        );
        Ok(())
    }

    fn release(&self, candidate: &Config) {
        let Ok(digest) = candidate.digest() else {
            return;
        };
        let mut state = self.state();
        let held = matches!(
            &state.pending,
            Some(claim) if claim.sequence == candidate.sequence && claim.digest == digest
        );
        if held {
            state.pending = None;
            debug!(
                channel = %self.channel_id,
                sequence = candidate.sequence,
                "Config claim released"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderer_crypto::{create_signed_envelope, Ed25519Signer};
    use orderer_types::{ChannelGroup, ConfigUpdate};

    fn channel() -> ChannelId {
        ChannelId::from("mychannel")
    }

    fn genesis() -> Config {
        Config {
            sequence: 0,
            channel: ChannelGroup::standard("etcdraft"),
        }
    }

    fn update_envelope(base_sequence: u64, max_message_count: u32) -> Envelope {
        let mut write_set = ChannelGroup::standard("etcdraft");
        write_set.orderer.batch_size.max_message_count = max_message_count;
        let update = ConfigUpdateEnvelope {
            config_update: ConfigUpdate {
                channel_id: channel(),
                base_sequence,
                write_set,
            },
            signatures: vec![],
        };
        let signer = Ed25519Signer::generate();
        create_signed_envelope(HeaderType::ConfigUpdate, &channel(), &signer, &update).unwrap()
    }

    #[test]
    fn propose_builds_next_sequence_without_mutation() {
        let validator = StandardValidator::new(channel(), genesis());
        let env = validator.propose_config_update(&update_envelope(0, 10)).unwrap();
        assert_eq!(env.config.sequence, 1);
        assert_eq!(env.config.channel.orderer.batch_size.max_message_count, 10);
        assert_eq!(validator.sequence(), 0);
        assert_eq!(validator.config_proto(), genesis());
    }

    #[test]
    fn propose_rejects_stale_base() {
        let validator = StandardValidator::new(channel(), genesis());
        let err = validator
            .propose_config_update(&update_envelope(3, 10))
            .unwrap_err();
        assert!(err.is_stale_sequence());
    }

    #[test]
    fn propose_rejects_no_op_update() {
        let validator = StandardValidator::new(channel(), genesis());
        let default_count = genesis().channel.orderer.batch_size.max_message_count;
        let err = validator
            .propose_config_update(&update_envelope(0, default_count))
            .unwrap_err();
        assert_eq!(err, ConfigError::NoChanges);
    }

    #[test]
    fn propose_rejects_wrong_channel() {
        let validator = StandardValidator::new(ChannelId::from("other"), genesis());
        let err = validator
            .propose_config_update(&update_envelope(0, 10))
            .unwrap_err();
        assert!(matches!(err, ConfigError::WrongChannel { .. }));
    }

    #[test]
    fn propose_rejects_non_update_envelope() {
        let validator = StandardValidator::new(channel(), genesis());
        let signer = Ed25519Signer::generate();
        let env =
            create_signed_envelope(HeaderType::Message, &channel(), &signer, &"tx").unwrap();
        let err = validator.propose_config_update(&env).unwrap_err();
        assert!(matches!(err, ConfigError::UnexpectedHeaderType { .. }));
    }

    #[test]
    fn validate_accepts_what_propose_produces() {
        let validator = StandardValidator::new(channel(), genesis());
        let env = validator.propose_config_update(&update_envelope(0, 10)).unwrap();
        validator.validate(&env).unwrap();

        let mut tampered = env.clone();
        tampered.config.channel.orderer.batch_size.max_message_count = 99;
        assert_eq!(
            validator.validate(&tampered).unwrap_err(),
            ConfigError::ConfigMismatch
        );
    }

    #[test]
    fn only_one_candidate_claims_a_sequence() {
        let validator = StandardValidator::new(channel(), genesis());
        let a = validator.propose_config_update(&update_envelope(0, 10)).unwrap();
        let b = validator.propose_config_update(&update_envelope(0, 20)).unwrap();

        validator.validate_new(&a.config).unwrap();
        let err = validator.validate_new(&b.config).unwrap_err();
        assert_eq!(err, ConfigError::SequenceClaimed { sequence: 1 });
        assert!(err.is_stale_sequence());

        // Re-validating the claimant is idempotent.
        validator.validate_new(&a.config).unwrap();
        assert_eq!(validator.sequence(), 0);
    }

    #[test]
    fn commit_advances_by_one_and_clears_claim() {
        let validator = StandardValidator::new(channel(), genesis());
        let a = validator.propose_config_update(&update_envelope(0, 10)).unwrap();
        let b = validator.propose_config_update(&update_envelope(0, 20)).unwrap();
        validator.validate_new(&a.config).unwrap();

        validator.commit(&a.config).unwrap();
        assert_eq!(validator.sequence(), 1);
        assert_eq!(validator.config_proto(), a.config);
        assert!(validator.commit(&a.config).unwrap_err().is_stale_sequence());

        // The loser is now stale against the new sequence.
        assert!(matches!(
            validator.validate_new(&b.config),
            Err(ConfigError::StaleSequence {
                built_against: 0,
                current: 1
            })
        ));
    }

    #[test]
    fn commit_supersedes_a_different_claim() {
        let validator = StandardValidator::new(channel(), genesis());
        let a = validator.propose_config_update(&update_envelope(0, 10)).unwrap();
        let b = validator.propose_config_update(&update_envelope(0, 20)).unwrap();
        validator.validate_new(&a.config).unwrap();

        validator.commit(&b.config).unwrap();
        assert_eq!(validator.config_proto(), b.config);
        assert!(validator.validate_new(&a.config).unwrap_err().is_stale_sequence());
    }

    #[test]
    fn release_frees_the_sequence() {
        let validator = StandardValidator::new(channel(), genesis());
        let a = validator.propose_config_update(&update_envelope(0, 10)).unwrap();
        let b = validator.propose_config_update(&update_envelope(0, 20)).unwrap();

        validator.validate_new(&a.config).unwrap();
        validator.release(&b.config);
        assert!(validator.validate_new(&b.config).is_err());

        validator.release(&a.config);
        validator.validate_new(&b.config).unwrap();
    }
}
