use std::sync::{Arc, PoisonError, RwLock};

use orderer_types::{ChannelId, Config, ConsensusState};
use tracing::{info, warn};

use crate::bundle::{Bundle, SharedConfig, SharedConfigSource};
use crate::error::ConfigError;
use crate::validator::{ConfigtxValidator, StandardValidator};

/// A channel's current bundle together with the validator owning its sequence.
///
/// Readers get a cheap `Arc<Bundle>` snapshot; [`BundleSource::update`] is the
/// only way to install a new one.
pub struct BundleSource {
    current: RwLock<Arc<Bundle>>,
    validator: Arc<dyn ConfigtxValidator>,
}

impl BundleSource {
    /// Pair `bundle` with `validator`. Both must describe the same channel and sequence.
    pub fn new(bundle: Bundle, validator: Arc<dyn ConfigtxValidator>) -> Result<Self, ConfigError> {
        if bundle.channel_id() != &validator.channel_id() {
            return Err(ConfigError::WrongChannel {
                expected: validator.channel_id(),
                got: bundle.channel_id().clone(),
            });
        }
        if bundle.sequence() != validator.sequence() {
            return Err(ConfigError::Invalid(format!(
                "bundle sequence {} does not match validator sequence {}",
                bundle.sequence(),
                validator.sequence()
            )));
        }

        Ok(Self {
            current: RwLock::new(Arc::new(bundle)),
            validator,
        })
    }

    /// Build a source backed by a [`StandardValidator`] at `config`.
    pub fn from_config(channel_id: ChannelId, config: Config) -> Result<Self, ConfigError> {
        let bundle = Bundle::new(channel_id.clone(), config.clone())?;
        let validator = Arc::new(StandardValidator::new(channel_id, config));
        Self::new(bundle, validator)
    }

    /// Snapshot of the current bundle.
    pub fn bundle(&self) -> Arc<Bundle> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn validator(&self) -> &Arc<dyn ConfigtxValidator> {
        &self.validator
    }

    /// Build a bundle for `config` on this channel without comparing it to the current one.
    pub fn create_bundle(&self, config: Config) -> Result<Bundle, ConfigError> {
        Bundle::new(self.validator.channel_id(), config)
    }

    /// Check that `candidate` may replace the current bundle, and claim its sequence.
    ///
    /// A consensus type migration is only accepted when both the current and
    /// the candidate configuration are in maintenance mode.
    pub fn validate_new(&self, candidate: &Bundle) -> Result<(), ConfigError> {
        let current = self.bundle();
        if candidate.channel_id() != current.channel_id() {
            return Err(ConfigError::WrongChannel {
                expected: current.channel_id().clone(),
                got: candidate.channel_id().clone(),
            });
        }

        let old = current.shared_config();
        let new = candidate.shared_config();
        if old.consensus_type() != new.consensus_type() {
            let in_maintenance = old.consensus_state() == ConsensusState::Maintenance
                && new.consensus_state() == ConsensusState::Maintenance;
            if !in_maintenance {
                warn!(
                    channel = %current.channel_id(),
                    from = old.consensus_type(),
                    to = new.consensus_type(),
                    "Rejected consensus type change outside maintenance mode"
                );
                return Err(ConfigError::ConsensusTypeChange {
                    from: old.consensus_type().to_string(),
                    to: new.consensus_type().to_string(),
                });
            }
        }

        self.validator.validate_new(candidate.config())
    }

    /// Check that `bundle` is this channel's next configuration, without
    /// claiming or committing anything.
    pub fn check_update(&self, bundle: &Bundle) -> Result<(), ConfigError> {
        let expected = self.validator.channel_id();
        if bundle.channel_id() != &expected {
            return Err(ConfigError::WrongChannel {
                expected,
                got: bundle.channel_id().clone(),
            });
        }

        let current = self.validator.sequence();
        if bundle.sequence() != current + 1 {
            return Err(ConfigError::StaleSequence {
                built_against: bundle.sequence().saturating_sub(1),
                current,
            });
        }
        Ok(())
    }

    /// Commit `bundle` through the validator and make it current.
    ///
    /// The bundle lock is held across the commit, so readers never see the
    /// old bundle once the validator has moved on.
    pub fn update(&self, bundle: Bundle) -> Result<(), ConfigError> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        self.validator.commit(bundle.config())?;

        let sequence = bundle.sequence();
        let channel = bundle.channel_id().clone();
        *current = Arc::new(bundle);
        drop(current);

        info!(channel = %channel, sequence, "Bundle updated");
        Ok(())
    }
}

impl SharedConfigSource for BundleSource {
    fn shared_config(&self) -> SharedConfig {
        self.bundle().shared_config().clone()
    }
}
