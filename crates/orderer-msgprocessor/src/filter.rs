use std::sync::Arc;

use orderer_configtx::SharedConfigSource;
use orderer_types::Envelope;

use crate::error::ProcessorError;

/// A single admission check applied to every message on the channel.
pub trait Rule: Send + Sync {
    fn apply(&self, env: &Envelope) -> Result<(), ProcessorError>;
}

/// Rejects envelopes with no payload.
pub struct EmptyRejectRule;

impl Rule for EmptyRejectRule {
    fn apply(&self, env: &Envelope) -> Result<(), ProcessorError> {
        if env.payload.is_empty() {
            return Err(ProcessorError::EmptyMessage);
        }
        Ok(())
    }
}

/// Rejects envelopes larger than the channel's absolute max batch bytes.
///
/// The limit is read from the current shared config on each call.
pub struct MaxBytesRule {
    shared_config: Arc<dyn SharedConfigSource>,
}

impl MaxBytesRule {
    pub fn new(shared_config: Arc<dyn SharedConfigSource>) -> Self {
        Self { shared_config }
    }
}

impl Rule for MaxBytesRule {
    fn apply(&self, env: &Envelope) -> Result<(), ProcessorError> {
        let max = self.shared_config.shared_config().batch_size().absolute_max_bytes as usize;
        let size = env.size_bytes();
        if size > max {
            return Err(ProcessorError::MessageTooLarge { size, max });
        }
        Ok(())
    }
}

/// Ordered collection of rules; the first rejection wins.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// The rules every standard channel applies.
    pub fn standard(shared_config: Arc<dyn SharedConfigSource>) -> Self {
        Self::new(vec![
            Box::new(EmptyRejectRule),
            Box::new(MaxBytesRule::new(shared_config)),
        ])
    }

    pub fn apply(&self, env: &Envelope) -> Result<(), ProcessorError> {
        self.rules.iter().try_for_each(|rule| rule.apply(env))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderer_configtx::BundleSource;
    use orderer_types::{ChannelGroup, ChannelId, Config};

    fn shared(absolute_max_bytes: u32) -> Arc<dyn SharedConfigSource> {
        let mut group = ChannelGroup::standard("solo");
        group.orderer.batch_size.absolute_max_bytes = absolute_max_bytes;
        group.orderer.batch_size.preferred_max_bytes = absolute_max_bytes;
        Arc::new(
            BundleSource::from_config(
                ChannelId::from("c"),
                Config {
                    sequence: 0,
                    channel: group,
                },
            )
            .unwrap(),
        )
    }

    #[test]
    fn standard_rules_reject_empty_and_oversized() {
        let rules = RuleSet::standard(shared(16));
        assert!(matches!(
            rules.apply(&Envelope::default()),
            Err(ProcessorError::EmptyMessage)
        ));

        let big = Envelope {
            payload: vec![1; 20],
            signature: vec![],
        };
        assert!(matches!(
            rules.apply(&big),
            Err(ProcessorError::MessageTooLarge { size: 20, max: 16 })
        ));

        let ok = Envelope {
            payload: vec![1; 8],
            signature: vec![2; 8],
        };
        rules.apply(&ok).unwrap();
    }

    #[test]
    fn empty_rule_set_accepts_everything() {
        RuleSet::default().apply(&Envelope::default()).unwrap();
    }
}
