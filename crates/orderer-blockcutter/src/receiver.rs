use std::sync::{Arc, Mutex, PoisonError};

use orderer_configtx::SharedConfigSource;
use orderer_types::Envelope;
use tracing::debug;

/// Accumulates ordered envelopes and cuts them into batches.
pub trait Receiver: Send + Sync {
    /// Add `env` to the pending batch.
    ///
    /// Returns the batches cut as a consequence (zero, one or two) and whether
    /// envelopes remain pending afterwards.
    fn ordered(&self, env: Envelope) -> (Vec<Vec<Envelope>>, bool);

    /// Cut whatever is pending, possibly an empty batch.
    fn cut(&self) -> Vec<Envelope>;
}

#[derive(Default)]
struct Pending {
    envelopes: Vec<Envelope>,
    size_bytes: usize,
}

impl Pending {
    fn take(&mut self) -> Vec<Envelope> {
        self.size_bytes = 0;
        std::mem::take(&mut self.envelopes)
    }
}

/// Cuts by message count and preferred batch size.
pub struct CuttingReceiver {
    shared_config: Arc<dyn SharedConfigSource>,
    pending: Mutex<Pending>,
}

impl CuttingReceiver {
    pub fn new(shared_config: Arc<dyn SharedConfigSource>) -> Self {
        Self {
            shared_config,
            pending: Mutex::new(Pending::default()),
        }
    }
}

impl Receiver for CuttingReceiver {
    fn ordered(&self, env: Envelope) -> (Vec<Vec<Envelope>>, bool) {
        let batch_size = self.shared_config.shared_config().batch_size();
        let preferred = batch_size.preferred_max_bytes as usize;
        let max_count = batch_size.max_message_count as usize;
        let size = env.size_bytes();

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let mut batches = Vec::new();

        if size > preferred {
            debug!(size, preferred, "Envelope exceeds preferred batch size, isolating it");
            if !pending.envelopes.is_empty() {
                batches.push(pending.take());
            }
            batches.push(vec![env]);
            return (batches, false);
        }

        if pending.size_bytes + size > preferred {
            debug!("Pending batch would overflow preferred size, cutting");
            batches.push(pending.take());
        }

        pending.size_bytes += size;
        pending.envelopes.push(env);

        if pending.envelopes.len() >= max_count {
            debug!(count = max_count, "Batch reached max message count, cutting");
            batches.push(pending.take());
        }

        let still_pending = !pending.envelopes.is_empty();
        (batches, still_pending)
    }

    fn cut(&self) -> Vec<Envelope> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderer_configtx::BundleSource;
    use orderer_types::{ChannelGroup, ChannelId, Config};
    use proptest::prelude::*;

    fn receiver(max_count: u32, preferred: u32) -> CuttingReceiver {
        let mut group = ChannelGroup::standard("solo");
        group.orderer.batch_size.max_message_count = max_count;
        group.orderer.batch_size.preferred_max_bytes = preferred;
        let source = BundleSource::from_config(
            ChannelId::from("mychannel"),
            Config {
                sequence: 0,
                channel: group,
            },
        )
        .unwrap();
        CuttingReceiver::new(Arc::new(source))
    }

    fn env(size: usize) -> Envelope {
        Envelope {
            payload: vec![0; size],
            signature: Vec::new(),
        }
    }

    #[test]
    fn cuts_at_max_message_count() {
        let r = receiver(2, 1000);
        let (batches, pending) = r.ordered(env(10));
        assert!(batches.is_empty());
        assert!(pending);

        let (batches, pending) = r.ordered(env(10));
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
        assert!(!pending);
    }

    #[test]
    fn oversized_message_is_isolated() {
        let r = receiver(10, 100);
        r.ordered(env(10));
        let (batches, pending) = r.ordered(env(500));
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 1);
        assert_eq!(batches[1][0].size_bytes(), 500);
        assert!(!pending);
    }

    #[test]
    fn cuts_before_overflowing_preferred_size() {
        let r = receiver(10, 100);
        r.ordered(env(60));
        let (batches, pending) = r.ordered(env(60));
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0][0].size_bytes(), 60);
        assert!(pending);
        assert_eq!(r.cut().len(), 1);
        assert!(r.cut().is_empty());
    }

    proptest! {
        #[test]
        fn no_envelope_is_lost_or_duplicated(sizes in proptest::collection::vec(1usize..300, 0..40)) {
            let r = receiver(5, 200);
            let mut seen = 0;
            for size in &sizes {
                let (batches, _) = r.ordered(env(*size));
                for batch in batches {
                    prop_assert!(!batch.is_empty());
                    prop_assert!(batch.len() <= 5);
                    seen += batch.len();
                }
            }
            seen += r.cut().len();
            prop_assert_eq!(seen, sizes.len());
        }
    }
}
