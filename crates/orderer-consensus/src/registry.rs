use std::collections::HashMap;
use std::sync::Arc;

use crate::traits::Consenter;

/// Lookup table from consensus type name to consenter.
#[derive(Clone, Default)]
pub struct ConsenterRegistry {
    consenters: HashMap<String, Arc<dyn Consenter>>,
}

impl ConsenterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `consenter` under `consensus_type`, replacing any previous entry.
    pub fn register(&mut self, consensus_type: impl Into<String>, consenter: Arc<dyn Consenter>) {
        self.consenters.insert(consensus_type.into(), consenter);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, consensus_type: impl Into<String>, consenter: Arc<dyn Consenter>) -> Self {
        self.register(consensus_type, consenter);
        self
    }

    pub fn get(&self, consensus_type: &str) -> Option<Arc<dyn Consenter>> {
        self.consenters.get(consensus_type).cloned()
    }

    /// Registered consensus types, sorted.
    pub fn types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.consenters.keys().cloned().collect();
        types.sort();
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockConsenter;
    use orderer_types::consensus_types;

    #[test]
    fn lookup_by_type() {
        let registry = ConsenterRegistry::new()
            .with(consensus_types::SOLO, Arc::new(MockConsenter::new()))
            .with(consensus_types::ETCDRAFT, Arc::new(MockConsenter::new()));

        assert!(registry.get("solo").is_some());
        assert!(registry.get("kafka").is_none());
        assert_eq!(registry.types(), vec!["etcdraft", "solo"]);
    }
}
