use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// Identity of a channel: an independently ordered stream of transactions.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl ChannelId {
    /// Create a channel id, rejecting empty names.
    pub fn new(name: impl Into<String>) -> Result<Self, TypesError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TypesError::InvalidChannelId(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}
