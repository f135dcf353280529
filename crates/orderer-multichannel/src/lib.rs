//! Per-channel coordination core of the ordering service.
//!
//! For each channel this crate binds the block ledger, a pluggable consensus
//! engine, the configuration validator and the batching handle into one
//! runtime object, [`ChainSupport`], and resumes that state from the
//! channel's last block after a restart.
//!
//! ## Core Components
//!
//! - **LedgerResources**: the channel's ledger plus its current config bundle
//!   and validator.
//! - **ChannelCore**: the partially-built runtime (resources, signer, batching
//!   handle) handed to the message processor and block writer during bootstrap.
//!   Owns the config-update pipeline.
//! - **ChannelSupport**: the core plus processor and block writer; the view a
//!   consensus engine receives.
//! - **ChainSupport**: the assembled channel runtime, built by
//!   [`ChainSupport::bootstrap`].
//!
//! ## Config Updates
//!
//! [`ChainSupport::propose_config_update`] validates an update, builds and
//! checks a candidate bundle, and claims the next sequence for it. It never
//! changes the committed configuration; only writing the config block through
//! consensus does.

pub mod blockwriter;
pub mod chainsupport;
pub mod channel;
pub mod compat;
pub mod config;
pub mod configblock;
pub mod error;
pub mod resources;
pub mod support;
pub mod telemetry;

pub use blockwriter::BlockWriter;
pub use chainsupport::ChainSupport;
pub use channel::ChannelCore;
pub use compat::check_resources;
pub use crate::config::{CapabilitiesConfig, LoggingConfig, MultichannelConfig};
pub use configblock::{config_envelope_from_block, genesis_block};
pub use error::{
    BlockWriterError, BootstrapError, ConfigUpdateError, LedgerResourcesError, ResourceError,
};
pub use resources::LedgerResources;
pub use support::ChannelSupport;
