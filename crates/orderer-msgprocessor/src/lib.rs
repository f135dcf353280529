//! Message processing for a channel.
//!
//! Every envelope submitted to a channel is classified by its header type and
//! then run through the channel's filter rules. Config updates are turned into
//! full, signed config envelopes by proposing them against the channel's
//! current configuration.

pub mod error;
pub mod filter;
pub mod standard;

pub use error::ProcessorError;
pub use filter::{EmptyRejectRule, MaxBytesRule, Rule, RuleSet};
pub use standard::{Classification, Processor, StandardChannel, StandardChannelSupport};
