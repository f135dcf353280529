//! Batching handle for a channel.
//!
//! Consensus engines feed every ordered envelope through a [`Receiver`], which
//! decides when the accumulated envelopes become a block's worth of data.
//! Batch parameters are read from the channel's shared configuration on every
//! call, so a committed reconfiguration takes effect on the next envelope.

pub mod receiver;

pub use receiver::{CuttingReceiver, Receiver};
