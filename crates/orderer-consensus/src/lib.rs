//! Consensus engine seams.
//!
//! A consensus engine is plugged in as a [`Consenter`], looked up by the
//! consensus type named in a channel's configuration. For each channel the
//! consenter builds a [`Chain`] from a [`ConsenterSupport`] view of the
//! channel and the orderer metadata persisted in the channel's last block.
//!
//! Engines are interchangeable variants selected through the
//! [`ConsenterRegistry`]; nothing here implements an ordering algorithm.

pub mod error;
pub mod mocks;
pub mod registry;
pub mod traits;

pub use error::ConsensusError;
pub use registry::ConsenterRegistry;
pub use traits::{Chain, Consenter, ConsenterSupport};
