//! Channel configuration transactions.
//!
//! ## Core Components
//!
//! - **ConfigtxValidator**: owns the channel's configuration sequence. Turns
//!   update envelopes into candidate configurations and decides, atomically,
//!   which candidate may take the next sequence.
//! - **Bundle**: immutable, structurally validated snapshot of a configuration.
//! - **SharedConfig**: the orderer's view of a bundle (consensus type, batching).
//! - **BundleSource**: the channel's current bundle plus its validator; the
//!   only place a new configuration is installed.
//!
//! ## Sequence Discipline
//!
//! Proposing an update never changes the sequence. A candidate built against
//! sequence `N` carries sequence `N + 1`; the final validation claims `N + 1`
//! for exactly one candidate, and only an explicit commit advances the
//! sequence.

pub mod bundle;
pub mod error;
pub mod source;
pub mod validator;

pub use bundle::{Bundle, SharedConfig, SharedConfigSource};
pub use error::ConfigError;
pub use source::BundleSource;
pub use validator::{ConfigtxValidator, StandardValidator};
