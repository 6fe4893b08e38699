//! The engine's own error type: a thin wrapper around
//! [`ssi_sim_core::Error`] so call sites outside this crate only ever deal
//! with one `Error` type per layer, per the pattern set by the core crate's
//! own `error.rs`.

use thiserror::Error;

/// All errors `ssi-sim-engine` can surface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A domain-level invariant violation raised by `ssi-sim-core` (an
    /// unknown transaction, a non-monotonic commit, and the like).
    #[error(transparent)]
    Core(#[from] ssi_sim_core::Error),
}

/// Result type for `ssi-sim-engine` operations.
pub type Result<T> = std::result::Result<T, Error>;
