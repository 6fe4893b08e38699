//! Unified error type for internal invariant violations.
//!
//! Per §7, transaction commit/abort outcomes are *not* errors — they are
//! ordinary data returned from `end()` (see [`ssi_sim_core::outcome`]).
//! `Error` is reserved for conditions the spec calls "implementation bugs":
//! violated append-only invariants, references to variables or sites that
//! don't exist, and similar programmer mistakes. The engine catches these
//! at the call boundary, aborts the offending transaction, and logs —
//! they never escape as a panic.

use crate::ids::{SiteId, TxnId, VarId};
use thiserror::Error;

/// All `ssi-sim` internal errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A commit was attempted at a timestamp not strictly greater than the
    /// variable's most recent snapshot (§4.1 edge case).
    #[error("non-monotonic commit of {var} at t={attempted}, last snapshot at t={last}")]
    NonMonotonicCommit {
        /// The variable being committed.
        var: VarId,
        /// The timestamp the commit attempted to use.
        attempted: u64,
        /// The timestamp of the most recent existing snapshot.
        last: u64,
    },

    /// A variable index outside `[1, NUM_VARS]` was referenced.
    #[error("unknown variable x{0}")]
    UnknownVariable(u8),

    /// A site index outside `[1, NUM_SITES]` was referenced.
    #[error("unknown site {0}")]
    UnknownSite(u8),

    /// Operated on a site that does not host the given variable.
    #[error("site {site} does not host {var}")]
    VariableNotAtSite {
        /// The site that was addressed.
        site: SiteId,
        /// The variable that isn't hosted there.
        var: VarId,
    },

    /// Referenced a transaction id with no open or known transaction.
    #[error("unknown transaction {0}")]
    UnknownTransaction(TxnId),

    /// `begin(Tk)` was issued for a transaction id that's already in use.
    #[error("transaction {0} already begun")]
    DuplicateTransaction(TxnId),
}

/// Result type for `ssi-sim` operations.
pub type Result<T> = std::result::Result<T, Error>;
