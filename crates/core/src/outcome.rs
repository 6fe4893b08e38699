//! User-visible commit outcomes (§7).
//!
//! These are plain data, not errors: every transaction ends in exactly one
//! of these states, and an abort is as much an expected result as a commit.

use std::fmt;

/// Why a transaction aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortCause {
    /// `end()` arrived while the transaction was still `WAITING` on a read.
    WaitingAtEnd,
    /// A site the transaction wrote to failed after the transaction's start.
    SiteFailureAfterWrite,
    /// Another transaction committed a write to a variable this transaction
    /// also wrote, during this transaction's lifetime (first-committer-wins).
    StaleWrite,
    /// This transaction sits on a cycle in the serialization graph and was
    /// chosen (by latest start-time) as the victim.
    Cycle,
    /// A read or write could not reach any site hosting the variable.
    UnreachableVariable,
}

impl fmt::Display for AbortCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AbortCause::WaitingAtEnd => "waiting-at-end",
            AbortCause::SiteFailureAfterWrite => "site-failure-after-write",
            AbortCause::StaleWrite => "stale-write",
            AbortCause::Cycle => "cycle",
            AbortCause::UnreachableVariable => "unreachable-variable",
        };
        write!(f, "{}", s)
    }
}

/// The result of `end(Tk)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The transaction committed at the given logical time.
    Committed {
        /// The commit timestamp.
        commit_time: u64,
    },
    /// The transaction aborted for the given reason.
    Aborted(AbortCause),
}

impl Outcome {
    /// True if this outcome is a commit.
    pub fn is_committed(&self) -> bool {
        matches!(self, Outcome::Committed { .. })
    }

    /// True if this outcome is an abort.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Outcome::Aborted(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Committed { commit_time } => write!(f, "commits at t={}", commit_time),
            Outcome::Aborted(cause) => write!(f, "aborts ({})", cause),
        }
    }
}
