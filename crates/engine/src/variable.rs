//! A versioned cell: a current tentative value plus an append-only
//! history of committed (timestamp, value) snapshots (§4.1).

use ssi_sim_core::{Error, Result, VarId};

/// One versioned variable `xN`.
#[derive(Debug, Clone)]
pub struct Variable {
    name: VarId,
    /// The value most recently staged by some in-flight transaction.
    /// Not visible to readers until committed.
    tentative_value: i64,
    /// Ordered `(timestamp, value)` pairs, strictly increasing in timestamp.
    /// Seeded with `(0, 10 * N)` at construction.
    snapshots: Vec<(u64, i64)>,
}

impl Variable {
    /// Create a new variable seeded with its initial value at t=0.
    pub fn new(name: VarId) -> Self {
        let initial = name.initial_value();
        Variable {
            name,
            tentative_value: initial,
            snapshots: vec![(0, initial)],
        }
    }

    /// This variable's identifier.
    pub fn name(&self) -> VarId {
        self.name
    }

    /// The value of the most recent snapshot with timestamp strictly less
    /// than `t`, or `None` if no such snapshot exists (§4.1).
    pub fn read_as_of(&self, t: u64) -> Option<i64> {
        self.snapshots
            .iter()
            .rev()
            .find(|(ts, _)| *ts < t)
            .map(|(_, v)| *v)
    }

    /// Set the current tentative value without touching the history.
    pub fn tentative_set(&mut self, v: i64) {
        self.tentative_value = v;
    }

    /// The current tentative value (whatever was last staged).
    pub fn tentative_value(&self) -> i64 {
        self.tentative_value
    }

    /// Append `(t, value)` to the snapshot history.
    ///
    /// `t` must exceed the last snapshot's timestamp; violating this is an
    /// invariant break (§4.1 edge case), not a recoverable condition.
    pub fn commit(&mut self, t: u64, value: i64) -> Result<()> {
        let last = self.most_recent_commit_time();
        if let Some(last) = last {
            if t <= last {
                return Err(Error::NonMonotonicCommit {
                    var: self.name,
                    attempted: t,
                    last,
                });
            }
        }
        self.snapshots.push((t, value));
        Ok(())
    }

    /// Timestamp of the last snapshot, or `None` if the history is somehow
    /// empty (never true after construction, since we seed at t=0).
    pub fn most_recent_commit_time(&self) -> Option<u64> {
        self.snapshots.last().map(|(ts, _)| *ts)
    }

    /// The value of the most recent snapshot (the current committed value).
    pub fn most_recent_value(&self) -> i64 {
        self.snapshots
            .last()
            .map(|(_, v)| *v)
            .unwrap_or_else(|| self.name.initial_value())
    }

    /// True iff a snapshot for this variable exists with timestamp strictly
    /// in `(t1, t2)` (§4.2, used to gate recovered-site reads).
    pub fn had_commit_between(&self, t1: u64, t2: u64) -> bool {
        self.snapshots.iter().any(|(ts, _)| *ts > t1 && *ts < t2)
    }
}
