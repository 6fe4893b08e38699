//! Bookkeeping for one transaction: id, start time, status, access log,
//! tentative writes, and sites touched (§3).

use rustc_hash::{FxHashMap, FxHashSet};
use ssi_sim_core::{AbortCause, SiteId, TxnId, VarId};

/// Lifecycle state of a transaction. `Waiting` is the only non-terminal
/// state besides `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnStatus {
    /// Actively issuing reads/writes.
    Running,
    /// Blocked on a read of a replicated variable whose holding sites are
    /// temporarily down (§4.4, §5).
    Waiting,
    /// Terminal: committed.
    Committed,
    /// Terminal: aborted.
    Aborted,
}

impl TxnStatus {
    /// Terminal states can't transition further.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TxnStatus::Committed | TxnStatus::Aborted)
    }
}

/// What a transaction did to one variable, for serialization-graph
/// construction (§4.4's R/W table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    /// Only ever read this variable.
    Read,
    /// Only ever wrote this variable.
    Write,
    /// Both read and wrote this variable.
    ReadWrite,
}

impl AccessKind {
    fn with_read(self) -> Self {
        match self {
            AccessKind::Write | AccessKind::ReadWrite => AccessKind::ReadWrite,
            AccessKind::Read => AccessKind::Read,
        }
    }

    fn with_write(self) -> Self {
        match self {
            AccessKind::Read | AccessKind::ReadWrite => AccessKind::ReadWrite,
            AccessKind::Write => AccessKind::Write,
        }
    }

    /// Whether this access included a read of the variable.
    pub fn read(&self) -> bool {
        matches!(self, AccessKind::Read | AccessKind::ReadWrite)
    }

    /// Whether this access included a write of the variable.
    pub fn wrote(&self) -> bool {
        matches!(self, AccessKind::Write | AccessKind::ReadWrite)
    }
}

/// One active or terminated transaction.
#[derive(Debug, Clone)]
pub struct Transaction {
    id: TxnId,
    start_time: u64,
    status: TxnStatus,
    /// Per-variable record of what this transaction did to it.
    access_log: FxHashMap<VarId, AccessKind>,
    /// Proposed values not yet in any snapshot history.
    tentative_writes: FxHashMap<VarId, i64>,
    /// Every site this transaction has touched (read or write).
    sites_accessed: FxHashSet<SiteId>,
    /// Sites this transaction specifically staged a write at — used by the
    /// site-failure-after-write gate (§4.4).
    write_sites: FxHashSet<SiteId>,
    commit_time: Option<u64>,
    abort_cause: Option<AbortCause>,
}

impl Transaction {
    /// Begin a new transaction, `RUNNING`, with no accesses yet.
    pub fn new(id: TxnId, start_time: u64) -> Self {
        Transaction {
            id,
            start_time,
            status: TxnStatus::Running,
            access_log: FxHashMap::default(),
            tentative_writes: FxHashMap::default(),
            sites_accessed: FxHashSet::default(),
            write_sites: FxHashSet::default(),
            commit_time: None,
            abort_cause: None,
        }
    }

    /// This transaction's id.
    pub fn id(&self) -> TxnId {
        self.id
    }

    /// This transaction's start (arrival) time.
    pub fn start_time(&self) -> u64 {
        self.start_time
    }

    /// Current lifecycle status.
    pub fn status(&self) -> TxnStatus {
        self.status
    }

    /// Set the current lifecycle status.
    pub fn set_status(&mut self, status: TxnStatus) {
        self.status = status;
    }

    /// The commit timestamp, if committed.
    pub fn commit_time(&self) -> Option<u64> {
        self.commit_time
    }

    /// Record that this transaction read `var`.
    pub fn record_read(&mut self, var: VarId) {
        let entry = self
            .access_log
            .entry(var)
            .or_insert(AccessKind::Read);
        *entry = entry.with_read();
    }

    /// Record that this transaction wrote `value` to `var`, staging it in
    /// the tentative-writes buffer (last write wins).
    pub fn record_write(&mut self, var: VarId, value: i64) {
        let entry = self
            .access_log
            .entry(var)
            .or_insert(AccessKind::Write);
        *entry = entry.with_write();
        self.tentative_writes.insert(var, value);
    }

    /// Record a site this transaction touched (read or write).
    pub fn add_site_accessed(&mut self, site: SiteId) {
        self.sites_accessed.insert(site);
    }

    /// Record a site this transaction staged a write at.
    pub fn add_write_site(&mut self, site: SiteId) {
        self.write_sites.insert(site);
        self.sites_accessed.insert(site);
    }

    /// Every site this transaction has touched.
    pub fn sites_accessed(&self) -> &FxHashSet<SiteId> {
        &self.sites_accessed
    }

    /// Sites this transaction staged a write at.
    pub fn write_sites(&self) -> &FxHashSet<SiteId> {
        &self.write_sites
    }

    /// This transaction's access log: what it did to each variable.
    pub fn access_log(&self) -> &FxHashMap<VarId, AccessKind> {
        &self.access_log
    }

    /// The variables this transaction wrote, and their tentative values.
    pub fn tentative_writes(&self) -> &FxHashMap<VarId, i64> {
        &self.tentative_writes
    }

    /// Mark this transaction committed at `t`.
    pub fn mark_committed(&mut self, t: u64) {
        self.status = TxnStatus::Committed;
        self.commit_time = Some(t);
    }

    /// Mark this transaction aborted for `cause`.
    pub fn mark_aborted(&mut self, cause: AbortCause) {
        self.status = TxnStatus::Aborted;
        self.abort_cause = Some(cause);
    }

    /// Why this transaction aborted, if it has.
    pub fn abort_cause(&self) -> Option<AbortCause> {
        self.abort_cause
    }
}
