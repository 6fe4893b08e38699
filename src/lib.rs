//! `ssi-sim`: a simulator of a replicated, ten-site database running under
//! Serializable Snapshot Isolation, with explicit site failure and recovery.
//!
//! This crate is a thin facade: [`Cluster`] wraps
//! [`ssi_sim_engine::TransactionManager`] and re-exports the domain types
//! callers need, the way `Strata` wraps `strata_engine::Database` in this
//! codebase's lineage.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use ssi_sim_core::{AbortCause, Instruction, Outcome, SiteId, TxnId, VarId};
pub use ssi_sim_engine::{ClusterConfig, ClusterConfigBuilder, Error, ReadOutcome, Result, WriteOutcome};

use ssi_sim_engine::TransactionManager;

/// A running cluster: the single entry point embedders call into.
///
/// All mutating methods take the logical timestamp `t` the driver has
/// already advanced to for this instruction (see §3a / §4.5) — the cluster
/// itself holds no clock of its own.
#[derive(Debug)]
pub struct Cluster {
    manager: TransactionManager,
}

impl Cluster {
    /// Build a cluster with the default configuration (10 sites, 20
    /// variables).
    pub fn new() -> Self {
        Cluster::with_config(ClusterConfig::default())
    }

    /// Build a cluster from an explicit [`ClusterConfig`].
    pub fn with_config(config: ClusterConfig) -> Self {
        Cluster {
            manager: TransactionManager::with_config(config),
        }
    }

    /// `begin(Tk)`.
    pub fn begin(&mut self, txn: TxnId, t: u64) {
        self.manager.begin(txn, t);
    }

    /// `R(Tk, xN)`.
    pub fn read(&mut self, txn: TxnId, var: VarId, t: u64) -> Result<ReadOutcome> {
        self.manager.read(txn, var, t)
    }

    /// `W(Tk, xN, v)`.
    pub fn write(&mut self, txn: TxnId, var: VarId, value: i64, t: u64) -> Result<WriteOutcome> {
        self.manager.write(txn, var, value, t)
    }

    /// `end(Tk)`.
    pub fn end(&mut self, txn: TxnId, t: u64) -> Result<Outcome> {
        self.manager.end(txn, t)
    }

    /// `fail(s)`.
    pub fn fail(&mut self, site: SiteId, t: u64) -> Result<()> {
        self.manager.fail(site, t)
    }

    /// `recover(s)`.
    pub fn recover(&mut self, site: SiteId, t: u64) -> Result<()> {
        self.manager.recover(site, t)
    }

    /// `dump()`: every site's resident variables and their most recently
    /// committed values.
    pub fn dump(&self) -> Vec<(SiteId, Vec<(VarId, i64)>)> {
        self.manager.dump()
    }
}

impl Default for Cluster {
    fn default() -> Self {
        Cluster::new()
    }
}
