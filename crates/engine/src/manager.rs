//! The coordinator: owns every live transaction, the site cluster, and the
//! serialization graph, and exposes the five entry points the driver calls
//! (§4.4).

use crate::config::ClusterConfig;
use crate::error::Result;
use crate::graph::{EdgeLabel, SerializationGraph};
use crate::site::SiteStatus;
use crate::site_manager::SiteManager;
use crate::transaction::{Transaction, TxnStatus};
use rustc_hash::FxHashMap;
use ssi_sim_core::Error as CoreError;
use ssi_sim_core::{AbortCause, Outcome, SiteId, TxnId, VarId};
use tracing::{debug, info, warn};

/// What happened when a `read()` was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The read was served from a snapshot.
    Value(i64),
    /// The read is blocked on a site recovery; the transaction is now
    /// `WAITING`.
    Waiting,
    /// The read could not be served and the transaction was aborted.
    Aborted(Outcome),
}

/// What happened when a `write()` was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The write was staged at one or more sites.
    Staged,
    /// No site could accept the write and the transaction was aborted.
    Aborted(Outcome),
}

/// Coordinates transactions against a [`SiteManager`]-owned cluster,
/// enforcing snapshot isolation plus the serialization-graph cycle check
/// that promotes it to serializable (§4.4).
#[derive(Debug)]
pub struct TransactionManager {
    sites: SiteManager,
    txns: FxHashMap<TxnId, Transaction>,
    graph: SerializationGraph,
}

impl TransactionManager {
    /// Build a coordinator over a freshly seeded cluster of `num_vars`
    /// variables.
    pub fn new(num_vars: u8) -> Self {
        TransactionManager {
            sites: SiteManager::new(num_vars),
            txns: FxHashMap::default(),
            graph: SerializationGraph::new(),
        }
    }

    /// Build a coordinator from a [`ClusterConfig`].
    pub fn with_config(config: ClusterConfig) -> Self {
        TransactionManager::new(config.num_vars())
    }

    fn txn(&self, id: TxnId) -> Result<&Transaction> {
        self.txns
            .get(&id)
            .ok_or_else(|| CoreError::UnknownTransaction(id).into())
    }

    fn txn_mut(&mut self, id: TxnId) -> Result<&mut Transaction> {
        self.txns
            .get_mut(&id)
            .ok_or_else(|| CoreError::UnknownTransaction(id).into())
    }

    /// `begin(Tk)`: create a new RUNNING transaction with start-time `t`. A
    /// repeated id is logged and ignored rather than rejected.
    pub fn begin(&mut self, id: TxnId, t: u64) {
        if self.txns.contains_key(&id) {
            warn!(txn = %id, "begin of already-known transaction ignored");
            return;
        }
        self.txns.insert(id, Transaction::new(id, t));
        self.graph.add_node(id);
        debug!(txn = %id, start = t, "began");
    }

    /// Whether `site` can currently serve a snapshot read of `var` as of
    /// `start`: an `UP` site always can (if it holds a snapshot at all); a
    /// `RECOVERED` site only once a post-recovery commit has landed there.
    fn try_serve_read(&self, site: SiteId, var: VarId, start: u64) -> Option<i64> {
        let s = self.sites.site(site);
        match s.status() {
            SiteStatus::Up => s.data_manager().snapshot_read(var, start),
            SiteStatus::Recovered => {
                let last_recovery = s.last_recovery_time();
                if s.data_manager().had_commit_between(last_recovery, start, var) {
                    s.data_manager().snapshot_read(var, start)
                } else {
                    None
                }
            }
            SiteStatus::Down => None,
        }
    }

    /// `R(Tk, xN)` (§4.4).
    pub fn read(&mut self, id: TxnId, var: VarId, t: u64) -> Result<ReadOutcome> {
        let start = self.txn(id)?.start_time();
        let hosting = self.sites.sites_hosting(var);

        for &site in &hosting {
            if let Some(value) = self.try_serve_read(site, var, start) {
                let txn = self.txn_mut(id)?;
                txn.record_read(var);
                txn.add_site_accessed(site);
                debug!(txn = %id, var = %var, site = site.0, value, "read served");
                return Ok(ReadOutcome::Value(value));
            }
        }

        if var.is_even() {
            let down_sites: Vec<SiteId> =
                hosting.iter().copied().filter(|&s| self.sites.is_down(s)).collect();
            if !down_sites.is_empty() {
                for site in down_sites {
                    self.sites.enqueue_wait(site, id, var);
                }
                self.txn_mut(id)?.set_status(TxnStatus::Waiting);
                debug!(txn = %id, var = %var, "read blocked, transaction waiting");
                return Ok(ReadOutcome::Waiting);
            }
        }

        let outcome = self.abort_internal(id, t, AbortCause::UnreachableVariable)?;
        Ok(ReadOutcome::Aborted(outcome))
    }

    /// `W(Tk, xN, v)` (§4.4). Stages the write at every currently `UP` or
    /// `RECOVERED` site hosting `xN` — a recovered site must be able to
    /// accept the write that eventually cures its staleness and promotes it
    /// back to `UP` (see DESIGN.md for why this reads "UP" rather more
    /// narrowly than a literal pass over §4.4's wording would).
    pub fn write(&mut self, id: TxnId, var: VarId, value: i64, t: u64) -> Result<WriteOutcome> {
        let targets: Vec<SiteId> = self
            .sites
            .sites_hosting(var)
            .into_iter()
            .filter(|&s| matches!(self.sites.site(s).status(), SiteStatus::Up | SiteStatus::Recovered))
            .collect();

        if targets.is_empty() {
            let outcome = self.abort_internal(id, t, AbortCause::UnreachableVariable)?;
            return Ok(WriteOutcome::Aborted(outcome));
        }

        for &site in &targets {
            self.sites.site_mut(site).data_manager_mut().stage_write(var, value, id);
        }

        let txn = self.txn_mut(id)?;
        txn.record_write(var, value);
        for &site in &targets {
            txn.add_write_site(site);
        }
        debug!(txn = %id, var = %var, value, sites = targets.len(), "write staged");
        Ok(WriteOutcome::Staged)
    }

    /// Build every edge §4.4's R/W table requires between `id` and every
    /// other tracked, non-aborted transaction, based on shared variable
    /// accesses.
    fn build_edges(&mut self, id: TxnId) {
        let my_log = self.txns[&id].access_log().clone();
        let others: Vec<TxnId> = self.txns.keys().copied().filter(|&t| t != id).collect();

        for other in others {
            let other_log = match self.txns.get(&other) {
                Some(t) if t.status() != TxnStatus::Aborted => t.access_log().clone(),
                _ => continue,
            };
            for (var, my_kind) in &my_log {
                let other_kind = match other_log.get(var) {
                    Some(k) => k,
                    None => continue,
                };
                if my_kind.wrote() && other_kind.wrote() {
                    self.graph.add_edge(id, other, EdgeLabel::Ww);
                }
                if my_kind.read() && other_kind.wrote() {
                    self.graph.add_edge(other, id, EdgeLabel::Wr);
                }
                if my_kind.wrote() && other_kind.read() {
                    self.graph.add_edge(id, other, EdgeLabel::Rw);
                }
            }
        }
    }

    /// Pick the abort victim among a discovered cycle: latest start-time,
    /// ties broken by the larger transaction id (§4.4).
    fn pick_victim(&self, cycle: &[TxnId]) -> TxnId {
        cycle
            .iter()
            .copied()
            .max_by_key(|&t| (self.txns[&t].start_time(), t.0))
            .expect("a discovered cycle is never empty")
    }

    /// `end(Tk)` (§4.4): evaluate the four gates in order and commit or
    /// abort. Calling `end` on an already-terminal transaction just returns
    /// its stored outcome.
    pub fn end(&mut self, id: TxnId, t: u64) -> Result<Outcome> {
        match self.txn(id)?.status() {
            TxnStatus::Committed => {
                let ct = self.txn(id)?.commit_time().expect("committed has a commit_time");
                return Ok(Outcome::Committed { commit_time: ct });
            }
            TxnStatus::Aborted => {
                let cause = self.txn(id)?.abort_cause().expect("aborted has a cause");
                return Ok(Outcome::Aborted(cause));
            }
            _ => {}
        }

        // Gate 1: status.
        if self.txn(id)?.status() == TxnStatus::Waiting {
            return self.abort_internal(id, t, AbortCause::WaitingAtEnd);
        }

        let start = self.txn(id)?.start_time();

        // Gate 2: site-failure-after-write.
        let write_sites: Vec<SiteId> = self.txn(id)?.write_sites().iter().copied().collect();
        for site in &write_sites {
            if self.sites.failure_times(*site).iter().any(|&ft| ft > start) {
                return self.abort_internal(id, t, AbortCause::SiteFailureAfterWrite);
            }
        }

        // Gate 3: first-committer-wins.
        let written_vars: Vec<VarId> = self
            .txn(id)?
            .access_log()
            .iter()
            .filter(|(_, kind)| kind.wrote())
            .map(|(var, _)| *var)
            .collect();
        for var in &written_vars {
            for site in self.sites.sites_hosting(*var) {
                if let Some(last_commit) = self.sites.site(site).data_manager().most_recent_commit_time(*var) {
                    if last_commit > start {
                        return self.abort_internal(id, t, AbortCause::StaleWrite);
                    }
                }
            }
        }

        // Gate 4: cycle. Incorporate Tk's edges, then drain the graph of
        // cycles (there may be more than one once other victims are
        // removed) until it's acyclic or Tk itself has been chosen.
        self.build_edges(id);
        while let Some(cycle) = self.graph.find_cycle() {
            let victim = self.pick_victim(&cycle);
            if victim == id {
                return self.abort_internal(id, t, AbortCause::Cycle);
            }
            self.abort_internal(victim, t, AbortCause::Cycle)?;
        }

        // All gates passed: commit.
        for var in &written_vars {
            for site in self.sites.sites_hosting(*var) {
                let status = self.sites.site(site).status();
                if matches!(status, SiteStatus::Up | SiteStatus::Recovered) {
                    self.sites.site_mut(site).data_manager_mut().commit_staged(*var, t, id)?;
                    if status == SiteStatus::Recovered {
                        self.sites.site_mut(site).mark_fully_up();
                    }
                }
            }
        }
        self.txn_mut(id)?.mark_committed(t);
        info!(txn = %id, commit_time = t, "committed");
        self.retry_pending_all();
        Ok(Outcome::Committed { commit_time: t })
    }

    /// Abort `id` for `cause`: discard its staged writes everywhere, mark it
    /// terminal, purge it from the serialization graph (§9: aborted
    /// transactions can never be a future victim, so purging keeps the
    /// graph small), and re-examine every wait-queue.
    fn abort_internal(&mut self, id: TxnId, t: u64, cause: AbortCause) -> Result<Outcome> {
        for site in SiteId::all() {
            self.sites.site_mut(site).data_manager_mut().discard_staged(id);
        }
        self.txn_mut(id)?.mark_aborted(cause);
        self.graph.remove_node(id);
        info!(txn = %id, cause = %cause, t, "aborted");
        self.retry_pending_all();
        Ok(Outcome::Aborted(cause))
    }

    /// Re-examine `site`'s wait-queue: entries that can now be served are
    /// completed and resume their transaction; entries that can't are
    /// requeued; entries for a transaction that resolved (or aborted)
    /// elsewhere in the meantime are silently dropped.
    fn retry_pending(&mut self, site: SiteId) {
        let entries = self.sites.drain_wait(site);
        for (txn_id, var) in entries {
            let still_waiting = matches!(self.txns.get(&txn_id), Some(txn) if txn.status() == TxnStatus::Waiting);
            if !still_waiting {
                continue;
            }
            let start = self.txns[&txn_id].start_time();
            if let Some(value) = self.try_serve_read(site, var, start) {
                let txn = self.txns.get_mut(&txn_id).expect("checked above");
                txn.record_read(var);
                txn.add_site_accessed(site);
                txn.set_status(TxnStatus::Running);
                info!(txn = %txn_id, var = %var, site = site.0, value, "waiting read resolved");
            } else {
                self.sites.requeue_wait(site, txn_id, var);
            }
        }
    }

    fn retry_pending_all(&mut self) {
        for site in SiteId::all() {
            self.retry_pending(site);
        }
    }

    /// `fail(s)` (§4.4 site failure handling). Discards tentative state at
    /// `s` and aborts every live transaction that staged a write there —
    /// its durability on that replica can no longer be assumed. A
    /// transaction that only read from `s` keeps running: its already-served
    /// reads are fixed snapshots unaffected by `s`'s later failure, and any
    /// further read of a replicated variable simply routes to another
    /// surviving replica (or to `WAITING`) through the ordinary read path.
    pub fn fail(&mut self, site: SiteId, t: u64) -> Result<()> {
        self.sites.mark_failed(site, t);
        let writers: Vec<TxnId> = self
            .txns
            .iter()
            .filter(|(_, txn)| !txn.status().is_terminal() && txn.write_sites().contains(&site))
            .map(|(&id, _)| id)
            .collect();
        for id in writers {
            self.abort_internal(id, t, AbortCause::SiteFailureAfterWrite)?;
        }
        Ok(())
    }

    /// `recover(s)` (§4.4 site recovery handling).
    pub fn recover(&mut self, site: SiteId, t: u64) -> Result<()> {
        self.sites.mark_recovered(site, t);
        self.retry_pending(site);
        Ok(())
    }

    /// `dump()`: every site's resident variables and their most recently
    /// committed values (§4.3, §6).
    pub fn dump(&self) -> Vec<(SiteId, Vec<(VarId, i64)>)> {
        self.sites.dump()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(n: u32) -> TxnId {
        TxnId::new(n)
    }

    fn v(n: u8) -> VarId {
        VarId::new(n)
    }

    #[test]
    fn read_own_snapshot_then_commit() {
        let mut tm = TransactionManager::new(4);
        tm.begin(t(1), 1);
        let read = tm.read(t(1), v(2), 2).unwrap();
        assert_eq!(read, ReadOutcome::Value(20));
        let outcome = tm.end(t(1), 3).unwrap();
        assert_eq!(outcome, Outcome::Committed { commit_time: 3 });
    }

    #[test]
    fn write_then_read_elsewhere_is_isolated_until_commit() {
        let mut tm = TransactionManager::new(4);
        tm.begin(t(1), 1);
        tm.begin(t(2), 2);
        assert_eq!(tm.write(t(1), v(2), 99, 3).unwrap(), WriteOutcome::Staged);
        // T2 started before T1's write is committed, so it must not see it.
        assert_eq!(tm.read(t(2), v(2), 4).unwrap(), ReadOutcome::Value(20));
        tm.end(t(1), 5).unwrap();
        tm.begin(t(3), 6);
        assert_eq!(tm.read(t(3), v(2), 7).unwrap(), ReadOutcome::Value(99));
    }

    #[test]
    fn first_committer_wins_aborts_stale_writer() {
        let mut tm = TransactionManager::new(4);
        tm.begin(t(1), 1);
        tm.begin(t(2), 2);
        tm.write(t(1), v(2), 11, 3).unwrap();
        tm.write(t(2), v(2), 22, 4).unwrap();
        assert!(tm.end(t(1), 5).unwrap().is_committed());
        let outcome = tm.end(t(2), 6).unwrap();
        assert_eq!(outcome, Outcome::Aborted(AbortCause::StaleWrite));
    }

    #[test]
    fn site_failure_after_write_aborts_at_end() {
        let mut tm = TransactionManager::new(2);
        tm.begin(t(1), 1);
        // x1's home site is 1 + (1 % 10) = 2.
        tm.write(t(1), v(1), 5, 2).unwrap();
        tm.fail(SiteId::new(2), 3).unwrap();
        let outcome = tm.end(t(1), 4).unwrap();
        assert_eq!(outcome, Outcome::Aborted(AbortCause::SiteFailureAfterWrite));
    }

    #[test]
    fn single_copy_variable_has_no_alternative_on_failure() {
        let mut tm = TransactionManager::new(2);
        tm.fail(SiteId::new(2), 1).unwrap();
        tm.begin(t(1), 2);
        // x1 lives only at site 2, which is down: no alternative, aborts.
        let outcome = tm.read(t(1), v(1), 3).unwrap();
        assert!(matches!(outcome, ReadOutcome::Aborted(_)));
    }

    #[test]
    fn even_variable_waits_then_resolves_once_a_recovered_site_accepts_a_commit() {
        let mut tm = TransactionManager::new(2);
        // Every replica of x2 must be unreachable for a read to block.
        for s in SiteId::all() {
            tm.fail(s, 1).unwrap();
        }
        tm.begin(t(1), 2);
        let outcome = tm.read(t(1), v(2), 3).unwrap();
        assert_eq!(outcome, ReadOutcome::Waiting);
        assert_eq!(tm.txn(t(1)).unwrap().status(), TxnStatus::Waiting);

        // Site 1 comes back, but stays stale (recovered, not up) until a
        // write lands there; T1's read still can't be served from it.
        tm.recover(SiteId::new(1), 4).unwrap();
        assert_eq!(tm.txn(t(1)).unwrap().status(), TxnStatus::Waiting);

        // T2 writes and commits x2, landing only at the recovered site 1
        // (the rest are still down) and promoting it back to UP.
        tm.begin(t(2), 5);
        tm.write(t(2), v(2), 77, 6).unwrap();
        assert!(tm.end(t(2), 7).unwrap().is_committed());

        // T1's wait is now resolved, from the same pre-recovery snapshot it
        // originally asked for.
        assert_eq!(tm.txn(t(1)).unwrap().status(), TxnStatus::Running);
    }

    #[test]
    fn cycle_aborts_latest_starting_transaction() {
        let mut tm = TransactionManager::new(4);
        tm.begin(t(1), 1);
        tm.begin(t(2), 2);
        // T1 reads x2, T2 writes x2: edge T2 -> T1 (wr).
        tm.read(t(1), v(2), 3).unwrap();
        tm.write(t(2), v(2), 1, 3).unwrap();
        // T2 reads x4, T1 writes x4: edge T1 -> T2 (rw). Cycle: T1 <-> T2.
        tm.read(t(2), v(4), 3).unwrap();
        tm.write(t(1), v(4), 2, 3).unwrap();

        // T2 started later, so it's the victim when the cycle is found.
        let outcome = tm.end(t(2), 5).unwrap();
        assert_eq!(outcome, Outcome::Aborted(AbortCause::Cycle));
        assert!(tm.end(t(1), 6).unwrap().is_committed());
    }

    #[test]
    fn unknown_transaction_is_an_error() {
        let mut tm = TransactionManager::new(2);
        assert!(matches!(
            tm.read(t(9), v(2), 1),
            Err(crate::error::Error::Core(CoreError::UnknownTransaction(_)))
        ));
    }
}
