//! Directory and placement authority over the cluster's sites (§4.3).

use crate::site::{Site, SiteStatus};
use rustc_hash::FxHashMap;
use ssi_sim_core::{SiteId, TxnId, VarId, NUM_SITES};
use tracing::debug;

/// Enumerates sites, resolves variable placement, tracks failure/recovery
/// timelines, and holds the per-site wait-queues for transactions blocked
/// on an unavailable replica.
#[derive(Debug)]
pub struct SiteManager {
    sites: Vec<Site>,
    /// Per-site FIFO of `(txn, variable)` waiting for that site to become
    /// usable again (§3, §9: a transaction appears in at most one queue).
    wait_queues: FxHashMap<SiteId, Vec<(TxnId, VarId)>>,
}

impl SiteManager {
    /// Build the cluster: `NUM_SITES` sites, each populated with the
    /// `num_vars` variables it's responsible for hosting.
    pub fn new(num_vars: u8) -> Self {
        let sites = SiteId::all().map(|id| Site::new(id, num_vars)).collect();
        SiteManager {
            sites,
            wait_queues: FxHashMap::default(),
        }
    }

    /// Read-only access to one site by id.
    pub fn site(&self, id: SiteId) -> &Site {
        &self.sites[id.0 as usize - 1]
    }

    /// Exclusive access to one site by id.
    pub fn site_mut(&mut self, id: SiteId) -> &mut Site {
        &mut self.sites[id.0 as usize - 1]
    }

    /// All sites, in ascending id order.
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// All sites that physically store `var`: every site for an even
    /// (replicated) variable, or just the home site for an odd one.
    pub fn sites_hosting(&self, var: VarId) -> Vec<SiteId> {
        if var.is_even() {
            SiteId::all().collect()
        } else {
            var.home_site().into_iter().collect()
        }
    }

    /// Transition a site `UP -> DOWN`, discarding its buffered tentative
    /// writes.
    pub fn mark_failed(&mut self, s: SiteId, t: u64) {
        let site = self.site_mut(s);
        site.fail(t);
        site.data_manager_mut().discard_all_staged();
        debug!(site = s.0, t, "site failed");
    }

    /// Transition a site `DOWN -> RECOVERED`.
    pub fn mark_recovered(&mut self, s: SiteId, t: u64) {
        self.site_mut(s).recover(t);
        debug!(site = s.0, t, "site recovered");
    }

    /// Enqueue `(txn, var)` on `s`'s wait-queue.
    pub fn enqueue_wait(&mut self, s: SiteId, txn: TxnId, var: VarId) {
        self.wait_queues.entry(s).or_default().push((txn, var));
        debug!(site = s.0, txn = %txn, var = %var, "enqueued waiting read");
    }

    /// Remove and return every entry currently queued on `s`'s wait-queue.
    pub fn drain_wait(&mut self, s: SiteId) -> Vec<(TxnId, VarId)> {
        self.wait_queues.remove(&s).unwrap_or_default()
    }

    /// Re-enqueue an entry that couldn't yet be served (used by
    /// `retry_pending` to put back entries that are still blocked).
    pub fn requeue_wait(&mut self, s: SiteId, txn: TxnId, var: VarId) {
        self.wait_queues.entry(s).or_default().push((txn, var));
    }

    /// All recorded failure timestamps for `s`.
    pub fn failure_times(&self, s: SiteId) -> &[u64] {
        self.site(s).failure_times()
    }

    /// All recorded recovery timestamps for `s`.
    pub fn recovery_times(&self, s: SiteId) -> &[u64] {
        self.site(s).recovery_times()
    }

    /// Whether `s` is `UP`.
    pub fn is_up(&self, s: SiteId) -> bool {
        self.site(s).status() == SiteStatus::Up
    }

    /// Whether `s` is `DOWN`.
    pub fn is_down(&self, s: SiteId) -> bool {
        self.site(s).status() == SiteStatus::Down
    }

    /// For each site, for each variable it holds, the most recently
    /// committed value — in ascending site, then ascending variable, order
    /// (§4.3, feeds the `dump()` CLI output in §6).
    pub fn dump(&self) -> Vec<(SiteId, Vec<(VarId, i64)>)> {
        self.sites
            .iter()
            .map(|s| (s.id(), s.data_manager().dump()))
            .collect()
    }
}
