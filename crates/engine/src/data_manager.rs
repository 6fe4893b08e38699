//! Per-site owner of resident variables: snapshot reads, staged writes,
//! commits, and aborts (§4.2).

use crate::variable::Variable;
use rustc_hash::FxHashMap;
use ssi_sim_core::{Result, SiteId, TxnId, VarId};

/// Owns the variables physically resident at one site.
#[derive(Debug)]
pub struct DataManager {
    site: SiteId,
    variables: FxHashMap<VarId, Variable>,
    /// Per-transaction tentative writes staged at this site, keyed by txn.
    staged: FxHashMap<TxnId, FxHashMap<VarId, i64>>,
}

impl DataManager {
    /// Populate the variables resident at `site` out of `num_vars` total
    /// variables, per the placement rule in §3: even N on every site, odd N
    /// only at its home site `1 + (N mod 10)`.
    pub fn new(site: SiteId, num_vars: u8) -> Self {
        let mut variables = FxHashMap::default();
        for n in 1..=num_vars {
            let var = VarId::new(n);
            let resident = if var.is_even() {
                true
            } else {
                var.home_site() == Some(site)
            };
            if resident {
                variables.insert(var, Variable::new(var));
            }
        }
        DataManager {
            site,
            variables,
            staged: FxHashMap::default(),
        }
    }

    /// Whether this site holds `var`.
    pub fn has(&self, var: VarId) -> bool {
        self.variables.contains_key(&var)
    }

    /// Snapshot read as of `txn_start`, or `None` if no such snapshot
    /// exists (or the variable isn't resident here).
    pub fn snapshot_read(&self, var: VarId, txn_start: u64) -> Option<i64> {
        self.variables.get(&var)?.read_as_of(txn_start)
    }

    /// Stage `value` as `txn`'s tentative write for `var`. Idempotent for
    /// repeated calls with the same `txn`/`var` — last write wins.
    pub fn stage_write(&mut self, var: VarId, value: i64, txn: TxnId) {
        if let Some(variable) = self.variables.get_mut(&var) {
            variable.tentative_set(value);
        }
        self.staged.entry(txn).or_default().insert(var, value);
    }

    /// Move `txn`'s tentative value for `var` into the snapshot history at
    /// `commit_time`, and clear that staging entry.
    pub fn commit_staged(&mut self, var: VarId, commit_time: u64, txn: TxnId) -> Result<()> {
        let value = self
            .staged
            .get(&txn)
            .and_then(|m| m.get(&var))
            .copied()
            .unwrap_or_else(|| {
                self.variables
                    .get(&var)
                    .map(|v| v.tentative_value())
                    .unwrap_or(0)
            });

        if let Some(variable) = self.variables.get_mut(&var) {
            variable.commit(commit_time, value)?;
        }
        if let Some(m) = self.staged.get_mut(&txn) {
            m.remove(&var);
        }
        Ok(())
    }

    /// Drop all of `txn`'s tentative entries at this site (abort, or the
    /// site failing out from under an in-flight write).
    pub fn discard_staged(&mut self, txn: TxnId) {
        self.staged.remove(&txn);
    }

    /// Drop every transaction's tentative entries at this site: called
    /// when the site itself fails (§4.3, §4.4 site failure handling).
    pub fn discard_all_staged(&mut self) {
        self.staged.clear();
    }

    /// True iff `var` has a committed snapshot with timestamp strictly in
    /// `(t1, t2)` — used to gate reads from a recovered site (§4.2, §4.4).
    pub fn had_commit_between(&self, t1: u64, t2: u64, var: VarId) -> bool {
        self.variables
            .get(&var)
            .map(|v| v.had_commit_between(t1, t2))
            .unwrap_or(false)
    }

    /// The most recent committed snapshot time for `var` at this site, if
    /// resident (used by the first-committer-wins check in §4.4).
    pub fn most_recent_commit_time(&self, var: VarId) -> Option<u64> {
        self.variables.get(&var)?.most_recent_commit_time()
    }

    /// All resident variables and their most recently committed values, in
    /// ascending variable-id order — feeds `SiteManager::dump`.
    pub fn dump(&self) -> Vec<(VarId, i64)> {
        let mut out: Vec<(VarId, i64)> = self
            .variables
            .values()
            .map(|v| (v.name(), v.most_recent_value()))
            .collect();
        out.sort_by_key(|(name, _)| name.0);
        out
    }

    /// The site this data manager belongs to.
    pub fn site(&self) -> SiteId {
        self.site
    }
}
