//! Shared harness for running a short instruction script against a
//! [`ssi_sim::Cluster`] and asserting on the resulting outcomes.

use ssi_sim::{Cluster, Outcome, ReadOutcome, SiteId, TxnId, VarId};

/// Drives a [`Cluster`] with its own logical clock, one tick per
/// instruction, mirroring the driver's dispatch loop (§4.5) without going
/// through the text grammar.
pub struct TestCluster {
    cluster: Cluster,
    clock: u64,
}

impl TestCluster {
    /// A cluster seeded with the default configuration.
    pub fn new() -> Self {
        TestCluster {
            cluster: Cluster::new(),
            clock: 0,
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// `begin(Tk)`.
    pub fn begin(&mut self, txn: u32) -> &mut Self {
        let t = self.tick();
        self.cluster.begin(TxnId::new(txn), t);
        self
    }

    /// `R(Tk, xN)`, discarding the value (for scripts that only care about
    /// final outcomes/dumps).
    pub fn read(&mut self, txn: u32, var: u8) -> &mut Self {
        self.read_outcome(txn, var);
        self
    }

    /// `R(Tk, xN)`, returning the full [`ReadOutcome`] (served value,
    /// waiting, or an inline abort).
    pub fn read_outcome(&mut self, txn: u32, var: u8) -> ReadOutcome {
        let t = self.tick();
        self.cluster.read(TxnId::new(txn), VarId::new(var), t).unwrap()
    }

    /// `W(Tk, xN, v)`.
    pub fn write(&mut self, txn: u32, var: u8, value: i64) -> &mut Self {
        let t = self.tick();
        self.cluster.write(TxnId::new(txn), VarId::new(var), value, t).unwrap();
        self
    }

    /// `end(Tk)`, returning the outcome.
    pub fn end(&mut self, txn: u32) -> Outcome {
        let t = self.tick();
        self.cluster.end(TxnId::new(txn), t).unwrap()
    }

    /// `fail(s)`.
    pub fn fail(&mut self, site: u8) -> &mut Self {
        let t = self.tick();
        self.cluster.fail(SiteId::new(site), t).unwrap();
        self
    }

    /// `recover(s)`.
    pub fn recover(&mut self, site: u8) -> &mut Self {
        let t = self.tick();
        self.cluster.recover(SiteId::new(site), t).unwrap();
        self
    }

    /// The most recently committed value of `xN` at site `s`, if resident
    /// there.
    pub fn value_at(&self, site: u8, var: u8) -> Option<i64> {
        self.cluster
            .dump()
            .into_iter()
            .find(|(s, _)| *s == SiteId::new(site))
            .and_then(|(_, vars)| vars.into_iter().find(|(v, _)| *v == VarId::new(var)))
            .map(|(_, value)| value)
    }
}

impl Default for TestCluster {
    fn default() -> Self {
        TestCluster::new()
    }
}
