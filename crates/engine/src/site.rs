//! A site: a unit of failure wrapping one [`DataManager`], with a status
//! and a failure/recovery timeline (§3).

use crate::data_manager::DataManager;
use ssi_sim_core::SiteId;

/// The liveness state of a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteStatus {
    /// Serving reads and writes normally.
    Up,
    /// Failed; serves neither reads nor writes.
    Down,
    /// Back from a failure, but replicated variables are stale until a
    /// fresh commit lands (§3, §4.4).
    Recovered,
}

/// One site in the cluster.
#[derive(Debug)]
pub struct Site {
    id: SiteId,
    status: SiteStatus,
    failure_timeline: Vec<u64>,
    recovery_timeline: Vec<u64>,
    data_manager: DataManager,
}

impl Site {
    /// Construct a site, `UP` from the start with timelines seeded at `[0]`
    /// (§3), owning a freshly populated [`DataManager`].
    pub fn new(id: SiteId, num_vars: u8) -> Self {
        Site {
            id,
            status: SiteStatus::Up,
            failure_timeline: vec![0],
            recovery_timeline: vec![0],
            data_manager: DataManager::new(id, num_vars),
        }
    }

    /// This site's identifier.
    pub fn id(&self) -> SiteId {
        self.id
    }

    /// Current liveness status.
    pub fn status(&self) -> SiteStatus {
        self.status
    }

    /// Shared access to the resident [`DataManager`].
    pub fn data_manager(&self) -> &DataManager {
        &self.data_manager
    }

    /// Exclusive access to the resident [`DataManager`].
    pub fn data_manager_mut(&mut self) -> &mut DataManager {
        &mut self.data_manager
    }

    /// All recorded failure timestamps, in order.
    pub fn failure_times(&self) -> &[u64] {
        &self.failure_timeline
    }

    /// All recorded recovery timestamps, in order.
    pub fn recovery_times(&self) -> &[u64] {
        &self.recovery_timeline
    }

    /// The most recent recovery timestamp, or `0` if the site has never
    /// failed (matches the seeded `[0]` timeline).
    pub fn last_recovery_time(&self) -> u64 {
        *self.recovery_timeline.last().unwrap_or(&0)
    }

    /// Transition `UP -> DOWN`. Discards any tentative writes buffered here.
    pub fn fail(&mut self, t: u64) {
        self.status = SiteStatus::Down;
        self.failure_timeline.push(t);
    }

    /// Transition `DOWN -> RECOVERED`.
    pub fn recover(&mut self, t: u64) {
        self.status = SiteStatus::Recovered;
        self.recovery_timeline.push(t);
    }

    /// Transition `RECOVERED -> UP`, implicitly, once this site has
    /// accepted a committed write (§3, §9).
    pub fn mark_fully_up(&mut self) {
        if self.status == SiteStatus::Recovered {
            self.status = SiteStatus::Up;
        }
    }
}
