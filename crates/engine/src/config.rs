//! Cluster configuration (ambient stack expansion, §2a).
//!
//! The number of sites is fixed at [`ssi_sim_core::NUM_SITES`]: the
//! odd-variable placement formula (`1 + N mod 10`) is defined in terms of
//! exactly ten sites, so letting it vary would silently break that formula.
//! Only the variable count is configurable, mainly so tests can spin up a
//! small cluster without seeding twenty variables they don't use.

use ssi_sim_core::NUM_VARS;

/// Configuration for a fresh [`crate::manager::TransactionManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterConfig {
    num_vars: u8,
}

impl ClusterConfig {
    /// The number of variables to seed (`x1..=xN`).
    pub fn num_vars(&self) -> u8 {
        self.num_vars
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        ClusterConfig { num_vars: NUM_VARS }
    }
}

/// Builder for [`ClusterConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ClusterConfigBuilder {
    config: ClusterConfig,
}

impl ClusterConfigBuilder {
    /// Start from the default configuration (20 variables).
    pub fn new() -> Self {
        ClusterConfigBuilder::default()
    }

    /// Override the number of variables to seed.
    pub fn num_vars(mut self, num_vars: u8) -> Self {
        self.config.num_vars = num_vars;
        self
    }

    /// Finish building.
    pub fn build(self) -> ClusterConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_seeds_twenty_variables() {
        assert_eq!(ClusterConfig::default().num_vars(), 20);
    }

    #[test]
    fn builder_overrides_var_count() {
        let cfg = ClusterConfigBuilder::new().num_vars(4).build();
        assert_eq!(cfg.num_vars(), 4);
    }
}
