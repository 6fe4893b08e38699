//! Domain identifiers for sites, variables, and transactions.
//!
//! These are thin newtypes over the integers the script grammar uses
//! (`Tk`, `xN`, site `s`) so the engine and the driver can't accidentally
//! mix up a site id and a variable id at a call site.

use std::fmt;

/// The number of sites in the simulated cluster (§3).
pub const NUM_SITES: u8 = 10;

/// The number of variables in the simulated cluster (§3).
pub const NUM_VARS: u8 = 20;

/// Identifier for a transaction, written `Tk` in the script grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct TxnId(pub u32);

impl TxnId {
    /// Construct a transaction id from its numeric suffix.
    ///
    /// ```
    /// use ssi_sim_core::ids::TxnId;
    /// assert_eq!(TxnId::new(3).to_string(), "T3");
    /// ```
    pub fn new(k: u32) -> Self {
        TxnId(k)
    }
}

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// Identifier for a variable, written `xN` in the script grammar.
///
/// `N` is 1-indexed and must fall in `[1, NUM_VARS]`; construction does not
/// itself enforce the range (callers validate at parse time, see
/// `ssi-sim-cli`), but [`VarId::is_even`] and [`VarId::home_site`] assume it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct VarId(pub u8);

impl VarId {
    /// Construct a variable id from its numeric suffix.
    pub fn new(n: u8) -> Self {
        VarId(n)
    }

    /// Even-indexed variables are replicated on every site (§3).
    pub fn is_even(&self) -> bool {
        self.0 % 2 == 0
    }

    /// The single home site for an odd-indexed variable: `1 + (N mod 10)`.
    ///
    /// Returns `None` for even (replicated) variables, which have no single
    /// home site.
    pub fn home_site(&self) -> Option<SiteId> {
        if self.is_even() {
            None
        } else {
            Some(SiteId(1 + self.0 % NUM_SITES))
        }
    }

    /// The seed value written at initialization: `10 * N`.
    pub fn initial_value(&self) -> i64 {
        10 * self.0 as i64
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// Identifier for a site, in `[1, NUM_SITES]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct SiteId(pub u8);

impl SiteId {
    /// Construct a site id from its numeric value.
    pub fn new(s: u8) -> Self {
        SiteId(s)
    }

    /// All sites in the cluster, in ascending id order.
    pub fn all() -> impl Iterator<Item = SiteId> {
        (1..=NUM_SITES).map(SiteId)
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_variable_home_site() {
        // x1 -> site 1 + (1 % 10) = 2
        assert_eq!(VarId::new(1).home_site(), Some(SiteId::new(2)));
        // x11 -> site 1 + (11 % 10) = 2
        assert_eq!(VarId::new(11).home_site(), Some(SiteId::new(2)));
        // x19 -> site 1 + (19 % 10) = 10
        assert_eq!(VarId::new(19).home_site(), Some(SiteId::new(10)));
    }

    #[test]
    fn even_variable_has_no_home_site() {
        assert_eq!(VarId::new(2).home_site(), None);
    }

    #[test]
    fn initial_values_seeded_at_ten_times_index() {
        assert_eq!(VarId::new(4).initial_value(), 40);
        assert_eq!(VarId::new(17).initial_value(), 170);
    }

    #[test]
    fn all_sites_is_one_through_ten() {
        let ids: Vec<u8> = SiteId::all().map(|s| s.0).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
    }
}
