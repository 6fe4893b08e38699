//! Property tests over the public `Cluster` surface for the cross-cutting
//! invariants in §8: a conflict-free schedule always commits and lands its
//! final value everywhere the variable is replicated, and a first-committer-
//! wins abort never leaks its write into a dump.

mod common;

use common::TestCluster;
use proptest::prelude::*;
use ssi_sim::{AbortCause, Outcome};

proptest! {
    #[test]
    fn sequential_writes_to_the_same_variable_all_commit_in_order(
        values in prop::collection::vec(any::<i16>(), 1..8),
    ) {
        let mut c = TestCluster::new();
        let mut last = 20i64; // x2's seeded value
        for (i, value) in values.iter().enumerate() {
            let txn = (i as u32) + 1;
            c.begin(txn);
            c.write(txn, 2, *value as i64);
            prop_assert!(c.end(txn).is_committed());
            last = *value as i64;
        }
        // x2 is replicated, so every site shows the same final value.
        prop_assert_eq!(c.value_at(1, 2), Some(last));
        prop_assert_eq!(c.value_at(10, 2), Some(last));
    }

    #[test]
    fn an_aborted_write_never_appears_in_the_dump(
        winner: i16,
        loser: i16,
    ) {
        let mut c = TestCluster::new();
        c.begin(1);
        c.begin(2);
        c.write(1, 2, winner as i64);
        prop_assert!(c.end(1).is_committed());
        c.write(2, 2, loser as i64);
        let outcome = c.end(2);
        prop_assert_eq!(outcome, Outcome::Aborted(AbortCause::StaleWrite));
        prop_assert_eq!(c.value_at(1, 2), Some(winner as i64));
    }
}
