//! Property tests for `Variable`'s append-only snapshot history (§4.1, §8):
//! commits only ever extend the history at a strictly later timestamp, and
//! `read_as_of` always matches a naive scan of the full history.

use proptest::prelude::*;
use ssi_sim_core::VarId;
use ssi_sim_engine::variable::Variable;

fn increasing_timestamps() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(1u64..50, 1..20).prop_map(|deltas| {
        let mut timestamps = Vec::with_capacity(deltas.len());
        let mut acc = 0u64;
        for delta in deltas {
            acc += delta;
            timestamps.push(acc);
        }
        timestamps
    })
}

proptest! {
    #[test]
    fn commits_preserve_strictly_increasing_history(
        timestamps in increasing_timestamps(),
        values in prop::collection::vec(any::<i64>(), 1..20),
    ) {
        let mut var = Variable::new(VarId::new(4));
        let mut history = vec![(0u64, 40i64)]; // seeded at construction

        let n = timestamps.len().min(values.len());
        for i in 0..n {
            let (t, v) = (timestamps[i], values[i]);
            var.commit(t, v).unwrap();
            history.push((t, v));
        }

        for &(t, _) in &history {
            let probe = t + 1;
            let expected = history.iter().rev().find(|(ts, _)| *ts < probe).map(|(_, v)| *v);
            prop_assert_eq!(var.read_as_of(probe), expected);
        }
        prop_assert_eq!(var.most_recent_commit_time(), history.last().map(|(t, _)| *t));
    }

    #[test]
    fn commit_rejects_any_timestamp_not_strictly_after_the_last_one(
        first in 1u64..100,
        second in 0u64..100,
        v1: i64,
        v2: i64,
    ) {
        let mut var = Variable::new(VarId::new(2));
        var.commit(first, v1).unwrap();
        if second <= first {
            prop_assert!(var.commit(second, v2).is_err());
        } else {
            prop_assert!(var.commit(second, v2).is_ok());
        }
    }
}
