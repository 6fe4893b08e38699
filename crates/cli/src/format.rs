//! Rendering of dump output and commit/abort echoes to stdout (§4.5, §6).

use ssi_sim::{Outcome, SiteId, TxnId, VarId};

/// Render `SiteManager::dump()`'s output as `site <s> - xN: v, xN: v, ...`,
/// one line per site, ascending by site then by variable.
pub fn format_dump(dump: &[(SiteId, Vec<(VarId, i64)>)]) -> String {
    let mut lines = Vec::with_capacity(dump.len());
    for (site, vars) in dump {
        let vars_str = vars
            .iter()
            .map(|(var, value)| format!("{}: {}", var, value))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("site {} - {}", site, vars_str));
    }
    lines.join("\n")
}

/// Render a transaction's terminal outcome for the short stdout echo.
pub fn format_outcome(txn: TxnId, outcome: &Outcome) -> String {
    match outcome {
        Outcome::Committed { .. } => format!("{} commits", txn),
        Outcome::Aborted(cause) => format!("{} aborts ({})", txn, cause),
    }
}
