use crate::model::{MatchResult, MatchStatus, Snapshot, Summary};

/// Count statuses and carry the snapshot totals through.
///
/// `net_delta` is `b.sum - a.sum`, not a re-sum of per-row deltas, so it
/// stays exact even though NEW / REMOVED rows carry no delta.
pub fn summarize(results: &[MatchResult], a: &Snapshot, b: &Snapshot) -> Summary {
    let mut summary = Summary {
        changed: 0,
        new: 0,
        removed: 0,
        renamed: 0,
        unchanged: 0,
        total_rows: results.len(),
        net_delta_cents: b.sum_cents().saturating_sub(a.sum_cents()),
        sum_a_cents: a.sum_cents(),
        sum_b_cents: b.sum_cents(),
        is_balanced_a: a.is_balanced(),
        is_balanced_b: b.is_balanced(),
    };

    for r in results {
        match r.status {
            MatchStatus::Changed => summary.changed += 1,
            MatchStatus::New => summary.new += 1,
            MatchStatus::Removed => summary.removed += 1,
            MatchStatus::Renamed => summary.renamed += 1,
            MatchStatus::Unchanged => summary.unchanged += 1,
        }
    }

    summary
}
