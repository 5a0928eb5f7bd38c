//! Variance ranking for insight consumers.

use crate::model::MatchResult;

/// The `n` results with the largest absolute delta, largest first.
///
/// Results without a delta (NEW / REMOVED) rank as zero. The sort is stable,
/// so equal magnitudes keep their comparison order.
pub fn top_variances(results: &[MatchResult], n: usize) -> Vec<&MatchResult> {
    let mut ranked: Vec<&MatchResult> = results.iter().collect();
    ranked.sort_by_key(|r| std::cmp::Reverse(abs_delta(r)));
    ranked.truncate(n);
    ranked
}

fn abs_delta(r: &MatchResult) -> u64 {
    r.delta_cents.map_or(0, i64::unsigned_abs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MatchStatus;

    fn result(account: &str, status: MatchStatus, delta: Option<i64>) -> MatchResult {
        MatchResult {
            status,
            account_a: Some(account.into()),
            account_b: Some(account.into()),
            description_a: None,
            description_b: None,
            amount_a_cents: None,
            amount_b_cents: None,
            delta_cents: delta,
            similarity: None,
        }
    }

    #[test]
    fn ranks_by_magnitude() {
        let results = vec![
            result("1000", MatchStatus::Changed, Some(100)),
            result("2000", MatchStatus::Changed, Some(-900)),
            result("3000", MatchStatus::New, None),
            result("4000", MatchStatus::Renamed, Some(300)),
        ];
        let top: Vec<&str> = top_variances(&results, 2).iter().map(|r| r.account()).collect();
        assert_eq!(top, vec!["2000", "4000"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let results = vec![
            result("1000", MatchStatus::Changed, Some(-50)),
            result("2000", MatchStatus::Changed, Some(50)),
            result("3000", MatchStatus::Unchanged, Some(0)),
        ];
        let top: Vec<&str> = top_variances(&results, 10).iter().map(|r| r.account()).collect();
        assert_eq!(top, vec!["1000", "2000", "3000"]);
    }
}
