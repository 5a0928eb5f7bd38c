use std::collections::HashMap;

use crate::aggregate::{account_lines, AccountLine};
use crate::config::{EngineConfig, RenameConfig};
use crate::model::{ComparisonMode, MatchResult, MatchStatus, Snapshot};
use crate::similarity::{greedy_assign, score_candidates};

// ---------------------------------------------------------------------------
// Exact key pass
// ---------------------------------------------------------------------------

/// Indices into the left/right account lines.
#[derive(Debug, Default)]
pub struct KeyMatchOutput {
    pub matched: Vec<(usize, usize)>,
    pub left_only: Vec<usize>,
    pub right_only: Vec<usize>,
}

/// Match two sets of account lines by exact account number.
pub fn match_exact_key(left: &[AccountLine], right: &[AccountLine]) -> KeyMatchOutput {
    let right_index: HashMap<&str, usize> = right
        .iter()
        .enumerate()
        .map(|(i, line)| (line.account_number.as_str(), i))
        .collect();

    let mut out = KeyMatchOutput::default();
    let mut right_used = vec![false; right.len()];

    for (li, line) in left.iter().enumerate() {
        match right_index.get(line.account_number.as_str()) {
            Some(&ri) => {
                right_used[ri] = true;
                out.matched.push((li, ri));
            }
            None => out.left_only.push(li),
        }
    }

    out.right_only = (0..right.len()).filter(|&i| !right_used[i]).collect();
    out
}

// ---------------------------------------------------------------------------
// Rename strategies
// ---------------------------------------------------------------------------

/// An unmatched A line paired with an unmatched B line.
#[derive(Debug, Clone, PartialEq)]
pub struct RenamePair {
    pub left: usize,
    pub right: usize,
    pub similarity: f64,
}

/// What to do with lines the exact key pass left unmatched.
pub trait RenameStrategy: Send + Sync {
    fn pair_unmatched(
        &self,
        left: &[AccountLine],
        right: &[AccountLine],
        left_open: &[usize],
        right_open: &[usize],
    ) -> Vec<RenamePair>;
}

/// VERSION mode: unmatched lines stay NEW / REMOVED.
pub struct KeyOnly;

impl RenameStrategy for KeyOnly {
    fn pair_unmatched(
        &self,
        _left: &[AccountLine],
        _right: &[AccountLine],
        _left_open: &[usize],
        _right_open: &[usize],
    ) -> Vec<RenamePair> {
        Vec::new()
    }
}

/// YEAR mode: greedy pairing of unmatched lines by description similarity.
pub struct DescriptionSimilarity {
    pub config: RenameConfig,
}

impl RenameStrategy for DescriptionSimilarity {
    fn pair_unmatched(
        &self,
        left: &[AccountLine],
        right: &[AccountLine],
        left_open: &[usize],
        right_open: &[usize],
    ) -> Vec<RenamePair> {
        let candidates = score_candidates(left, right, left_open, right_open, &self.config);
        log::debug!(
            "rename: {} of {} pair(s) at or above {}",
            candidates.len(),
            left_open.len() * right_open.len(),
            self.config.threshold
        );
        greedy_assign(candidates, self.config.amount_tie_break)
            .into_iter()
            .map(|c| RenamePair {
                left: c.left,
                right: c.right,
                similarity: c.score,
            })
            .collect()
    }
}

impl ComparisonMode {
    /// Strategy for this mode, chosen once per comparison.
    pub fn strategy(&self, config: &EngineConfig) -> Box<dyn RenameStrategy> {
        match self {
            Self::Version => Box::new(KeyOnly),
            Self::Year => Box::new(DescriptionSimilarity {
                config: config.rename.clone(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Matcher
// ---------------------------------------------------------------------------

/// Classify every account line of `a` and `b`.
///
/// Output order: A lines in first-seen order (keyed, renamed or removed),
/// then B-only lines in first-seen order.
pub fn match_snapshots(
    a: &Snapshot,
    b: &Snapshot,
    mode: ComparisonMode,
    config: &EngineConfig,
) -> Vec<MatchResult> {
    let left = account_lines(a);
    let right = account_lines(b);

    let keyed = match_exact_key(&left, &right);
    let renames = mode
        .strategy(config)
        .pair_unmatched(&left, &right, &keyed.left_only, &keyed.right_only);

    let mut left_partner: Vec<Option<(usize, Option<f64>)>> = vec![None; left.len()];
    let mut right_claimed = vec![false; right.len()];
    for &(l, r) in &keyed.matched {
        left_partner[l] = Some((r, None));
        right_claimed[r] = true;
    }
    for pair in &renames {
        left_partner[pair.left] = Some((pair.right, Some(pair.similarity)));
        right_claimed[pair.right] = true;
    }

    let mut results = Vec::with_capacity(left.len() + right.len());
    for (l, line) in left.iter().enumerate() {
        let result = match left_partner[l] {
            Some((r, None)) => keyed_result(line, &right[r], config.match_tolerance_cents),
            Some((r, Some(similarity))) => renamed_result(line, &right[r], similarity),
            None => removed_result(line),
        };
        results.push(result);
    }
    for (r, line) in right.iter().enumerate() {
        if !right_claimed[r] {
            results.push(new_result(line));
        }
    }

    log::info!(
        "{mode} match: {} account(s) in A, {} in B, {} keyed, {} renamed",
        left.len(),
        right.len(),
        keyed.matched.len(),
        renames.len()
    );

    results
}

fn keyed_result(a: &AccountLine, b: &AccountLine, tolerance_cents: i64) -> MatchResult {
    let delta = b.amount_cents.saturating_sub(a.amount_cents);
    let status = if delta.unsigned_abs() <= tolerance_cents.unsigned_abs() {
        MatchStatus::Unchanged
    } else {
        MatchStatus::Changed
    };
    MatchResult {
        status,
        account_a: Some(a.account_number.clone()),
        account_b: Some(b.account_number.clone()),
        description_a: Some(a.description.clone()),
        description_b: Some(b.description.clone()),
        amount_a_cents: Some(a.amount_cents),
        amount_b_cents: Some(b.amount_cents),
        delta_cents: Some(delta),
        similarity: None,
    }
}

fn renamed_result(a: &AccountLine, b: &AccountLine, similarity: f64) -> MatchResult {
    MatchResult {
        status: MatchStatus::Renamed,
        similarity: Some(similarity),
        ..keyed_result(a, b, 0)
    }
}

fn removed_result(a: &AccountLine) -> MatchResult {
    MatchResult {
        status: MatchStatus::Removed,
        account_a: Some(a.account_number.clone()),
        account_b: None,
        description_a: Some(a.description.clone()),
        description_b: None,
        amount_a_cents: Some(a.amount_cents),
        amount_b_cents: None,
        delta_cents: None,
        similarity: None,
    }
}

fn new_result(b: &AccountLine) -> MatchResult {
    MatchResult {
        status: MatchStatus::New,
        account_a: None,
        account_b: Some(b.account_number.clone()),
        description_a: None,
        description_b: Some(b.description.clone()),
        amount_a_cents: None,
        amount_b_cents: Some(b.amount_cents),
        delta_cents: None,
        similarity: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CanonicalRow;

    fn snap(rows: &[(&str, &str, i64)]) -> Snapshot {
        Snapshot::from_rows(
            rows.iter()
                .map(|(a, d, c)| CanonicalRow::new(*a, *d, *c).unwrap())
                .collect(),
        )
    }

    fn statuses(results: &[MatchResult]) -> Vec<(String, MatchStatus)> {
        results.iter().map(|r| (r.account().to_string(), r.status)).collect()
    }

    #[test]
    fn exact_key_split() {
        let a = snap(&[("1000", "Cash", 100), ("2000", "AP", -100)]);
        let b = snap(&[("1000", "Cash", 100), ("3000", "Equity", -100)]);
        let out = match_exact_key(&account_lines(&a), &account_lines(&b));
        assert_eq!(out.matched, vec![(0, 0)]);
        assert_eq!(out.left_only, vec![1]);
        assert_eq!(out.right_only, vec![1]);
    }

    #[test]
    fn version_mode_classification_and_order() {
        let a = snap(&[("1000", "Cash", 10_000), ("2000", "AP", -5_000), ("3000", "Equity", -5_000)]);
        let b = snap(&[
            ("4000", "Revenue", -700),
            ("3000", "Equity", -5_001),
            ("1000", "Cash", 10_700),
        ]);
        let results = match_snapshots(&a, &b, ComparisonMode::Version, &EngineConfig::default());
        assert_eq!(
            statuses(&results),
            vec![
                ("1000".into(), MatchStatus::Changed),
                ("2000".into(), MatchStatus::Removed),
                ("3000".into(), MatchStatus::Unchanged),
                ("4000".into(), MatchStatus::New),
            ]
        );
        assert_eq!(results[0].delta_cents, Some(700));
        assert_eq!(results[1].account_b, None);
        assert_eq!(results[3].account_a, None);
        assert_eq!(results[3].delta_cents, None);
    }

    #[test]
    fn version_mode_never_renames() {
        let a = snap(&[("5000", "Office Supplies", 10_000)]);
        let b = snap(&[("5050", "Office Supplies", 10_000)]);
        let results = match_snapshots(&a, &b, ComparisonMode::Version, &EngineConfig::default());
        assert_eq!(
            statuses(&results),
            vec![("5000".into(), MatchStatus::Removed), ("5050".into(), MatchStatus::New)]
        );
    }

    #[test]
    fn year_mode_rename() {
        let a = snap(&[("1000", "Cash", 500), ("5000", "Office Supplies", 10_000)]);
        let b = snap(&[("5050", "Office Supplies Expense", 12_000), ("1000", "Cash", 500)]);
        let results = match_snapshots(&a, &b, ComparisonMode::Year, &EngineConfig::default());
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].status, MatchStatus::Unchanged);
        let renamed = &results[1];
        assert_eq!(renamed.status, MatchStatus::Renamed);
        assert_eq!(renamed.account_a.as_deref(), Some("5000"));
        assert_eq!(renamed.account_b.as_deref(), Some("5050"));
        assert_eq!(renamed.description_b.as_deref(), Some("Office Supplies Expense"));
        assert_eq!(renamed.delta_cents, Some(2_000));
        assert_eq!(renamed.similarity, Some(0.8));
    }

    #[test]
    fn year_mode_rename_keeps_a_position() {
        let a = snap(&[("5000", "Office Supplies", 100), ("6000", "Travel", 50), ("7000", "Rent", 10)]);
        let b = snap(&[("9000", "Marketing", 1), ("6000", "Travel", 50), ("5050", "Office Supplies", 100)]);
        let results = match_snapshots(&a, &b, ComparisonMode::Year, &EngineConfig::default());
        assert_eq!(
            statuses(&results),
            vec![
                ("5050".into(), MatchStatus::Renamed),
                ("6000".into(), MatchStatus::Unchanged),
                ("7000".into(), MatchStatus::Removed),
                ("9000".into(), MatchStatus::New),
            ]
        );
    }

    #[test]
    fn year_mode_below_threshold_stays_unmatched() {
        let a = snap(&[("5000", "Office Supplies", 100)]);
        let b = snap(&[("5050", "Legal Fees", 100)]);
        let results = match_snapshots(&a, &b, ComparisonMode::Year, &EngineConfig::default());
        assert_eq!(
            statuses(&results),
            vec![("5000".into(), MatchStatus::Removed), ("5050".into(), MatchStatus::New)]
        );
    }

    #[test]
    fn duplicate_keys_are_summed_before_matching() {
        let a = snap(&[("1000", "Cash", 100), ("1000", "", 50)]);
        let b = snap(&[("1000", "Cash", 150)]);
        let results = match_snapshots(&a, &b, ComparisonMode::Version, &EngineConfig::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, MatchStatus::Unchanged);
        assert_eq!(results[0].amount_a_cents, Some(150));
    }

    #[test]
    fn rounding_rows_match_by_empty_key() {
        let a = snap(&[("", "Rounding Gain/Loss", 1)]);
        let b = snap(&[("", "Rounding Gain/Loss", 3)]);
        let results = match_snapshots(&a, &b, ComparisonMode::Year, &EngineConfig::default());
        assert_eq!(results[0].status, MatchStatus::Changed);
        assert_eq!(results[0].delta_cents, Some(2));
    }
}
