//! Description similarity for year-over-year rename detection.

use std::collections::{BTreeSet, HashSet};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::aggregate::AccountLine;
use crate::config::{RenameConfig, SimilarityMetric};

/// Lowercase and collapse whitespace.
pub fn normalize_for_similarity(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

fn tokens(s: &str) -> BTreeSet<String> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Dice coefficient over word tokens: `2·|A∩B| / (|A| + |B|)`.
pub fn token_overlap(a: &str, b: &str) -> f64 {
    let ta = tokens(a);
    let tb = tokens(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let shared = ta.intersection(&tb).count();
    (2 * shared) as f64 / (ta.len() + tb.len()) as f64
}

/// `1 - levenshtein / max_len` over normalized descriptions.
pub fn edit_distance_ratio(a: &str, b: &str) -> f64 {
    let na = normalize_for_similarity(a);
    let nb = normalize_for_similarity(b);
    if na.is_empty() || nb.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(&na, &nb)
}

pub fn similarity(a: &str, b: &str, metric: SimilarityMetric) -> f64 {
    match metric {
        SimilarityMetric::TokenOverlap => token_overlap(a, b),
        SimilarityMetric::EditDistance => edit_distance_ratio(a, b),
    }
}

/// One scored (unmatched A, unmatched B) pairing.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub left: usize,
    pub right: usize,
    pub score: f64,
    pub amount_gap_cents: u64,
}

/// Score every open (left, right) pair; keep those at or above the threshold.
pub fn score_candidates(
    left: &[AccountLine],
    right: &[AccountLine],
    left_open: &[usize],
    right_open: &[usize],
    config: &RenameConfig,
) -> Vec<Candidate> {
    let score = |l: usize, r: usize| Candidate {
        left: l,
        right: r,
        score: similarity(&left[l].description, &right[r].description, config.metric),
        amount_gap_cents: left[l].amount_cents.abs_diff(right[r].amount_cents),
    };

    #[cfg(feature = "parallel")]
    let scored: Vec<Candidate> = left_open
        .par_iter()
        .flat_map_iter(|&l| right_open.iter().map(move |&r| score(l, r)))
        .filter(|c| c.score >= config.threshold)
        .collect();

    #[cfg(not(feature = "parallel"))]
    let scored: Vec<Candidate> = left_open
        .iter()
        .flat_map(|&l| right_open.iter().map(move |&r| score(l, r)))
        .filter(|c| c.score >= config.threshold)
        .collect();

    scored
}

/// Highest score first; ties by amount gap (when enabled), then by A order,
/// then by B order. Each side is claimed at most once.
pub fn greedy_assign(mut candidates: Vec<Candidate>, amount_tie_break: bool) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        let by_score = b.score.total_cmp(&a.score);
        let by_gap = if amount_tie_break {
            a.amount_gap_cents.cmp(&b.amount_gap_cents)
        } else {
            std::cmp::Ordering::Equal
        };
        by_score
            .then(by_gap)
            .then(a.left.cmp(&b.left))
            .then(a.right.cmp(&b.right))
    });

    let mut left_used = HashSet::new();
    let mut right_used = HashSet::new();
    let mut assigned = Vec::new();
    for c in candidates {
        if left_used.contains(&c.left) || right_used.contains(&c.right) {
            continue;
        }
        left_used.insert(c.left);
        right_used.insert(c.right);
        assigned.push(c);
    }
    assigned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(account: &str, description: &str, cents: i64) -> AccountLine {
        AccountLine {
            account_number: account.into(),
            description: description.into(),
            amount_cents: cents,
            row_count: 1,
        }
    }

    fn cand(left: usize, right: usize, score: f64, gap: u64) -> Candidate {
        Candidate {
            left,
            right,
            score,
            amount_gap_cents: gap,
        }
    }

    #[test]
    fn token_overlap_scores() {
        assert_eq!(token_overlap("Office Supplies", "office  supplies"), 1.0);
        assert_eq!(token_overlap("Office Supplies", "Office Supplies Expense"), 0.8);
        assert_eq!(token_overlap("Cash", "Payroll"), 0.0);
        assert_eq!(token_overlap("", "Payroll"), 0.0);
    }

    #[test]
    fn edit_distance_scores() {
        assert_eq!(edit_distance_ratio("Rent", "rent"), 1.0);
        assert!(edit_distance_ratio("Office Supplies", "Office Supplies Expense") > 0.6);
        assert_eq!(edit_distance_ratio("", ""), 0.0);
    }

    #[test]
    fn threshold_filters_candidates() {
        let left = vec![line("5000", "Office Supplies", 100), line("6000", "Travel", 5)];
        let right = vec![line("5050", "Office Supplies Expense", 120)];
        let cands = score_candidates(&left, &right, &[0, 1], &[0], &RenameConfig::default());
        assert_eq!(cands.len(), 1);
        assert_eq!(cands[0].left, 0);
        assert_eq!(cands[0].amount_gap_cents, 20);
    }

    #[test]
    fn greedy_claims_best_first() {
        let assigned = greedy_assign(
            vec![cand(0, 0, 0.7, 0), cand(1, 0, 0.9, 0), cand(0, 1, 0.65, 0)],
            true,
        );
        let pairs: Vec<(usize, usize)> = assigned.iter().map(|c| (c.left, c.right)).collect();
        assert_eq!(pairs, vec![(1, 0), (0, 1)]);
    }

    #[test]
    fn ties_break_on_amount_then_order() {
        let assigned = greedy_assign(vec![cand(0, 0, 0.8, 500), cand(0, 1, 0.8, 10)], true);
        assert_eq!((assigned[0].left, assigned[0].right), (0, 1));

        let assigned = greedy_assign(vec![cand(0, 1, 0.8, 10), cand(0, 0, 0.8, 500)], false);
        assert_eq!((assigned[0].left, assigned[0].right), (0, 0));
    }
}
