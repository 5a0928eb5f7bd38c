use std::cmp::Ordering;

use serde::Serialize;

use crate::aggregate::aggregate;
use crate::amount::format_cents;
use crate::config::EngineConfig;
use crate::error::ReconError;
use crate::matcher::match_snapshots;
use crate::model::{CanonicalRow, ComparisonMode, MatchResult, MatchStatus, RawGrid, Side, Snapshot, Summary};
use crate::normalize::{normalize, ColumnLayout, DropStats};
use crate::rank::top_variances;
use crate::summary::summarize;

// ---------------------------------------------------------------------------
// Clean (single trial balance)
// ---------------------------------------------------------------------------

/// One normalized and aggregated trial balance.
#[derive(Debug, Clone, Serialize)]
pub struct CleanReport {
    pub layout: ColumnLayout,
    pub grid_rows: usize,
    pub dropped: DropStats,
    pub snapshot: Snapshot,
}

impl CleanReport {
    /// Rows ordered for export: numeric account ascending, Rounding rows last.
    pub fn export_rows(&self) -> Vec<&CanonicalRow> {
        let mut rows: Vec<&CanonicalRow> = self.snapshot.rows().iter().collect();
        rows.sort_by(|a, b| export_order(a, b));
        rows
    }

    /// First line of the cleaned sheet, e.g. `Balanced: Sum = 0.00`.
    pub fn balance_line(&self) -> String {
        let sum = format_cents(self.snapshot.sum_cents());
        if self.snapshot.is_balanced() {
            format!("Balanced: Sum = {sum}")
        } else {
            format!("Not Balanced: Sum = {sum}")
        }
    }
}

fn export_order(a: &CanonicalRow, b: &CanonicalRow) -> Ordering {
    let key = |r: &CanonicalRow| r.account_number().parse::<u64>().ok();
    match (key(a), key(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.account_number().cmp(b.account_number())),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.account_number().cmp(b.account_number()),
    }
}

/// Normalize a grid and aggregate it into a snapshot.
pub fn clean(grid: &RawGrid, config: &EngineConfig) -> Result<CleanReport, ReconError> {
    let normalized = normalize(grid, config)?;
    let snapshot = aggregate(normalized.rows, config);

    log::info!(
        "cleaned {} row(s) from {} grid row(s), sum {}",
        snapshot.len(),
        grid.len(),
        format_cents(snapshot.sum_cents())
    );
    if !snapshot.is_balanced() {
        log::warn!("trial balance does not balance: sum {}", format_cents(snapshot.sum_cents()));
    }

    Ok(CleanReport {
        layout: normalized.layout,
        grid_rows: grid.len(),
        dropped: normalized.dropped,
        snapshot,
    })
}

// ---------------------------------------------------------------------------
// Compare (two trial balances)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonMeta {
    pub mode: ComparisonMode,
    pub engine_version: String,
    pub rows_a: usize,
    pub rows_b: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropped_a: Option<DropStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropped_b: Option<DropStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub meta: ComparisonMeta,
    pub summary: Summary,
    pub results: Vec<MatchResult>,
}

impl Comparison {
    /// Largest absolute deltas first.
    pub fn top_variances(&self, n: usize) -> Vec<&MatchResult> {
        top_variances(&self.results, n)
    }

    /// Results grouped CHANGED, RENAMED, NEW, REMOVED, UNCHANGED; comparison
    /// order is kept within each group.
    pub fn grouped_by_status(&self) -> Vec<&MatchResult> {
        let rank = |s: MatchStatus| MatchStatus::ALL.iter().position(|x| *x == s).unwrap_or(usize::MAX);
        let mut grouped: Vec<&MatchResult> = self.results.iter().collect();
        grouped.sort_by_key(|r| rank(r.status));
        grouped
    }
}

/// Match two finished snapshots and summarize.
pub fn compare_snapshots(
    a: &Snapshot,
    b: &Snapshot,
    mode: ComparisonMode,
    config: &EngineConfig,
) -> Comparison {
    let results = match_snapshots(a, b, mode, config);
    let summary = summarize(&results, a, b);
    Comparison {
        meta: ComparisonMeta {
            mode,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            rows_a: a.len(),
            rows_b: b.len(),
            dropped_a: None,
            dropped_b: None,
        },
        summary,
        results,
    }
}

/// Clean both grids (in parallel with the `parallel` feature), then compare.
pub fn compare(
    grid_a: &RawGrid,
    grid_b: &RawGrid,
    mode: ComparisonMode,
    config: &EngineConfig,
) -> Result<Comparison, ReconError> {
    #[cfg(feature = "parallel")]
    let (a, b) = rayon::join(|| clean(grid_a, config), || clean(grid_b, config));
    #[cfg(not(feature = "parallel"))]
    let (a, b) = (clean(grid_a, config), clean(grid_b, config));

    let a = a.map_err(|e| e.for_side(Side::A))?;
    let b = b.map_err(|e| e.for_side(Side::B))?;

    let mut comparison = compare_snapshots(&a.snapshot, &b.snapshot, mode, config);
    comparison.meta.dropped_a = Some(a.dropped);
    comparison.meta.dropped_b = Some(b.dropped);
    Ok(comparison)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> RawGrid {
        RawGrid::from_strings(rows.iter().map(|r| r.iter().copied()))
    }

    #[test]
    fn export_rows_sorted_with_rounding_last() {
        let report = clean(
            &grid(&[
                &["Account", "Amount"],
                &["Rounding Gain/Loss", "0.01"],
                &["20000 Payables", "-100"],
                &["9000 Misc", "50"],
                &["10000 Cash", "49.99"],
            ]),
            &EngineConfig::default(),
        )
        .unwrap();
        let order: Vec<&str> = report.export_rows().iter().map(|r| r.account_number()).collect();
        assert_eq!(order, vec!["9000", "10000", "20000", ""]);
        assert_eq!(report.balance_line(), "Balanced: Sum = 0.00");
    }

    #[test]
    fn unbalanced_line() {
        let report = clean(
            &grid(&[&["Account", "Amount"], &["1000 Cash", "12.34"]]),
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(report.balance_line(), "Not Balanced: Sum = 12.34");
    }

    #[test]
    fn compare_attributes_errors_to_side() {
        let good = grid(&[&["Account", "Amount"], &["1000 Cash", "1"]]);
        let bad = grid(&[&["nothing", "here"]]);
        let err = compare(&good, &bad, ComparisonMode::Version, &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, ReconError::Snapshot { side: Side::B, .. }));
        assert!(matches!(err.root(), ReconError::MalformedInput { .. }));
        assert!(err.to_string().starts_with("snapshot B: malformed input"));
    }

    #[test]
    fn grouped_by_status_order() {
        let a = grid(&[&["Account", "Amount"], &["1000 Cash", "1"], &["2000 AP", "2"], &["3000 Eq", "3"]]);
        let b = grid(&[&["Account", "Amount"], &["4000 Rev", "4"], &["2000 AP", "5"], &["1000 Cash", "1"]]);
        let cmp = compare(&a, &b, ComparisonMode::Version, &EngineConfig::default()).unwrap();
        let grouped: Vec<MatchStatus> = cmp.grouped_by_status().iter().map(|r| r.status).collect();
        assert_eq!(
            grouped,
            vec![MatchStatus::Changed, MatchStatus::New, MatchStatus::Removed, MatchStatus::Unchanged]
        );
        assert_eq!(cmp.meta.dropped_a.unwrap().dropped(), 0);
    }
}
