use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::amount::cents_to_decimal;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single cell as materialized by the spreadsheet or CSV reader.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Blank,
}

impl Cell {
    /// Display text of the cell. Integral numbers render without decimals.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s.as_str()),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Cow::Owned(format!("{}", *n as i64))
                } else {
                    Cow::Owned(format!("{n}"))
                }
            }
            Self::Blank => Cow::Borrowed(""),
        }
    }

    /// True for `Blank` and for text that is empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) => false,
            Self::Blank => true,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::Blank
        } else {
            Self::Text(s.to_string())
        }
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        if s.is_empty() {
            Self::Blank
        } else {
            Self::Text(s)
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Rectangular-ish grid of cells, top row first. Never mutated by the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGrid {
    rows: Vec<Vec<Cell>>,
}

impl RawGrid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Build a grid from plain strings; empty strings become `Cell::Blank`.
    pub fn from_strings<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(|s| Cell::from(s.as_ref())).collect())
                .collect(),
        }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at (row, col); out-of-range positions read as blank.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        const BLANK: &Cell = &Cell::Blank;
        self.rows.get(row).and_then(|r| r.get(col)).unwrap_or(BLANK)
    }
}

// ---------------------------------------------------------------------------
// Canonical rows + snapshot
// ---------------------------------------------------------------------------

/// One normalized trial balance line. Amount is never zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalRow {
    account_number: String,
    description: String,
    amount_cents: i64,
}

impl CanonicalRow {
    /// Returns `None` for a zero amount; such rows never reach a snapshot.
    pub fn new(
        account_number: impl Into<String>,
        description: impl Into<String>,
        amount_cents: i64,
    ) -> Option<Self> {
        if amount_cents == 0 {
            return None;
        }
        Some(Self {
            account_number: account_number.into(),
            description: description.into(),
            amount_cents,
        })
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount_cents(&self) -> i64 {
        self.amount_cents
    }

    pub fn amount(&self) -> f64 {
        cents_to_decimal(self.amount_cents)
    }

    /// Rounding Gain/Loss pseudo-account (no account number).
    pub fn is_rounding(&self) -> bool {
        self.account_number.is_empty()
    }
}

/// Immutable set of rows with its fixed-point sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    rows: Vec<CanonicalRow>,
    sum_cents: i64,
    is_balanced: bool,
}

impl Snapshot {
    pub(crate) fn from_parts(rows: Vec<CanonicalRow>, sum_cents: i64, is_balanced: bool) -> Self {
        Self {
            rows,
            sum_cents,
            is_balanced,
        }
    }

    pub fn rows(&self) -> &[CanonicalRow] {
        &self.rows
    }

    pub fn sum_cents(&self) -> i64 {
        self.sum_cents
    }

    pub fn sum(&self) -> f64 {
        cents_to_decimal(self.sum_cents)
    }

    pub fn is_balanced(&self) -> bool {
        self.is_balanced
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonMode {
    /// Two revisions of the same period; chart of accounts is stable.
    Version,
    /// Year over year; accounts may be renumbered.
    Year,
}

impl std::fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Version => write!(f, "VERSION"),
            Self::Year => write!(f, "YEAR"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    A,
    B,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    New,
    Removed,
    Changed,
    Renamed,
    Unchanged,
}

impl MatchStatus {
    pub const ALL: [MatchStatus; 5] = [
        Self::Changed,
        Self::Renamed,
        Self::New,
        Self::Removed,
        Self::Unchanged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Removed => "REMOVED",
            Self::Changed => "CHANGED",
            Self::Renamed => "RENAMED",
            Self::Unchanged => "UNCHANGED",
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified account line. Sides are absent where the status has none
/// (NEW has no A side, REMOVED has no B side).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub status: MatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_a: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_b: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_a: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_b: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_a_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_b_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta_cents: Option<i64>,
    /// Description similarity for RENAMED pairs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

impl MatchResult {
    /// Account key to display: the B side when present, otherwise A.
    pub fn account(&self) -> &str {
        self.account_b
            .as_deref()
            .or(self.account_a.as_deref())
            .unwrap_or("")
    }

    pub fn amount_a(&self) -> Option<f64> {
        self.amount_a_cents.map(cents_to_decimal)
    }

    pub fn amount_b(&self) -> Option<f64> {
        self.amount_b_cents.map(cents_to_decimal)
    }

    pub fn delta(&self) -> Option<f64> {
        self.delta_cents.map(cents_to_decimal)
    }
}

/// Aggregate counts for one comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub changed: usize,
    pub new: usize,
    pub removed: usize,
    pub renamed: usize,
    pub unchanged: usize,
    pub total_rows: usize,
    pub net_delta_cents: i64,
    pub sum_a_cents: i64,
    pub sum_b_cents: i64,
    pub is_balanced_a: bool,
    pub is_balanced_b: bool,
}

impl Summary {
    pub fn net_delta(&self) -> f64 {
        cents_to_decimal(self.net_delta_cents)
    }

    pub fn sum_a(&self) -> f64 {
        cents_to_decimal(self.sum_a_cents)
    }

    pub fn sum_b(&self) -> f64 {
        cents_to_decimal(self.sum_b_cents)
    }

    pub fn count(&self, status: MatchStatus) -> usize {
        match status {
            MatchStatus::New => self.new,
            MatchStatus::Removed => self.removed,
            MatchStatus::Changed => self.changed,
            MatchStatus::Renamed => self.renamed,
            MatchStatus::Unchanged => self.unchanged,
        }
    }

    /// Anything other than UNCHANGED.
    pub fn has_differences(&self) -> bool {
        self.changed + self.new + self.removed + self.renamed > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_cell_text() {
        assert_eq!(Cell::Number(10000.0).text(), "10000");
        assert_eq!(Cell::Number(-12.5).text(), "-12.5");
        assert_eq!(Cell::Blank.text(), "");
    }

    #[test]
    fn zero_amount_row_rejected() {
        assert!(CanonicalRow::new("1000", "Cash", 0).is_none());
        let row = CanonicalRow::new("1000", "Cash", -50000).unwrap();
        assert_eq!(row.amount(), -500.0);
        assert!(!row.is_rounding());
    }

    #[test]
    fn out_of_range_cell_is_blank() {
        let grid = RawGrid::from_strings([["a", ""]]);
        assert_eq!(grid.cell(0, 0), &Cell::Text("a".into()));
        assert!(grid.cell(0, 1).is_blank());
        assert!(grid.cell(4, 9).is_blank());
    }

    #[test]
    fn status_serializes_uppercase() {
        let json = serde_json::to_string(&MatchStatus::Unchanged).unwrap();
        assert_eq!(json, "\"UNCHANGED\"");
    }
}
