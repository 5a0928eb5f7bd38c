//! Row Normalizer: raw cell grid → canonical `(account, description, amount)` rows.

use std::borrow::Cow;

use serde::Serialize;

use crate::amount::{cell_amount, CellAmount, MAX_AMOUNT_CENTS};
use crate::config::{ColumnKeywords, EngineConfig};
use crate::describe::{extract_account, format_description, normalize_whitespace};
use crate::error::ReconError;
use crate::model::{CanonicalRow, Cell, RawGrid};

// ---------------------------------------------------------------------------
// Column layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Account,
    Description,
    Amount,
    Debit,
    Credit,
}

impl ColumnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Description => "description",
            Self::Amount => "amount",
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    /// Role for a header cell. `Account Description` is a description column,
    /// `Debit Amount` a debit column.
    pub fn classify(header: &str, keywords: &ColumnKeywords) -> Option<Self> {
        let lower = header.to_lowercase();
        let hit = |words: &[String]| words.iter().any(|w| lower.contains(&w.to_lowercase()));
        if hit(&keywords.description) {
            Some(Self::Description)
        } else if hit(&keywords.debit) {
            Some(Self::Debit)
        } else if hit(&keywords.credit) {
            Some(Self::Credit)
        } else if hit(&keywords.amount) {
            Some(Self::Amount)
        } else if hit(&keywords.account) {
            Some(Self::Account)
        } else {
            None
        }
    }
}

/// Which column index plays which role. First column wins per role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnLayout {
    pub header_row: usize,
    pub account: Option<usize>,
    pub description: Option<usize>,
    pub amount: Option<usize>,
    pub debit: Option<usize>,
    pub credit: Option<usize>,
}

impl ColumnLayout {
    fn slot(&mut self, role: ColumnRole) -> &mut Option<usize> {
        match role {
            ColumnRole::Account => &mut self.account,
            ColumnRole::Description => &mut self.description,
            ColumnRole::Amount => &mut self.amount,
            ColumnRole::Debit => &mut self.debit,
            ColumnRole::Credit => &mut self.credit,
        }
    }

    fn amount_source(&self) -> Option<AmountSource> {
        if let Some(col) = self.amount {
            Some(AmountSource::Single(col))
        } else if self.debit.is_some() || self.credit.is_some() {
            Some(AmountSource::DebitCredit {
                debit: self.debit,
                credit: self.credit,
            })
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum AmountSource {
    Single(usize),
    DebitCredit {
        debit: Option<usize>,
        credit: Option<usize>,
    },
}

impl AmountSource {
    fn covers(&self, col: usize) -> bool {
        match *self {
            AmountSource::Single(c) => c == col,
            AmountSource::DebitCredit { debit, credit } => debit == Some(col) || credit == Some(col),
        }
    }
}

/// First row (within the scan window) where any cell contains a header keyword.
pub fn detect_header(grid: &RawGrid, config: &EngineConfig) -> Result<usize, ReconError> {
    let keywords: Vec<String> = config.columns.all().map(|k| k.to_lowercase()).collect();
    let window = grid.len().min(config.header_scan_rows);

    grid.rows()
        .iter()
        .take(window)
        .position(|row| {
            row.iter().any(|cell| {
                let text = normalize_whitespace(&cell.text()).to_lowercase();
                !text.is_empty() && keywords.iter().any(|k| text.contains(k.as_str()))
            })
        })
        .ok_or(ReconError::MalformedInput {
            scanned_rows: window,
        })
}

pub fn assign_columns(header: &[Cell], header_row: usize, keywords: &ColumnKeywords) -> ColumnLayout {
    let mut layout = ColumnLayout {
        header_row,
        ..ColumnLayout::default()
    };
    for (col, cell) in header.iter().enumerate() {
        let text = normalize_whitespace(&cell.text());
        if let Some(role) = ColumnRole::classify(&text, keywords) {
            let slot = layout.slot(role);
            if slot.is_none() {
                *slot = Some(col);
            } else {
                log::debug!("ignoring extra {} column {col} ({text:?})", role.as_str());
            }
        }
    }
    layout
}

// ---------------------------------------------------------------------------
// Drop accounting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Every cell blank.
    BlankRow,
    /// Total / subtotal line.
    TotalLine,
    /// No 3–10 digit account number and not a Rounding line.
    NoAccount,
    /// Amount zero or blank.
    ZeroAmount,
    /// Amount, debit or credit text that is not a number.
    UnparseableAmount,
}

/// Rows excluded from the output, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DropStats {
    pub blank_row: usize,
    pub total_line: usize,
    pub no_account: usize,
    pub zero_amount: usize,
    pub unparseable_amount: usize,
}

impl DropStats {
    pub fn record(&mut self, reason: DropReason) {
        match reason {
            DropReason::BlankRow => self.blank_row += 1,
            DropReason::TotalLine => self.total_line += 1,
            DropReason::NoAccount => self.no_account += 1,
            DropReason::ZeroAmount => self.zero_amount += 1,
            DropReason::UnparseableAmount => self.unparseable_amount += 1,
        }
    }

    pub fn dropped(&self) -> usize {
        self.blank_row + self.total_line + self.no_account + self.zero_amount + self.unparseable_amount
    }
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Grid bound to its detected column layout.
pub struct Normalizer<'a> {
    grid: &'a RawGrid,
    config: &'a EngineConfig,
    layout: ColumnLayout,
    account_col: usize,
    amount: AmountSource,
}

impl<'a> Normalizer<'a> {
    pub fn new(grid: &'a RawGrid, config: &'a EngineConfig) -> Result<Self, ReconError> {
        let header_row = detect_header(grid, config)?;
        let layout = assign_columns(&grid.rows()[header_row], header_row, &config.columns);

        let account_col = layout.account.ok_or(ReconError::MissingColumn {
            role: "account",
            header_row,
        })?;
        let amount = layout.amount_source().ok_or(ReconError::MissingColumn {
            role: "amount/debit/credit",
            header_row,
        })?;

        log::debug!("header at row {header_row}, layout {layout:?}");

        Ok(Self {
            grid,
            config,
            layout,
            account_col,
            amount,
        })
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    /// Single pass over the data rows below the header.
    pub fn into_rows(self) -> Rows<'a> {
        let next = self.layout.header_row + 1;
        Rows {
            normalizer: self,
            next,
            dropped: DropStats::default(),
        }
    }

    fn normalize_row(&self, row: usize) -> Result<CanonicalRow, DropReason> {
        let cells = &self.grid.rows()[row];
        if cells.iter().all(Cell::is_blank) {
            return Err(DropReason::BlankRow);
        }

        let account_cell = self.grid.cell(row, self.account_col);
        let account_text = account_cell.text();
        let account_text = account_text.trim();
        let description_cell = self.layout.description.map(|c| self.grid.cell(row, c));

        let label_cells: Vec<Cow<'_, str>> = cells
            .iter()
            .enumerate()
            .filter(|(col, cell)| !self.amount.covers(*col) && !cell.is_blank())
            .map(|(_, cell)| cell.text())
            .collect();
        let lower_labels = label_cells.join(" ").to_lowercase();
        if lower_labels.contains("total") {
            return Err(DropReason::TotalLine);
        }

        let (account_number, label) = match extract_account(account_text) {
            Some(acct) => (acct.number.to_string(), acct.label),
            None if lower_labels.contains("rounding") => {
                let label = if account_text.is_empty() {
                    label_cells
                        .iter()
                        .map(|t| t.trim())
                        .find(|t| t.to_lowercase().contains("rounding"))
                        .unwrap_or_default()
                } else {
                    account_text
                };
                (String::new(), label)
            }
            None => return Err(DropReason::NoAccount),
        };

        let amount_cents = self.amount_cents(row)?;

        let description = match description_cell {
            Some(cell) if !cell.is_blank() => normalize_whitespace(&cell.text()),
            _ => format_description(label, self.config),
        };

        CanonicalRow::new(account_number, description, amount_cents).ok_or(DropReason::ZeroAmount)
    }

    fn amount_cents(&self, row: usize) -> Result<i64, DropReason> {
        match self.amount {
            AmountSource::Single(col) => match cell_amount(self.grid.cell(row, col)) {
                CellAmount::Cents(c) => Ok(c),
                CellAmount::Blank => Err(DropReason::ZeroAmount),
                CellAmount::Unparseable => Err(DropReason::UnparseableAmount),
            },
            AmountSource::DebitCredit { debit, credit } => {
                let read = |col: Option<usize>| match col.map(|c| cell_amount(self.grid.cell(row, c))) {
                    None | Some(CellAmount::Blank) => Ok(0),
                    Some(CellAmount::Cents(c)) => Ok(c),
                    Some(CellAmount::Unparseable) => Err(DropReason::UnparseableAmount),
                };
                let debit = read(debit)?;
                let credit = read(credit)?;
                debit
                    .checked_sub(credit)
                    .filter(|net| net.abs() <= MAX_AMOUNT_CENTS)
                    .ok_or(DropReason::UnparseableAmount)
            }
        }
    }
}

/// Canonical rows in grid order. Drop counts are complete once exhausted.
pub struct Rows<'a> {
    normalizer: Normalizer<'a>,
    next: usize,
    dropped: DropStats,
}

impl Rows<'_> {
    pub fn dropped(&self) -> &DropStats {
        &self.dropped
    }
}

impl Iterator for Rows<'_> {
    type Item = CanonicalRow;

    fn next(&mut self) -> Option<CanonicalRow> {
        while self.next < self.normalizer.grid.len() {
            let row = self.next;
            self.next += 1;
            match self.normalizer.normalize_row(row) {
                Ok(canonical) => return Some(canonical),
                Err(reason) => {
                    log::trace!("row {row} dropped: {reason:?}");
                    self.dropped.record(reason);
                }
            }
        }
        None
    }
}

/// Fully drained normalizer output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Normalized {
    pub layout: ColumnLayout,
    pub rows: Vec<CanonicalRow>,
    pub dropped: DropStats,
}

pub fn normalize(grid: &RawGrid, config: &EngineConfig) -> Result<Normalized, ReconError> {
    let normalizer = Normalizer::new(grid, config)?;
    let layout = normalizer.layout().clone();
    let mut stream = normalizer.into_rows();
    let rows: Vec<CanonicalRow> = stream.by_ref().collect();
    let dropped = *stream.dropped();

    log::debug!(
        "normalized {} row(s), dropped {} ({dropped:?})",
        rows.len(),
        dropped.dropped()
    );

    Ok(Normalized {
        layout,
        rows,
        dropped,
    })
}
