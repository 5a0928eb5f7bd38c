use std::collections::HashMap;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::model::{CanonicalRow, Snapshot};

/// Sum rows in integer cents and check the balance.
pub fn aggregate(rows: Vec<CanonicalRow>, config: &EngineConfig) -> Snapshot {
    let sum_cents = rows
        .iter()
        .map(CanonicalRow::amount_cents)
        .fold(0i64, i64::saturating_add);
    let is_balanced = sum_cents.unsigned_abs() <= config.balance_tolerance_cents.unsigned_abs();
    Snapshot::from_parts(rows, sum_cents, is_balanced)
}

impl Snapshot {
    /// Aggregate with the default 0.01 balance tolerance.
    pub fn from_rows(rows: Vec<CanonicalRow>) -> Self {
        aggregate(rows, &EngineConfig::default())
    }
}

/// All rows of one snapshot sharing an account number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountLine {
    pub account_number: String,
    /// First non-blank description seen under this account.
    pub description: String,
    pub amount_cents: i64,
    pub row_count: usize,
}

/// Group rows by account number in first-seen order, summing amounts.
pub fn account_lines(snapshot: &Snapshot) -> Vec<AccountLine> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut lines: Vec<AccountLine> = Vec::new();

    for row in snapshot.rows() {
        match index.get(row.account_number()) {
            Some(&i) => {
                let line = &mut lines[i];
                line.amount_cents = line.amount_cents.saturating_add(row.amount_cents());
                line.row_count += 1;
                if line.description.is_empty() {
                    line.description = row.description().to_string();
                }
            }
            None => {
                index.insert(row.account_number(), lines.len());
                lines.push(AccountLine {
                    account_number: row.account_number().to_string(),
                    description: row.description().to_string(),
                    amount_cents: row.amount_cents(),
                    row_count: 1,
                });
            }
        }
    }

    let merged = snapshot.len() - lines.len();
    if merged > 0 {
        log::debug!("merged {merged} duplicate account row(s)");
    }

    lines
}
