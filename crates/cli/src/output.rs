// Shared stdout/stderr rendering for clean and compare

use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use tbcompare_io::export::{write_sheet, ExportSheet};
use tbcompare_recon::normalize::DropStats;

use crate::exit_codes::EXIT_ERROR;
use crate::CliError;

/// Pretty JSON, exactly one value, on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
    let mut out = io::stdout().lock();
    writeln!(out, "{json}").map_err(|e| CliError::io(e.to_string()))
}

/// Sheet as CSV on stdout.
pub fn print_sheet(sheet: &ExportSheet) -> Result<(), CliError> {
    tbcompare_io::csv::write_to(io::stdout().lock(), &sheet.text_rows(), b',').map_err(CliError::io)
}

pub fn save_sheet(sheet: &ExportSheet, path: &Path, quiet: bool) -> Result<(), CliError> {
    write_sheet(sheet, path)?;
    if !quiet {
        eprintln!("wrote {} ({} row(s)) to {}", sheet.name, sheet.rows.len(), path.display());
    }
    Ok(())
}

/// e.g. `2 blank, 1 total, 3 no account`; empty when nothing was dropped.
pub fn describe_drops(d: &DropStats) -> String {
    [
        (d.blank_row, "blank"),
        (d.total_line, "total"),
        (d.no_account, "no account"),
        (d.zero_amount, "zero amount"),
        (d.unparseable_amount, "unparseable amount"),
    ]
    .iter()
    .filter(|(n, _)| *n > 0)
    .map(|(n, label)| format!("{n} {label}"))
    .collect::<Vec<_>>()
    .join(", ")
}
