// TB_Clean / TB_Compare sheet layout and format dispatch

use std::path::Path;

use tbcompare_recon::amount::format_cents;
use tbcompare_recon::{CleanReport, Comparison, MatchResult, MatchStatus};

use crate::error::IoError;
use crate::FileFormat;

pub const CLEAN_SHEET: &str = "TB_Clean";
pub const COMPARE_SHEET: &str = "TB_Compare";

pub const CLEAN_HEADERS: [&str; 3] = ["Account Number", "Account Description", "Amount"];
pub const COMPARE_HEADERS: [&str; 8] = [
    "Status",
    "Account A",
    "Account B",
    "Description A",
    "Description B",
    "Amount A",
    "Amount B",
    "Delta",
];

#[derive(Debug, Clone, PartialEq)]
pub enum ExportCell {
    Text(String),
    Cents(i64),
    Empty,
}

impl ExportCell {
    fn opt_text(s: Option<&String>) -> Self {
        s.map_or(Self::Empty, |s| Self::Text(s.clone()))
    }

    fn opt_cents(c: Option<i64>) -> Self {
        c.map_or(Self::Empty, Self::Cents)
    }

    pub fn display(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Cents(c) => format_cents(*c),
            Self::Empty => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    /// Drives row fill in Excel output.
    pub status: Option<MatchStatus>,
    pub cells: Vec<ExportCell>,
}

/// A single output sheet: optional title line, header row, data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSheet {
    pub name: &'static str,
    pub title: Option<String>,
    pub headers: Vec<&'static str>,
    pub rows: Vec<ExportRow>,
}

impl ExportSheet {
    /// Display text rows as written to CSV.
    pub fn text_rows(&self) -> Vec<Vec<String>> {
        let mut out = Vec::with_capacity(self.rows.len() + 2);
        if let Some(title) = &self.title {
            out.push(vec![title.clone()]);
        }
        out.push(self.headers.iter().map(|h| h.to_string()).collect());
        for row in &self.rows {
            out.push(row.cells.iter().map(ExportCell::display).collect());
        }
        out
    }
}

/// Balance line, headers, then rows sorted by account with Rounding last.
pub fn clean_sheet(report: &CleanReport) -> ExportSheet {
    let rows = report
        .export_rows()
        .into_iter()
        .map(|r| ExportRow {
            status: None,
            cells: vec![
                ExportCell::Text(r.account_number().to_string()),
                ExportCell::Text(r.description().to_string()),
                ExportCell::Cents(r.amount_cents()),
            ],
        })
        .collect();

    ExportSheet {
        name: CLEAN_SHEET,
        title: Some(report.balance_line()),
        headers: CLEAN_HEADERS.to_vec(),
        rows,
    }
}

fn compare_row(r: &MatchResult) -> ExportRow {
    ExportRow {
        status: Some(r.status),
        cells: vec![
            ExportCell::Text(r.status.as_str().to_string()),
            ExportCell::opt_text(r.account_a.as_ref()),
            ExportCell::opt_text(r.account_b.as_ref()),
            ExportCell::opt_text(r.description_a.as_ref()),
            ExportCell::opt_text(r.description_b.as_ref()),
            ExportCell::opt_cents(r.amount_a_cents),
            ExportCell::opt_cents(r.amount_b_cents),
            ExportCell::opt_cents(r.delta_cents),
        ],
    }
}

/// Results grouped CHANGED, RENAMED, NEW, REMOVED, UNCHANGED.
pub fn compare_sheet(comparison: &Comparison) -> ExportSheet {
    ExportSheet {
        name: COMPARE_SHEET,
        title: None,
        headers: COMPARE_HEADERS.to_vec(),
        rows: comparison
            .grouped_by_status()
            .into_iter()
            .map(compare_row)
            .collect(),
    }
}

/// Write a sheet as CSV, TSV or XLSX depending on the path's extension.
pub fn write_sheet(sheet: &ExportSheet, path: &Path) -> Result<(), IoError> {
    match FileFormat::from_path(path)? {
        FileFormat::Csv => crate::csv::write_rows(path, &sheet.text_rows(), b','),
        FileFormat::Tsv => crate::csv::write_rows(path, &sheet.text_rows(), b'\t'),
        FileFormat::Excel => {
            let is_xlsx = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
            if !is_xlsx {
                return Err(IoError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    extension: path
                        .extension()
                        .and_then(|e| e.to_str())
                        .unwrap_or_default()
                        .to_ascii_lowercase(),
                });
            }
            crate::xlsx::export(sheet, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tbcompare_recon::{clean, compare, ComparisonMode, EngineConfig, RawGrid};
    use tempfile::tempdir;

    fn grid(rows: &[&[&str]]) -> RawGrid {
        RawGrid::from_strings(rows.iter().map(|r| r.iter().copied()))
    }

    #[test]
    fn test_clean_sheet_layout() {
        let report = clean(
            &grid(&[
                &["Account", "Amount"],
                &["Rounding", "0.01"],
                &["2000 Payables", "(1,200.50)"],
                &["1000 Cash", "$1,200.49"],
            ]),
            &EngineConfig::default(),
        )
        .unwrap();

        let rows = clean_sheet(&report).text_rows();
        assert_eq!(rows[0], vec!["Balanced: Sum = 0.00"]);
        assert_eq!(rows[1], vec!["Account Number", "Account Description", "Amount"]);
        assert_eq!(rows[2], vec!["1000", "Cash", "1200.49"]);
        assert_eq!(rows[3], vec!["2000", "Payables", "-1200.50"]);
        assert_eq!(rows[4][0], "");
        assert_eq!(rows[4][2], "0.01");
    }

    #[test]
    fn test_compare_sheet_groups_by_status() {
        let a = grid(&[&["Account", "Amount"], &["1000 Cash", "1"], &["3000 Equity", "-1"]]);
        let b = grid(&[&["Account", "Amount"], &["1000 Cash", "1"], &["4000 Revenue", "-3"], &["3000 Equity", "2"]]);
        let cmp = compare(&a, &b, ComparisonMode::Version, &EngineConfig::default()).unwrap();

        let sheet = compare_sheet(&cmp);
        let statuses: Vec<String> = sheet.text_rows().iter().skip(1).map(|r| r[0].clone()).collect();
        assert_eq!(statuses, vec!["CHANGED", "NEW", "UNCHANGED"]);

        let new_row = &sheet.rows[1].cells;
        assert_eq!(new_row[1], ExportCell::Empty);
        assert_eq!(new_row[2], ExportCell::Text("4000".into()));
        assert_eq!(new_row[7], ExportCell::Empty);
    }

    #[test]
    fn test_write_sheet_by_extension() {
        let dir = tempdir().unwrap();
        let report = clean(&grid(&[&["Account", "Amount"], &["1000 Cash", "5"]]), &EngineConfig::default()).unwrap();
        let sheet = clean_sheet(&report);

        let csv_path = dir.path().join("clean.csv");
        write_sheet(&sheet, &csv_path).unwrap();
        let content = fs::read_to_string(&csv_path).unwrap();
        assert!(content.starts_with("Not Balanced: Sum = 5.00\n"));

        let xlsx_path = dir.path().join("clean.xlsx");
        write_sheet(&sheet, &xlsx_path).unwrap();
        let back = crate::load_grid(&xlsx_path, Some(CLEAN_SHEET)).unwrap();
        assert_eq!(back.cell(2, 0).text(), "1000");

        let err = write_sheet(&sheet, &dir.path().join("clean.xls")).unwrap_err();
        assert!(matches!(err, IoError::UnsupportedFormat { .. }));
    }
}
