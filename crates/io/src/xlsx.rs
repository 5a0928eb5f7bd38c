// Excel import (calamine) and sheet export (rust_xlsxwriter)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Color, Format, Workbook};
use tbcompare_recon::{Cell, MatchStatus, RawGrid};

use crate::error::IoError;
use crate::export::{ExportCell, ExportSheet};

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Import one worksheet of an Excel file (xlsx, xls, xlsb, ods).
///
/// `sheet` picks a worksheet by name (case-insensitive); the first one is read
/// otherwise. Cell positions are kept: a range that starts below A1 is padded
/// with blank rows and columns.
pub fn import(path: &Path, sheet: Option<&str>) -> Result<RawGrid, IoError> {
    let excel_err = |message: String| IoError::Excel {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| excel_err(format!("failed to open: {e}")))?;
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();

    let name = match sheet {
        Some(wanted) => sheet_names
            .iter()
            .find(|n| n.eq_ignore_ascii_case(wanted))
            .cloned()
            .ok_or_else(|| IoError::SheetNotFound {
                path: path.to_path_buf(),
                sheet: wanted.to_string(),
                available: sheet_names.clone(),
            })?,
        None => sheet_names.first().cloned().ok_or_else(|| IoError::NoSheets {
            path: path.to_path_buf(),
        })?,
    };

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| excel_err(format!("failed to read sheet '{name}': {e}")))?;

    // Range start offset (data may not begin at A1)
    let (start_row, start_col) = range.start().unwrap_or((0, 0));

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![Cell::Blank; start_col as usize];
        cells.extend(row.iter().map(data_to_cell));
        rows.push(cells);
    }

    log::debug!("sheet '{name}': {} row(s)", rows.len());
    Ok(RawGrid::new(rows))
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Blank,
        Data::String(s) => Cell::from(s.as_str()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(e) => Cell::Text(format!("#{e:?}")),
        // Date serial as text, as the sheet stores it
        Data::DateTime(dt) => Cell::Text(dt.as_f64().to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

const MONEY_FORMAT: &str = "#,##0.00;-#,##0.00";

/// Fill colour for status grouping.
fn status_color(status: MatchStatus) -> Option<Color> {
    match status {
        MatchStatus::Changed => Some(Color::RGB(0xFFEB9C)),
        MatchStatus::Renamed => Some(Color::RGB(0xDDEBF7)),
        MatchStatus::New => Some(Color::RGB(0xC6EFCE)),
        MatchStatus::Removed => Some(Color::RGB(0xFFC7CE)),
        MatchStatus::Unchanged => None,
    }
}

/// Write one sheet to a new .xlsx workbook.
pub fn export(sheet: &ExportSheet, path: &Path) -> Result<(), IoError> {
    let write_err = |e: rust_xlsxwriter::XlsxError| IoError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet().set_name(sheet.name).map_err(write_err)?;

    let bold = Format::new().set_bold();
    let mut row: u32 = 0;

    if let Some(title) = &sheet.title {
        worksheet
            .write_string_with_format(row, 0, title.as_str(), &bold)
            .map_err(write_err)?;
        row += 1;
    }

    for (col, header) in sheet.headers.iter().enumerate() {
        worksheet
            .write_string_with_format(row, col as u16, *header, &bold)
            .map_err(write_err)?;
    }
    worksheet.set_freeze_panes(row + 1, 0).map_err(write_err)?;
    row += 1;

    for export_row in &sheet.rows {
        let base = match export_row.status.and_then(status_color) {
            Some(color) => Format::new().set_background_color(color),
            None => Format::new(),
        };
        let money = base.clone().set_num_format(MONEY_FORMAT);

        for (col, cell) in export_row.cells.iter().enumerate() {
            let col = col as u16;
            match cell {
                ExportCell::Text(s) => {
                    worksheet
                        .write_string_with_format(row, col, s.as_str(), &base)
                        .map_err(write_err)?;
                }
                ExportCell::Cents(cents) => {
                    worksheet
                        .write_number_with_format(row, col, *cents as f64 / 100.0, &money)
                        .map_err(write_err)?;
                }
                ExportCell::Empty => {
                    worksheet.write_blank(row, col, &base).map_err(write_err)?;
                }
            }
        }
        row += 1;
    }

    for (col, header) in sheet.headers.iter().enumerate() {
        let width = (header.len() as f64 + 2.0).max(14.0);
        worksheet.set_column_width(col as u16, width).map_err(write_err)?;
    }

    workbook.save(path).map_err(write_err)?;
    log::info!("wrote {} row(s) to {} [{}]", sheet.rows.len(), path.display(), sheet.name);
    Ok(())
}
