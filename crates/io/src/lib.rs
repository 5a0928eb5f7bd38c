// File I/O operations: load a trial balance grid, write cleaned and compared sheets

pub mod csv;
pub mod error;
pub mod export;
pub mod xlsx;

use std::path::Path;

use tbcompare_recon::RawGrid;

pub use error::IoError;

/// Input formats recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Tsv,
    Excel,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(Self::Excel),
            _ => Err(IoError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: ext,
            }),
        }
    }
}

/// Read a file into a raw cell grid. `sheet` selects an Excel worksheet by
/// name; the first worksheet is used otherwise. Ignored for CSV.
pub fn load_grid(path: &Path, sheet: Option<&str>) -> Result<RawGrid, IoError> {
    let grid = match FileFormat::from_path(path)? {
        FileFormat::Csv => csv::import(path)?,
        FileFormat::Tsv => csv::import_with_delimiter(path, b'\t')?,
        FileFormat::Excel => xlsx::import(path, sheet)?,
    };
    log::debug!("loaded {} row(s) from {}", grid.len(), path.display());
    Ok(grid)
}
