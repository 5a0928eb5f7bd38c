use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum IoError {
    /// File could not be opened or read.
    Read { path: PathBuf, source: std::io::Error },
    /// Extension is not a CSV or Excel format.
    UnsupportedFormat { path: PathBuf, extension: String },
    Csv { path: PathBuf, message: String },
    Excel { path: PathBuf, message: String },
    NoSheets { path: PathBuf },
    SheetNotFound { path: PathBuf, sheet: String, available: Vec<String> },
    Write { path: PathBuf, message: String },
}

impl IoError {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Read { path, .. }
            | Self::UnsupportedFormat { path, .. }
            | Self::Csv { path, .. }
            | Self::Excel { path, .. }
            | Self::NoSheets { path }
            | Self::SheetNotFound { path, .. }
            | Self::Write { path, .. } => path,
        }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::UnsupportedFormat { path, extension } if extension.is_empty() => {
                write!(f, "{}: no file extension (expected .csv, .tsv or .xlsx)", path.display())
            }
            Self::UnsupportedFormat { path, extension } => write!(
                f,
                "{}: unsupported format '.{extension}' (expected .csv, .tsv or .xlsx)",
                path.display()
            ),
            Self::Csv { path, message } => write!(f, "{}: CSV error: {message}", path.display()),
            Self::Excel { path, message } => write!(f, "{}: Excel error: {message}", path.display()),
            Self::NoSheets { path } => write!(f, "{}: workbook contains no sheets", path.display()),
            Self::SheetNotFound { path, sheet, available } => write!(
                f,
                "{}: no sheet named '{sheet}' (available: {})",
                path.display(),
                available.join(", ")
            ),
            Self::Write { path, message } => write!(f, "cannot write {}: {message}", path.display()),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}
