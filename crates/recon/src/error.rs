use std::fmt;

use crate::model::Side;

#[derive(Debug)]
pub enum ReconError {
    /// No header row found within the scan window.
    MalformedInput { scanned_rows: usize },
    /// Header row found, but a column role needed to build rows is absent.
    MissingColumn { role: &'static str, header_row: usize },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (threshold out of range, empty keyword list, etc.).
    ConfigValidation(String),
    /// Failure while normalizing one side of a comparison.
    Snapshot { side: Side, source: Box<ReconError> },
}

impl ReconError {
    /// Attribute an error to snapshot A or B.
    pub fn for_side(self, side: Side) -> Self {
        Self::Snapshot {
            side,
            source: Box::new(self),
        }
    }

    /// The innermost error, with any side attribution removed.
    pub fn root(&self) -> &ReconError {
        match self {
            Self::Snapshot { source, .. } => source.root(),
            other => other,
        }
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedInput { scanned_rows } => write!(
                f,
                "malformed input: no header row (account/description/amount/debit/credit) in the first {scanned_rows} row(s)"
            ),
            Self::MissingColumn { role, header_row } => write!(
                f,
                "malformed input: header row {} has no {role} column",
                header_row + 1
            ),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Snapshot { side, source } => write!(f, "snapshot {side}: {source}"),
        }
    }
}

impl std::error::Error for ReconError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Snapshot { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
