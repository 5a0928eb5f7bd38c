//! CLI Exit Code Registry
//!
//! Single source of truth for `tbcompare` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | Usage error (bad arguments, unsupported file type)   |
//! | 3    | Malformed input (no header row, missing column)      |
//! | 4    | I/O error (cannot read input or write output)        |
//! | 5    | Invalid engine config                                |
//! | 6    | Trial balance does not balance (`--strict` only)     |
//! | 7    | Comparison found differences (`--strict` only)       |

use tbcompare_io::IoError;
use tbcompare_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments or an input/output path of unknown type.
pub const EXIT_USAGE: u8 = 2;

/// No header row in the scan window, or header lacks account/amount columns.
pub const EXIT_MALFORMED: u8 = 3;

/// Input could not be read or output could not be written.
pub const EXIT_IO: u8 = 4;

/// Config file failed to parse or validate.
pub const EXIT_CONFIG: u8 = 5;

/// `--strict`: a snapshot's sum is outside the balance tolerance.
pub const EXIT_UNBALANCED: u8 = 6;

/// `--strict`: at least one CHANGED, RENAMED, NEW or REMOVED result.
pub const EXIT_DIFFERENCES: u8 = 7;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err.root() {
        ReconError::MalformedInput { .. } | ReconError::MissingColumn { .. } => EXIT_MALFORMED,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_CONFIG,
        ReconError::Snapshot { .. } => EXIT_ERROR,
    }
}

/// Map a file I/O error to its exit code.
pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::UnsupportedFormat { .. } => EXIT_USAGE,
        IoError::SheetNotFound { .. } => EXIT_USAGE,
        IoError::Csv { .. } | IoError::Excel { .. } | IoError::NoSheets { .. } => EXIT_MALFORMED,
        IoError::Read { .. } | IoError::Write { .. } => EXIT_IO,
    }
}
