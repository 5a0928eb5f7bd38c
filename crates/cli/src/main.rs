// tbcompare - clean and compare trial balance exports

mod clean;
mod compare;
mod config;
mod exit_codes;
mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tbcompare_io::IoError;
use tbcompare_recon::{ComparisonMode, EngineConfig, ReconError};

use exit_codes::{io_exit_code, recon_exit_code, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "tbcompare")]
#[command(about = "Normalize messy trial balance exports and reconcile two of them")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Engine config (TOML). Defaults are used when absent.
    #[arg(long, global = true, env = "TBCOMPARE_CONFIG")]
    config: Option<PathBuf>,

    /// Log to stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize one trial balance into canonical rows (TB_Clean)
    #[command(after_help = "\
Examples:
  tbcompare clean export.xlsx
  tbcompare clean export.csv --output clean.xlsx
  tbcompare clean export.xlsx --sheet 'TB 2024' --json
  tbcompare clean export.csv --strict   # exit 6 if it does not balance")]
    Clean {
        /// Input file (.csv, .tsv, .xlsx, .xls, .xlsb, .ods)
        input: PathBuf,

        /// Worksheet to read (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Write TB_Clean to a file (.csv, .tsv or .xlsx)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Print the clean report as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Exit 6 when the trial balance does not balance
        #[arg(long)]
        strict: bool,

        /// Suppress the stderr summary
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Compare two trial balances (TB_Compare)
    #[command(after_help = "\
Examples:
  tbcompare compare tb_v1.xlsx tb_v2.xlsx
  tbcompare compare fy2023.csv fy2024.csv --mode year --json
  tbcompare compare a.xlsx b.xlsx --output compare.xlsx --top 5
  tbcompare compare a.csv b.csv --strict   # exit 7 on any difference")]
    Compare {
        /// Snapshot A (earlier version or prior year)
        a: PathBuf,

        /// Snapshot B (later version or current year)
        b: PathBuf,

        /// version: same chart of accounts; year: detect renumbered accounts
        #[arg(long, value_enum, default_value = "version")]
        mode: ModeArg,

        /// Worksheet to read from A (default: first sheet)
        #[arg(long)]
        sheet_a: Option<String>,

        /// Worksheet to read from B (default: first sheet)
        #[arg(long)]
        sheet_b: Option<String>,

        /// Number of largest variances to report (overrides config top_n)
        #[arg(long)]
        top: Option<usize>,

        /// Write TB_Compare to a file (.csv, .tsv or .xlsx)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Print the comparison as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Exit 6 if either side does not balance, 7 on any difference
        #[arg(long)]
        strict: bool,

        /// Suppress the stderr summary
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Inspect engine configuration
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Version,
    Year,
}

impl From<ModeArg> for ComparisonMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Version => ComparisonMode::Version,
            ModeArg::Year => ComparisonMode::Year,
        }
    }
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  tbcompare-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = match verbose {
        0 => "error",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // Also routes `log` records from the engine and io crates
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Clean { input, sheet, output, json, strict, quiet } => {
            clean::cmd_clean(clean::CleanArgs {
                config: config_path,
                input,
                sheet,
                output,
                json,
                strict,
                quiet,
            })
        }
        Commands::Compare { a, b, mode, sheet_a, sheet_b, top, output, json, strict, quiet } => {
            compare::cmd_compare(compare::CompareArgs {
                config: config_path,
                a,
                b,
                mode: mode.into(),
                sheet_a,
                sheet_b,
                top,
                output,
                json,
                strict,
                quiet,
            })
        }
        Commands::Config { command } => config::cmd_config(command, config_path),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {message}");
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {hint}");
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_IO, msg)
    }

    /// Exit with `code` and print nothing further.
    pub fn silent(code: u8) -> Self {
        Self::new(code, String::new())
    }

    /// Prefix the message with the file it concerns.
    pub fn in_file(mut self, path: &Path) -> Self {
        self.message = format!("{}: {}", path.display(), self.message);
        self
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let hint = match err.root() {
            ReconError::MalformedInput { .. } => Some(
                "the sheet needs a header row naming an account column and an amount (or debit/credit) column"
                    .to_string(),
            ),
            ReconError::MissingColumn { .. } => {
                Some("add header aliases under [columns] in the config file".to_string())
            }
            _ => None,
        };
        Self { code: recon_exit_code(&err), message: err.to_string(), hint }
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        let hint = match &err {
            IoError::SheetNotFound { .. } => Some("sheet names are matched case-insensitively".to_string()),
            IoError::UnsupportedFormat { .. } => Some("use .csv, .tsv or .xlsx".to_string()),
            _ => None,
        };
        Self { code: io_exit_code(&err), message: err.to_string(), hint }
    }
}

/// Load `--config` or fall back to defaults.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, CliError> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read config {}: {e}", path.display())))?;
    let config = EngineConfig::from_toml(&text).map_err(|e| {
        CliError::from(e).with_hint(format!("check {}", path.display()))
    })?;
    log::debug!("loaded config from {}", path.display());
    Ok(config)
}
