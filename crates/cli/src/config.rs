//! `tbcompare config`: validate or print engine configuration.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Subcommand;

use crate::{load_config, CliError};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Parse and validate a config file
    #[command(after_help = "\
Examples:
  tbcompare config check tbcompare.toml")]
    Check {
        /// Path to the TOML config file
        path: PathBuf,
    },

    /// Print the effective config (defaults, or --config) as TOML
    #[command(after_help = "\
Examples:
  tbcompare config show > tbcompare.toml
  tbcompare --config custom.toml config show")]
    Show,
}

pub fn cmd_config(cmd: ConfigCommands, config_path: Option<&Path>) -> Result<(), CliError> {
    match cmd {
        ConfigCommands::Check { path } => {
            let config = load_config(Some(&path))?;
            eprintln!(
                "ok: {} ({} abbreviation(s), rename threshold {}, top {})",
                path.display(),
                config.abbreviations.len(),
                config.rename.threshold,
                config.top_n
            );
            Ok(())
        }
        ConfigCommands::Show => {
            let config = load_config(config_path)?;
            let text = config.to_toml()?;
            io::stdout()
                .lock()
                .write_all(text.as_bytes())
                .map_err(|e| CliError::io(e.to_string()))
        }
    }
}
