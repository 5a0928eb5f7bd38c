//! `tbcompare clean`: one export in, TB_Clean out.

use std::path::{Path, PathBuf};

use tbcompare_io::export::clean_sheet;

use crate::exit_codes::EXIT_UNBALANCED;
use crate::output::{describe_drops, print_json, print_sheet, save_sheet};
use crate::{load_config, CliError};

pub struct CleanArgs<'a> {
    pub config: Option<&'a Path>,
    pub input: PathBuf,
    pub sheet: Option<String>,
    pub output: Option<PathBuf>,
    pub json: bool,
    pub strict: bool,
    pub quiet: bool,
}

pub fn cmd_clean(args: CleanArgs<'_>) -> Result<(), CliError> {
    let config = load_config(args.config)?;
    let grid = tbcompare_io::load_grid(&args.input, args.sheet.as_deref())?;
    let report = tbcompare_recon::clean(&grid, &config)
        .map_err(|e| CliError::from(e).in_file(&args.input))?;

    let sheet = clean_sheet(&report);
    if let Some(path) = &args.output {
        save_sheet(&sheet, path, args.quiet)?;
    }

    // stdout carries exactly one thing: JSON, or the sheet when not saved to a file
    if args.json {
        print_json(&report)?;
    } else if args.output.is_none() {
        print_sheet(&sheet)?;
    }

    if !args.quiet {
        let dropped = describe_drops(&report.dropped);
        if dropped.is_empty() {
            eprintln!(
                "{}: {} row(s) kept from {} grid row(s)",
                args.input.display(),
                report.snapshot.len(),
                report.grid_rows
            );
        } else {
            eprintln!(
                "{}: {} row(s) kept from {} grid row(s), dropped {dropped}",
                args.input.display(),
                report.snapshot.len(),
                report.grid_rows
            );
        }
        eprintln!("{}", report.balance_line());
    }

    if args.strict && !report.snapshot.is_balanced() {
        return Err(CliError::new(EXIT_UNBALANCED, report.balance_line()));
    }

    Ok(())
}
