//! `tbcompare compare`: two exports in, TB_Compare out.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tbcompare_io::export::compare_sheet;
use tbcompare_recon::amount::format_cents;
use tbcompare_recon::{Comparison, ComparisonMode, MatchResult, ReconError, Side};

use crate::exit_codes::{EXIT_DIFFERENCES, EXIT_UNBALANCED};
use crate::output::{describe_drops, print_json, print_sheet, save_sheet};
use crate::{load_config, CliError};

pub struct CompareArgs<'a> {
    pub config: Option<&'a Path>,
    pub a: PathBuf,
    pub b: PathBuf,
    pub mode: ComparisonMode,
    pub sheet_a: Option<String>,
    pub sheet_b: Option<String>,
    pub top: Option<usize>,
    pub output: Option<PathBuf>,
    pub json: bool,
    pub strict: bool,
    pub quiet: bool,
}

/// JSON shape: the comparison plus the ranked variances.
#[derive(Serialize)]
struct CompareOutput<'a> {
    #[serde(flatten)]
    comparison: &'a Comparison,
    top_variances: Vec<&'a MatchResult>,
}

pub fn cmd_compare(args: CompareArgs<'_>) -> Result<(), CliError> {
    let mut config = load_config(args.config)?;
    if let Some(top) = args.top {
        if top == 0 {
            return Err(CliError::args("--top must be at least 1"));
        }
        config.top_n = top;
    }

    let grid_a = tbcompare_io::load_grid(&args.a, args.sheet_a.as_deref())?;
    let grid_b = tbcompare_io::load_grid(&args.b, args.sheet_b.as_deref())?;

    let comparison = tbcompare_recon::compare(&grid_a, &grid_b, args.mode, &config).map_err(|e| {
        let path = match &e {
            ReconError::Snapshot { side: Side::A, .. } => Some(&args.a),
            ReconError::Snapshot { side: Side::B, .. } => Some(&args.b),
            _ => None,
        };
        match path {
            Some(path) => CliError::from(e).in_file(path),
            None => CliError::from(e),
        }
    })?;
    let top = comparison.top_variances(config.top_n);

    let sheet = compare_sheet(&comparison);
    if let Some(path) = &args.output {
        save_sheet(&sheet, path, args.quiet)?;
    }

    if args.json {
        print_json(&CompareOutput {
            comparison: &comparison,
            top_variances: top.clone(),
        })?;
    } else if args.output.is_none() {
        print_sheet(&sheet)?;
    }

    if !args.quiet {
        print_summary(&args, &comparison, &top);
    }

    let s = &comparison.summary;
    if args.strict {
        if !s.is_balanced_a || !s.is_balanced_b {
            let side = if !s.is_balanced_a { &args.a } else { &args.b };
            return Err(CliError::new(EXIT_UNBALANCED, "trial balance does not balance").in_file(side));
        }
        if s.has_differences() {
            return Err(CliError::silent(EXIT_DIFFERENCES));
        }
    }

    Ok(())
}

fn balance_label(balanced: bool, sum_cents: i64) -> String {
    let state = if balanced { "balanced" } else { "NOT balanced" };
    format!("{state}, sum {}", format_cents(sum_cents))
}

fn print_summary(args: &CompareArgs<'_>, comparison: &Comparison, top: &[&MatchResult]) {
    let s = &comparison.summary;
    let meta = &comparison.meta;

    eprintln!(
        "{} compare: {} account(s): {} changed, {} renamed, {} new, {} removed, {} unchanged",
        meta.mode, s.total_rows, s.changed, s.renamed, s.new, s.removed, s.unchanged
    );
    for (label, path, balanced, sum, dropped) in [
        ("A", &args.a, s.is_balanced_a, s.sum_a_cents, meta.dropped_a.as_ref()),
        ("B", &args.b, s.is_balanced_b, s.sum_b_cents, meta.dropped_b.as_ref()),
    ] {
        let drops = dropped.map(describe_drops).unwrap_or_default();
        if drops.is_empty() {
            eprintln!("{label}: {} ({})", path.display(), balance_label(balanced, sum));
        } else {
            eprintln!("{label}: {} ({}; dropped {drops})", path.display(), balance_label(balanced, sum));
        }
    }
    eprintln!("net delta: {}", format_cents(s.net_delta_cents));

    let movers: Vec<&&MatchResult> = top.iter().filter(|r| r.delta_cents.unwrap_or(0) != 0).collect();
    if !movers.is_empty() {
        eprintln!("top variances:");
        for r in movers {
            let description = r.description_b.as_deref().or(r.description_a.as_deref()).unwrap_or("");
            eprintln!(
                "  {:<9} {:<10} {:>14}  {description}",
                r.status.as_str(),
                r.account(),
                format_cents(r.delta_cents.unwrap_or(0))
            );
        }
    }
}
