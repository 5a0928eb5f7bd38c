use tbcompare_recon::model::{MatchResult, MatchStatus};
use tbcompare_recon::{clean, compare, ComparisonMode, EngineConfig, RawGrid, ReconError};

fn grid(rows: &[&[&str]]) -> RawGrid {
    RawGrid::from_strings(rows.iter().map(|r| r.iter().copied()))
}

fn find<'a>(results: &'a [MatchResult], account: &str) -> &'a MatchResult {
    results
        .iter()
        .find(|r| r.account() == account)
        .unwrap_or_else(|| panic!("no result for {account}"))
}

// -------------------------------------------------------------------------
// Clean
// -------------------------------------------------------------------------

#[test]
fn messy_export_cleans_to_canonical_rows() {
    let g = grid(&[
        &["Acme Holdings LLC", "", ""],
        &["Trial Balance as of 12/31", "", ""],
        &["", "", ""],
        &["Account", "Debit", "Credit"],
        &["10000 - PNC - Money Market 11100", "$1,200.50", ""],
        &["51000 Cost 51400", "300", ""],
        &["41000 Recurring Revenue 41050 revenue new", "", "(500)"],
        &["Rounding Gain/Loss", "", "0.50"],
        &["No account here", "10", ""],
        &["Total", "1,500.50", "500.50"],
    ]);
    let report = clean(&g, &EngineConfig::default()).unwrap();
    let rows = report.snapshot.rows();

    assert_eq!(report.layout.header_row, 3);
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].account_number(), "11100");
    assert_eq!(rows[0].description(), "PNC - Money Market");
    assert_eq!(rows[0].amount_cents(), 120050);
    assert_eq!(rows[1].account_number(), "51400");
    assert_eq!(rows[1].description(), "Cost");
    assert_eq!(rows[2].account_number(), "41050");
    assert_eq!(rows[2].description(), "Revenue New");
    // Credit of (500) is a negative credit, so debit - credit = +500.
    assert_eq!(rows[2].amount_cents(), 50000);
    assert_eq!(rows[3].account_number(), "");
    assert!(rows[3].is_rounding());
    assert_eq!(rows[3].amount_cents(), -50);

    assert_eq!(report.dropped.no_account, 1);
    assert_eq!(report.dropped.total_line, 1);
    assert_eq!(report.snapshot.sum_cents(), 120050 + 30000 + 50000 - 50);
    assert!(!report.snapshot.is_balanced());
}

#[test]
fn zero_rounding_row_is_dropped() {
    let g = grid(&[
        &["Account", "Amount"],
        &["1000 Cash", "10"],
        &["2000 Equity", "-10"],
        &["Rounding", "0.00"],
    ]);
    let report = clean(&g, &EngineConfig::default()).unwrap();
    assert_eq!(report.snapshot.len(), 2);
    assert_eq!(report.dropped.zero_amount, 1);
    assert!(report.snapshot.is_balanced());
}

#[test]
fn no_header_is_malformed() {
    let g = grid(&[&["foo", "bar"], &["1000", "12"]]);
    let err = clean(&g, &EngineConfig::default()).unwrap_err();
    assert!(matches!(err, ReconError::MalformedInput { .. }));
}

#[test]
fn cleaning_is_deterministic() {
    let g = grid(&[
        &["Account", "Description", "Amount"],
        &["1000", "Cash", "100"],
        &["2000", "Accounts Payable", "-40"],
        &["3000", "Retained Earnings", "-60"],
    ]);
    let config = EngineConfig::default();
    let first = clean(&g, &config).unwrap();
    let second = clean(&g, &config).unwrap();
    assert_eq!(first.snapshot, second.snapshot);
    assert!(first.snapshot.is_balanced());
}

// -------------------------------------------------------------------------
// Compare
// -------------------------------------------------------------------------

#[test]
fn version_mode_classifies_every_key() {
    let a = grid(&[
        &["Account", "Amount"],
        &["1000 Cash", "100"],
        &["2000 Payables", "-50"],
        &["3000 Equity", "-50"],
    ]);
    let b = grid(&[
        &["Account", "Amount"],
        &["1000 Cash", "100.01"],
        &["2000 Payables", "-80"],
        &["4000 Revenue", "-20"],
    ]);
    let cmp = compare(&a, &b, ComparisonMode::Version, &EngineConfig::default()).unwrap();

    assert_eq!(find(&cmp.results, "1000").status, MatchStatus::Unchanged);
    let payables = find(&cmp.results, "2000");
    assert_eq!(payables.status, MatchStatus::Changed);
    assert_eq!(payables.delta_cents, Some(-3000));
    let equity = find(&cmp.results, "3000");
    assert_eq!(equity.status, MatchStatus::Removed);
    assert!(equity.account_b.is_none());
    let revenue = find(&cmp.results, "4000");
    assert_eq!(revenue.status, MatchStatus::New);
    assert!(revenue.account_a.is_none());

    assert_eq!(cmp.summary.total_rows, 4);
    assert_eq!(cmp.summary.net_delta_cents, 1);
    assert!(cmp.results.iter().all(|r| r.status != MatchStatus::Renamed));
}

#[test]
fn year_mode_detects_renumbered_account() {
    let a = grid(&[
        &["Account", "Amount"],
        &["1000 Cash - Operating", "100"],
        &["5000 Travel", "30"],
        &["6000 Legal Fees", "-130"],
    ]);
    let b = grid(&[
        &["Account", "Amount"],
        &["1010 Cash Operating", "120"],
        &["5000 Travel", "30"],
        &["7000 Software", "-150"],
    ]);
    let config = EngineConfig::default();

    let year = compare(&a, &b, ComparisonMode::Year, &config).unwrap();
    let renamed = find(&year.results, "1010");
    assert_eq!(renamed.status, MatchStatus::Renamed);
    assert_eq!(renamed.account_a.as_deref(), Some("1000"));
    assert_eq!(renamed.delta_cents, Some(2000));
    assert_eq!(renamed.similarity, Some(1.0));
    assert_eq!(find(&year.results, "6000").status, MatchStatus::Removed);
    assert_eq!(find(&year.results, "7000").status, MatchStatus::New);
    assert_eq!(year.summary.renamed, 1);

    let version = compare(&a, &b, ComparisonMode::Version, &config).unwrap();
    assert_eq!(version.summary.renamed, 0);
    assert_eq!(find(&version.results, "1000").status, MatchStatus::Removed);
    assert_eq!(find(&version.results, "1010").status, MatchStatus::New);
}

#[test]
fn self_comparison_is_all_unchanged() {
    let g = grid(&[
        &["Account", "Amount"],
        &["1000 Cash", "100"],
        &["2000 Payables", "-60"],
        &["Rounding", "0.01"],
    ]);
    let cmp = compare(&g, &g, ComparisonMode::Year, &EngineConfig::default()).unwrap();
    assert!(cmp.results.iter().all(|r| r.status == MatchStatus::Unchanged));
    assert_eq!(cmp.summary.unchanged, 3);
    assert_eq!(cmp.summary.net_delta_cents, 0);
    assert!(!cmp.summary.has_differences());
}

#[test]
fn top_variances_rank_by_absolute_delta() {
    let a = grid(&[
        &["Account", "Amount"],
        &["1000 Cash", "100"],
        &["2000 Payables", "-50"],
        &["3000 Equity", "-50"],
    ]);
    let b = grid(&[
        &["Account", "Amount"],
        &["1000 Cash", "90"],
        &["2000 Payables", "-150"],
        &["3000 Equity", "-49"],
    ]);
    let cmp = compare(&a, &b, ComparisonMode::Version, &EngineConfig::default()).unwrap();
    let top: Vec<&str> = cmp
        .top_variances(2)
        .iter()
        .map(|r| r.account())
        .collect();
    assert_eq!(top, vec!["2000", "1000"]);
}

#[test]
fn comparison_serializes_with_screaming_statuses() {
    let a = grid(&[&["Account", "Amount"], &["1000 Cash", "1"]]);
    let b = grid(&[&["Account", "Amount"], &["1000 Cash", "2"]]);
    let cmp = compare(&a, &b, ComparisonMode::Version, &EngineConfig::default()).unwrap();
    let json = serde_json::to_value(&cmp).unwrap();
    assert_eq!(json["meta"]["mode"], "VERSION");
    assert_eq!(json["results"][0]["status"], "CHANGED");
    assert_eq!(json["results"][0]["delta_cents"], 100);
    assert!(json["results"][0].get("similarity").is_none());
}
