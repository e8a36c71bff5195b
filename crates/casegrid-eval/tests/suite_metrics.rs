use std::fs;
use std::path::PathBuf;

use casegrid_core::CategorySpace;
use casegrid_eval::{
    EvalError, EvaluateOptions, collect_suite_metrics, load_suite_csv, render_report, row_statuses,
};
use casegrid_generate::generate;
use casegrid_generate::output::csv::write_suite_csv;
use casegrid_plan::{CombineRule, ResolvedRules, RuleSet};

fn space() -> CategorySpace {
    CategorySpace::new()
        .with_category("os", ["linux", "mac", "windows"])
        .with_category("browser", ["firefox", "chrome", "safari"])
        .with_category("locale", ["de", "en"])
}

fn temp_out_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("casegrid_eval_{label}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

#[test]
fn pairwise_suite_has_full_coverage() {
    let space = space();
    let suite = generate("pairwise", &space).expect("generate");
    let metrics = collect_suite_metrics(&space, &suite, None, &EvaluateOptions::default());

    assert!(metrics.pair_coverage.is_complete());
    assert_eq!(metrics.pair_coverage_pct, 100.0);
    assert!(metrics.covers_every_value());
    assert!(metrics.missing_pairs.is_empty());
    assert_eq!(metrics.invalid_rows, 0);
}

#[test]
fn each_choice_suite_leaves_pairs_uncovered() {
    let space = space();
    let suite = generate("each-choice", &space).expect("generate");
    let metrics = collect_suite_metrics(&space, &suite, None, &EvaluateOptions::default());

    assert!(metrics.covers_every_value());
    assert!(!metrics.pair_coverage.is_complete());
    let report = render_report(&metrics, "run-1", "each-choice");
    assert!(report.contains("## Uncovered pairs"));
    assert!(report.contains("- strategy: each-choice"));
}

#[test]
fn csv_round_trip_keeps_rows_and_statuses() {
    let space = space();
    let rules =
        RuleSet::new().with(CombineRule::new("os", "mac", "browser", ["safari", "chrome"]));
    let resolved = ResolvedRules::resolve(&space, &rules);
    let suite = generate("all", &space).expect("generate");
    let statuses = row_statuses(&resolved, &suite);

    let path = temp_out_dir("roundtrip").join("suite.csv");
    write_suite_csv(&path, &space, &suite, b';', Some(&statuses)).expect("write csv");

    let loaded = load_suite_csv(&path, &space, b';').expect("load csv");
    assert_eq!(loaded.assignments, suite);
    assert_eq!(loaded.statuses.as_deref(), Some(statuses.as_slice()));

    let metrics = collect_suite_metrics(
        &space,
        &loaded.assignments,
        loaded.statuses.as_deref(),
        &EvaluateOptions::default(),
    );
    assert_eq!(metrics.status_counts.get("combined:browser=safari"), Some(&2));
    assert_eq!(metrics.status_counts.get("ok"), Some(&14));
}

#[test]
fn mismatched_header_is_rejected() {
    let path = temp_out_dir("header").join("suite.csv");
    fs::write(&path, "os;locale\nlinux;de\n").expect("write csv");
    let err = load_suite_csv(&path, &space(), b';').expect_err("header mismatch");
    assert!(matches!(err, EvalError::InvalidSuite(_)));
}
