use benchlab::{
    BenchError, Ratio, RatioSpec, ResultRow, ResultTable, UndefinedRatio, summarize,
};

fn row(implementation: &str, function: &str, time: f64, std: f64) -> ResultRow {
    ResultRow {
        implementation: implementation.into(),
        function: function.into(),
        time_seconds: time,
        std_dev: Some(std),
    }
}

fn spec() -> RatioSpec {
    RatioSpec::new("A", "B")
}

#[test]
fn test_ratio_of_baseline_over_comparison() {
    let table = ResultTable::from_rows(vec![row("A", "f", 2.0, 0.1), row("B", "f", 1.0, 0.05)]);
    let summary = summarize(&table, &spec()).expect("summary");
    assert_eq!(summary.pivot.ratio("f"), Some(Ratio::Defined(2.0)));
    assert_eq!(summary.pivot.mean("f", "A"), Some(2.0));
    assert_eq!(summary.pivot.mean("f", "B"), Some(1.0));
    assert!(summary.pivot.undefined_ratios().is_empty());
}

#[test]
fn test_zero_comparison_mean_is_flagged() {
    let table = ResultTable::from_rows(vec![row("A", "f", 2.0, 0.1), row("B", "f", 0.0, 0.0)]);
    let summary = summarize(&table, &spec()).expect("summary");
    let ratio = summary.pivot.ratio("f").expect("ratio");
    assert_eq!(ratio, Ratio::Undefined(UndefinedRatio::ZeroComparison));
    assert_eq!(ratio.value(), None);
    assert_eq!(
        summary.pivot.undefined_ratios(),
        vec![("f", UndefinedRatio::ZeroComparison)]
    );
}

#[test]
fn test_missing_implementation_leaves_gap_and_undefined_ratio() {
    let table = ResultTable::from_rows(vec![
        row("A", "f", 2.0, 0.1),
        row("B", "f", 1.0, 0.05),
        row("A", "g", 3.0, 0.2),
    ]);
    let summary = summarize(&table, &spec()).expect("summary");
    assert_eq!(summary.pivot.mean("g", "B"), None);
    assert_eq!(summary.pivot.std_dev("g", "B"), None);
    assert_eq!(
        summary.pivot.ratio("g"),
        Some(Ratio::Undefined(UndefinedRatio::MissingComparison))
    );
    assert_eq!(summary.pivot.ratio("f"), Some(Ratio::Defined(2.0)));

    let rows = summary.pivot.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].function, "g");
    assert_eq!(rows[1].means, vec![Some(3.0), None]);
}

#[test]
fn test_missing_baseline_is_flagged() {
    let table = ResultTable::from_rows(vec![row("B", "f", 1.0, 0.05)]);
    let summary = summarize(&table, &spec()).expect("summary");
    assert_eq!(
        summary.pivot.ratio("f"),
        Some(Ratio::Undefined(UndefinedRatio::MissingBaseline))
    );
}

#[test]
fn test_pivot_headers_follow_implementation_order() {
    let table = ResultTable::from_rows(vec![row("B", "f", 1.0, 0.05), row("A", "f", 2.0, 0.1)]);
    let summary = summarize(&table, &spec()).expect("summary");
    assert_eq!(
        summary.pivot.headers(),
        ["Function", "A", "B", "Speedup (A ÷ B)", "A StdDev", "B StdDev"]
    );
}

#[test]
fn test_single_row_groups_restate_recorded_std_dev() {
    let table = ResultTable::from_rows(vec![row("A", "f", 2.0, 0.1), row("B", "f", 1.0, 0.05)]);
    let summary = summarize(&table, &spec()).expect("summary");
    assert_eq!(summary.pivot.std_dev("f", "A"), Some(0.1));
    assert_eq!(summary.pivot.std_dev("f", "B"), Some(0.05));
    let stat = summary.stats.get("A", "f").expect("group");
    assert_eq!(stat.describe.count, 1);
    assert_eq!(stat.describe.std, None);
}

#[test]
fn test_raw_repetition_rows_use_grouped_statistics() {
    let table = ResultTable::from_rows(vec![
        row("A", "f", 1.0, 0.0),
        row("A", "f", 2.0, 0.0),
        row("A", "f", 3.0, 0.0),
        row("A", "f", 4.0, 0.0),
        row("B", "f", 0.5, 0.0),
        row("B", "f", 1.5, 0.0),
    ]);
    let summary = summarize(&table, &spec()).expect("summary");
    assert_eq!(summary.pivot.mean("f", "A"), Some(2.5));
    assert_eq!(summary.pivot.mean("f", "B"), Some(1.0));
    assert_eq!(summary.pivot.ratio("f"), Some(Ratio::Defined(2.5)));

    let std_a = summary.pivot.std_dev("f", "A").expect("std");
    assert!((std_a - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);

    let describe = &summary.stats.get("A", "f").expect("group").describe;
    assert_eq!(describe.count, 4);
    assert_eq!(describe.min, 1.0);
    assert_eq!(describe.p25, 1.75);
    assert_eq!(describe.p50, 2.5);
    assert_eq!(describe.p75, 3.25);
    assert_eq!(describe.max, 4.0);
}

#[test]
fn test_overall_comparison_uses_all_rows() {
    let table = ResultTable::from_rows(vec![
        row("A", "f", 2.0, 0.1),
        row("A", "g", 4.0, 0.1),
        row("B", "f", 1.0, 0.05),
        row("B", "g", 1.0, 0.05),
    ]);
    let summary = summarize(&table, &spec()).expect("summary");
    assert_eq!(summary.overall.means.get("A"), Some(&3.0));
    assert_eq!(summary.overall.means.get("B"), Some(&1.0));
    assert_eq!(summary.overall.ratio, Ratio::Defined(3.0));
}

#[test]
fn test_overall_ratio_guards_zero_comparison() {
    let table = ResultTable::from_rows(vec![row("A", "f", 2.0, 0.1), row("B", "f", 0.0, 0.0)]);
    let summary = summarize(&table, &spec()).expect("summary");
    assert_eq!(
        summary.overall.ratio,
        Ratio::Undefined(UndefinedRatio::ZeroComparison)
    );
}

#[test]
fn test_labels_are_configurable() {
    let table = ResultTable::from_rows(vec![row("A", "f", 2.0, 0.1), row("B", "f", 1.0, 0.05)]);
    let summary = summarize(&table, &RatioSpec::new("B", "A")).expect("summary");
    assert_eq!(summary.pivot.ratio("f"), Some(Ratio::Defined(0.5)));
}

#[test]
fn test_empty_table_is_rejected() {
    let err = summarize(&ResultTable::default(), &spec()).unwrap_err();
    assert!(matches!(err, BenchError::InvalidInput(_)));
}

#[test]
fn test_long_format_includes_missing_cells() {
    let table = ResultTable::from_rows(vec![row("A", "f", 2.0, 0.1), row("A", "g", 3.0, 0.2), row("B", "f", 1.0, 0.05)]);
    let summary = summarize(&table, &spec()).expect("summary");
    let cells = summary.pivot.long_std_devs();
    assert_eq!(cells.len(), 4);
    let missing = cells
        .iter()
        .find(|c| c.function == "g" && c.implementation == "B")
        .expect("cell");
    assert_eq!(missing.value, None);
}
