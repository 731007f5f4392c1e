//! Integration tests for the credit default feature-engineering pipeline.
//!
//! These tests run the whole pipeline over a 80-row extract of the credit
//! card dataset that contains duplicates, missing values and invalid codes.

use credit_prep::{
    CreditSchema, DERIVED_COLUMNS, DataCleaner, OutlierBounder, Pipeline, PipelineConfig,
    PipelineStage, PreprocessingError, ReportGenerator, SplitReport, load_csv,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

const TARGET: &str = "default.payment.next.month";

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixture() -> DataFrame {
    load_csv(fixtures_path().join("credit_subset.csv")).expect("Failed to read fixture")
}

fn column_f64(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

/// Copy the fixture with one cell replaced by `text`.
fn fixture_with_cell(name: &str, row: usize, column: &str, text: &str) -> PathBuf {
    let content = std::fs::read_to_string(fixtures_path().join("credit_subset.csv")).unwrap();
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
    let position = lines[0].split(',').position(|c| c == column).unwrap();

    let mut cells: Vec<&str> = lines[row + 1].split(',').collect();
    cells[position] = text;
    lines[row + 1] = cells.join(",");

    let path = std::env::temp_dir().join(format!("{}_{}.csv", name, std::process::id()));
    std::fs::write(&path, lines.join("\n") + "\n").unwrap();
    path
}

fn run_default(df: DataFrame) -> credit_prep::PipelineResult {
    Pipeline::builder()
        .build()
        .unwrap()
        .process(df)
        .expect("Pipeline should complete successfully")
}

// ============================================================================
// Full Pipeline Tests
// ============================================================================

#[test]
fn test_full_pipeline_shapes() {
    let result = run_default(load_fixture());
    let summary = &result.summary;

    assert_eq!(summary.initial_shape, (80, 25));
    assert_eq!(summary.cleaning.duplicates_removed, 4);
    assert_eq!(summary.cleaned_shape, (76, 25));
    assert_eq!(summary.engineered_shape, (76, 37));
    assert_eq!(summary.train_shape, (60, 35));
    assert_eq!(summary.test_shape, (16, 35));
    assert_eq!(result.split.y_train.len(), 60);
    assert_eq!(result.split.y_test.len(), 16);
}

#[test]
fn test_full_pipeline_partitions_are_disjoint_and_complete() {
    let result = run_default(load_fixture());

    let train: HashSet<usize> = result.split.train_rows.iter().copied().collect();
    let test: HashSet<usize> = result.split.test_rows.iter().copied().collect();

    assert!(train.is_disjoint(&test));
    assert_eq!(train.len() + test.len(), 76);
    assert!(train.union(&test).all(|&row| row < 76));
}

#[test]
fn test_full_pipeline_preserves_class_proportions() {
    let result = run_default(load_fixture());
    let summary = &result.summary;

    // 19 defaulters out of 76 split exactly 15/4
    for class in [0, 1] {
        let overall = summary.overall_distribution.proportion(class);
        assert!((summary.train_distribution.proportion(class) - overall).abs() <= 1.0 / 60.0);
        assert!((summary.test_distribution.proportion(class) - overall).abs() <= 1.0 / 16.0);
    }
    assert_eq!(summary.test_distribution.classes[1].count, 4);
}

#[test]
fn test_full_pipeline_feature_invariants() {
    let result = run_default(load_fixture());
    let x_train = &result.split.x_train;

    // No missing values survive
    for column in x_train.get_columns() {
        assert_eq!(column.null_count(), 0, "{} has nulls", column.name());
    }

    // Identifier and target leave the feature table
    assert!(x_train.column("ID").is_err());
    assert!(x_train.column(TARGET).is_err());

    for name in DERIVED_COLUMNS {
        assert!(x_train.column(name).is_ok(), "missing {}", name);
    }

    let education = column_f64(x_train, "EDUCATION");
    assert!(education.iter().all(|v| matches!(v, Some(c) if (1.0..=4.0).contains(c))));
    let marriage = column_f64(x_train, "MARRIAGE");
    assert!(marriage.iter().all(|v| matches!(v, Some(c) if (1.0..=3.0).contains(c))));

    // Skew-corrected columns are log1p of non-negative values
    for name in ["BILL_AMT1", "PAY_AMT3", "TOTAL_BILL", "PAY_RATIO"] {
        assert!(column_f64(x_train, name).iter().all(|v| v.unwrap() >= 0.0));
    }
}

#[test]
fn test_full_pipeline_is_reproducible() {
    let first = run_default(load_fixture());
    let second = run_default(load_fixture());

    assert_eq!(first.split.train_rows, second.split.train_rows);
    assert_eq!(first.split.test_rows, second.split.test_rows);
    assert!(first.split.x_train.equals(&second.split.x_train));
    assert!(first.split.y_test.equals(&second.split.y_test));
}

#[test]
fn test_different_seed_changes_split() {
    let config = PipelineConfig::builder().random_seed(7).build().unwrap();
    let other = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .process(load_fixture())
        .unwrap();
    let default = run_default(load_fixture());

    assert_ne!(other.split.test_rows, default.split.test_rows);
}

// ============================================================================
// Stage Tests on Real Data
// ============================================================================

#[test]
fn test_cleaning_is_idempotent_on_fixture() {
    let schema = CreditSchema::default();
    let (once, _) = DataCleaner.clean(load_fixture(), &schema).unwrap();
    let (twice, stats) = DataCleaner.clean(once.clone(), &schema).unwrap();

    assert!(once.equals(&twice));
    assert_eq!(stats.values_imputed, 0);
    assert_eq!(stats.codes_remapped, 0);
}

#[test]
fn test_cleaning_counts_on_fixture() {
    let (_, stats) = DataCleaner
        .clean(load_fixture(), &CreditSchema::default())
        .unwrap();

    // 8 blank cells; EDUCATION 0/5/6 and MARRIAGE 0 twice
    assert_eq!(stats.values_imputed, 8);
    assert_eq!(stats.codes_remapped, 5);
    assert_eq!(stats.rows_after, 76);
}

#[test]
fn test_bounding_stays_within_quantiles() {
    let schema = CreditSchema::default();
    let (mut df, _) = DataCleaner.clean(load_fixture(), &schema).unwrap();
    let before = column_f64(&df, "LIMIT_BAL");
    let mut steps = Vec::new();

    let bounds = OutlierBounder::new(0.01, 0.99)
        .bound_outliers(&mut df, &schema, &mut steps)
        .unwrap();

    let limit = bounds.iter().find(|b| b.column == "LIMIT_BAL").unwrap();
    let after = column_f64(&df, "LIMIT_BAL");

    assert_eq!(after.len(), before.len());
    assert!(after.iter().all(|v| {
        let v = v.unwrap();
        v >= limit.lower && v <= limit.upper
    }));
    assert!(after.iter().any(|v| v.unwrap() == limit.upper));
    // The 1,000,000 limit is pulled down to the 99th percentile
    assert!(limit.upper < 1_000_000.0);
    assert!(limit.clipped_high >= 1);
}

#[test]
fn test_missing_markers_are_imputed_and_bounded() {
    for (marker, column) in [("NA", "LIMIT_BAL"), ("NaN", "BILL_AMT1"), ("null", "PAY_AMT2")] {
        let path = fixture_with_cell("credit_prep_marker", 5, column, marker);
        let df = load_csv(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let result = run_default(df);
        let x_train = &result.split.x_train;
        let x_test = &result.split.x_test;

        for frame in [x_train, x_test] {
            let feature = frame.column(column).unwrap();
            assert!(matches!(feature.dtype(), DataType::Float64), "{} with {}", column, marker);
            assert_eq!(feature.null_count(), 0);
        }
        assert!(result.summary.bounds.iter().any(|b| b.column == column));
    }
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[test]
fn test_missing_target_fails() {
    let config = PipelineConfig::builder()
        .target_column("defaulted")
        .build()
        .unwrap();

    let result = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .process(load_fixture());

    match result {
        Err(PreprocessingError::ColumnNotFound(column)) => assert_eq!(column, "defaulted"),
        other => panic!("Expected ColumnNotFound, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_single_member_class_fails() {
    let mut df = load_fixture();
    let labels: Vec<i64> = (0..df.height()).map(|i| i64::from(i == 0)).collect();
    df.replace(TARGET, Series::new(TARGET.into(), labels)).unwrap();

    let result = Pipeline::builder().build().unwrap().process(df);

    assert!(matches!(
        result,
        Err(PreprocessingError::InsufficientClassMembers { class: 1, count: 1 })
    ));
}

#[test]
fn test_missing_input_file() {
    let result = load_csv(fixtures_path().join("does_not_exist.csv"));

    let err = result.unwrap_err();
    assert_eq!(err.error_code(), "INPUT_NOT_FOUND");
}

// ============================================================================
// Progress and Report Tests
// ============================================================================

#[test]
fn test_pipeline_progress_is_monotonic() {
    let updates = Arc::new(Mutex::new(Vec::new()));
    let updates_clone = updates.clone();

    Pipeline::builder()
        .on_progress(move |update| {
            updates_clone.lock().unwrap().push((update.stage, update.progress));
        })
        .build()
        .unwrap()
        .process(load_fixture())
        .unwrap();

    let updates = updates.lock().unwrap();
    assert_eq!(updates.first().map(|u| u.0), Some(PipelineStage::Initializing));
    assert_eq!(updates.last().map(|u| u.0), Some(PipelineStage::Complete));
    assert!(updates.windows(2).all(|pair| pair[0].1 <= pair[1].1 + 1e-6));
}

#[test]
fn test_report_round_trips_through_json() {
    let pipeline = Pipeline::builder().build().unwrap();
    let result = pipeline.process(load_fixture()).unwrap();

    let report =
        ReportGenerator::build_report("credit_subset.csv", pipeline.config(), &result.summary);
    let json = serde_json::to_string_pretty(&report).unwrap();
    let parsed: SplitReport = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.shapes, report.shapes);
    assert_eq!(parsed.config, PipelineConfig::default());
    assert_eq!(parsed.derived_columns.len(), 12);
    assert!(!parsed.leakage_note.is_empty());
    assert!(parsed.class_balance.max_proportion_gap <= 1.0 / 16.0);
}
