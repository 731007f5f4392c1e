use crate::config::PipelineConfig;
use crate::error::{PreprocessingError, Result};
use crate::pipeline::LEAKAGE_NOTE;
use crate::types::{CleaningStats, ClassDistribution, ColumnBounds, PipelineSummary};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

// ============================================================================
// Report Types
// ============================================================================

/// Validation report of one pipeline run.
///
/// Used for both JSON output (`--json`) and file writing (`--emit-report`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitReport {
    // Metadata
    /// RFC 3339 timestamp of report creation
    pub generated_at: String,
    /// Path of the input file
    pub input_file: String,
    pub target_column: String,
    /// Effective configuration of the run
    pub config: PipelineConfig,
    pub duration_ms: u64,

    /// Table shapes at each checkpoint
    pub shapes: ShapeReport,
    /// Class proportions of the full set and each partition
    pub class_balance: ClassBalanceReport,

    // Actions taken
    pub cleaning: CleaningStats,
    pub bounds: Vec<ColumnBounds>,
    pub derived_columns: Vec<String>,
    pub log_transformed_columns: Vec<String>,
    pub processing_steps: Vec<String>,
    pub warnings: Vec<String>,

    /// Statement of the known bounding/skew leakage
    pub leakage_note: String,
}

/// `(rows, columns)` at each checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeReport {
    pub initial: (usize, usize),
    pub cleaned: (usize, usize),
    pub engineered: (usize, usize),
    pub train: (usize, usize),
    pub test: (usize, usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassBalanceReport {
    pub overall: ClassDistribution,
    pub train: ClassDistribution,
    pub test: ClassDistribution,
    /// Largest absolute difference between a partition's class share and
    /// the overall share.
    pub max_proportion_gap: f64,
}

impl ClassBalanceReport {
    pub fn new(
        overall: ClassDistribution,
        train: ClassDistribution,
        test: ClassDistribution,
    ) -> Self {
        let max_proportion_gap = overall
            .classes
            .iter()
            .flat_map(|share| {
                [
                    (train.proportion(share.class) - share.proportion).abs(),
                    (test.proportion(share.class) - share.proportion).abs(),
                ]
            })
            .fold(0.0, f64::max);

        Self {
            overall,
            train,
            test,
            max_proportion_gap,
        }
    }
}

// ============================================================================
// Report Generator
// ============================================================================

/// Builds reports and writes them to an output directory.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(PathBuf::from("outputs"))
    }
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Build the report for a finished run.
    pub fn build_report(
        input_file: &str,
        config: &PipelineConfig,
        summary: &PipelineSummary,
    ) -> SplitReport {
        SplitReport {
            generated_at: Local::now().to_rfc3339(),
            input_file: input_file.to_string(),
            target_column: summary.target_column.clone(),
            config: config.clone(),
            duration_ms: summary.duration_ms,
            shapes: ShapeReport {
                initial: summary.initial_shape,
                cleaned: summary.cleaned_shape,
                engineered: summary.engineered_shape,
                train: summary.train_shape,
                test: summary.test_shape,
            },
            class_balance: ClassBalanceReport::new(
                summary.overall_distribution.clone(),
                summary.train_distribution.clone(),
                summary.test_distribution.clone(),
            ),
            cleaning: summary.cleaning.clone(),
            bounds: summary.bounds.clone(),
            derived_columns: summary.derived_columns.clone(),
            log_transformed_columns: summary.log_transformed_columns.clone(),
            processing_steps: summary.processing_steps.clone(),
            warnings: summary.warnings.clone(),
            leakage_note: LEAKAGE_NOTE.to_string(),
        }
    }

    /// Write a report to a JSON file.
    ///
    /// If `report_base_name` is "credit", the file will be "credit_report.json".
    pub fn write_report_to_file(
        &self,
        report: &SplitReport,
        report_base_name: &str,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).map_err(|e| {
            PreprocessingError::ReportGenerationFailed(format!(
                "cannot create {}: {}",
                self.output_dir.display(),
                e
            ))
        })?;

        let report_path = self
            .output_dir
            .join(format!("{}_report.json", report_base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}
