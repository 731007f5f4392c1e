use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// What the cleaner changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningStats {
    pub rows_before: usize,
    pub rows_after: usize,
    pub duplicates_removed: usize,
    /// Cells filled by median or mode imputation.
    pub values_imputed: usize,
    /// Categorical cells collapsed into a fallback bucket.
    pub codes_remapped: usize,
    /// Human-readable descriptions of each action taken.
    pub actions: Vec<String>,
}

/// Quantile bounds applied to one column by the outlier bounder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnBounds {
    pub column: String,
    pub lower: f64,
    pub upper: f64,
    /// Values raised to `lower`.
    pub clipped_low: usize,
    /// Values lowered to `upper`.
    pub clipped_high: usize,
}

impl ColumnBounds {
    pub fn clipped(&self) -> usize {
        self.clipped_low + self.clipped_high
    }
}

/// Count and share of one target class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassShare {
    pub class: i64,
    pub count: usize,
    pub proportion: f64,
}

/// Class breakdown of a label set, sorted by class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassDistribution {
    pub total: usize,
    pub classes: Vec<ClassShare>,
}

impl ClassDistribution {
    /// Build the breakdown from raw labels.
    pub fn from_labels(labels: &[i64]) -> Self {
        let mut counts: std::collections::BTreeMap<i64, usize> = std::collections::BTreeMap::new();
        for &label in labels {
            *counts.entry(label).or_insert(0) += 1;
        }

        let total = labels.len();
        let classes = counts
            .into_iter()
            .map(|(class, count)| ClassShare {
                class,
                count,
                proportion: if total > 0 {
                    count as f64 / total as f64
                } else {
                    0.0
                },
            })
            .collect();

        Self { total, classes }
    }

    /// Share of a class, zero when absent.
    pub fn proportion(&self, class: i64) -> f64 {
        self.classes
            .iter()
            .find(|share| share.class == class)
            .map(|share| share.proportion)
            .unwrap_or(0.0)
    }
}

/// The four artifacts of the split.
///
/// `train_rows` and `test_rows` are row positions in the table handed to the
/// splitter; together they cover every row exactly once.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: DataFrame,
    pub x_test: DataFrame,
    pub y_train: Series,
    pub y_test: Series,
    pub train_rows: Vec<usize>,
    pub test_rows: Vec<usize>,
}

/// Shape and distribution summary of one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    /// Shape of the table handed to the pipeline.
    pub initial_shape: (usize, usize),
    /// Shape after cleaning.
    pub cleaned_shape: (usize, usize),
    /// Shape after feature derivation and skew correction.
    pub engineered_shape: (usize, usize),
    pub train_shape: (usize, usize),
    pub test_shape: (usize, usize),

    pub target_column: String,
    pub cleaning: CleaningStats,
    pub bounds: Vec<ColumnBounds>,
    pub derived_columns: Vec<String>,
    pub log_transformed_columns: Vec<String>,

    /// Class breakdown of all post-cleaning rows.
    pub overall_distribution: ClassDistribution,
    pub train_distribution: ClassDistribution,
    pub test_distribution: ClassDistribution,

    /// Ordered description of every step taken.
    pub processing_steps: Vec<String>,
    pub warnings: Vec<String>,
}

/// Outcome of [`Pipeline::process`](crate::pipeline::Pipeline::process).
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub split: TrainTestSplit,
    pub summary: PipelineSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_distribution_from_labels() {
        let dist = ClassDistribution::from_labels(&[1, 0, 0, 0]);

        assert_eq!(dist.total, 4);
        assert_eq!(dist.classes.len(), 2);
        assert_eq!(dist.classes[0].class, 0);
        assert_eq!(dist.classes[0].count, 3);
        assert_eq!(dist.proportion(0), 0.75);
        assert_eq!(dist.proportion(1), 0.25);
        assert_eq!(dist.proportion(7), 0.0);
    }

    #[test]
    fn test_class_distribution_empty() {
        let dist = ClassDistribution::from_labels(&[]);
        assert_eq!(dist.total, 0);
        assert!(dist.classes.is_empty());
    }

    #[test]
    fn test_column_bounds_clipped() {
        let bounds = ColumnBounds {
            column: "BILL_AMT1".to_string(),
            lower: 0.0,
            upper: 1.0,
            clipped_low: 2,
            clipped_high: 3,
        };
        assert_eq!(bounds.clipped(), 5);
    }
}
