//! Stratified train/test split.
//!
//! Test quotas are apportioned per class with the largest-remainder method,
//! so each partition's class shares match the full table to within one row
//! per class. Shuffling uses a single seeded `StdRng`; the same seed always
//! yields the same partitions.

use crate::error::{PreprocessingError, Result};
use crate::schema::CreditSchema;
use crate::types::TrainTestSplit;
use crate::utils::optional_f64_values;
use polars::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use tracing::debug;

/// Seeded stratified splitter.
#[derive(Debug, Clone, Copy)]
pub struct StratifiedSplitter {
    test_size: f64,
    seed: u64,
}

impl StratifiedSplitter {
    pub fn new(test_size: f64, seed: u64) -> Self {
        Self { test_size, seed }
    }

    /// Split the table into train/test features and labels.
    ///
    /// The identifier column is dropped if present and the target becomes
    /// the label series. Row positions refer to the table as passed in.
    pub fn split(&self, df: &DataFrame, schema: &CreditSchema) -> Result<TrainTestSplit> {
        let labels = target_labels(df, &schema.target)?;
        let (train_rows, test_rows) = self.partition(&labels)?;

        let features = if df.column(&schema.identifier).is_ok() {
            df.drop(&schema.identifier)?
        } else {
            df.clone()
        };
        let target = features
            .column(&schema.target)?
            .as_materialized_series()
            .clone();
        let features = features.drop(&schema.target)?;

        let train_idx = to_idx(&train_rows);
        let test_idx = to_idx(&test_rows);

        debug!(
            "Split {} rows into {} train / {} test",
            labels.len(),
            train_rows.len(),
            test_rows.len()
        );

        Ok(TrainTestSplit {
            x_train: features.take(&train_idx)?,
            x_test: features.take(&test_idx)?,
            y_train: target.take(&train_idx)?,
            y_test: target.take(&test_idx)?,
            train_rows,
            test_rows,
        })
    }

    /// Assign row positions to train and test given their labels.
    pub fn partition(&self, labels: &[i64]) -> Result<(Vec<usize>, Vec<usize>)> {
        let mut by_class: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (row, &label) in labels.iter().enumerate() {
            by_class.entry(label).or_default().push(row);
        }

        for (&class, rows) in &by_class {
            if rows.len() < 2 {
                return Err(PreprocessingError::InsufficientClassMembers {
                    class,
                    count: rows.len(),
                });
            }
        }

        let n = labels.len();
        let n_test = (self.test_size * n as f64).ceil() as usize;
        let n_train = n.saturating_sub(n_test);
        let n_classes = by_class.len();
        if n_test < n_classes || n_train < n_classes {
            return Err(PreprocessingError::InvalidConfig(format!(
                "test_size {} gives {} train / {} test rows, fewer than the {} classes",
                self.test_size, n_train, n_test, n_classes
            )));
        }

        let counts: Vec<usize> = by_class.values().map(Vec::len).collect();
        let quotas = keep_classes_in_both(n_test, &counts, apportion(n_test, &counts));

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut train = Vec::with_capacity(n_train);
        let mut test = Vec::with_capacity(n_test);

        for (mut rows, quota) in by_class.into_values().zip(quotas) {
            rows.shuffle(&mut rng);
            let (class_test, class_train) = rows.split_at(quota);
            test.extend_from_slice(class_test);
            train.extend_from_slice(class_train);
        }

        train.shuffle(&mut rng);
        test.shuffle(&mut rng);

        Ok((train, test))
    }
}

impl Default for StratifiedSplitter {
    fn default() -> Self {
        Self::new(
            crate::config::DEFAULT_TEST_SIZE,
            crate::config::DEFAULT_RANDOM_SEED,
        )
    }
}

/// Read the target column as integer class labels.
///
/// Nulls and non-integral values are rejected with `InvalidTarget`.
pub fn target_labels(df: &DataFrame, target: &str) -> Result<Vec<i64>> {
    let values = optional_f64_values(df, target)?;

    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            None => Err(PreprocessingError::InvalidTarget {
                column: target.to_string(),
                reason: format!("null label at row {}", row),
            }),
            Some(v) if v.fract() != 0.0 || !v.is_finite() => {
                Err(PreprocessingError::InvalidTarget {
                    column: target.to_string(),
                    reason: format!("non-integer label {} at row {}", v, row),
                })
            }
            Some(v) => Ok(v as i64),
        })
        .collect()
}

/// Largest-remainder apportionment of `total` seats over `counts`.
///
/// Remainders are compared exactly in integers; ties go to the earlier class.
fn apportion(total: usize, counts: &[usize]) -> Vec<usize> {
    let n: usize = counts.iter().sum();
    if n == 0 {
        return vec![0; counts.len()];
    }

    let mut quotas: Vec<usize> = counts.iter().map(|c| total * c / n).collect();
    let assigned: usize = quotas.iter().sum();

    let mut order: Vec<usize> = (0..counts.len()).collect();
    // Stable sort keeps class order among equal remainders
    order.sort_by(|&a, &b| (total * counts[b] % n).cmp(&(total * counts[a] % n)));

    for &i in order.iter().take(total - assigned) {
        quotas[i] += 1;
    }
    quotas
}

/// Adjust test quotas so each class keeps at least one row on each side.
///
/// Quotas are clamped to `[1, count - 1]`; the surplus or shortfall is
/// taken from or given to the largest classes with room. Requires every
/// count `>= 2` and `classes <= total <= sum(counts) - classes`.
fn keep_classes_in_both(total: usize, counts: &[usize], mut quotas: Vec<usize>) -> Vec<usize> {
    for (quota, &count) in quotas.iter_mut().zip(counts) {
        *quota = (*quota).clamp(1, count - 1);
    }

    let mut assigned: usize = quotas.iter().sum();
    while assigned > total {
        let Some(i) = largest_class(counts, |i| quotas[i] > 1) else {
            break;
        };
        quotas[i] -= 1;
        assigned -= 1;
    }
    while assigned < total {
        let Some(i) = largest_class(counts, |i| quotas[i] < counts[i] - 1) else {
            break;
        };
        quotas[i] += 1;
        assigned += 1;
    }
    quotas
}

/// Index of the largest class accepted by `room`; ties go to the earlier class.
fn largest_class(counts: &[usize], room: impl Fn(usize) -> bool) -> Option<usize> {
    (0..counts.len())
        .filter(|&i| room(i))
        .min_by_key(|&i| (Reverse(counts[i]), i))
}

fn to_idx(rows: &[usize]) -> IdxCa {
    IdxCa::from_vec(
        "idx".into(),
        rows.iter().map(|&row| row as IdxSize).collect(),
    )
}
