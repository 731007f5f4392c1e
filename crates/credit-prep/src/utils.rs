//! Shared utilities for the pipeline stages.
//!
//! Column extraction helpers, order statistics and the small integer mode
//! used by categorical imputation.

use crate::error::{PreprocessingError, Result};
use polars::prelude::*;
use std::collections::BTreeMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

// =============================================================================
// Column Extraction Utilities
// =============================================================================

/// Read a column as `f64`. Nulls and NaN both come back as `None`.
pub fn optional_f64_values(df: &DataFrame, col_name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(col_name)
        .map_err(|_| PreprocessingError::ColumnNotFound(col_name.to_string()))?;
    let float_series = column.as_materialized_series().cast(&DataType::Float64)?;
    Ok(float_series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Read a column that must be complete as `f64`.
pub fn f64_values(df: &DataFrame, col_name: &str) -> Result<Vec<f64>> {
    optional_f64_values(df, col_name)?
        .into_iter()
        .map(|v| v.ok_or_else(|| PreprocessingError::UnexpectedNulls(col_name.to_string())))
        .collect()
}

/// Read a column as `i64`, keeping nulls as `None`.
pub fn optional_i64_values(df: &DataFrame, col_name: &str) -> Result<Vec<Option<i64>>> {
    let column = df
        .column(col_name)
        .map_err(|_| PreprocessingError::ColumnNotFound(col_name.to_string()))?;
    let int_series = column.as_materialized_series().cast(&DataType::Int64)?;
    Ok(int_series.i64()?.into_iter().collect())
}

// =============================================================================
// Statistics Utilities
// =============================================================================

/// Quantile of ascending-sorted values with linear interpolation.
///
/// Position is `q * (n - 1)`; the result lies between the two surrounding
/// order statistics. Returns `None` for an empty slice.
pub fn linear_quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let fraction = pos - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Median of the non-missing values, `None` when there are none.
pub fn median(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(f64::total_cmp);
    linear_quantile(&sorted, 0.5)
}

/// Most frequent value; ties resolve to the lowest code.
pub fn integer_mode(values: impl IntoIterator<Item = i64>) -> Option<i64> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    // BTreeMap iterates ascending, so keeping only strictly larger counts
    // leaves the lowest code among equals.
    let mut best: Option<(i64, usize)> = None;
    for (value, count) in counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

/// Sample standard deviation (divisor `n - 1`); zero for fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (n - 1) as f64).sqrt()
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null and NaN values in a numeric Series with a specific value.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let float_series = series.cast(&DataType::Float64)?;
    let filled: Float64Chunked = float_series
        .f64()?
        .into_iter()
        .map(|v| Some(v.filter(|x| !x.is_nan()).unwrap_or(fill_value)))
        .collect();

    Ok(filled.with_name(series.name().clone()).into_series())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_linear_quantile_interpolates() {
        let sorted: Vec<f64> = (1..=10).map(|v| v as f64).collect();

        assert_eq!(linear_quantile(&sorted, 0.0), Some(1.0));
        assert_eq!(linear_quantile(&sorted, 1.0), Some(10.0));
        assert_eq!(linear_quantile(&sorted, 0.5), Some(5.5));
        // pos = 0.01 * 9 = 0.09 -> 1 + 0.09
        let q01 = linear_quantile(&sorted, 0.01).unwrap();
        assert!((q01 - 1.09).abs() < 1e-12);
        // pos = 0.99 * 9 = 8.91 -> 9 + 0.91
        let q99 = linear_quantile(&sorted, 0.99).unwrap();
        assert!((q99 - 9.91).abs() < 1e-12);
    }

    #[test]
    fn test_linear_quantile_edge_cases() {
        assert_eq!(linear_quantile(&[], 0.5), None);
        assert_eq!(linear_quantile(&[7.0], 0.99), Some(7.0));
    }

    #[test]
    fn test_integer_mode() {
        assert_eq!(integer_mode([2, 1, 2, 3]), Some(2));
        assert_eq!(integer_mode(Vec::<i64>::new()), None);
    }

    #[test]
    fn test_integer_mode_tie_breaks_to_lowest() {
        assert_eq!(integer_mode([3, 1, 3, 1, 2]), Some(1));
        assert_eq!(integer_mode([5, 4]), Some(4));
    }

    #[test]
    fn test_sample_std() {
        let values = [100.0, 200.0, 300.0, 400.0, 500.0, 600.0];
        // variance = 17500 * 6 / 5 = 35000
        assert!((sample_std(&values) - 35000f64.sqrt()).abs() < 1e-9);
        assert_eq!(sample_std(&[5.0; 6]), 0.0);
        assert_eq!(sample_std(&[5.0]), 0.0);
    }

    #[test]
    fn test_fill_numeric_nulls() {
        let series = Series::new("test".into(), &[Some(1.0), None, Some(3.0)]);
        let filled = fill_numeric_nulls(&series, 0.0).unwrap();

        assert_eq!(filled.name().as_str(), "test");
        assert_eq!(filled.null_count(), 0);
        assert_eq!(filled.get(1).unwrap().try_extract::<f64>().unwrap(), 0.0);
        assert_eq!(filled.get(2).unwrap().try_extract::<f64>().unwrap(), 3.0);
    }

    #[test]
    fn test_nan_reads_as_missing() {
        let df = df!["BILL_AMT1" => [1.0, f64::NAN, 3.0]].unwrap();

        let values = optional_f64_values(&df, "BILL_AMT1").unwrap();
        assert_eq!(values, vec![Some(1.0), None, Some(3.0)]);

        let series = df.column("BILL_AMT1").unwrap().as_materialized_series();
        let filled = fill_numeric_nulls(series, 2.0).unwrap();
        assert_eq!(filled.get(1).unwrap().try_extract::<f64>().unwrap(), 2.0);
    }

    #[test]
    fn test_median_skips_nan() {
        assert_eq!(median([3.0, f64::NAN, 1.0, 2.0]), Some(2.0));
        assert_eq!(median([4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median([f64::NAN]), None);
    }

    #[test]
    fn test_f64_values_rejects_nulls() {
        let df = df!["x" => [Some(1.0), None]].unwrap();
        assert!(matches!(
            f64_values(&df, "x"),
            Err(PreprocessingError::UnexpectedNulls(_))
        ));
        assert!(matches!(
            f64_values(&df, "missing"),
            Err(PreprocessingError::ColumnNotFound(_))
        ));
    }
}
