//! Statistical imputation methods.
//!
//! Provides median imputation for numeric features and mode imputation for
//! integer-coded categorical columns.

use crate::error::{PreprocessingError, Result};
use crate::utils::{
    fill_numeric_nulls, integer_mode, median, optional_f64_values, optional_i64_values,
};
use polars::prelude::*;
use tracing::debug;

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Apply median imputation to a numeric column.
    ///
    /// The column is rewritten as `Float64`. NaN counts as missing. Returns
    /// the number of filled cells. A column with no valid value cannot be
    /// imputed.
    pub fn apply_numeric_median(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<usize> {
        let series = df
            .column(col_name)
            .map_err(|_| PreprocessingError::ColumnNotFound(col_name.to_string()))?
            .as_materialized_series()
            .clone();

        let values = optional_f64_values(df, col_name)?;
        let missing = values.iter().filter(|v| v.is_none()).count();
        let median_val = median(values.into_iter().flatten())
            .ok_or_else(|| PreprocessingError::NoValidValues(col_name.to_string()))?;

        let filled = fill_numeric_nulls(&series, median_val)?;
        df.replace(col_name, filled)?;

        if missing > 0 {
            processing_steps.push(format!(
                "Filled {} missing values in '{}' with median: {:.2}",
                missing, col_name, median_val
            ));
            debug!("Median imputed '{}' ({} values)", col_name, missing);
        }

        Ok(missing)
    }

    /// Apply mode imputation to an integer-coded categorical column.
    ///
    /// The column is rewritten as `Int64`. Ties between equally frequent
    /// codes resolve to the lowest code. Returns the number of filled cells.
    pub fn apply_mode_imputation(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<usize> {
        let values = optional_i64_values(df, col_name)?;
        let missing = values.iter().filter(|v| v.is_none()).count();

        let mode_val = integer_mode(values.iter().flatten().copied())
            .ok_or_else(|| PreprocessingError::NoValidValues(col_name.to_string()))?;

        let filled: Int64Chunked = values
            .into_iter()
            .map(|v| Some(v.unwrap_or(mode_val)))
            .collect();
        df.replace(col_name, filled.with_name(col_name.into()).into_series())?;

        if missing > 0 {
            processing_steps.push(format!(
                "Filled {} missing values in '{}' with mode: {}",
                missing, col_name, mode_val
            ));
            debug!("Mode imputed '{}' ({} values)", col_name, missing);
        }

        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // apply_numeric_median() tests
    // ========================================================================

    #[test]
    fn test_apply_numeric_median_basic() {
        let mut df = df![
            "values" => [Some(1.0), None, Some(3.0), None, Some(5.0)],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let filled =
            StatisticalImputer::apply_numeric_median(&mut df, "values", &mut steps).unwrap();

        assert_eq!(filled, 2);
        let values = df.column("values").unwrap();
        assert_eq!(values.null_count(), 0);

        // Median of [1, 3, 5] = 3
        assert_eq!(values.get(1).unwrap().try_extract::<f64>().unwrap(), 3.0);
        assert_eq!(values.get(3).unwrap().try_extract::<f64>().unwrap(), 3.0);
        assert!(steps[0].contains("median"));
    }

    #[test]
    fn test_apply_numeric_median_integer_column_becomes_float() {
        let mut df = df![
            "LIMIT_BAL" => [Some(10i64), None, Some(20), Some(40)],
        ]
        .unwrap();
        let mut steps = Vec::new();

        StatisticalImputer::apply_numeric_median(&mut df, "LIMIT_BAL", &mut steps).unwrap();

        let values = df.column("LIMIT_BAL").unwrap();
        assert!(matches!(values.dtype(), DataType::Float64));
        assert_eq!(values.get(1).unwrap().try_extract::<f64>().unwrap(), 20.0);
    }

    #[test]
    fn test_apply_numeric_median_no_nulls_logs_nothing() {
        let mut df = df![
            "values" => [1.0, 2.0, 3.0],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let filled =
            StatisticalImputer::apply_numeric_median(&mut df, "values", &mut steps).unwrap();

        assert_eq!(filled, 0);
        assert!(steps.is_empty());
        let values = df.column("values").unwrap();
        assert_eq!(values.get(2).unwrap().try_extract::<f64>().unwrap(), 3.0);
    }

    #[test]
    fn test_apply_numeric_median_treats_nan_as_missing() {
        let mut df = df![
            "BILL_AMT1" => [Some(1.0), Some(f64::NAN), None, Some(5.0), Some(3.0)],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let filled =
            StatisticalImputer::apply_numeric_median(&mut df, "BILL_AMT1", &mut steps).unwrap();

        assert_eq!(filled, 2);
        let values = df.column("BILL_AMT1").unwrap();
        assert_eq!(values.null_count(), 0);
        assert_eq!(values.get(1).unwrap().try_extract::<f64>().unwrap(), 3.0);
        assert_eq!(values.get(2).unwrap().try_extract::<f64>().unwrap(), 3.0);
    }

    #[test]
    fn test_apply_numeric_median_all_nulls_fails() {
        let mut df = df![
            "values" => [Option::<f64>::None, None, None],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let result = StatisticalImputer::apply_numeric_median(&mut df, "values", &mut steps);

        assert!(matches!(result, Err(PreprocessingError::NoValidValues(_))));
    }

    #[test]
    fn test_apply_numeric_median_nonexistent_column() {
        let mut df = df![
            "other" => [1.0, 2.0, 3.0],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let result = StatisticalImputer::apply_numeric_median(&mut df, "values", &mut steps);
        assert!(matches!(result, Err(PreprocessingError::ColumnNotFound(_))));
    }

    // ========================================================================
    // apply_mode_imputation() tests
    // ========================================================================

    #[test]
    fn test_apply_mode_imputation_basic() {
        let mut df = df![
            "EDUCATION" => [Some(2i64), Some(1), Some(2), None, Some(2)],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let filled =
            StatisticalImputer::apply_mode_imputation(&mut df, "EDUCATION", &mut steps).unwrap();

        assert_eq!(filled, 1);
        let education = df.column("EDUCATION").unwrap();
        assert_eq!(education.null_count(), 0);
        assert_eq!(education.get(3).unwrap().try_extract::<i64>().unwrap(), 2);
        assert!(steps[0].contains("mode"));
    }

    #[test]
    fn test_apply_mode_imputation_tie_breaking() {
        let mut df = df![
            "MARRIAGE" => [Some(2i64), Some(1), None, Some(2), Some(1)],
        ]
        .unwrap();
        let mut steps = Vec::new();

        StatisticalImputer::apply_mode_imputation(&mut df, "MARRIAGE", &mut steps).unwrap();

        // 1 and 2 both appear twice; the lowest code wins
        let marriage = df.column("MARRIAGE").unwrap();
        assert_eq!(marriage.get(2).unwrap().try_extract::<i64>().unwrap(), 1);
    }

    #[test]
    fn test_apply_mode_imputation_all_nulls_fails() {
        let mut df = df![
            "SEX" => [Option::<i64>::None, None],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let result = StatisticalImputer::apply_mode_imputation(&mut df, "SEX", &mut steps);
        assert!(matches!(result, Err(PreprocessingError::NoValidValues(ref c)) if c == "SEX"));
    }
}
