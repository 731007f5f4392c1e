//! Data cleaning module.
//!
//! This module provides:
//! - Target presence and numeric-column checks (fail before any transformation)
//! - Duplicate row removal, keeping first occurrences in order
//! - Median imputation of numeric features, mode imputation of categorical codes
//! - Normalization of invalid categorical codes

mod categorical;

use crate::error::{PreprocessingError, Result};
use crate::imputers::StatisticalImputer;
use crate::schema::CreditSchema;
use crate::types::CleaningStats;
use crate::utils::is_numeric_dtype;
use polars::prelude::*;
use tracing::{debug, info};

/// Data cleaner for the credit dataset.
pub struct DataCleaner;

impl DataCleaner {
    /// Clean a raw table.
    ///
    /// Order:
    /// 1. Check the target column exists and every other column is numeric
    /// 2. Remove duplicate rows (all columns, first occurrence kept)
    /// 3. Fill numeric features with their median
    /// 4. Fill categorical codes with their mode
    /// 5. Collapse invalid categorical codes and cast categoricals to `Int64`
    /// 6. Remove rows the repairs turned into duplicates
    ///
    /// The output is a fixed point: cleaning it again changes nothing.
    pub fn clean(
        &self,
        df: DataFrame,
        schema: &CreditSchema,
    ) -> Result<(DataFrame, CleaningStats)> {
        if df.column(&schema.target).is_err() {
            return Err(PreprocessingError::ColumnNotFound(schema.target.clone()));
        }
        if let Some(column) = df
            .get_columns()
            .iter()
            .find(|c| c.name().as_str() != schema.target && !is_numeric_dtype(c.dtype()))
        {
            return Err(PreprocessingError::NonNumericColumn {
                column: column.name().to_string(),
                dtype: column.dtype().to_string(),
            });
        }

        info!("Performing data cleaning...");

        let mut stats = CleaningStats {
            rows_before: df.height(),
            ..Default::default()
        };

        // 1. Remove duplicate rows
        let mut df = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
        stats.duplicates_removed = stats.rows_before - df.height();

        if stats.duplicates_removed > 0 {
            let pct = (stats.duplicates_removed as f64 / stats.rows_before as f64) * 100.0;
            stats.actions.push(format!(
                "Removed {} duplicate rows ({:.1}%)",
                stats.duplicates_removed, pct
            ));
            debug!("Removed {} duplicate rows", stats.duplicates_removed);
        } else {
            stats.actions.push("No duplicate rows found".to_string());
            debug!("No duplicate rows found");
        }

        // 2. Numeric features: median
        for col_name in schema.numeric_features(&df) {
            stats.values_imputed +=
                StatisticalImputer::apply_numeric_median(&mut df, &col_name, &mut stats.actions)?;
        }

        // 3. Categorical codes: mode
        let categorical = schema.categorical_present(&df);
        for col_name in &categorical {
            stats.values_imputed +=
                StatisticalImputer::apply_mode_imputation(&mut df, col_name, &mut stats.actions)?;
        }

        // 4. Collapse unknown codes
        for rule in &schema.category_rules {
            if categorical.contains(&rule.column) {
                stats.codes_remapped +=
                    categorical::normalize_codes(&mut df, rule, &mut stats.actions)?;
            }
        }
        for col_name in &categorical {
            categorical::cast_to_integer(&mut df, col_name)?;
        }

        // 5. Repairs can make rows identical; fill values stay the ones above
        let before_repair_dedup = df.height();
        df = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
        let repaired_duplicates = before_repair_dedup - df.height();
        if repaired_duplicates > 0 {
            stats.duplicates_removed += repaired_duplicates;
            stats.actions.push(format!(
                "Removed {} rows duplicated after imputation",
                repaired_duplicates
            ));
            debug!("Removed {} rows duplicated after imputation", repaired_duplicates);
        }

        stats.rows_after = df.height();
        info!(
            "Cleaning complete: {} rows, {} values imputed, {} codes remapped",
            stats.rows_after, stats.values_imputed, stats.codes_remapped
        );

        Ok((df, stats))
    }
}
