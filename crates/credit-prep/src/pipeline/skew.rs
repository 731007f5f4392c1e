//! Skew correction.
//!
//! Heavy-tailed monetary columns are floored at zero and compressed with
//! `ln(1 + x)`.

use crate::error::Result;
use crate::schema::CreditSchema;
use crate::utils::optional_f64_values;
use polars::prelude::*;
use tracing::debug;

/// `ln(1 + max(x, 0))`.
#[inline]
pub fn clipped_log1p(value: f64) -> f64 {
    value.max(0.0).ln_1p()
}

/// Applies the clip-then-log transform to skewed columns.
pub struct SkewCorrector;

impl SkewCorrector {
    /// Rewrite every skew column in place. Returns the transformed names.
    pub fn correct_skew(
        &self,
        df: &mut DataFrame,
        schema: &CreditSchema,
        processing_steps: &mut Vec<String>,
    ) -> Result<Vec<String>> {
        let columns = schema.skew_columns(df);

        for col_name in &columns {
            let values = optional_f64_values(df, col_name)?;
            let transformed: Float64Chunked = values
                .into_iter()
                .map(|v| v.map(clipped_log1p))
                .collect();
            df.replace(
                col_name,
                transformed.with_name(col_name.as_str().into()).into_series(),
            )?;
        }

        if !columns.is_empty() {
            processing_steps.push(format!(
                "Applied log1p (floored at 0) to {} columns",
                columns.len()
            ));
        }
        debug!("Log-transformed columns: {:?}", columns);

        Ok(columns)
    }
}
