//! Outlier bounding module.
//!
//! Winsorizes the monetary-magnitude columns: each column is clipped to its
//! own `[lower, upper]` empirical quantiles.

use crate::error::{PreprocessingError, Result};
use crate::schema::CreditSchema;
use crate::types::ColumnBounds;
use crate::utils::{linear_quantile, optional_f64_values};
use polars::prelude::*;
use tracing::debug;

/// Clips magnitude columns to per-column quantile bounds.
#[derive(Debug, Clone, Copy)]
pub struct OutlierBounder {
    lower: f64,
    upper: f64,
}

impl OutlierBounder {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Winsorize every magnitude column of the table in place.
    ///
    /// Bounds are computed from the current data of each column
    /// independently. Row count and nulls are preserved; columns end as
    /// `Float64`.
    pub fn bound_outliers(
        &self,
        df: &mut DataFrame,
        schema: &CreditSchema,
        processing_steps: &mut Vec<String>,
    ) -> Result<Vec<ColumnBounds>> {
        let mut all_bounds = Vec::new();

        for col_name in schema.magnitude_columns(df) {
            let bounds = self.bound_column(df, &col_name)?;
            if bounds.clipped() > 0 {
                processing_steps.push(format!(
                    "Clipped {} values in {} to [{:.2}, {:.2}] ({}th/{}th percentiles)",
                    bounds.clipped(),
                    col_name,
                    bounds.lower,
                    bounds.upper,
                    percent(self.lower),
                    percent(self.upper)
                ));
            }
            all_bounds.push(bounds);
        }

        let total: usize = all_bounds.iter().map(ColumnBounds::clipped).sum();
        debug!(
            "Clipped {} values across {} columns",
            total,
            all_bounds.len()
        );

        Ok(all_bounds)
    }

    /// Winsorize a single column in place.
    ///
    /// NaN cells are treated as missing: they never enter the quantiles and
    /// come back as null.
    pub fn bound_column(&self, df: &mut DataFrame, col_name: &str) -> Result<ColumnBounds> {
        let values = optional_f64_values(df, col_name)?;

        let mut sorted: Vec<f64> = values.iter().flatten().copied().collect();
        sorted.sort_by(f64::total_cmp);

        let (lower_val, upper_val) = match (
            linear_quantile(&sorted, self.lower),
            linear_quantile(&sorted, self.upper),
        ) {
            (Some(lo), Some(hi)) => (lo, hi),
            _ => return Err(PreprocessingError::NoValidValues(col_name.to_string())),
        };

        let clipped_low = sorted.iter().filter(|&&v| v < lower_val).count();
        let clipped_high = sorted.iter().filter(|&&v| v > upper_val).count();

        let capped: Float64Chunked = values
            .into_iter()
            .map(|v| v.map(|val| val.clamp(lower_val, upper_val)))
            .collect();
        df.replace(col_name, capped.with_name(col_name.into()).into_series())?;

        debug!(
            "Bounded '{}' to [{}, {}]: {} low, {} high",
            col_name, lower_val, upper_val, clipped_low, clipped_high
        );

        Ok(ColumnBounds {
            column: col_name.to_string(),
            lower: lower_val,
            upper: upper_val,
            clipped_low,
            clipped_high,
        })
    }
}

impl Default for OutlierBounder {
    fn default() -> Self {
        Self::new(
            crate::config::DEFAULT_WINSORIZE_LOWER,
            crate::config::DEFAULT_WINSORIZE_UPPER,
        )
    }
}

fn percent(q: f64) -> String {
    format!("{}", (q * 100.0 * 1000.0).round() / 1000.0)
}
