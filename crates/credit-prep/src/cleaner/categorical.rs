//! Categorical code normalization.

use crate::error::Result;
use crate::schema::CategoryRule;
use crate::utils::optional_i64_values;
use polars::prelude::*;
use tracing::debug;

/// Collapse out-of-set codes into the rule's fallback bucket.
///
/// The column is rewritten as `Int64`. Nulls are left untouched (imputation
/// runs before this). Returns the number of remapped cells.
pub(crate) fn normalize_codes(
    df: &mut DataFrame,
    rule: &CategoryRule,
    cleaning_actions: &mut Vec<String>,
) -> Result<usize> {
    let values = optional_i64_values(df, &rule.column)?;
    let mut remapped = 0usize;

    let normalized: Int64Chunked = values
        .into_iter()
        .map(|opt| {
            opt.map(|code| {
                let mapped = rule.normalize(code);
                if mapped != code {
                    remapped += 1;
                }
                mapped
            })
        })
        .collect();

    df.replace(
        &rule.column,
        normalized.with_name(rule.column.as_str().into()).into_series(),
    )?;

    if remapped > 0 {
        cleaning_actions.push(format!(
            "Remapped {} '{}' codes outside {:?} to {}",
            remapped, rule.column, rule.valid_codes, rule.fallback_code
        ));
    }
    debug!("Normalized '{}': {} codes remapped", rule.column, remapped);

    Ok(remapped)
}

/// Cast a categorical column to `Int64` without changing its codes.
pub(crate) fn cast_to_integer(df: &mut DataFrame, col_name: &str) -> Result<()> {
    let values = optional_i64_values(df, col_name)?;
    let ints: Int64Chunked = values.into_iter().collect();
    df.replace(col_name, ints.with_name(col_name.into()).into_series())?;
    Ok(())
}
