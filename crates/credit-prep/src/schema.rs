//! Column roles of the credit card default dataset.
//!
//! Stages never spell column names themselves; they ask the schema which
//! columns play which role. Group membership for winsorization and skew
//! correction is resolved by name prefix against the live table, so derived
//! columns that share a prefix are picked up automatically.

use crate::error::{PreprocessingError, Result};
use crate::utils::is_numeric_dtype;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Valid codes of a categorical column and the bucket for everything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub column: String,
    pub valid_codes: Vec<i64>,
    pub fallback_code: i64,
}

impl CategoryRule {
    pub fn new(column: impl Into<String>, valid_codes: &[i64], fallback_code: i64) -> Self {
        Self {
            column: column.into(),
            valid_codes: valid_codes.to_vec(),
            fallback_code,
        }
    }

    /// Map a code into the valid set.
    #[inline]
    pub fn normalize(&self, code: i64) -> i64 {
        if self.valid_codes.contains(&code) {
            code
        } else {
            self.fallback_code
        }
    }
}

/// Typed description of the dataset's column roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditSchema {
    /// Binary label column.
    pub target: String,
    /// Row identifier, dropped before the split.
    pub identifier: String,
    /// Small-integer categorical codes, imputed with the mode.
    pub categorical: Vec<String>,
    /// Monthly bill statements, oldest first.
    pub bill_amounts: Vec<String>,
    /// Monthly payments, oldest first.
    pub payment_amounts: Vec<String>,
    /// Monthly repayment status codes (positive = months late).
    pub delay_status: Vec<String>,
    /// Prefixes of the monetary-magnitude columns that get winsorized.
    pub magnitude_prefixes: Vec<String>,
    /// Prefixes of the heavy-tailed columns that get log-compressed.
    pub skew_prefixes: Vec<String>,
    /// Normalization rules for categorical codes.
    pub category_rules: Vec<CategoryRule>,
}

impl Default for CreditSchema {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_TARGET_COLUMN)
    }
}

impl CreditSchema {
    /// Schema of the UCI credit card dataset with the given target column.
    pub fn new(target: impl Into<String>) -> Self {
        let owned = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        Self {
            target: target.into(),
            identifier: "ID".to_string(),
            categorical: owned(&["SEX", "EDUCATION", "MARRIAGE"]),
            bill_amounts: (1..=6).map(|i| format!("BILL_AMT{}", i)).collect(),
            payment_amounts: (1..=6).map(|i| format!("PAY_AMT{}", i)).collect(),
            delay_status: [0, 2, 3, 4, 5, 6]
                .iter()
                .map(|i| format!("PAY_{}", i))
                .collect(),
            magnitude_prefixes: owned(&["BILL_", "PAY_", "LIMIT_BAL"]),
            skew_prefixes: owned(&["BILL_", "PAY_", "TOTAL_"]),
            category_rules: vec![
                CategoryRule::new("EDUCATION", &[1, 2, 3, 4], 4),
                CategoryRule::new("MARRIAGE", &[1, 2, 3], 3),
            ],
        }
    }

    /// Whether a column is the target or the identifier.
    pub fn is_reserved(&self, name: &str) -> bool {
        name == self.target || name == self.identifier
    }

    pub fn is_categorical(&self, name: &str) -> bool {
        self.categorical.iter().any(|c| c == name)
    }

    /// Fail with `ColumnNotFound` for the first name missing from the table.
    pub fn require_columns<'a>(
        &self,
        df: &DataFrame,
        names: impl IntoIterator<Item = &'a String>,
    ) -> Result<()> {
        let present = column_names(df);
        for name in names {
            if !present.contains(name) {
                return Err(PreprocessingError::ColumnNotFound(name.clone()));
            }
        }
        Ok(())
    }

    /// Numeric columns that receive median imputation.
    ///
    /// Excludes the target, the identifier and the categorical columns.
    pub fn numeric_features(&self, df: &DataFrame) -> Vec<String> {
        df.get_columns()
            .iter()
            .filter(|col| is_numeric_dtype(col.dtype()))
            .map(|col| col.name().to_string())
            .filter(|name| !self.is_reserved(name) && !self.is_categorical(name))
            .collect()
    }

    /// Categorical columns present in the table.
    pub fn categorical_present(&self, df: &DataFrame) -> Vec<String> {
        let present = column_names(df);
        self.categorical
            .iter()
            .filter(|c| present.contains(c))
            .cloned()
            .collect()
    }

    /// Numeric feature columns matched by a magnitude prefix.
    pub fn magnitude_columns(&self, df: &DataFrame) -> Vec<String> {
        self.numeric_features(df)
            .into_iter()
            .filter(|name| has_prefix(name, &self.magnitude_prefixes))
            .collect()
    }

    /// Columns (raw or derived) matched by a skew prefix, target excluded.
    pub fn skew_columns(&self, df: &DataFrame) -> Vec<String> {
        column_names(df)
            .into_iter()
            .filter(|name| *name != self.target && has_prefix(name, &self.skew_prefixes))
            .collect()
    }
}

fn has_prefix(name: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|p| name.starts_with(p.as_str()))
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}
