//! Derived feature computation.
//!
//! Appends aggregate, statistical, behavioral and trend features computed
//! row by row from the monthly bill, payment and delay-status columns.

use crate::error::Result;
use crate::schema::CreditSchema;
use crate::utils::{f64_values, sample_std};
use polars::prelude::*;
use tracing::debug;

pub const TOTAL_BILL: &str = "TOTAL_BILL";
pub const TOTAL_PAY: &str = "TOTAL_PAY";
pub const PAY_RATIO: &str = "PAY_RATIO";
pub const BILL_MEAN: &str = "BILL_MEAN";
pub const BILL_STD: &str = "BILL_STD";
pub const BILL_MAX: &str = "BILL_MAX";
pub const PAY_MEAN: &str = "PAY_MEAN";
pub const PAY_STD: &str = "PAY_STD";
pub const PAY_MAX: &str = "PAY_MAX";
pub const NB_LATE_PAYMENTS: &str = "NB_LATE_PAYMENTS";
pub const BILL_TREND: &str = "BILL_TREND";
pub const PAY_TREND: &str = "PAY_TREND";

/// Derived columns in the order they are appended.
pub const DERIVED_COLUMNS: [&str; 12] = [
    TOTAL_BILL,
    TOTAL_PAY,
    PAY_RATIO,
    BILL_MEAN,
    BILL_STD,
    BILL_MAX,
    PAY_MEAN,
    PAY_STD,
    PAY_MAX,
    NB_LATE_PAYMENTS,
    BILL_TREND,
    PAY_TREND,
];

/// Row-wise statistics over one monthly group.
struct GroupStats {
    total: Vec<f64>,
    mean: Vec<f64>,
    std: Vec<f64>,
    max: Vec<f64>,
    /// Last month minus first month.
    trend: Vec<f64>,
}

impl GroupStats {
    fn compute(rows: &[Vec<f64>]) -> Self {
        let n = rows.len();
        let mut stats = Self {
            total: Vec::with_capacity(n),
            mean: Vec::with_capacity(n),
            std: Vec::with_capacity(n),
            max: Vec::with_capacity(n),
            trend: Vec::with_capacity(n),
        };

        for row in rows {
            let total: f64 = row.iter().sum();
            stats.total.push(total);
            stats.mean.push(if row.is_empty() {
                0.0
            } else {
                total / row.len() as f64
            });
            stats.std.push(sample_std(row));
            stats
                .max
                .push(row.iter().copied().fold(f64::NEG_INFINITY, f64::max));
            stats.trend.push(match (row.first(), row.last()) {
                (Some(first), Some(last)) => last - first,
                _ => 0.0,
            });
        }

        stats
    }
}

/// Appends the derived feature columns.
pub struct FeatureDeriver;

impl FeatureDeriver {
    /// Append all derived columns to the table.
    ///
    /// Returns the names of the appended columns. Existing columns are not
    /// modified.
    pub fn derive_features(
        &self,
        df: &mut DataFrame,
        schema: &CreditSchema,
        processing_steps: &mut Vec<String>,
    ) -> Result<Vec<String>> {
        schema.require_columns(df, &schema.bill_amounts)?;
        schema.require_columns(df, &schema.payment_amounts)?;
        schema.require_columns(df, &schema.delay_status)?;

        let bills = GroupStats::compute(&row_values(df, &schema.bill_amounts)?);
        let payments = GroupStats::compute(&row_values(df, &schema.payment_amounts)?);
        let late = late_payment_counts(df, &schema.delay_status)?;

        let ratio: Vec<f64> = payments
            .total
            .iter()
            .zip(&bills.total)
            .map(|(pay, bill)| pay / (bill + 1.0))
            .collect();

        let columns = vec![
            Series::new(TOTAL_BILL.into(), bills.total),
            Series::new(TOTAL_PAY.into(), payments.total),
            Series::new(PAY_RATIO.into(), ratio),
            Series::new(BILL_MEAN.into(), bills.mean),
            Series::new(BILL_STD.into(), bills.std),
            Series::new(BILL_MAX.into(), bills.max),
            Series::new(PAY_MEAN.into(), payments.mean),
            Series::new(PAY_STD.into(), payments.std),
            Series::new(PAY_MAX.into(), payments.max),
            Series::new(NB_LATE_PAYMENTS.into(), late),
            Series::new(BILL_TREND.into(), bills.trend),
            Series::new(PAY_TREND.into(), payments.trend),
        ];

        for series in columns {
            df.with_column(series)?;
        }

        processing_steps.push(format!(
            "Derived {} features: {}",
            DERIVED_COLUMNS.len(),
            DERIVED_COLUMNS.join(", ")
        ));
        debug!("Appended {} derived columns", DERIVED_COLUMNS.len());

        Ok(DERIVED_COLUMNS.iter().map(|s| s.to_string()).collect())
    }
}

/// Transpose a column group into per-row vectors, in group order.
fn row_values(df: &DataFrame, columns: &[String]) -> Result<Vec<Vec<f64>>> {
    let mut rows = vec![Vec::with_capacity(columns.len()); df.height()];
    for col_name in columns {
        for (row, value) in rows.iter_mut().zip(f64_values(df, col_name)?) {
            row.push(value);
        }
    }
    Ok(rows)
}

/// Per row, how many delay-status codes are strictly positive.
fn late_payment_counts(df: &DataFrame, columns: &[String]) -> Result<Vec<i64>> {
    let mut counts = vec![0i64; df.height()];
    for col_name in columns {
        for (count, status) in counts.iter_mut().zip(f64_values(df, col_name)?) {
            if status > 0.0 {
                *count += 1;
            }
        }
    }
    Ok(counts)
}
