//! Imputation module for handling missing values.
//!
//! Numeric features are filled with their median, categorical codes with
//! their mode.

mod statistical;

pub use statistical::StatisticalImputer;
