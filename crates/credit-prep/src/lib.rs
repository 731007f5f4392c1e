//! Credit Default Feature Engineering Library
//!
//! Turns the raw UCI "default of credit card clients" table into a cleaned,
//! feature-enriched, stratified train/test split, built with Rust and Polars.
//!
//! # Overview
//!
//! The pipeline runs a fixed sequence of stages over one in-memory table:
//!
//! - **Cleaning**: duplicate removal, median/mode imputation, categorical code normalization
//! - **Outlier Bounding**: per-column quantile clipping of monetary columns
//! - **Feature Derivation**: totals, ratios, row statistics, late-payment counts, trends
//! - **Skew Correction**: `ln(1 + max(x, 0))` on heavy-tailed columns
//! - **Splitting**: seeded stratified train/test partition
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use credit_prep::{Pipeline, PipelineConfig, load_csv};
//!
//! let df = load_csv("data/UCI_Credit_Card.csv")?;
//!
//! let config = PipelineConfig::builder()
//!     .winsorize_bounds(0.01, 0.99)
//!     .test_size(0.2)
//!     .random_seed(42)
//!     .build()?;
//!
//! let result = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .process(df)?;
//!
//! println!("train: {:?}", result.split.x_train.shape());
//! println!("test:  {:?}", result.split.x_test.shape());
//! ```
//!
//! # Known leakage
//!
//! Quantile bounds and the log transform are fitted on the full table before
//! the split. Every run flags it with a `warn!` log line and
//! [`reporting::SplitReport::leakage_note`].

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod loader;
pub mod pipeline;
pub mod reporting;
pub mod schema;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::DataCleaner;
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use error::{PreprocessingError, Result as PreprocessingResult, ResultExt};
pub use imputers::StatisticalImputer;
pub use loader::load_csv;
pub use pipeline::{
    ClosureProgressReporter, DERIVED_COLUMNS, FeatureDeriver, LEAKAGE_NOTE, OutlierBounder,
    Pipeline, PipelineBuilder, PipelineStage, ProgressReporter, ProgressUpdate, SkewCorrector,
    StratifiedSplitter,
};
pub use reporting::{ReportGenerator, SplitReport};
pub use schema::{CategoryRule, CreditSchema};
pub use types::{
    ClassDistribution, ClassShare, CleaningStats, ColumnBounds, PipelineResult, PipelineSummary,
    TrainTestSplit,
};
