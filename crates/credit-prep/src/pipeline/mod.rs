//! Pipeline module.
//!
//! This module provides the feature-engineering pipeline and its stages.

mod builder;
pub mod features;
pub mod outliers;
pub mod progress;
pub mod skew;
pub mod splitter;

pub use builder::{LEAKAGE_NOTE, Pipeline, PipelineBuilder};
pub use features::{DERIVED_COLUMNS, FeatureDeriver};
pub use outliers::OutlierBounder;
pub use progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};
pub use skew::SkewCorrector;
pub use splitter::StratifiedSplitter;
