//! Main pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating the feature-engineering workflow.

use crate::cleaner::DataCleaner;
use crate::config::{ConfigValidationError, PipelineConfig};
use crate::error::Result;
use crate::pipeline::features::FeatureDeriver;
use crate::pipeline::outliers::OutlierBounder;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::pipeline::skew::SkewCorrector;
use crate::pipeline::splitter::{StratifiedSplitter, target_labels};
use crate::schema::CreditSchema;
use crate::types::{ClassDistribution, PipelineResult, PipelineSummary};
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Note attached to every run: bounding and skew statistics see the test rows.
pub const LEAKAGE_NOTE: &str = "Quantile bounds and the log transform are computed on the full \
     table before the split, so test rows influence the training features";

/// The feature-engineering pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use credit_prep::{Pipeline, PipelineConfig};
///
/// let result = Pipeline::builder()
///     .config(PipelineConfig::builder().test_size(0.25).build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .process(dataframe)?;
///
/// println!("train: {:?}", result.split.x_train.shape());
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    schema: CreditSchema,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cleaner: DataCleaner,
    bounder: OutlierBounder,
    deriver: FeatureDeriver,
    skew: SkewCorrector,
    splitter: StratifiedSplitter,
}

// A pipeline may be handed to a worker thread
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn schema(&self) -> &CreditSchema {
        &self.schema
    }

    /// Run every stage over a raw table and split the result.
    ///
    /// # Errors
    ///
    /// Fails with `ColumnNotFound` if the target is missing (before any
    /// transformation), with `InsufficientClassMembers` if a class has fewer
    /// than two rows, and with the error of any stage that fails.
    pub fn process(&self, df: DataFrame) -> Result<PipelineResult> {
        match self.process_internal(df) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn process_internal(&self, df: DataFrame) -> Result<PipelineResult> {
        let start_time = Instant::now();

        info!("Starting feature-engineering pipeline...");
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Initializing,
            0.0,
            "Starting feature-engineering pipeline...",
        ));

        let mut summary = PipelineSummary {
            initial_shape: df.shape(),
            target_column: self.schema.target.clone(),
            ..Default::default()
        };
        let mut processing_steps: Vec<String> = Vec::new();

        warn!("{}", LEAKAGE_NOTE);
        summary.warnings.push(LEAKAGE_NOTE.to_string());

        // Step 1: Cleaning
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Cleaning,
            0.0,
            "Cleaning data...",
        ));
        info!("Step 1: Cleaning {} rows...", df.height());

        let (mut df, cleaning) = self.cleaner.clean(df, &self.schema)?;
        summary.cleaned_shape = df.shape();
        processing_steps.extend(cleaning.actions.iter().cloned());
        summary.cleaning = cleaning;

        let labels = target_labels(&df, &self.schema.target)?;
        summary.overall_distribution = ClassDistribution::from_labels(&labels);

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Cleaning,
            1.0,
            format!("Cleaning complete: {} rows", df.height()),
        ));

        // Step 2: Outlier bounding
        self.report_progress(ProgressUpdate::new(
            PipelineStage::OutlierBounding,
            0.0,
            "Bounding outliers...",
        ));
        info!(
            "Step 2: Winsorizing at the {}/{} quantiles...",
            self.config.winsorize_lower, self.config.winsorize_upper
        );

        summary.bounds = self
            .bounder
            .bound_outliers(&mut df, &self.schema, &mut processing_steps)?;

        self.report_progress(ProgressUpdate::new(
            PipelineStage::OutlierBounding,
            1.0,
            format!("Bounded {} columns", summary.bounds.len()),
        ));

        // Step 3: Derived features
        self.report_progress(ProgressUpdate::new(
            PipelineStage::FeatureDerivation,
            0.0,
            "Deriving features...",
        ));
        info!("Step 3: Deriving features...");

        summary.derived_columns =
            self.deriver
                .derive_features(&mut df, &self.schema, &mut processing_steps)?;

        self.report_progress(ProgressUpdate::new(
            PipelineStage::FeatureDerivation,
            1.0,
            format!("Derived {} features", summary.derived_columns.len()),
        ));

        // Step 4: Skew correction
        self.report_progress(ProgressUpdate::new(
            PipelineStage::SkewCorrection,
            0.0,
            "Correcting skew...",
        ));
        info!("Step 4: Applying log1p to skewed columns...");

        summary.log_transformed_columns =
            self.skew
                .correct_skew(&mut df, &self.schema, &mut processing_steps)?;
        summary.engineered_shape = df.shape();
        debug!("Engineered shape: {:?}", summary.engineered_shape);

        self.report_progress(ProgressUpdate::new(
            PipelineStage::SkewCorrection,
            1.0,
            format!(
                "Log-transformed {} columns",
                summary.log_transformed_columns.len()
            ),
        ));

        // Step 5: Split
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Splitting,
            0.0,
            "Splitting data...",
        ));
        info!(
            "Step 5: Stratified split (test_size={}, seed={})...",
            self.config.test_size, self.config.random_seed
        );

        let split = self.splitter.split(&df, &self.schema)?;

        let pick = |rows: &[usize]| rows.iter().map(|&r| labels[r]).collect::<Vec<_>>();
        summary.train_distribution = ClassDistribution::from_labels(&pick(&split.train_rows));
        summary.test_distribution = ClassDistribution::from_labels(&pick(&split.test_rows));
        summary.train_shape = split.x_train.shape();
        summary.test_shape = split.x_test.shape();

        processing_steps.push(format!(
            "Split {} rows into {} train / {} test (stratified on '{}')",
            df.height(),
            split.train_rows.len(),
            split.test_rows.len(),
            self.schema.target
        ));

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Splitting,
            1.0,
            format!(
                "{} train / {} test rows",
                split.train_rows.len(),
                split.test_rows.len()
            ),
        ));

        summary.processing_steps = processing_steps;
        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Pipeline complete in {} ms: train {:?}, test {:?}",
            summary.duration_ms, summary.train_shape, summary.test_shape
        );

        Ok(PipelineResult { split, summary })
    }
}

/// Builder for creating a [`Pipeline`] instance.
///
/// Use [`Pipeline::builder()`] to get started.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use credit_prep::{ProgressReporter, ProgressUpdate};
    /// use std::sync::Arc;
    ///
    /// struct MyReporter;
    ///
    /// impl ProgressReporter for MyReporter {
    ///     fn report(&self, update: ProgressUpdate) {
    ///         println!("{}: {}", update.stage.display_name(), update.message);
    ///     }
    /// }
    ///
    /// let pipeline = Pipeline::builder()
    ///     .progress_reporter(Arc::new(MyReporter))
    ///     .build()?;
    /// ```
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            schema: CreditSchema::new(config.target_column.clone()),
            bounder: OutlierBounder::new(config.winsorize_lower, config.winsorize_upper),
            splitter: StratifiedSplitter::new(config.test_size, config.random_seed),
            config,
            progress_reporter: self.progress_reporter,
            cleaner: DataCleaner,
            deriver: FeatureDeriver,
            skew: SkewCorrector,
        })
    }
}
