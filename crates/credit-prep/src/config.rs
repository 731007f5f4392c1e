//! Configuration types for the feature engineering pipeline.
//!
//! Only a handful of knobs are recognized: the target column name, the
//! winsorization quantiles, the test fraction and the random seed. Everything
//! else is fixed by [`CreditSchema`](crate::schema::CreditSchema).

use serde::{Deserialize, Serialize};

/// Label column of the UCI credit card default dataset.
pub const DEFAULT_TARGET_COLUMN: &str = "default.payment.next.month";

/// Default lower winsorization quantile.
pub const DEFAULT_WINSORIZE_LOWER: f64 = 0.01;

/// Default upper winsorization quantile.
pub const DEFAULT_WINSORIZE_UPPER: f64 = 0.99;

/// Default fraction of rows assigned to the test partition.
pub const DEFAULT_TEST_SIZE: f64 = 0.2;

/// Default seed for the stratified split.
pub const DEFAULT_RANDOM_SEED: u64 = 42;

/// Configuration for the pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use credit_prep::config::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .winsorize_bounds(0.05, 0.95)
///     .test_size(0.25)
///     .random_seed(7)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Name of the binary target column.
    /// Default: "default.payment.next.month"
    pub target_column: String,

    /// Lower quantile used to clip magnitude columns (0.0 - 1.0).
    /// Default: 0.01
    pub winsorize_lower: f64,

    /// Upper quantile used to clip magnitude columns (0.0 - 1.0).
    /// Default: 0.99
    pub winsorize_upper: f64,

    /// Fraction of rows placed in the test partition, exclusive range (0.0, 1.0).
    /// Default: 0.2
    pub test_size: f64,

    /// Seed for the stratified shuffle. Same seed, same split.
    /// Default: 42
    pub random_seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
            winsorize_lower: DEFAULT_WINSORIZE_LOWER,
            winsorize_upper: DEFAULT_WINSORIZE_UPPER,
            test_size: DEFAULT_TEST_SIZE,
            random_seed: DEFAULT_RANDOM_SEED,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.target_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyTargetColumn);
        }

        for (field, value) in [
            ("winsorize_lower", self.winsorize_lower),
            ("winsorize_upper", self.winsorize_upper),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigValidationError::InvalidQuantile {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if self.winsorize_lower >= self.winsorize_upper {
            return Err(ConfigValidationError::InvertedQuantiles {
                lower: self.winsorize_lower,
                upper: self.winsorize_upper,
            });
        }

        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ConfigValidationError::InvalidTestSize(self.test_size));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Target column name must not be empty")]
    EmptyTargetColumn,

    #[error("Invalid quantile for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidQuantile { field: String, value: f64 },

    #[error("Lower quantile {lower} must be strictly below upper quantile {upper}")]
    InvertedQuantiles { lower: f64, upper: f64 },

    #[error("Invalid test size: {0} (must be between 0.0 and 1.0, exclusive)")]
    InvalidTestSize(f64),
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    target_column: Option<String>,
    winsorize_lower: Option<f64>,
    winsorize_upper: Option<f64>,
    test_size: Option<f64>,
    random_seed: Option<u64>,
}

impl PipelineConfigBuilder {
    /// Start from an existing configuration (e.g. one loaded from JSON).
    pub fn from_config(config: PipelineConfig) -> Self {
        Self {
            target_column: Some(config.target_column),
            winsorize_lower: Some(config.winsorize_lower),
            winsorize_upper: Some(config.winsorize_upper),
            test_size: Some(config.test_size),
            random_seed: Some(config.random_seed),
        }
    }

    /// Set the target column name.
    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = Some(column.into());
        self
    }

    /// Set the lower winsorization quantile.
    pub fn winsorize_lower(mut self, lower: f64) -> Self {
        self.winsorize_lower = Some(lower);
        self
    }

    /// Set the upper winsorization quantile.
    pub fn winsorize_upper(mut self, upper: f64) -> Self {
        self.winsorize_upper = Some(upper);
        self
    }

    /// Set both winsorization quantiles at once.
    ///
    /// # Arguments
    /// * `lower` - Lower quantile (e.g., 0.01 = 1st percentile)
    /// * `upper` - Upper quantile (e.g., 0.99 = 99th percentile)
    pub fn winsorize_bounds(self, lower: f64, upper: f64) -> Self {
        self.winsorize_lower(lower).winsorize_upper(upper)
    }

    /// Set the test partition fraction.
    pub fn test_size(mut self, size: f64) -> Self {
        self.test_size = Some(size);
        self
    }

    /// Set the split seed.
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let config = PipelineConfig {
            target_column: self
                .target_column
                .unwrap_or_else(|| DEFAULT_TARGET_COLUMN.to_string()),
            winsorize_lower: self.winsorize_lower.unwrap_or(DEFAULT_WINSORIZE_LOWER),
            winsorize_upper: self.winsorize_upper.unwrap_or(DEFAULT_WINSORIZE_UPPER),
            test_size: self.test_size.unwrap_or(DEFAULT_TEST_SIZE),
            random_seed: self.random_seed.unwrap_or(DEFAULT_RANDOM_SEED),
        };

        config.validate()?;
        Ok(config)
    }
}
