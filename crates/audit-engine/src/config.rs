//! Configuration for the anomaly detector.
//!
//! Defaults match the engine's policy constants; the builder exists so an
//! embedding application can tune the forest without touching the detection
//! code.

use serde::{Deserialize, Serialize};

/// Configuration for [`crate::AnomalyDetector`].
///
/// # Example
///
/// ```rust,ignore
/// use audit_engine::DetectorConfig;
///
/// let config = DetectorConfig::builder()
///     .num_trees(200)
///     .seed(7)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Number of isolation trees in the ensemble.
    /// Default: 100
    pub num_trees: usize,

    /// Subsample size per tree (capped at the row count).
    /// Default: 256
    pub max_samples: usize,

    /// RNG seed; a fixed seed makes detection reproducible across runs.
    /// Default: 42
    pub seed: u64,

    /// Minimum row count below which detection is not meaningful and the
    /// detector returns no anomalies.
    /// Default: 5
    pub min_rows: usize,

    /// Anomaly score threshold in (0.0, 1.0); rows scoring strictly above
    /// it are flagged. 0.5 is the conventional automatic threshold for
    /// isolation forests.
    /// Default: 0.5
    pub score_threshold: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            num_trees: 100,
            max_samples: 256,
            seed: 42,
            min_rows: 5,
            score_threshold: 0.5,
        }
    }
}

impl DetectorConfig {
    /// Create a new configuration builder.
    pub fn builder() -> DetectorConfigBuilder {
        DetectorConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.num_trees == 0 {
            return Err(ConfigValidationError::InvalidTreeCount(self.num_trees));
        }
        if self.max_samples == 0 {
            return Err(ConfigValidationError::InvalidSampleSize(self.max_samples));
        }
        if self.min_rows == 0 {
            return Err(ConfigValidationError::InvalidMinRows(self.min_rows));
        }
        if !(self.score_threshold > 0.0 && self.score_threshold < 1.0) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "score_threshold".to_string(),
                value: self.score_threshold,
            });
        }
        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be strictly between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Invalid tree count: {0} (must be at least 1)")]
    InvalidTreeCount(usize),

    #[error("Invalid subsample size: {0} (must be at least 1)")]
    InvalidSampleSize(usize),

    #[error("Invalid minimum row count: {0} (must be at least 1)")]
    InvalidMinRows(usize),
}

/// Builder for [`DetectorConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct DetectorConfigBuilder {
    num_trees: Option<usize>,
    max_samples: Option<usize>,
    seed: Option<u64>,
    min_rows: Option<usize>,
    score_threshold: Option<f64>,
}

impl DetectorConfigBuilder {
    pub fn num_trees(mut self, value: usize) -> Self {
        self.num_trees = Some(value);
        self
    }

    pub fn max_samples(mut self, value: usize) -> Self {
        self.max_samples = Some(value);
        self
    }

    pub fn seed(mut self, value: u64) -> Self {
        self.seed = Some(value);
        self
    }

    pub fn min_rows(mut self, value: usize) -> Self {
        self.min_rows = Some(value);
        self
    }

    pub fn score_threshold(mut self, value: f64) -> Self {
        self.score_threshold = Some(value);
        self
    }

    /// Build the configuration, validating all fields.
    pub fn build(self) -> Result<DetectorConfig, ConfigValidationError> {
        let defaults = DetectorConfig::default();
        let config = DetectorConfig {
            num_trees: self.num_trees.unwrap_or(defaults.num_trees),
            max_samples: self.max_samples.unwrap_or(defaults.max_samples),
            seed: self.seed.unwrap_or(defaults.seed),
            min_rows: self.min_rows.unwrap_or(defaults.min_rows),
            score_threshold: self.score_threshold.unwrap_or(defaults.score_threshold),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(DetectorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let config = DetectorConfig::builder()
            .num_trees(50)
            .seed(7)
            .build()
            .unwrap();
        assert_eq!(config.num_trees, 50);
        assert_eq!(config.seed, 7);
        // untouched fields keep defaults
        assert_eq!(config.min_rows, 5);
        assert_eq!(config.score_threshold, 0.5);
    }

    #[test]
    fn test_builder_rejects_zero_trees() {
        let result = DetectorConfig::builder().num_trees(0).build();
        assert!(matches!(
            result,
            Err(ConfigValidationError::InvalidTreeCount(0))
        ));
    }

    #[test]
    fn test_builder_rejects_out_of_range_threshold() {
        assert!(DetectorConfig::builder().score_threshold(0.0).build().is_err());
        assert!(DetectorConfig::builder().score_threshold(1.0).build().is_err());
        assert!(DetectorConfig::builder().score_threshold(0.9).build().is_ok());
    }

    #[test]
    fn test_builder_rejects_zero_samples_and_rows() {
        assert!(DetectorConfig::builder().max_samples(0).build().is_err());
        assert!(DetectorConfig::builder().min_rows(0).build().is_err());
    }
}
