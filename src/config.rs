//! Configuration for resampling runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::{PValueMethod, Sidedness};
use crate::error::ConfigurationError;
use crate::statistics::QuantileMethod;

/// Configuration options for `ResamplingTest`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Number of resampling iterations (default: 2,000).
    pub n_iterations: usize,

    /// Base seed of the run. When `None`, a seed is drawn from the
    /// thread-local generator and reported in the run metadata.
    pub seed: Option<u64>,

    /// Confidence level of bootstrap intervals, in (0, 1) (default: 0.95).
    pub confidence_level: f64,

    /// Direction of the alternative hypothesis (default: two-sided).
    pub sidedness: Sidedness,

    /// Per-group resample sizes for bootstrap mode.
    ///
    /// Groups without an entry are drawn at their original size.
    pub resample_sizes: BTreeMap<String, usize>,

    /// What to do when the statistic fails on a resample (default: abort).
    pub failure_policy: FailurePolicy,

    /// Interpolation between order statistics (default: linear).
    pub quantile_method: QuantileMethod,

    /// p-value estimator (default: add-one).
    pub p_value_method: PValueMethod,

    /// Return the per-quantity distributions with the outcome (default: false).
    pub retain_distributions: bool,

    /// Return every resample with the outcome (default: false).
    ///
    /// Memory grows with iterations times total resample size.
    pub retain_resamples: bool,

    /// Run iterations on the shared thread pool (default: false).
    ///
    /// Has no effect without the `parallel` feature. Results are identical
    /// either way.
    pub parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            n_iterations: 2_000,
            seed: None,
            confidence_level: 0.95,
            sidedness: Sidedness::TwoSided,
            resample_sizes: BTreeMap::new(),
            failure_policy: FailurePolicy::Abort,
            quantile_method: QuantileMethod::Linear,
            p_value_method: PValueMethod::AddOne,
            retain_distributions: false,
            retain_resamples: false,
            parallel: false,
        }
    }
}

impl Config {
    /// Check the values that do not depend on the data.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.n_iterations == 0 {
            return Err(ConfigurationError::ZeroIterations);
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ConfigurationError::ConfidenceLevelOutOfRange(
                self.confidence_level,
            ));
        }
        if let Some((label, _)) = self.resample_sizes.iter().find(|(_, k)| **k == 0) {
            return Err(ConfigurationError::ZeroResampleSize {
                label: label.clone(),
            });
        }
        Ok(())
    }
}

/// Policy for a statistic that fails on a resample.
///
/// A failure on the original data is always fatal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Fail the run and discard the partial distribution.
    #[default]
    Abort,

    /// Drop the iteration and count it as skipped.
    SkipIteration,
}

impl FailurePolicy {
    /// Get policy from environment, with fallback default.
    ///
    /// Reads `RESAMPLED_FAILURE_POLICY` environment variable:
    /// - `"abort"` → `Abort`
    /// - `"skip"` → `SkipIteration`
    /// - anything else → `default`
    pub fn from_env_or(default: Self) -> Self {
        match std::env::var("RESAMPLED_FAILURE_POLICY").as_deref() {
            Ok("abort") => FailurePolicy::Abort,
            Ok("skip") => FailurePolicy::SkipIteration,
            _ => default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.n_iterations, 2_000);
        assert_eq!(config.confidence_level, 0.95);
        assert_eq!(config.sidedness, Sidedness::TwoSided);
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert!(!config.retain_distributions);
        assert!(!config.retain_resamples);
        assert!(!config.parallel);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_validation() {
        let config = Config {
            n_iterations: 0,
            ..Config::default()
        };
        assert_eq!(config.validate(), Err(ConfigurationError::ZeroIterations));

        for level in [0.0, 1.0, 1.5, f64::NAN] {
            let config = Config {
                confidence_level: level,
                ..Config::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigurationError::ConfidenceLevelOutOfRange(_))
            ));
        }

        let mut config = Config::default();
        config.resample_sizes.insert("A".into(), 0);
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::ZeroResampleSize { label: "A".into() })
        );
    }
}
