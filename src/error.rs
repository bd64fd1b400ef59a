//! Error types for resampling runs.
//!
//! Input and configuration problems are detected before any resampling
//! begins. Statistic failures happen inside the loop and carry enough
//! bookkeeping for the caller to tell how far the run got.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error returned by a resampling run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The dataset could not be turned into a valid grouped view.
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),

    /// The run configuration is invalid for the requested mode or data.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The statistic failed and the failure policy aborted the run.
    ///
    /// `iteration` is `None` when the statistic failed on the original,
    /// non-resampled data.
    #[error(
        "statistic failed {}: {source} ({completed} of {requested} iterations accumulated)",
        describe_iteration(.iteration)
    )]
    Statistic {
        /// Iteration index at which the statistic failed.
        iteration: Option<usize>,
        /// Number of iterations accumulated before the failure.
        completed: usize,
        /// Number of iterations requested.
        requested: usize,
        /// The underlying reducer error.
        source: StatisticError,
    },

    /// The run was stopped through its [`StopSignal`](crate::StopSignal).
    #[error("run stopped after {completed} of {requested} iterations")]
    Stopped {
        /// Number of iterations accumulated before the stop was observed.
        completed: usize,
        /// Number of iterations requested.
        requested: usize,
    },
}

fn describe_iteration(iteration: &Option<usize>) -> String {
    match iteration {
        Some(i) => format!("at iteration {}", i),
        None => "on the original data".to_string(),
    }
}

impl Error {
    /// Number of iterations accumulated before the run ended early.
    ///
    /// Returns `None` for errors raised before resampling started.
    pub fn completed_iterations(&self) -> Option<usize> {
        match self {
            Error::Statistic { completed, .. } | Error::Stopped { completed, .. } => {
                Some(*completed)
            }
            Error::InvalidInput(_) | Error::Configuration(_) => None,
        }
    }
}

/// The input table does not have the shape a grouped view needs.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum InvalidInputError {
    /// The table has no rows, or the selection left no rows.
    #[error("dataset contains no rows")]
    EmptyDataset,

    /// A field named by the caller does not exist in the table.
    #[error("field '{field}' is not present in the dataset")]
    MissingField {
        /// Name of the absent field.
        field: String,
    },

    /// A row has no value in the group-label field.
    #[error("row {row} has no value for group field '{field}'")]
    MissingLabel {
        /// Row index.
        row: usize,
        /// Group-label field name.
        field: String,
    },

    /// A value used by the statistic cannot be read as a finite real number.
    #[error("row {row}: value {value} in field '{field}' is not a finite number")]
    NonNumeric {
        /// Row index.
        row: usize,
        /// Field name.
        field: String,
        /// Rendered offending value.
        value: String,
    },

    /// A row has a different number of cells than the table has fields.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// Row index.
        row: usize,
        /// Number of fields declared by the table.
        expected: usize,
        /// Number of cells in the row.
        found: usize,
    },

    /// A group has no members.
    #[error("group '{label}' has no members")]
    EmptyGroup {
        /// Group label.
        label: String,
    },

    /// A label was requested that does not occur in the dataset.
    #[error("group '{label}' does not occur in the dataset")]
    UnknownGroup {
        /// Group label.
        label: String,
    },

    /// The same label was supplied for two groups.
    #[error("group '{label}' is defined more than once")]
    DuplicateGroup {
        /// Group label.
        label: String,
    },
}

/// The run configuration is invalid.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// `n_iterations` must be positive.
    #[error("iteration count must be greater than zero")]
    ZeroIterations,

    /// Confidence level outside the open interval (0, 1).
    #[error("confidence level {0} is outside (0, 1)")]
    ConfidenceLevelOutOfRange(f64),

    /// Percentile outside [0, 100].
    #[error("percentile {0} is outside [0, 100]")]
    PercentileOutOfRange(f64),

    /// Unknown resampling mode name.
    #[error("unrecognized resampling mode '{0}' (expected 'bootstrap', 'permutation' or 'pooled-bootstrap')")]
    UnrecognizedMode(String),

    /// Unknown sidedness name.
    #[error("unrecognized sidedness '{0}' (expected 'two-sided', 'greater' or 'less')")]
    UnrecognizedSidedness(String),

    /// Unknown built-in aggregate name.
    #[error("unrecognized aggregate '{0}'")]
    UnrecognizedAggregate(String),

    /// A resample size override of zero.
    #[error("resample size for group '{label}' must be greater than zero")]
    ZeroResampleSize {
        /// Group label.
        label: String,
    },

    /// A resample size override names a group the estimand does not use.
    #[error("resample size override names group '{label}', which is not resampled")]
    UnusedResampleSize {
        /// Group label.
        label: String,
    },

    /// The estimand cannot be evaluated under the selected mode.
    #[error("estimand '{estimand}' is not supported in {mode} mode")]
    UnsupportedEstimand {
        /// Mode name.
        mode: String,
        /// Estimand description.
        estimand: String,
    },

    /// A contrast compares a group with itself.
    #[error("contrast compares group '{0}' with itself")]
    SelfContrast(String),
}

/// A statistic could not be computed for a given input.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum StatisticError {
    /// The reducer needs at least `required` values.
    #[error("{statistic} requires at least {required} value(s), got {found}")]
    InsufficientData {
        /// Statistic name.
        statistic: String,
        /// Minimum number of values.
        required: usize,
        /// Number of values supplied.
        found: usize,
    },

    /// The reducer produced NaN.
    #[error("{statistic} produced NaN")]
    NotANumber {
        /// Statistic name.
        statistic: String,
    },

    /// A ratio contrast divided by zero.
    #[error("ratio contrast has a zero denominator")]
    ZeroDenominator,

    /// Failure reported by a user-supplied reducer.
    #[error("{0}")]
    Custom(String),
}

impl StatisticError {
    /// Build a custom error from any message.
    pub fn custom(message: impl Into<String>) -> Self {
        StatisticError::Custom(message.into())
    }
}
