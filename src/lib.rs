//! # resampled
//!
//! Bootstrap confidence intervals and permutation tests for small grouped
//! datasets.
//!
//! This crate resamples grouped numeric data and applies a user-supplied
//! statistic to every resample, outputting:
//! - Percentile confidence intervals with bootstrap standard errors
//! - Permutation (or pooled bootstrap) p-values with add-one correction
//! - The empirical distributions, and optionally every resample
//! - Advisories when power or reliability is questionable
//!
//! ## Reproducibility
//!
//! Iteration `i` draws from a generator seeded from the run's base seed and
//! `i` alone. A seeded run gives bit-identical results whether iterations run
//! sequentially or on the thread pool. Unseeded runs report the seed they
//! drew in [`Metadata::seed`].
//!
//! ## Quick Start
//!
//! ```
//! use resampled::{Aggregate, Estimand, GroupedDataset, ResamplingTest};
//!
//! let data = GroupedDataset::single("A", vec![10.0, 12.0, 11.0, 13.0, 9.0]).unwrap();
//!
//! let output = ResamplingTest::bootstrap()
//!     .iterations(2_000)
//!     .confidence_level(0.90)
//!     .seed(7)
//!     .run(&data, &Estimand::group("A"), &Aggregate::Mean)
//!     .unwrap();
//!
//! let ci = output.outcome.interval().unwrap();
//! assert_eq!(ci.point_estimate, 11.0);
//! assert!(ci.lower < 11.0 && 11.0 < ci.upper);
//! ```
//!
//! Any closure `Fn(&[f64]) -> f64` works as a statistic:
//!
//! ```
//! use resampled::{Estimand, GroupedDataset, ResamplingTest};
//!
//! let data = GroupedDataset::from_groups([
//!     ("control", vec![4.1, 3.9, 4.4, 4.0, 4.2, 3.8]),
//!     ("treated", vec![4.9, 5.3, 4.7, 5.1, 5.0, 5.2]),
//! ])
//! .unwrap();
//!
//! let range = |xs: &[f64]| {
//!     let lo = xs.iter().copied().fold(f64::INFINITY, f64::min);
//!     let hi = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
//!     hi - lo
//! };
//!
//! let output = ResamplingTest::permutation()
//!     .seed(1)
//!     .run(&data, &Estimand::difference("treated", "control"), &range)
//!     .unwrap();
//! assert!(output.outcome.p_value().is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod config;
mod control;
mod engine;
mod error;
mod result;
mod state;
#[cfg(feature = "parallel")]
mod thread_pool;

// Functional modules
pub mod analysis;
pub mod dataset;
pub mod output;
pub mod preflight;
pub mod resampling;
pub mod statistics;

// Re-exports for public API
pub use analysis::{Contrast, ContrastKind, EmpiricalDistribution, Estimand, PValueMethod, Sidedness};
pub use config::{Config, FailurePolicy};
pub use control::StopSignal;
pub use dataset::{Dataset, Group, GroupedDataset, RowView, Table, Value};
pub use engine::ResamplingTest;
pub use error::{ConfigurationError, Error, InvalidInputError, Result, StatisticError};
pub use preflight::{Advisories, LowPowerWarning, LowReliabilityWarning};
pub use resampling::Mode;
pub use result::{
    ConfidenceInterval, InferenceOutcome, Metadata, PValueOutcome, RetainedResample, RetainedResamples,
    RunOutput,
};
pub use state::RunState;
pub use statistics::{Aggregate, Fallible, QuantileMethod, Statistic};

/// Percentile bootstrap interval of `statistic` over one sample.
///
/// Uses the default configuration apart from the confidence level and seed.
///
/// # Arguments
///
/// * `values` - The sample
/// * `statistic` - Reducer applied to each resample
/// * `confidence_level` - Level in (0, 1)
/// * `seed` - Base seed, or `None` to draw one
///
/// # Errors
///
/// See [`ResamplingTest::run`].
pub fn bootstrap_ci<S: Statistic + ?Sized>(
    values: &[f64],
    statistic: &S,
    confidence_level: f64,
    seed: Option<u64>,
) -> Result<ConfidenceInterval> {
    let data = GroupedDataset::single("sample", values.iter().copied())?;
    let mut test = ResamplingTest::bootstrap().confidence_level(confidence_level);
    if let Some(seed) = seed {
        test = test.seed(seed);
    }
    let output = test.run(&data, &Estimand::group("sample"), statistic)?;

    match output.outcome {
        InferenceOutcome::ConfidenceIntervals(mut intervals) if intervals.len() == 1 => Ok(intervals.remove(0)),
        _ => unreachable!("a single-group bootstrap yields exactly one interval"),
    }
}

/// Two-sample permutation test of `statistic(treatment) - statistic(control)`.
///
/// Uses the default configuration apart from sidedness and seed.
///
/// # Errors
///
/// See [`ResamplingTest::run`].
pub fn permutation_test<S: Statistic + ?Sized>(
    treatment: &[f64],
    control: &[f64],
    statistic: &S,
    sidedness: Sidedness,
    seed: Option<u64>,
) -> Result<PValueOutcome> {
    let data = GroupedDataset::from_groups([
        ("treatment", treatment.to_vec()),
        ("control", control.to_vec()),
    ])?;
    let mut test = ResamplingTest::permutation().sidedness(sidedness);
    if let Some(seed) = seed {
        test = test.seed(seed);
    }
    let output = test
        .run(&data, &Estimand::difference("treatment", "control"), statistic)?;

    match output.outcome {
        InferenceOutcome::PValues(mut p_values) if p_values.len() == 1 => Ok(p_values.remove(0)),
        _ => unreachable!("a two-group contrast yields exactly one p-value"),
    }
}
