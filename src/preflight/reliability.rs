//! Low reliability checks.
//!
//! These flag distributions too small or too degenerate for their
//! quantiles to be trusted.

use serde::{Deserialize, Serialize};

use crate::resampling::{Mode, Slot, SlotSource};

/// Runs with fewer iterations than this produce unstable tail quantiles.
pub const MIN_RELIABLE_ITERATIONS: usize = 30;

/// Advisory that the empirical distribution may be unreliable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LowReliabilityWarning {
    /// Too few iterations for stable quantiles.
    FewIterations {
        /// Number of iterations requested.
        iterations: usize,
        /// Iteration count below which this warning is raised.
        minimum: usize,
    },

    /// A bootstrapped group has a single value, so every draw repeats it.
    SingletonGroup {
        /// Group label.
        label: String,
    },

    /// Iterations were dropped because the statistic failed.
    SkippedIterations {
        /// Number of dropped iterations.
        skipped: usize,
        /// Number of iterations requested.
        requested: usize,
    },
}

impl LowReliabilityWarning {
    /// Get a human-readable description of the warning.
    pub fn description(&self) -> String {
        match self {
            LowReliabilityWarning::FewIterations {
                iterations,
                minimum,
            } => {
                format!(
                    "Only {} iterations requested (fewer than {}). \
                     Interval bounds and p-values will vary between seeds.",
                    iterations, minimum
                )
            }
            LowReliabilityWarning::SingletonGroup { label } => {
                format!(
                    "Group '{}' has a single value. Its bootstrap distribution is degenerate.",
                    label
                )
            }
            LowReliabilityWarning::SkippedIterations { skipped, requested } => {
                format!(
                    "{} of {} iterations were skipped after statistic failures. \
                     The distribution is conditional on the statistic succeeding.",
                    skipped, requested
                )
            }
        }
    }
}

/// Warn when `iterations` is below [`MIN_RELIABLE_ITERATIONS`].
pub fn iteration_check(iterations: usize) -> Option<LowReliabilityWarning> {
    (iterations < MIN_RELIABLE_ITERATIONS).then_some(LowReliabilityWarning::FewIterations {
        iterations,
        minimum: MIN_RELIABLE_ITERATIONS,
    })
}

/// Warn for each group bootstrapped from a single value.
///
/// `source_sizes[i]` is the number of original values behind `slots[i]`.
pub fn singleton_check(mode: Mode, slots: &[Slot], source_sizes: &[usize]) -> Vec<LowReliabilityWarning> {
    if mode != Mode::Bootstrap {
        return Vec::new();
    }
    slots
        .iter()
        .zip(source_sizes)
        .filter(|(slot, n)| **n == 1 && matches!(slot.source, SlotSource::Group(_)))
        .map(|(slot, _)| LowReliabilityWarning::SingletonGroup {
            label: slot.label.clone(),
        })
        .collect()
}

/// Warn when any iteration was skipped.
pub fn skipped_check(skipped: usize, requested: usize) -> Option<LowReliabilityWarning> {
    (skipped > 0).then_some(LowReliabilityWarning::SkippedIterations { skipped, requested })
}
