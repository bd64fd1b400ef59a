//! Run output types.

use serde::{Deserialize, Serialize};

use crate::analysis::{EmpiricalDistribution, Sidedness};
use crate::preflight::Advisories;
use crate::resampling::Mode;

/// Complete output of a resampling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    /// Intervals (bootstrap) or p-values (hypothesis modes).
    pub outcome: InferenceOutcome,

    /// Power and reliability advisories. Never block a result.
    pub advisories: Advisories,

    /// Bookkeeping needed to reproduce the run.
    pub metadata: Metadata,

    /// Per-quantity distributions, when retained.
    pub distributions: Option<Vec<EmpiricalDistribution>>,

    /// Every resample, when retained.
    pub resamples: Option<RetainedResamples>,
}

impl RunOutput {
    /// Distribution of the quantity named `quantity`, when retained.
    pub fn distribution(&self, quantity: &str) -> Option<&EmpiricalDistribution> {
        self.distributions
            .as_deref()?
            .iter()
            .find(|d| d.quantity() == quantity)
    }
}

/// Inference result of a run, one entry per tracked quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InferenceOutcome {
    /// Percentile confidence intervals from bootstrap mode.
    ConfidenceIntervals(Vec<ConfidenceInterval>),

    /// p-values from permutation or pooled bootstrap mode.
    PValues(Vec<PValueOutcome>),
}

impl InferenceOutcome {
    /// Intervals, or `None` for a hypothesis-mode run.
    pub fn intervals(&self) -> Option<&[ConfidenceInterval]> {
        match self {
            InferenceOutcome::ConfidenceIntervals(v) => Some(v),
            InferenceOutcome::PValues(_) => None,
        }
    }

    /// p-values, or `None` for a bootstrap run.
    pub fn p_values(&self) -> Option<&[PValueOutcome]> {
        match self {
            InferenceOutcome::PValues(v) => Some(v),
            InferenceOutcome::ConfidenceIntervals(_) => None,
        }
    }

    /// The single interval of a one-quantity bootstrap run.
    pub fn interval(&self) -> Option<&ConfidenceInterval> {
        self.intervals()?.first()
    }

    /// The single p-value of a one-quantity hypothesis run.
    pub fn p_value(&self) -> Option<&PValueOutcome> {
        self.p_values()?.first()
    }
}

/// Percentile bootstrap interval for one quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    /// Quantity name.
    pub quantity: String,
    /// Statistic on the original data.
    pub point_estimate: f64,
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
    /// Confidence level in (0, 1).
    pub confidence_level: f64,
    /// Standard deviation of the bootstrap distribution, `None` with fewer
    /// than two values.
    pub standard_error: Option<f64>,
}

impl ConfidenceInterval {
    /// Whether `value` lies within the bounds (inclusive).
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    /// Distance between the bounds.
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// p-value for one quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PValueOutcome {
    /// Quantity name.
    pub quantity: String,
    /// Statistic on the original data.
    pub observed: f64,
    /// Estimated p-value.
    pub p_value: f64,
    /// Direction of the alternative.
    pub sidedness: Sidedness,
    /// Number of resamples at least as extreme as `observed`.
    pub extreme_count: usize,
    /// Number of resamples in the null distribution.
    pub n_resamples: usize,
}

impl PValueOutcome {
    /// Whether the p-value is at most `alpha`.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value <= alpha
    }
}

/// Materialized resamples of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetainedResamples {
    /// Slot labels, in segment order.
    pub slot_labels: Vec<String>,
    /// Resamples in iteration order (skipped iterations omitted).
    pub iterations: Vec<RetainedResample>,
}

/// One resample kept for inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetainedResample {
    /// Iteration index.
    pub iteration: usize,
    /// Values per slot.
    pub segments: Vec<Vec<f64>>,
}

/// Metadata for reproducing and auditing a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Resampling mode.
    pub mode: Mode,
    /// Iterations requested.
    pub iterations_requested: usize,
    /// Iterations accumulated.
    pub iterations_completed: usize,
    /// Iterations dropped by the failure policy.
    pub skipped_iterations: usize,
    /// Base seed used (drawn when none was configured).
    pub seed: u64,
    /// Label and original size of every resampled group.
    pub group_sizes: Vec<(String, usize)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_helpers() {
        let ci = ConfidenceInterval {
            quantity: "A".into(),
            point_estimate: 11.0,
            lower: 10.0,
            upper: 12.5,
            confidence_level: 0.9,
            standard_error: Some(0.6),
        };
        assert!(ci.contains(11.0));
        assert!(ci.contains(12.5));
        assert!(!ci.contains(9.99));
        assert_eq!(ci.width(), 2.5);

        let outcome = InferenceOutcome::ConfidenceIntervals(vec![ci.clone()]);
        assert_eq!(outcome.interval(), Some(&ci));
        assert!(outcome.p_values().is_none());
    }

    #[test]
    fn test_significance() {
        let p = PValueOutcome {
            quantity: "B - A".into(),
            observed: 1.0,
            p_value: 0.03,
            sidedness: Sidedness::TwoSided,
            extreme_count: 29,
            n_resamples: 999,
        };
        assert!(p.is_significant(0.05));
        assert!(!p.is_significant(0.01));
    }
}
