//! Per-quantity empirical distributions.

use serde::{Deserialize, Serialize};

use crate::statistics::sorted_copy;

/// Statistic values of one quantity across iterations, in iteration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmpiricalDistribution {
    quantity: String,
    values: Vec<f64>,
}

impl EmpiricalDistribution {
    /// Empty distribution for `quantity`.
    pub fn new(quantity: impl Into<String>) -> Self {
        Self {
            quantity: quantity.into(),
            values: Vec::new(),
        }
    }

    /// Name of the tracked quantity.
    pub fn quantity(&self) -> &str {
        &self.quantity
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no value was accumulated.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values in iteration order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Ascending copy of the values.
    pub fn sorted(&self) -> Vec<f64> {
        sorted_copy(&self.values)
    }

    /// Arithmetic mean, `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }

    /// Sample standard deviation (n − 1), `None` with fewer than two values.
    pub fn std_dev(&self) -> Option<f64> {
        let n = self.values.len();
        if n < 2 {
            return None;
        }
        let mean = self.mean()?;
        let ss: f64 = self.values.iter().map(|x| (x - mean).powi(2)).sum();
        Some((ss / (n - 1) as f64).sqrt())
    }

    /// Consume into the raw values.
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

/// Collects evaluator output into one distribution per quantity.
#[derive(Debug, Clone)]
pub struct DistributionAccumulator {
    distributions: Vec<EmpiricalDistribution>,
    skipped: usize,
}

impl DistributionAccumulator {
    /// Accumulator for the given quantity names.
    pub fn new<I, S>(quantities: I, capacity: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let distributions = quantities
            .into_iter()
            .map(|q| EmpiricalDistribution {
                quantity: q.into(),
                values: Vec::with_capacity(capacity),
            })
            .collect();
        Self {
            distributions,
            skipped: 0,
        }
    }

    /// Append one iteration's results.
    ///
    /// # Panics
    ///
    /// Panics if `results` does not hold one value per quantity.
    pub fn push(&mut self, results: &[f64]) {
        assert_eq!(
            results.len(),
            self.distributions.len(),
            "Expected one result per quantity"
        );
        for (dist, &value) in self.distributions.iter_mut().zip(results) {
            dist.values.push(value);
        }
    }

    /// Record an iteration dropped by the failure policy.
    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    /// Number of iterations accumulated.
    pub fn accumulated(&self) -> usize {
        self.distributions.first().map_or(0, EmpiricalDistribution::len)
    }

    /// Number of iterations skipped.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Distributions accumulated so far.
    pub fn distributions(&self) -> &[EmpiricalDistribution] {
        &self.distributions
    }

    /// Finish accumulation.
    pub fn finish(self) -> Vec<EmpiricalDistribution> {
        self.distributions
    }
}
