//! Statistics: reducers from a sequence of numbers to a single number.
//!
//! Any closure `Fn(&[f64]) -> f64` is a [`Statistic`]. Built-in aggregates
//! are provided by [`Aggregate`], and reducers that can fail are wrapped in
//! [`Fallible`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::quantile::compute_quantile;
use crate::error::{ConfigurationError, StatisticError};

/// A reducer applied to each resample.
///
/// Implementations must be deterministic: the same input must give the same
/// output, otherwise seeded runs are not reproducible.
pub trait Statistic: Send + Sync {
    /// Reduce `values` to a single number.
    fn evaluate(&self, values: &[f64]) -> Result<f64, StatisticError>;

    /// Human-readable name used in quantity labels.
    fn name(&self) -> String {
        "statistic".to_string()
    }
}

impl<F> Statistic for F
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn evaluate(&self, values: &[f64]) -> Result<f64, StatisticError> {
        let x = self(values);
        if x.is_nan() {
            return Err(StatisticError::NotANumber {
                statistic: self.name(),
            });
        }
        Ok(x)
    }
}

/// Adapter for reducers that report their own failures.
///
/// ```
/// use resampled::{Fallible, Statistic, StatisticError};
///
/// let trimmed_min = Fallible::new("second smallest", |xs: &[f64]| {
///     let mut v = xs.to_vec();
///     v.sort_by(|a, b| a.total_cmp(b));
///     v.get(1).copied().ok_or_else(|| StatisticError::custom("need two values"))
/// });
/// assert_eq!(trimmed_min.evaluate(&[3.0, 1.0, 2.0]), Ok(2.0));
/// assert!(trimmed_min.evaluate(&[3.0]).is_err());
/// ```
pub struct Fallible<F> {
    name: String,
    reducer: F,
}

impl<F> Fallible<F>
where
    F: Fn(&[f64]) -> Result<f64, StatisticError> + Send + Sync,
{
    /// Wrap a fallible reducer under a display name.
    pub fn new(name: impl Into<String>, reducer: F) -> Self {
        Self {
            name: name.into(),
            reducer,
        }
    }
}

impl<F> Statistic for Fallible<F>
where
    F: Fn(&[f64]) -> Result<f64, StatisticError> + Send + Sync,
{
    fn evaluate(&self, values: &[f64]) -> Result<f64, StatisticError> {
        let x = (self.reducer)(values)?;
        if x.is_nan() {
            return Err(StatisticError::NotANumber {
                statistic: self.name.clone(),
            });
        }
        Ok(x)
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

/// Built-in aggregates.
///
/// Parsable from names: `mean`, `median`, `sum`, `min`, `max`, `var`,
/// `std`, and `percentile(q)` with `q` in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Aggregate {
    /// Arithmetic mean.
    Mean,
    /// 50th percentile with linear interpolation.
    Median,
    /// Percentile `q` in [0, 100] with linear interpolation.
    Percentile(f64),
    /// Sum of values.
    Sum,
    /// Smallest value.
    Min,
    /// Largest value.
    Max,
    /// Sample variance (n − 1 denominator).
    Variance,
    /// Sample standard deviation (n − 1 denominator).
    StdDev,
}

impl Aggregate {
    /// Percentile aggregate, validating `q`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::PercentileOutOfRange`] if `q` is not
    /// within [0, 100].
    pub fn percentile(q: f64) -> Result<Self, ConfigurationError> {
        if !(0.0..=100.0).contains(&q) {
            return Err(ConfigurationError::PercentileOutOfRange(q));
        }
        Ok(Aggregate::Percentile(q))
    }

    fn min_len(&self) -> usize {
        match self {
            Aggregate::Sum => 0,
            Aggregate::Variance | Aggregate::StdDev => 2,
            _ => 1,
        }
    }
}

impl Statistic for Aggregate {
    fn evaluate(&self, values: &[f64]) -> Result<f64, StatisticError> {
        let required = self.min_len();
        if values.len() < required {
            return Err(StatisticError::InsufficientData {
                statistic: self.name(),
                required,
                found: values.len(),
            });
        }

        let value = match *self {
            Aggregate::Mean => mean(values),
            Aggregate::Median => compute_quantile(&mut values.to_vec(), 0.5),
            Aggregate::Percentile(q) => {
                if !(0.0..=100.0).contains(&q) {
                    return Err(StatisticError::custom(format!(
                        "percentile {} is outside [0, 100]",
                        q
                    )));
                }
                compute_quantile(&mut values.to_vec(), q / 100.0)
            }
            Aggregate::Sum => values.iter().sum(),
            Aggregate::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Aggregate::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Aggregate::Variance => sample_variance(values),
            Aggregate::StdDev => sample_variance(values).sqrt(),
        };

        if value.is_nan() {
            return Err(StatisticError::NotANumber {
                statistic: self.name(),
            });
        }
        Ok(value)
    }

    fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregate::Mean => f.write_str("mean"),
            Aggregate::Median => f.write_str("median"),
            Aggregate::Percentile(q) => write!(f, "percentile({})", q),
            Aggregate::Sum => f.write_str("sum"),
            Aggregate::Min => f.write_str("min"),
            Aggregate::Max => f.write_str("max"),
            Aggregate::Variance => f.write_str("var"),
            Aggregate::StdDev => f.write_str("std"),
        }
    }
}

impl FromStr for Aggregate {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        match name.as_str() {
            "mean" | "average" => return Ok(Aggregate::Mean),
            "median" => return Ok(Aggregate::Median),
            "sum" => return Ok(Aggregate::Sum),
            "min" => return Ok(Aggregate::Min),
            "max" => return Ok(Aggregate::Max),
            "var" | "variance" => return Ok(Aggregate::Variance),
            "std" | "stddev" | "std_dev" => return Ok(Aggregate::StdDev),
            _ => {}
        }

        let q = name
            .strip_prefix("percentile(")
            .and_then(|rest| rest.strip_suffix(')'))
            .and_then(|q| q.trim().parse::<f64>().ok())
            .ok_or_else(|| ConfigurationError::UnrecognizedAggregate(s.to_string()))?;
        Aggregate::percentile(q)
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_variance(values: &[f64]) -> f64 {
    let m = mean(values);
    let ss: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    ss / (values.len() - 1) as f64
}
