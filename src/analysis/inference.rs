//! Confidence intervals and p-values from empirical distributions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::statistics::{quantile_sorted, QuantileMethod};

/// Relative tolerance under which a resampled value ties the observed one.
pub const TIE_TOLERANCE: f64 = 1e-14;

/// Direction of the alternative hypothesis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sidedness {
    /// Extreme means `|r| >= |observed|`.
    #[default]
    TwoSided,
    /// Extreme means `r >= observed`.
    Greater,
    /// Extreme means `r <= observed`.
    Less,
}

impl Sidedness {
    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sidedness::TwoSided => "two-sided",
            Sidedness::Greater => "greater",
            Sidedness::Less => "less",
        }
    }
}

impl fmt::Display for Sidedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sidedness {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "two-sided" | "two_sided" | "two sided" => Ok(Sidedness::TwoSided),
            "greater" => Ok(Sidedness::Greater),
            "less" => Ok(Sidedness::Less),
            _ => Err(ConfigurationError::UnrecognizedSidedness(s.to_string())),
        }
    }
}

/// Estimator of the p-value from the extreme count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PValueMethod {
    /// `(1 + count) / (1 + n)`; never zero.
    #[default]
    AddOne,
    /// `count / n`; zero when no resample is as extreme.
    Raw,
}

/// Percentile interval at `confidence_level` on an ascending distribution.
///
/// Returns the quantiles at `(1 - c) / 2` and `1 - (1 - c) / 2`.
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn percentile_interval(sorted: &[f64], confidence_level: f64, method: QuantileMethod) -> (f64, f64) {
    let alpha = 1.0 - confidence_level;
    let lower = quantile_sorted(sorted, alpha / 2.0, method);
    let upper = quantile_sorted(sorted, 1.0 - alpha / 2.0, method);
    (lower, upper)
}

/// Number of resampled values at least as extreme as `observed`.
///
/// Ties are inclusive, within a relative tolerance of [`TIE_TOLERANCE`].
pub fn count_extreme(values: &[f64], observed: f64, sidedness: Sidedness) -> usize {
    let tol = TIE_TOLERANCE * observed.abs();
    match sidedness {
        Sidedness::TwoSided => {
            let threshold = observed.abs() - tol;
            values.iter().filter(|r| r.abs() >= threshold).count()
        }
        Sidedness::Greater => values.iter().filter(|&&r| r >= observed - tol).count(),
        Sidedness::Less => values.iter().filter(|&&r| r <= observed + tol).count(),
    }
}

/// p-value of `observed` against the null distribution `values`.
///
/// Returns `(p_value, extreme_count)`. With no values, the raw estimate is
/// defined as 1.
pub fn p_value(values: &[f64], observed: f64, sidedness: Sidedness, method: PValueMethod) -> (f64, usize) {
    let count = count_extreme(values, observed, sidedness);
    let n = values.len();
    let p = match method {
        PValueMethod::AddOne => (1 + count) as f64 / (1 + n) as f64,
        PValueMethod::Raw if n == 0 => 1.0,
        PValueMethod::Raw => count as f64 / n as f64,
    };
    (p, count)
}
