//! Quantile computation on sorted and unsorted samples.
//!
//! The default method is linear interpolation between the two nearest order
//! statistics (the "R-7" definition, also numpy's default). The other
//! methods mirror numpy's discrete alternatives.

use serde::{Deserialize, Serialize};

/// Rule for picking a quantile that falls between two order statistics.
///
/// With `h = (n - 1) * p`, `lo = floor(h)` and `hi = ceil(h)`:
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantileMethod {
    /// `x[lo] + (h - lo) * (x[hi] - x[lo])`.
    #[default]
    Linear,
    /// `x[lo]`.
    Lower,
    /// `x[hi]`.
    Higher,
    /// Order statistic nearest to `h`, ties to the even index.
    Nearest,
    /// `(x[lo] + x[hi]) / 2`.
    Midpoint,
}

/// Compute the quantile at probability `p` from sorted data.
///
/// # Arguments
///
/// * `sorted` - Slice that MUST be sorted in ascending order
/// * `p` - Probability in [0, 1]; values outside are clamped
/// * `method` - Interpolation rule between order statistics
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn quantile_sorted(sorted: &[f64], p: f64, method: QuantileMethod) -> f64 {
    assert!(!sorted.is_empty(), "Cannot compute quantile of empty slice");

    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let p = p.clamp(0.0, 1.0);
    let h = (n - 1) as f64 * p;
    let lo = (h.floor() as usize).min(n - 1);
    let hi = (h.ceil() as usize).min(n - 1);
    let frac = h - h.floor();

    match method {
        QuantileMethod::Linear => {
            if frac == 0.0 || lo == hi {
                sorted[lo]
            } else {
                sorted[lo] + frac * (sorted[hi] - sorted[lo])
            }
        }
        QuantileMethod::Lower => sorted[lo],
        QuantileMethod::Higher => sorted[hi],
        QuantileMethod::Nearest => {
            let idx = (h.round_ties_even() as usize).min(n - 1);
            sorted[idx]
        }
        QuantileMethod::Midpoint => 0.5 * (sorted[lo] + sorted[hi]),
    }
}

/// Compute a single linear-interpolated quantile from a mutable slice.
///
/// Uses `select_nth_unstable()` for O(n) expected time. The slice is
/// partially reordered as a side effect.
///
/// # Panics
///
/// Panics if `data` is empty or if `p` is outside [0, 1].
pub fn compute_quantile(data: &mut [f64], p: f64) -> f64 {
    assert!(!data.is_empty(), "Cannot compute quantile of empty slice");
    assert!(
        (0.0..=1.0).contains(&p),
        "Quantile probability must be in [0, 1]"
    );

    let n = data.len();
    if n == 1 {
        return data[0];
    }

    let h = (n - 1) as f64 * p;
    let h_floor = h.floor() as usize;
    let h_frac = h - h.floor();

    if h_floor >= n - 1 {
        let (_, &mut max, _) = data.select_nth_unstable_by(n - 1, |a, b| a.total_cmp(b));
        return max;
    }

    let (_, &mut lower, upper) = data.select_nth_unstable_by(h_floor, |a, b| a.total_cmp(b));

    if h_frac == 0.0 {
        return lower;
    }

    // Smallest element of the upper partition is the next order statistic
    let upper_min = upper
        .iter()
        .copied()
        .min_by(|a, b| a.total_cmp(b))
        .unwrap_or(lower);

    lower + h_frac * (upper_min - lower)
}

/// Sorted copy of `data` (ascending, NaN-safe total order).
pub fn sorted_copy(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));
    sorted
}
