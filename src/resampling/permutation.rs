//! Label-shuffling permutations.

use rand::seq::SliceRandom;
use rand::Rng;

/// Shuffle `pooled` into `scratch` and split it into consecutive segments.
///
/// Segment `i` receives `segments[i].len()` values. The segment lengths must
/// sum to `pooled.len()`, so every original value lands in exactly one
/// segment and per-group cardinality is preserved.
///
/// # Panics
///
/// Panics if the segment lengths do not sum to `pooled.len()`.
pub fn permute_into<R: Rng + ?Sized>(
    pooled: &[f64],
    rng: &mut R,
    scratch: &mut Vec<f64>,
    segments: &mut [Vec<f64>],
) {
    let total: usize = segments.iter().map(Vec::len).sum();
    assert_eq!(
        total,
        pooled.len(),
        "Segment lengths must cover the pooled values exactly"
    );

    scratch.clear();
    scratch.extend_from_slice(pooled);
    scratch.shuffle(rng);

    let mut offset = 0;
    for segment in segments.iter_mut() {
        let len = segment.len();
        segment.copy_from_slice(&scratch[offset..offset + len]);
        offset += len;
    }
}

/// Number of distinct ways to assign `sizes` slots from the pooled values,
/// ignoring order within a slot (the multinomial coefficient).
///
/// Saturates at `u128::MAX`.
pub fn distinct_arrangements(sizes: &[usize]) -> u128 {
    let mut total: u128 = 1;
    let mut n: u128 = 0;

    for &k in sizes {
        // Multiply by C(n + k, k) one factor at a time to stay exact
        for i in 1..=k as u128 {
            n += 1;
            total = match total.checked_mul(n) {
                Some(t) => t / i,
                None => return u128::MAX,
            };
        }
    }
    total
}
