//! Draws with replacement.

use rand::Rng;

/// Counter-based RNG seed generation using SplitMix64.
///
/// This is a stateless PRF that generates deterministic, well-distributed
/// seeds from a base seed and counter. Iteration `i` of a run always gets the
/// same seed no matter which worker executes it, which is what makes
/// parallel runs reproducible.
///
/// # Arguments
///
/// * `base_seed` - Base random seed of the run
/// * `counter` - Iteration counter (0, 1, 2, ...)
#[inline]
pub fn counter_rng_seed(base_seed: u64, counter: u64) -> u64 {
    // SplitMix64: https://xoshiro.di.unimi.it/splitmix64.c
    let mut z = base_seed.wrapping_add(counter.wrapping_mul(0x9e3779b97f4a7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Fill `out` with values drawn uniformly with replacement from `data`.
///
/// `out` may be shorter or longer than `data`; its length is the resample
/// size. Every draw is independent.
///
/// # Panics
///
/// Panics if `data` is empty and `out` is not.
pub fn resample_with_replacement_into<R: Rng + ?Sized>(data: &[f64], rng: &mut R, out: &mut [f64]) {
    if out.is_empty() {
        return;
    }
    assert!(!data.is_empty(), "Cannot resample from an empty slice");

    let n = data.len();
    if n == 1 {
        out.fill(data[0]);
        return;
    }

    for slot in out.iter_mut() {
        *slot = data[rng.random_range(0..n)];
    }
}

/// Draw `size` values uniformly with replacement from `data`.
pub fn resample_with_replacement<R: Rng + ?Sized>(data: &[f64], size: usize, rng: &mut R) -> Vec<f64> {
    let mut out = vec![0.0; size];
    resample_with_replacement_into(data, rng, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_counter_seeds_are_distinct_and_stable() {
        let a = counter_rng_seed(42, 0);
        let b = counter_rng_seed(42, 1);
        assert_ne!(a, b);
        assert_eq!(a, counter_rng_seed(42, 0));
        assert_ne!(counter_rng_seed(42, 1), counter_rng_seed(43, 1));
    }

    #[test]
    fn test_resample_preserves_length() {
        let data: Vec<f64> = (0..25).map(|x| x as f64).collect();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);

        let resampled = resample_with_replacement(&data, data.len(), &mut rng);
        assert_eq!(resampled.len(), data.len());
    }

    #[test]
    fn test_resample_draws_from_data() {
        let data: Vec<f64> = (0..25).map(|x| x as f64 * 0.5).collect();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);

        for val in resample_with_replacement(&data, 100, &mut rng) {
            assert!(data.contains(&val));
        }
    }

    #[test]
    fn test_resample_uses_replacement() {
        // 200 draws from 5 values must repeat at least one value
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let resampled = resample_with_replacement(&data, 200, &mut rng);
        for x in data {
            assert!(resampled.iter().filter(|&&v| v == x).count() > 1);
        }
    }

    #[test]
    fn test_singleton_source_repeats_its_value() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let resampled = resample_with_replacement(&[3.5], 6, &mut rng);
        assert_eq!(resampled, vec![3.5; 6]);
    }

    #[test]
    fn test_same_seed_same_draws() {
        let data = [1.0, 2.0, 3.0, 4.0];
        let a = resample_with_replacement(&data, 10, &mut Xoshiro256PlusPlus::seed_from_u64(9));
        let b = resample_with_replacement(&data, 10, &mut Xoshiro256PlusPlus::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
