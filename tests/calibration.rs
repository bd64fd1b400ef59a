//! Calibration tests to verify statistical properties.
//!
//! Data are drawn from a seeded generator so every trial is reproducible.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use resampled::{Aggregate, Estimand, GroupedDataset, ResamplingTest};

fn uniform_sample(rng: &mut Xoshiro256PlusPlus, n: usize) -> Vec<f64> {
    (0..n).map(|_| rng.random::<f64>()).collect()
}

/// Verify the permutation test false positive rate is bounded.
///
/// Run many trials where both groups come from the same distribution and
/// check rejection rate <= 2*alpha.
#[test]
fn permutation_fpr_calibration() {
    const TRIALS: usize = 200;
    const ALPHA: f64 = 0.05;

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(2024);
    let mut rejections = 0;
    let mut below_half = 0;

    for trial in 0..TRIALS {
        let data = GroupedDataset::from_groups([
            ("A", uniform_sample(&mut rng, 10)),
            ("B", uniform_sample(&mut rng, 10)),
        ])
        .unwrap();

        let p = ResamplingTest::permutation()
            .iterations(199)
            .seed(trial as u64)
            .run(&data, &Estimand::difference("B", "A"), &Aggregate::Mean)
            .unwrap()
            .outcome
            .p_value()
            .unwrap()
            .p_value;

        if p <= ALPHA {
            rejections += 1;
        }
        if p <= 0.5 {
            below_half += 1;
        }
    }

    let rejection_rate = rejections as f64 / TRIALS as f64;
    assert!(
        rejection_rate <= 2.0 * ALPHA,
        "FPR {} exceeds 2*alpha={}",
        rejection_rate,
        2.0 * ALPHA
    );

    // Null p-values are roughly uniform, so about half fall below 0.5
    let half_rate = below_half as f64 / TRIALS as f64;
    assert!((0.35..=0.65).contains(&half_rate), "P(p <= 0.5) = {}", half_rate);
}

/// Verify the permutation test detects a clear shift.
#[test]
fn permutation_power_on_shifted_groups() {
    const TRIALS: usize = 50;

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
    let mut detections = 0;

    for trial in 0..TRIALS {
        let a = uniform_sample(&mut rng, 12);
        let b: Vec<f64> = uniform_sample(&mut rng, 12).into_iter().map(|x| x + 0.6).collect();
        let data = GroupedDataset::from_groups([("A", a), ("B", b)]).unwrap();

        let output = ResamplingTest::permutation()
            .iterations(499)
            .seed(trial as u64)
            .run(&data, &Estimand::difference("B", "A"), &Aggregate::Mean)
            .unwrap();
        if output.outcome.p_value().unwrap().is_significant(0.05) {
            detections += 1;
        }
    }

    assert!(detections >= 45, "only {} of {} shifts detected", detections, TRIALS);
}

/// Verify percentile intervals for the mean cover the true mean at close to
/// the nominal rate.
#[test]
fn bootstrap_coverage_calibration() {
    const TRIALS: usize = 200;
    const TRUE_MEAN: f64 = 0.5;

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(99);
    let mut covered = 0;

    for trial in 0..TRIALS {
        let data = GroupedDataset::single("x", uniform_sample(&mut rng, 20)).unwrap();
        let output = ResamplingTest::bootstrap()
            .iterations(500)
            .seed(trial as u64)
            .confidence_level(0.95)
            .run(&data, &Estimand::group("x"), &Aggregate::Mean)
            .unwrap();

        if output.outcome.interval().unwrap().contains(TRUE_MEAN) {
            covered += 1;
        }
    }

    let coverage = covered as f64 / TRIALS as f64;
    assert!(coverage >= 0.85, "coverage {} well below nominal 0.95", coverage);
    assert!(coverage <= 0.995, "coverage {} suspiciously high", coverage);
}
