//! Resample generation.
//!
//! A [`Resampler`] turns a grouped dataset into one synthetic realization
//! per iteration. Each iteration draws from its own generator, seeded from
//! the run's base seed and the iteration index, so the resample produced for
//! iteration `i` does not depend on the order in which iterations execute.

mod bootstrap;
mod permutation;

use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::dataset::GroupedDataset;
use crate::error::ConfigurationError;

pub use bootstrap::{counter_rng_seed, resample_with_replacement, resample_with_replacement_into};
pub use permutation::{distinct_arrangements, permute_into};

/// How resamples are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Draw each group (or the pooled data) with replacement at its own size.
    /// Yields confidence intervals.
    Bootstrap,
    /// Shuffle labels across the compared groups, preserving group sizes.
    /// Yields a p-value.
    Permutation,
    /// Fill every compared group, at its size, with draws with replacement
    /// from the pooled values of all compared groups. Yields a p-value.
    PooledBootstrap,
}

impl Mode {
    /// Whether this mode simulates a null hypothesis and yields a p-value.
    pub fn tests_hypothesis(&self) -> bool {
        matches!(self, Mode::Permutation | Mode::PooledBootstrap)
    }

    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Bootstrap => "bootstrap",
            Mode::Permutation => "permutation",
            Mode::PooledBootstrap => "pooled-bootstrap",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bootstrap" => Ok(Mode::Bootstrap),
            "permutation" => Ok(Mode::Permutation),
            "pooled-bootstrap" | "pooled_bootstrap" => Ok(Mode::PooledBootstrap),
            _ => Err(ConfigurationError::UnrecognizedMode(s.to_string())),
        }
    }
}

/// Where a slot of a resample draws its values from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotSource {
    /// One group, by index in the grouped view.
    Group(usize),
    /// All values of the grouped view.
    Pooled,
}

/// One segment of a resample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    /// Label of the group (or `"pooled"`).
    pub label: String,
    /// Source of the values.
    pub source: SlotSource,
    /// Number of values drawn per iteration.
    pub size: usize,
}

/// One synthetic realization of the data: one segment per slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resample {
    segments: Vec<Vec<f64>>,
}

impl Resample {
    /// Values of segment `slot`.
    pub fn segment(&self, slot: usize) -> &[f64] {
        &self.segments[slot]
    }

    /// All segments, in slot order.
    pub fn segments(&self) -> &[Vec<f64>] {
        &self.segments
    }

    /// Consume into the segment vectors.
    pub fn into_segments(self) -> Vec<Vec<f64>> {
        self.segments
    }
}

/// Reusable per-worker buffers for [`Resampler::draw`].
#[derive(Debug, Clone)]
pub struct Workspace {
    resample: Resample,
    scratch: Vec<f64>,
}

/// Generator of resamples for one run.
#[derive(Debug, Clone)]
pub struct Resampler {
    mode: Mode,
    slots: Vec<Slot>,
    /// Source values per slot (bootstrap) or the shared pool (other modes).
    sources: Vec<Vec<f64>>,
    pool: Vec<f64>,
}

impl Resampler {
    /// Build a resampler for `slots` over `data`.
    ///
    /// In [`Mode::Permutation`] and [`Mode::PooledBootstrap`] the pool is the
    /// concatenation of the slots' source groups and each slot's size must
    /// equal its group's size; callers build slots accordingly.
    pub fn new(mode: Mode, data: &GroupedDataset, slots: Vec<Slot>) -> Self {
        let sources: Vec<Vec<f64>> = slots
            .iter()
            .map(|slot| match slot.source {
                SlotSource::Group(i) => data.groups()[i].values().to_vec(),
                SlotSource::Pooled => data.pooled(),
            })
            .collect();

        let pool = match mode {
            Mode::Bootstrap => Vec::new(),
            Mode::Permutation | Mode::PooledBootstrap => sources.concat(),
        };

        Self {
            mode,
            slots,
            sources,
            pool,
        }
    }

    /// Resampling mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Slots, in segment order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// The original data arranged into slots (no resampling).
    pub fn original(&self) -> Resample {
        Resample {
            segments: self.sources.clone(),
        }
    }

    /// Fresh buffers sized for this resampler.
    pub fn workspace(&self) -> Workspace {
        Workspace {
            resample: Resample {
                segments: self.slots.iter().map(|s| vec![0.0; s.size]).collect(),
            },
            scratch: Vec::with_capacity(self.pool.len()),
        }
    }

    /// Draw one resample into `ws` and return it.
    pub fn draw<'w, R: Rng + ?Sized>(&self, rng: &mut R, ws: &'w mut Workspace) -> &'w Resample {
        let segments = &mut ws.resample.segments;

        match self.mode {
            Mode::Bootstrap => {
                for (source, out) in self.sources.iter().zip(segments.iter_mut()) {
                    resample_with_replacement_into(source, rng, out);
                }
            }
            Mode::PooledBootstrap => {
                for out in segments.iter_mut() {
                    resample_with_replacement_into(&self.pool, rng, out);
                }
            }
            Mode::Permutation => {
                permute_into(&self.pool, rng, &mut ws.scratch, segments);
            }
        }

        &ws.resample
    }

    /// Draw the resample for `iteration` of a run with `base_seed`.
    pub fn draw_iteration<'w>(&self, base_seed: u64, iteration: usize, ws: &'w mut Workspace) -> &'w Resample {
        let mut rng = iteration_rng(base_seed, iteration);
        self.draw(&mut rng, ws)
    }
}

/// Generator for one iteration of a run.
pub fn iteration_rng(base_seed: u64, iteration: usize) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(counter_rng_seed(base_seed, iteration as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_groups() -> GroupedDataset {
        GroupedDataset::from_groups([
            ("A", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            ("B", vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0]),
        ])
        .unwrap()
    }

    fn group_slots(data: &GroupedDataset) -> Vec<Slot> {
        data.groups()
            .iter()
            .enumerate()
            .map(|(i, g)| Slot {
                label: g.label().to_string(),
                source: SlotSource::Group(i),
                size: g.len(),
            })
            .collect()
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("bootstrap".parse::<Mode>(), Ok(Mode::Bootstrap));
        assert_eq!(" Permutation".parse::<Mode>(), Ok(Mode::Permutation));
        assert_eq!("pooled_bootstrap".parse::<Mode>(), Ok(Mode::PooledBootstrap));
        assert_eq!(
            "jackknife".parse::<Mode>(),
            Err(ConfigurationError::UnrecognizedMode("jackknife".into()))
        );
        assert_eq!(Mode::PooledBootstrap.to_string(), "pooled-bootstrap");
    }

    #[test]
    fn test_bootstrap_draws_within_each_group() {
        let data = two_groups();
        let resampler = Resampler::new(Mode::Bootstrap, &data, group_slots(&data));
        let mut ws = resampler.workspace();

        for i in 0..50 {
            let resample = resampler.draw_iteration(11, i, &mut ws);
            assert_eq!(resample.segment(0).len(), 5);
            assert_eq!(resample.segment(1).len(), 6);
            assert!(resample.segment(0).iter().all(|x| data.values("A").unwrap().contains(x)));
            assert!(resample.segment(1).iter().all(|x| data.values("B").unwrap().contains(x)));
        }
    }

    #[test]
    fn test_bootstrap_honors_size_override() {
        let data = two_groups();
        let mut slots = group_slots(&data);
        slots[0].size = 12;
        let resampler = Resampler::new(Mode::Bootstrap, &data, slots);
        let mut ws = resampler.workspace();

        let resample = resampler.draw_iteration(5, 0, &mut ws);
        assert_eq!(resample.segment(0).len(), 12);
        assert_eq!(resample.segment(1).len(), 6);
    }

    #[test]
    fn test_pooled_slot_draws_from_all_values() {
        let data = two_groups();
        let slots = vec![Slot {
            label: "pooled".into(),
            source: SlotSource::Pooled,
            size: data.row_count(),
        }];
        let resampler = Resampler::new(Mode::Bootstrap, &data, slots);
        assert_eq!(resampler.original().segment(0), data.pooled().as_slice());

        let mut ws = resampler.workspace();
        let resample = resampler.draw_iteration(1, 0, &mut ws);
        assert_eq!(resample.segment(0).len(), 11);
    }

    #[test]
    fn test_permutation_preserves_group_sizes() {
        let data = two_groups();
        let resampler = Resampler::new(Mode::Permutation, &data, group_slots(&data));
        let mut ws = resampler.workspace();

        for i in 0..100 {
            let resample = resampler.draw_iteration(42, i, &mut ws);
            assert_eq!(resample.segment(0).len(), 5);
            assert_eq!(resample.segment(1).len(), 6);
            let sum: f64 = resample.segments().iter().flatten().sum();
            assert_eq!(sum, 42.0);
        }
    }

    #[test]
    fn test_pooled_bootstrap_draws_from_pool() {
        let data = GroupedDataset::from_groups([("A", vec![1.0, 1.0, 1.0]), ("B", vec![9.0, 9.0, 9.0])]).unwrap();
        let resampler = Resampler::new(Mode::PooledBootstrap, &data, group_slots(&data));
        let mut ws = resampler.workspace();

        // With enough draws, group A must receive values that came from B
        let mut saw_cross = false;
        for i in 0..50 {
            let resample = resampler.draw_iteration(8, i, &mut ws);
            saw_cross |= resample.segment(0).contains(&9.0);
        }
        assert!(saw_cross);
    }

    #[test]
    fn test_iteration_draws_are_reproducible() {
        let data = two_groups();
        let resampler = Resampler::new(Mode::Permutation, &data, group_slots(&data));
        let mut ws1 = resampler.workspace();
        let mut ws2 = resampler.workspace();

        let a = resampler.draw_iteration(42, 17, &mut ws1).clone();
        // Draw some other iterations in between on the second workspace
        resampler.draw_iteration(42, 3, &mut ws2);
        let b = resampler.draw_iteration(42, 17, &mut ws2).clone();
        assert_eq!(a, b);
    }
}
