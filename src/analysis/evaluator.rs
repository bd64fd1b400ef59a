//! Statistic evaluation.
//!
//! An [`Estimand`] names the quantities a run tracks. Resolving it against a
//! grouped dataset and a mode gives an [`EvaluationPlan`]: the resample slots
//! the resampler must fill and an [`Evaluator`] that reduces each resample to
//! one value per quantity.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dataset::GroupedDataset;
use crate::error::{ConfigurationError, InvalidInputError, Result, StatisticError};
use crate::resampling::{Mode, Resample, Slot, SlotSource};
use crate::statistics::Statistic;

/// Label of the slot holding all values together.
pub const POOLED_LABEL: &str = "pooled";

/// What the statistic is computed on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Estimand {
    /// The statistic of one group.
    Group(String),
    /// The statistic of every group in the view, one quantity per group.
    EachGroup,
    /// The statistic of all values together, ignoring labels.
    Pooled,
    /// A comparison of the statistic between two groups.
    Contrast(Contrast),
}

impl Estimand {
    /// Statistic of the group labelled `label`.
    pub fn group(label: impl Into<String>) -> Self {
        Estimand::Group(label.into())
    }

    /// `statistic(minuend) - statistic(subtrahend)`.
    pub fn difference(minuend: impl Into<String>, subtrahend: impl Into<String>) -> Self {
        Estimand::Contrast(Contrast::difference(minuend, subtrahend))
    }

    /// `statistic(numerator) / statistic(denominator)`.
    pub fn ratio(numerator: impl Into<String>, denominator: impl Into<String>) -> Self {
        Estimand::Contrast(Contrast::ratio(numerator, denominator))
    }

    /// Resolve against `data` for a run in `mode`.
    ///
    /// Bootstrap mode draws only the groups the estimand reads, at their own
    /// size or the size given in `resample_sizes`. The hypothesis modes pool
    /// the compared groups (both sides of a contrast, or every group in the
    /// view) and keep the original group sizes.
    ///
    /// # Errors
    ///
    /// - [`InvalidInputError::UnknownGroup`] for labels absent from `data`
    /// - [`ConfigurationError::SelfContrast`] for a contrast of a group with itself
    /// - [`ConfigurationError::UnsupportedEstimand`] for [`Estimand::Pooled`]
    ///   in a hypothesis mode, where relabelling leaves it unchanged
    /// - [`ConfigurationError::UnusedResampleSize`] for an override naming a
    ///   group that is not drawn with replacement at its own size
    pub fn plan(
        &self,
        data: &GroupedDataset,
        mode: Mode,
        resample_sizes: &BTreeMap<String, usize>,
    ) -> Result<EvaluationPlan> {
        let lookup = |label: &str| {
            data.index_of(label).ok_or_else(|| InvalidInputError::UnknownGroup {
                label: label.to_string(),
            })
        };

        // Group indices to draw, then the quantities over slot positions
        let (sources, quantities): (Vec<SlotSource>, Vec<Quantity>) = match self {
            Estimand::Group(label) => {
                let index = lookup(label)?;
                if mode.tests_hypothesis() {
                    let sources = all_groups(data);
                    (sources, vec![Quantity::Slot(index)])
                } else {
                    (vec![SlotSource::Group(index)], vec![Quantity::Slot(0)])
                }
            }
            Estimand::EachGroup => {
                let quantities = (0..data.group_count()).map(Quantity::Slot).collect();
                (all_groups(data), quantities)
            }
            Estimand::Pooled => {
                if mode.tests_hypothesis() {
                    return Err(ConfigurationError::UnsupportedEstimand {
                        mode: mode.to_string(),
                        estimand: self.to_string(),
                    }
                    .into());
                }
                (vec![SlotSource::Pooled], vec![Quantity::Slot(0)])
            }
            Estimand::Contrast(contrast) => {
                if contrast.minuend == contrast.subtrahend {
                    return Err(ConfigurationError::SelfContrast(contrast.minuend.clone()).into());
                }
                let minuend = lookup(&contrast.minuend)?;
                let subtrahend = lookup(&contrast.subtrahend)?;
                (
                    vec![SlotSource::Group(minuend), SlotSource::Group(subtrahend)],
                    vec![Quantity::Contrast {
                        minuend: 0,
                        subtrahend: 1,
                        kind: contrast.kind,
                    }],
                )
            }
        };

        let slots: Vec<Slot> = sources
            .into_iter()
            .map(|source| match source {
                SlotSource::Group(i) => {
                    let group = &data.groups()[i];
                    let size = match mode {
                        Mode::Bootstrap => resample_sizes.get(group.label()).copied(),
                        Mode::Permutation | Mode::PooledBootstrap => None,
                    };
                    Slot {
                        label: group.label().to_string(),
                        source,
                        size: size.unwrap_or(group.len()),
                    }
                }
                SlotSource::Pooled => Slot {
                    label: POOLED_LABEL.to_string(),
                    source,
                    size: data.row_count(),
                },
            })
            .collect();

        for label in resample_sizes.keys() {
            let drawn = mode == Mode::Bootstrap
                && slots
                    .iter()
                    .any(|s| matches!(s.source, SlotSource::Group(_)) && &s.label == label);
            if !drawn {
                return Err(ConfigurationError::UnusedResampleSize {
                    label: label.clone(),
                }
                .into());
            }
        }

        let names = quantities.iter().map(|q| q.name(&slots)).collect();
        Ok(EvaluationPlan {
            slots,
            evaluator: Evaluator { names, quantities },
        })
    }
}

fn all_groups(data: &GroupedDataset) -> Vec<SlotSource> {
    (0..data.group_count()).map(SlotSource::Group).collect()
}

impl fmt::Display for Estimand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Estimand::Group(label) => write!(f, "group {}", label),
            Estimand::EachGroup => f.write_str("each group"),
            Estimand::Pooled => f.write_str("pooled"),
            Estimand::Contrast(c) => write!(f, "contrast {}", c),
        }
    }
}

/// How two group statistics are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContrastKind {
    /// `minuend - subtrahend`.
    Difference,
    /// `minuend / subtrahend`.
    Ratio,
}

impl ContrastKind {
    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContrastKind::Difference => "difference",
            ContrastKind::Ratio => "ratio",
        }
    }
}

/// A between-group comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contrast {
    /// Left-hand group.
    pub minuend: String,
    /// Right-hand group.
    pub subtrahend: String,
    /// Combination.
    pub kind: ContrastKind,
}

impl Contrast {
    /// `statistic(minuend) - statistic(subtrahend)`.
    pub fn difference(minuend: impl Into<String>, subtrahend: impl Into<String>) -> Self {
        Self {
            minuend: minuend.into(),
            subtrahend: subtrahend.into(),
            kind: ContrastKind::Difference,
        }
    }

    /// `statistic(numerator) / statistic(denominator)`.
    pub fn ratio(numerator: impl Into<String>, denominator: impl Into<String>) -> Self {
        Self {
            minuend: numerator.into(),
            subtrahend: denominator.into(),
            kind: ContrastKind::Ratio,
        }
    }

    fn combine(kind: ContrastKind, a: f64, b: f64) -> std::result::Result<f64, StatisticError> {
        let value = match kind {
            ContrastKind::Difference => a - b,
            ContrastKind::Ratio if b == 0.0 => return Err(StatisticError::ZeroDenominator),
            ContrastKind::Ratio => a / b,
        };
        // inf - inf and inf / inf
        if value.is_nan() {
            return Err(StatisticError::NotANumber {
                statistic: kind.as_str().to_string(),
            });
        }
        Ok(value)
    }
}

impl fmt::Display for Contrast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.kind {
            ContrastKind::Difference => '-',
            ContrastKind::Ratio => '/',
        };
        write!(f, "{} {} {}", self.minuend, op, self.subtrahend)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Quantity {
    Slot(usize),
    Contrast {
        minuend: usize,
        subtrahend: usize,
        kind: ContrastKind,
    },
}

impl Quantity {
    fn name(&self, slots: &[Slot]) -> String {
        match *self {
            Quantity::Slot(i) => slots[i].label.clone(),
            Quantity::Contrast {
                minuend,
                subtrahend,
                kind,
            } => Contrast {
                minuend: slots[minuend].label.clone(),
                subtrahend: slots[subtrahend].label.clone(),
                kind,
            }
            .to_string(),
        }
    }
}

/// Slots to draw and the evaluator that reads them.
#[derive(Debug, Clone)]
pub struct EvaluationPlan {
    /// Resample slots, in segment order.
    pub slots: Vec<Slot>,
    /// Reducer over those slots.
    pub evaluator: Evaluator,
}

/// Reduces a resample to one value per tracked quantity.
#[derive(Debug, Clone)]
pub struct Evaluator {
    names: Vec<String>,
    quantities: Vec<Quantity>,
}

impl Evaluator {
    /// Quantity names, in output order.
    pub fn quantity_names(&self) -> &[String] {
        &self.names
    }

    /// Number of tracked quantities.
    pub fn quantity_count(&self) -> usize {
        self.quantities.len()
    }

    /// Apply `statistic` to `resample`.
    ///
    /// Each slot is reduced at most once even if several quantities read it.
    pub fn evaluate<S: Statistic + ?Sized>(
        &self,
        statistic: &S,
        resample: &Resample,
    ) -> std::result::Result<Vec<f64>, StatisticError> {
        let mut cache: Vec<Option<f64>> = vec![None; resample.segments().len()];
        let mut reduce = |slot: usize| -> std::result::Result<f64, StatisticError> {
            if let Some(v) = cache[slot] {
                return Ok(v);
            }
            let v = statistic.evaluate(resample.segment(slot))?;
            cache[slot] = Some(v);
            Ok(v)
        };

        self.quantities
            .iter()
            .map(|q| match *q {
                Quantity::Slot(i) => reduce(i),
                Quantity::Contrast {
                    minuend,
                    subtrahend,
                    kind,
                } => {
                    let a = reduce(minuend)?;
                    let b = reduce(subtrahend)?;
                    Contrast::combine(kind, a, b)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resampling::Resampler;
    use crate::statistics::Aggregate;
    use crate::Error;

    fn data() -> GroupedDataset {
        GroupedDataset::from_groups([
            ("A", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            ("B", vec![2.0, 3.0, 4.0, 5.0, 6.0]),
            ("C", vec![0.0, 0.0, 0.0]),
        ])
        .unwrap()
    }

    fn observed(plan: &EvaluationPlan, mode: Mode, data: &GroupedDataset) -> Vec<f64> {
        let resampler = Resampler::new(mode, data, plan.slots.clone());
        plan.evaluator
            .evaluate(&Aggregate::Mean, &resampler.original())
            .unwrap()
    }

    #[test]
    fn test_difference_of_means() {
        let data = data();
        let plan = Estimand::difference("B", "A")
            .plan(&data, Mode::Permutation, &BTreeMap::new())
            .unwrap();

        assert_eq!(plan.evaluator.quantity_names(), ["B - A"]);
        assert_eq!(plan.slots.len(), 2);
        assert_eq!(observed(&plan, Mode::Permutation, &data), vec![1.0]);
    }

    #[test]
    fn test_each_group_and_pooled() {
        let data = data();
        let plan = Estimand::EachGroup
            .plan(&data, Mode::Bootstrap, &BTreeMap::new())
            .unwrap();
        assert_eq!(plan.evaluator.quantity_names(), ["A", "B", "C"]);
        assert_eq!(observed(&plan, Mode::Bootstrap, &data), vec![3.0, 4.0, 0.0]);

        let plan = Estimand::Pooled
            .plan(&data, Mode::Bootstrap, &BTreeMap::new())
            .unwrap();
        assert_eq!(plan.evaluator.quantity_names(), [POOLED_LABEL]);
        assert_eq!(plan.slots[0].size, 13);
        assert_eq!(observed(&plan, Mode::Bootstrap, &data), vec![35.0 / 13.0]);
    }

    #[test]
    fn test_single_group_bootstrap_draws_only_that_group() {
        let data = data();
        let plan = Estimand::group("B")
            .plan(&data, Mode::Bootstrap, &BTreeMap::new())
            .unwrap();
        assert_eq!(plan.slots.len(), 1);
        assert_eq!(plan.slots[0].label, "B");

        // Hypothesis modes pool every group and read one of them
        let plan = Estimand::group("B")
            .plan(&data, Mode::Permutation, &BTreeMap::new())
            .unwrap();
        assert_eq!(plan.slots.len(), 3);
        assert_eq!(observed(&plan, Mode::Permutation, &data), vec![4.0]);
    }

    #[test]
    fn test_ratio_with_zero_denominator_fails() {
        let data = data();
        let plan = Estimand::ratio("A", "C")
            .plan(&data, Mode::Bootstrap, &BTreeMap::new())
            .unwrap();
        let resampler = Resampler::new(Mode::Bootstrap, &data, plan.slots.clone());
        assert_eq!(
            plan.evaluator.evaluate(&Aggregate::Mean, &resampler.original()),
            Err(StatisticError::ZeroDenominator)
        );
        assert_eq!(plan.evaluator.quantity_names(), ["A / C"]);
    }

    #[test]
    fn test_nan_contrast_fails() {
        let data = GroupedDataset::from_groups([
            ("A", vec![1e308, 1e308]),
            ("B", vec![1e308, 1e308]),
        ])
        .unwrap();
        let evaluate_original = |estimand: Estimand| {
            let plan = estimand.plan(&data, Mode::Bootstrap, &BTreeMap::new()).unwrap();
            let resampler = Resampler::new(Mode::Bootstrap, &data, plan.slots.clone());
            plan.evaluator.evaluate(&Aggregate::Sum, &resampler.original())
        };

        // Both sums overflow to infinity
        assert_eq!(
            evaluate_original(Estimand::difference("B", "A")),
            Err(StatisticError::NotANumber {
                statistic: "difference".into()
            })
        );
        assert_eq!(
            evaluate_original(Estimand::ratio("B", "A")),
            Err(StatisticError::NotANumber {
                statistic: "ratio".into()
            })
        );
    }

    #[test]
    fn test_resolution_errors() {
        let data = data();
        let none = BTreeMap::new();

        assert_eq!(
            Estimand::difference("A", "Z").plan(&data, Mode::Bootstrap, &none).unwrap_err(),
            Error::InvalidInput(InvalidInputError::UnknownGroup { label: "Z".into() })
        );
        assert_eq!(
            Estimand::difference("A", "A").plan(&data, Mode::Bootstrap, &none).unwrap_err(),
            Error::Configuration(ConfigurationError::SelfContrast("A".into()))
        );
        assert!(matches!(
            Estimand::Pooled.plan(&data, Mode::Permutation, &none),
            Err(Error::Configuration(ConfigurationError::UnsupportedEstimand { .. }))
        ));
    }

    #[test]
    fn test_resample_size_overrides() {
        let data = data();
        let sizes: BTreeMap<String, usize> = [("A".to_string(), 50)].into_iter().collect();

        let plan = Estimand::difference("B", "A")
            .plan(&data, Mode::Bootstrap, &sizes)
            .unwrap();
        assert_eq!(plan.slots[1].size, 50);
        assert_eq!(plan.slots[0].size, 5);

        // Not drawn by this estimand
        assert_eq!(
            Estimand::group("B").plan(&data, Mode::Bootstrap, &sizes).unwrap_err(),
            Error::Configuration(ConfigurationError::UnusedResampleSize { label: "A".into() })
        );
        // Hypothesis modes keep group sizes
        assert!(Estimand::difference("B", "A")
            .plan(&data, Mode::Permutation, &sizes)
            .is_err());
    }

    #[test]
    fn test_each_slot_reduced_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let data = data();
        let plan = Estimand::difference("B", "A")
            .plan(&data, Mode::Bootstrap, &BTreeMap::new())
            .unwrap();
        let calls = AtomicUsize::new(0);
        let counting = |xs: &[f64]| {
            calls.fetch_add(1, Ordering::Relaxed);
            xs.iter().sum::<f64>()
        };
        let resampler = Resampler::new(Mode::Bootstrap, &data, plan.slots.clone());
        plan.evaluator.evaluate(&counting, &resampler.original()).unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }
}
