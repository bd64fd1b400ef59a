//! Low power checks for hypothesis modes.
//!
//! A comparison between tiny groups has few distinct relabellings, so even a
//! real effect cannot reach a small p-value.

use serde::{Deserialize, Serialize};

use crate::resampling::{distinct_arrangements, Mode, Slot};

/// Groups smaller than this weaken a comparison.
pub const MIN_GROUP_SIZE_FOR_POWER: usize = 5;

/// Advisory that a hypothesis test has little power.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LowPowerWarning {
    /// At most one compared group has more than one value.
    ///
    /// Relabelling can barely change the statistic; the p-value is close to
    /// meaningless.
    DegenerateComparison {
        /// Sizes of the compared groups.
        group_sizes: Vec<usize>,
    },

    /// A compared group is small.
    SmallGroup {
        /// Group label.
        label: String,
        /// Number of values.
        size: usize,
        /// Size below which this warning is raised.
        minimum: usize,
    },

    /// There are fewer distinct relabellings than requested iterations.
    ///
    /// Many iterations repeat the same arrangement; an exact test would be
    /// more informative.
    FewDistinctPermutations {
        /// Number of distinct arrangements (saturating).
        distinct: u64,
        /// Number of iterations requested.
        iterations: usize,
    },
}

impl LowPowerWarning {
    /// Get a human-readable description of the warning.
    pub fn description(&self) -> String {
        match self {
            LowPowerWarning::DegenerateComparison { group_sizes } => {
                format!(
                    "Degenerate comparison: group sizes {:?} leave at most one group \
                     with more than one value. The p-value carries little information.",
                    group_sizes
                )
            }
            LowPowerWarning::SmallGroup {
                label,
                size,
                minimum,
            } => {
                format!(
                    "Group '{}' has only {} value(s) (fewer than {}). \
                     The test has low power to detect a difference.",
                    label, size, minimum
                )
            }
            LowPowerWarning::FewDistinctPermutations {
                distinct,
                iterations,
            } => {
                format!(
                    "Only {} distinct permutations exist for {} requested iterations. \
                     The smallest attainable p-value is limited by the group sizes.",
                    distinct, iterations
                )
            }
        }
    }
}

/// Check the compared groups of a hypothesis-mode run.
///
/// Returns no warnings in bootstrap mode.
pub fn power_check(mode: Mode, slots: &[Slot], iterations: usize) -> Vec<LowPowerWarning> {
    if !mode.tests_hypothesis() {
        return Vec::new();
    }

    let mut warnings = Vec::new();
    let sizes: Vec<usize> = slots.iter().map(|s| s.size).collect();

    if sizes.iter().filter(|&&n| n > 1).count() <= 1 {
        warnings.push(LowPowerWarning::DegenerateComparison {
            group_sizes: sizes.clone(),
        });
    }

    for slot in slots {
        if slot.size < MIN_GROUP_SIZE_FOR_POWER {
            warnings.push(LowPowerWarning::SmallGroup {
                label: slot.label.clone(),
                size: slot.size,
                minimum: MIN_GROUP_SIZE_FOR_POWER,
            });
        }
    }

    if mode == Mode::Permutation {
        let distinct = distinct_arrangements(&sizes);
        if distinct < iterations as u128 {
            warnings.push(LowPowerWarning::FewDistinctPermutations {
                distinct: u64::try_from(distinct).unwrap_or(u64::MAX),
                iterations,
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resampling::SlotSource;

    fn slots(sizes: &[usize]) -> Vec<Slot> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| Slot {
                label: format!("g{}", i),
                source: SlotSource::Group(i),
                size,
            })
            .collect()
    }

    #[test]
    fn test_no_warnings_for_bootstrap() {
        assert!(power_check(Mode::Bootstrap, &slots(&[1, 1]), 10).is_empty());
    }

    #[test]
    fn test_healthy_comparison() {
        assert!(power_check(Mode::Permutation, &slots(&[10, 10]), 2000).is_empty());
    }

    #[test]
    fn test_degenerate_comparison() {
        let warnings = power_check(Mode::Permutation, &slots(&[1, 6]), 2);
        assert!(warnings.contains(&LowPowerWarning::DegenerateComparison {
            group_sizes: vec![1, 6]
        }));
        assert!(warnings.iter().any(|w| matches!(w, LowPowerWarning::SmallGroup { size: 1, .. })));
    }

    #[test]
    fn test_few_distinct_permutations() {
        let warnings = power_check(Mode::Permutation, &slots(&[5, 5]), 1000);
        assert_eq!(
            warnings,
            vec![LowPowerWarning::FewDistinctPermutations {
                distinct: 252,
                iterations: 1000
            }]
        );

        // Pooled bootstrap draws with replacement, so arrangements are not limited
        assert!(power_check(Mode::PooledBootstrap, &slots(&[5, 5]), 1000).is_empty());
    }

    #[test]
    fn test_descriptions_mention_details() {
        let w = LowPowerWarning::SmallGroup {
            label: "A".into(),
            size: 3,
            minimum: 5,
        };
        assert!(w.description().contains("'A'"));
        assert!(w.description().contains("3 value"));
    }
}
