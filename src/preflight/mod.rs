//! Advisory checks on a run's setup and outcome.
//!
//! Advisories never block a result. They flag conditions under which the
//! reported interval or p-value deserves less trust.
//!
//! # Checks Performed
//!
//! - **Power**: degenerate or tiny comparisons, too few distinct permutations
//! - **Reliability**: few iterations, singleton bootstrap groups, skipped iterations

mod power;
mod reliability;

pub use power::{power_check, LowPowerWarning, MIN_GROUP_SIZE_FOR_POWER};
pub use reliability::{
    iteration_check, singleton_check, skipped_check, LowReliabilityWarning, MIN_RELIABLE_ITERATIONS,
};

use serde::{Deserialize, Serialize};

use crate::resampling::{Mode, Slot};

/// All advisories raised for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Advisories {
    /// Warnings about the power of a hypothesis test.
    pub power: Vec<LowPowerWarning>,

    /// Warnings about the reliability of the distribution.
    pub reliability: Vec<LowReliabilityWarning>,
}

impl Advisories {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a power warning.
    pub fn add_power_warning(&mut self, warning: LowPowerWarning) {
        self.power.push(warning);
    }

    /// Add a reliability warning.
    pub fn add_reliability_warning(&mut self, warning: LowReliabilityWarning) {
        self.reliability.push(warning);
    }

    /// Get total number of warnings.
    pub fn count(&self) -> usize {
        self.power.len() + self.reliability.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Human-readable descriptions of every warning.
    pub fn descriptions(&self) -> Vec<String> {
        self.power
            .iter()
            .map(LowPowerWarning::description)
            .chain(self.reliability.iter().map(LowReliabilityWarning::description))
            .collect()
    }
}

/// Run the checks that only depend on the run setup.
///
/// # Arguments
///
/// * `mode` - Resampling mode
/// * `slots` - Slots the resampler fills
/// * `source_sizes` - Number of original values behind each slot
/// * `iterations` - Requested iteration count
pub fn run_setup_checks(mode: Mode, slots: &[Slot], source_sizes: &[usize], iterations: usize) -> Advisories {
    let mut advisories = Advisories::new();

    for warning in power_check(mode, slots, iterations) {
        advisories.add_power_warning(warning);
    }

    if let Some(warning) = iteration_check(iterations) {
        advisories.add_reliability_warning(warning);
    }

    for warning in singleton_check(mode, slots, source_sizes) {
        advisories.add_reliability_warning(warning);
    }

    advisories
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resampling::SlotSource;

    #[test]
    fn test_advisories_default() {
        let advisories = Advisories::new();
        assert!(advisories.is_empty());
        assert!(advisories.descriptions().is_empty());
    }

    #[test]
    fn test_setup_checks_collect_both_kinds() {
        let slots = vec![
            Slot {
                label: "A".into(),
                source: SlotSource::Group(0),
                size: 1,
            },
            Slot {
                label: "B".into(),
                source: SlotSource::Group(1),
                size: 1,
            },
        ];
        let advisories = run_setup_checks(Mode::Permutation, &slots, &[1, 1], 10);
        assert!(!advisories.power.is_empty());
        assert_eq!(
            advisories.reliability,
            vec![LowReliabilityWarning::FewIterations {
                iterations: 10,
                minimum: MIN_RELIABLE_ITERATIONS
            }]
        );
        assert_eq!(advisories.count(), advisories.descriptions().len());
    }
}
