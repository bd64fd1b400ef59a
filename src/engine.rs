//! Main `ResamplingTest` entry point and builder.

use rand::Rng;
use tracing::{debug, warn};

use crate::analysis::{
    p_value, percentile_interval, DistributionAccumulator, EmpiricalDistribution, Estimand, Evaluator,
    PValueMethod, Sidedness,
};
use crate::config::{Config, FailurePolicy};
use crate::control::StopSignal;
use crate::dataset::GroupedDataset;
use crate::error::{Error, Result, StatisticError};
use crate::preflight::{run_setup_checks, skipped_check, Advisories};
use crate::resampling::{Mode, Resample, Resampler};
use crate::result::{
    ConfidenceInterval, InferenceOutcome, Metadata, PValueOutcome, RetainedResample, RetainedResamples,
    RunOutput,
};
use crate::state::{RunMachine, RunState};
use crate::statistics::{QuantileMethod, Statistic};

/// Main entry point for resampling analysis.
///
/// Use the builder pattern to configure and run a test.
///
/// # Example
///
/// ```
/// use resampled::{Aggregate, Estimand, GroupedDataset, ResamplingTest};
///
/// let data = GroupedDataset::from_groups([
///     ("A", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
///     ("B", vec![2.0, 3.0, 4.0, 5.0, 6.0]),
/// ])
/// .unwrap();
///
/// let output = ResamplingTest::permutation()
///     .iterations(1_000)
///     .seed(42)
///     .run(&data, &Estimand::difference("B", "A"), &Aggregate::Mean)
///     .unwrap();
///
/// let p = output.outcome.p_value().unwrap();
/// assert_eq!(p.observed, 1.0);
/// assert!(p.p_value > 0.0 && p.p_value <= 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct ResamplingTest {
    mode: Mode,
    config: Config,
    stop: StopSignal,
}

/// Result of one iteration: the quantity values, and the resample when kept.
type IterationOutcome = std::result::Result<(Vec<f64>, Option<Vec<Vec<f64>>>), StatisticError>;

impl ResamplingTest {
    /// Create with default configuration.
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            config: Config::default(),
            stop: StopSignal::new(),
        }
    }

    /// Bootstrap mode: confidence intervals.
    pub fn bootstrap() -> Self {
        Self::new(Mode::Bootstrap)
    }

    /// Permutation mode: p-values by label shuffling.
    pub fn permutation() -> Self {
        Self::new(Mode::Permutation)
    }

    /// Pooled bootstrap mode: p-values by drawing from the pooled groups.
    pub fn pooled_bootstrap() -> Self {
        Self::new(Mode::PooledBootstrap)
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Fast preset for exploration and tests.
    ///
    /// Settings:
    /// - 500 iterations (vs 2,000 default)
    pub fn quick(mut self) -> Self {
        self.config.n_iterations = 500;
        self
    }

    /// Preset for reported results.
    ///
    /// Settings:
    /// - 10,000 iterations (vs 2,000 default)
    /// - parallel execution
    pub fn thorough(mut self) -> Self {
        self.config.n_iterations = 10_000;
        self.config.parallel = true;
        self
    }

    /// Set the number of iterations.
    pub fn iterations(mut self, n: usize) -> Self {
        self.config.n_iterations = n;
        self
    }

    /// Set deterministic base seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set the confidence level of bootstrap intervals.
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.config.confidence_level = level;
        self
    }

    /// Set the direction of the alternative hypothesis.
    pub fn sidedness(mut self, sidedness: Sidedness) -> Self {
        self.config.sidedness = sidedness;
        self
    }

    /// Draw `size` values per iteration from group `label` (bootstrap only).
    pub fn resample_size(mut self, label: impl Into<String>, size: usize) -> Self {
        self.config.resample_sizes.insert(label.into(), size);
        self
    }

    /// Set the policy for statistic failures on resamples.
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    /// Set the quantile interpolation method.
    pub fn quantile_method(mut self, method: QuantileMethod) -> Self {
        self.config.quantile_method = method;
        self
    }

    /// Set the p-value estimator.
    pub fn p_value_method(mut self, method: PValueMethod) -> Self {
        self.config.p_value_method = method;
        self
    }

    /// Return per-quantity distributions with the output.
    pub fn retain_distributions(mut self, retain: bool) -> Self {
        self.config.retain_distributions = retain;
        self
    }

    /// Return every resample with the output.
    pub fn retain_resamples(mut self, retain: bool) -> Self {
        self.config.retain_resamples = retain;
        self
    }

    /// Run iterations on the shared thread pool.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Use `signal` to stop the run between iterations.
    pub fn stop_signal(mut self, signal: StopSignal) -> Self {
        self.stop = signal;
        self
    }

    /// Resampling mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Get the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the test.
    ///
    /// # How It Works
    ///
    /// 1. Validates the configuration and resolves the estimand against the data
    /// 2. Evaluates the statistic on the original data
    /// 3. Draws `n_iterations` resamples and evaluates each one
    /// 4. Derives intervals (bootstrap) or p-values (hypothesis modes)
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] / [`Error::Configuration`] before resampling
    /// - [`Error::Statistic`] when the statistic fails on the original data, or
    ///   on a resample under [`FailurePolicy::Abort`]
    /// - [`Error::Stopped`] when the stop signal is raised
    pub fn run<S: Statistic + ?Sized>(
        &self,
        data: &GroupedDataset,
        estimand: &Estimand,
        statistic: &S,
    ) -> Result<RunOutput> {
        let mut machine = RunMachine::new();
        let result = self.run_machine(&mut machine, data, estimand, statistic);
        if let Err(e) = &result {
            machine.fail(e);
            debug!(mode = %self.mode, state = %machine.state(), "run ended");
        }
        result
    }

    fn run_machine<S: Statistic + ?Sized>(
        &self,
        machine: &mut RunMachine,
        data: &GroupedDataset,
        estimand: &Estimand,
        statistic: &S,
    ) -> Result<RunOutput> {
        let config = &self.config;
        let requested = config.n_iterations;

        config.validate()?;
        let plan = estimand.plan(data, self.mode, &config.resample_sizes)?;
        let resampler = Resampler::new(self.mode, data, plan.slots);
        let evaluator = plan.evaluator;

        let original = resampler.original();
        let observed = evaluator
            .evaluate(statistic, &original)
            .map_err(|source| Error::Statistic {
                iteration: None,
                completed: 0,
                requested,
                source,
            })?;

        let source_sizes: Vec<usize> = original.segments().iter().map(Vec::len).collect();
        let mut advisories = run_setup_checks(self.mode, resampler.slots(), &source_sizes, requested);

        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        debug!(
            mode = %self.mode,
            iterations = requested,
            seed,
            quantities = ?evaluator.quantity_names(),
            "starting run"
        );

        let mut fold = Fold::new(&evaluator, requested, config.failure_policy, config.retain_resamples);

        if config.parallel && cfg!(feature = "parallel") {
            machine.advance(RunState::Resampling);
            machine.advance(RunState::Evaluating);
            let outcomes = self.iterate_parallel(&resampler, &evaluator, statistic, seed);
            for (i, outcome) in outcomes.into_iter().enumerate() {
                match outcome {
                    Some(outcome) => fold.absorb(i, outcome)?,
                    None => return Err(fold.stopped()),
                }
            }
        } else {
            if config.parallel {
                debug!("parallel feature disabled, running sequentially");
            }
            let mut ws = resampler.workspace();
            for i in 0..requested {
                if self.stop.is_stopped() {
                    return Err(fold.stopped());
                }
                machine.advance(RunState::Resampling);
                let resample = resampler.draw_iteration(seed, i, &mut ws);
                machine.advance(RunState::Evaluating);
                let outcome = evaluate_resample(&evaluator, statistic, resample, config.retain_resamples);
                fold.absorb(i, outcome)?;
            }
        }

        let (distributions, retained, skipped) = fold.finish()?;
        machine.advance(RunState::Accumulated);

        if let Some(warning) = skipped_check(skipped, requested) {
            advisories.add_reliability_warning(warning);
        }

        let outcome = self.infer(&distributions, &observed);
        machine.advance(RunState::Inferred);

        log_advisories(&advisories);
        let completed = requested - skipped;
        debug!(mode = %self.mode, completed, skipped, "run finished");

        let slot_labels: Vec<String> = resampler.slots().iter().map(|s| s.label.clone()).collect();
        let metadata = Metadata {
            mode: self.mode,
            iterations_requested: requested,
            iterations_completed: completed,
            skipped_iterations: skipped,
            seed,
            group_sizes: slot_labels.iter().cloned().zip(source_sizes).collect(),
        };

        Ok(RunOutput {
            outcome,
            advisories,
            metadata,
            distributions: config.retain_distributions.then_some(distributions),
            resamples: retained.map(|iterations| RetainedResamples {
                slot_labels,
                iterations,
            }),
        })
    }

    /// Evaluate every iteration on the shared pool.
    ///
    /// Slot `i` holds iteration `i`, or `None` if the stop signal was seen
    /// before it ran.
    #[cfg(feature = "parallel")]
    fn iterate_parallel<S: Statistic + ?Sized>(
        &self,
        resampler: &Resampler,
        evaluator: &Evaluator,
        statistic: &S,
        seed: u64,
    ) -> Vec<Option<IterationOutcome>> {
        use rayon::prelude::*;

        let retain = self.config.retain_resamples;
        let stop = &self.stop;
        let mut slots: Vec<Option<IterationOutcome>> = (0..self.config.n_iterations).map(|_| None).collect();

        crate::thread_pool::install(|| {
            slots.par_iter_mut().enumerate().for_each_init(
                || resampler.workspace(),
                |ws, (i, slot)| {
                    if stop.is_stopped() {
                        return;
                    }
                    let resample = resampler.draw_iteration(seed, i, ws);
                    *slot = Some(evaluate_resample(evaluator, statistic, resample, retain));
                },
            );
        });

        slots
    }

    #[cfg(not(feature = "parallel"))]
    fn iterate_parallel<S: Statistic + ?Sized>(
        &self,
        _resampler: &Resampler,
        _evaluator: &Evaluator,
        _statistic: &S,
        _seed: u64,
    ) -> Vec<Option<IterationOutcome>> {
        unreachable!("parallel iteration requires the `parallel` feature")
    }

    fn infer(&self, distributions: &[EmpiricalDistribution], observed: &[f64]) -> InferenceOutcome {
        let config = &self.config;

        match self.mode {
            Mode::Bootstrap => InferenceOutcome::ConfidenceIntervals(
                distributions
                    .iter()
                    .zip(observed)
                    .map(|(dist, &point_estimate)| {
                        let (lower, upper) =
                            percentile_interval(&dist.sorted(), config.confidence_level, config.quantile_method);
                        ConfidenceInterval {
                            quantity: dist.quantity().to_string(),
                            point_estimate,
                            lower,
                            upper,
                            confidence_level: config.confidence_level,
                            standard_error: dist.std_dev(),
                        }
                    })
                    .collect(),
            ),
            Mode::Permutation | Mode::PooledBootstrap => InferenceOutcome::PValues(
                distributions
                    .iter()
                    .zip(observed)
                    .map(|(dist, &observed)| {
                        let (p, extreme_count) =
                            p_value(dist.values(), observed, config.sidedness, config.p_value_method);
                        PValueOutcome {
                            quantity: dist.quantity().to_string(),
                            observed,
                            p_value: p,
                            sidedness: config.sidedness,
                            extreme_count,
                            n_resamples: dist.len(),
                        }
                    })
                    .collect(),
            ),
        }
    }
}

fn evaluate_resample<S: Statistic + ?Sized>(
    evaluator: &Evaluator,
    statistic: &S,
    resample: &Resample,
    retain: bool,
) -> IterationOutcome {
    let values = evaluator.evaluate(statistic, resample)?;
    Ok((values, retain.then(|| resample.segments().to_vec())))
}

fn log_advisories(advisories: &Advisories) {
    for description in advisories.descriptions() {
        warn!(target: "resampled", "{}", description);
    }
}

/// Folds iteration outcomes, in iteration order, into distributions.
struct Fold {
    accumulator: DistributionAccumulator,
    retained: Option<Vec<RetainedResample>>,
    first_failure: Option<(usize, StatisticError)>,
    policy: FailurePolicy,
    requested: usize,
}

impl Fold {
    fn new(evaluator: &Evaluator, requested: usize, policy: FailurePolicy, retain: bool) -> Self {
        Self {
            accumulator: DistributionAccumulator::new(evaluator.quantity_names().iter().cloned(), requested),
            retained: retain.then(Vec::new),
            first_failure: None,
            policy,
            requested,
        }
    }

    fn absorb(&mut self, iteration: usize, outcome: IterationOutcome) -> Result<()> {
        match outcome {
            Ok((values, segments)) => {
                self.accumulator.push(&values);
                if let (Some(retained), Some(segments)) = (self.retained.as_mut(), segments) {
                    retained.push(RetainedResample {
                        iteration,
                        segments,
                    });
                }
                Ok(())
            }
            Err(source) => match self.policy {
                FailurePolicy::Abort => Err(Error::Statistic {
                    iteration: Some(iteration),
                    completed: self.accumulator.accumulated(),
                    requested: self.requested,
                    source,
                }),
                FailurePolicy::SkipIteration => {
                    debug!(iteration, error = %source, "skipping iteration");
                    self.accumulator.skip();
                    self.first_failure.get_or_insert((iteration, source));
                    Ok(())
                }
            },
        }
    }

    fn stopped(&self) -> Error {
        Error::Stopped {
            completed: self.accumulator.accumulated(),
            requested: self.requested,
        }
    }

    /// Distributions, retained resamples and the skip count.
    ///
    /// Fails if every iteration was skipped.
    fn finish(self) -> Result<(Vec<EmpiricalDistribution>, Option<Vec<RetainedResample>>, usize)> {
        if self.accumulator.accumulated() == 0 {
            if let Some((iteration, source)) = self.first_failure {
                return Err(Error::Statistic {
                    iteration: Some(iteration),
                    completed: 0,
                    requested: self.requested,
                    source,
                });
            }
        }
        let skipped = self.accumulator.skipped();
        Ok((self.accumulator.finish(), self.retained, skipped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::Aggregate;

    fn scenario_data() -> GroupedDataset {
        GroupedDataset::from_groups([
            ("A", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            ("B", vec![2.0, 3.0, 4.0, 5.0, 6.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let test = ResamplingTest::bootstrap();
        assert_eq!(test.mode(), Mode::Bootstrap);
        assert_eq!(test.config().n_iterations, 2_000);
        assert_eq!(test.config().confidence_level, 0.95);
    }

    #[test]
    fn test_builder() {
        let test = ResamplingTest::permutation()
            .iterations(500)
            .seed(3)
            .sidedness(Sidedness::Greater)
            .p_value_method(PValueMethod::Raw)
            .failure_policy(FailurePolicy::SkipIteration)
            .retain_resamples(true);

        assert_eq!(test.config().n_iterations, 500);
        assert_eq!(test.config().seed, Some(3));
        assert_eq!(test.config().sidedness, Sidedness::Greater);
        assert_eq!(test.config().p_value_method, PValueMethod::Raw);
        assert_eq!(test.config().failure_policy, FailurePolicy::SkipIteration);
        assert!(test.config().retain_resamples);
    }

    #[test]
    fn test_presets() {
        assert_eq!(ResamplingTest::bootstrap().quick().config().n_iterations, 500);
        let thorough = ResamplingTest::bootstrap().thorough();
        assert_eq!(thorough.config().n_iterations, 10_000);
        assert!(thorough.config().parallel);
    }

    #[test]
    fn test_run_reaches_inferred() {
        let test = ResamplingTest::bootstrap().iterations(50).seed(1);
        let mut machine = RunMachine::new();
        test.run_machine(&mut machine, &scenario_data(), &Estimand::EachGroup, &Aggregate::Mean)
            .unwrap();
        assert_eq!(machine.state(), &RunState::Inferred);
    }

    #[test]
    fn test_unseeded_run_reports_seed() {
        let data = scenario_data();
        let first = ResamplingTest::bootstrap()
            .iterations(40)
            .run(&data, &Estimand::group("A"), &Aggregate::Mean)
            .unwrap();
        let replay = ResamplingTest::bootstrap()
            .iterations(40)
            .seed(first.metadata.seed)
            .run(&data, &Estimand::group("A"), &Aggregate::Mean)
            .unwrap();
        assert_eq!(first.outcome, replay.outcome);
    }

    #[test]
    fn test_all_iterations_skipped_is_an_error() {
        let data = scenario_data();
        // Accepts only the original, ordered values of A
        let picky = crate::Fallible::new("picky", |xs: &[f64]| {
            if xs == [1.0, 2.0, 3.0, 4.0, 5.0] {
                Ok(0.0)
            } else {
                Err(StatisticError::custom("not the original"))
            }
        });
        let err = ResamplingTest::permutation()
            .iterations(20)
            .seed(0)
            .failure_policy(FailurePolicy::SkipIteration)
            .run(&data, &Estimand::group("A"), &picky)
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Statistic {
                iteration: Some(0),
                completed: 0,
                requested: 20,
                ..
            }
        ));
    }
}
