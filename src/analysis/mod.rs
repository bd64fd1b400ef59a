//! Analysis pipeline applied to resamples.
//!
//! 1. **Evaluation** ([`evaluator`]): reduce each resample to one value per quantity
//! 2. **Accumulation** ([`accumulator`]): collect values into empirical distributions
//! 3. **Inference** ([`inference`]): percentile intervals and p-values

pub mod accumulator;
pub mod evaluator;
pub mod inference;

pub use accumulator::{DistributionAccumulator, EmpiricalDistribution};
pub use evaluator::{Contrast, ContrastKind, Estimand, EvaluationPlan, Evaluator, POOLED_LABEL};
pub use inference::{count_extreme, p_value, percentile_interval, PValueMethod, Sidedness, TIE_TOLERANCE};
