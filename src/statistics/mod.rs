//! Numeric building blocks.
//!
//! - Quantiles on sorted data with configurable interpolation
//! - The [`Statistic`] reducer trait and built-in [`Aggregate`]s

mod quantile;
mod reducer;

pub use quantile::{compute_quantile, quantile_sorted, sorted_copy, QuantileMethod};
pub use reducer::{Aggregate, Fallible, Statistic};
