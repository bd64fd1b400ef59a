//! JSON serialization for run output.

use serde::ser::Error as _;

use crate::result::{InferenceOutcome, RunOutput};

/// Serialize a RunOutput to a compact JSON string.
///
/// # Errors
///
/// Returns an error if any number in the output is infinite or NaN. JSON
/// has no such numbers and serde_json would write them as `null`, which
/// [`from_json`] cannot read back.
pub fn to_json(output: &RunOutput) -> Result<String, serde_json::Error> {
    check_finite(output)?;
    serde_json::to_string(output)
}

/// Serialize a RunOutput to a pretty-printed JSON string.
///
/// # Errors
///
/// Same as [`to_json`].
pub fn to_json_pretty(output: &RunOutput) -> Result<String, serde_json::Error> {
    check_finite(output)?;
    serde_json::to_string_pretty(output)
}

/// Parse a RunOutput previously written by [`to_json`] or [`to_json_pretty`].
///
/// # Errors
///
/// Returns an error if `json` is not a serialized RunOutput.
pub fn from_json(json: &str) -> Result<RunOutput, serde_json::Error> {
    serde_json::from_str(json)
}

fn check_finite(output: &RunOutput) -> Result<(), serde_json::Error> {
    let mut checked: Vec<(&str, &str, f64)> = Vec::new();
    match &output.outcome {
        InferenceOutcome::ConfidenceIntervals(intervals) => {
            for ci in intervals {
                checked.push((ci.quantity.as_str(), "point estimate", ci.point_estimate));
                checked.push((ci.quantity.as_str(), "lower bound", ci.lower));
                checked.push((ci.quantity.as_str(), "upper bound", ci.upper));
                if let Some(se) = ci.standard_error {
                    checked.push((ci.quantity.as_str(), "standard error", se));
                }
            }
        }
        InferenceOutcome::PValues(p_values) => {
            for p in p_values {
                checked.push((p.quantity.as_str(), "observed statistic", p.observed));
            }
        }
    }
    for dist in output.distributions.iter().flatten() {
        if let Some(&x) = dist.values().iter().find(|x| !x.is_finite()) {
            checked.push((dist.quantity(), "distribution", x));
        }
    }
    if let Some(resamples) = &output.resamples {
        let bad = resamples
            .iterations
            .iter()
            .flat_map(|r| r.segments.iter().flatten())
            .find(|x| !x.is_finite());
        if let Some(&x) = bad {
            checked.push(("resamples", "value", x));
        }
    }

    match checked.into_iter().find(|(_, _, x)| !x.is_finite()) {
        Some((quantity, field, x)) => Err(serde_json::Error::custom(format!(
            "{} of {} is {}, which JSON cannot represent",
            field, quantity, x
        ))),
        None => Ok(()),
    }
}
