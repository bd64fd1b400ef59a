//! Terminal output formatting with colors.

use colored::Colorize;

use crate::result::{ConfidenceInterval, InferenceOutcome, PValueOutcome, RunOutput};

/// Format a RunOutput for human-readable terminal output.
pub fn format_output(output: &RunOutput) -> String {
    let mut out = String::new();
    let sep = "\u{2500}".repeat(62);
    let meta = &output.metadata;

    out.push_str(&format!("resampled ({})\n", meta.mode));
    out.push_str(&sep);
    out.push('\n');
    out.push('\n');

    let groups: Vec<String> = meta
        .group_sizes
        .iter()
        .map(|(label, n)| format!("{} (n={})", label, n))
        .collect();
    out.push_str(&format!("  Groups: {}\n", groups.join(", ")));
    out.push_str(&format!(
        "  Iterations: {} of {} (seed {})\n",
        meta.iterations_completed, meta.iterations_requested, meta.seed
    ));
    if meta.skipped_iterations > 0 {
        out.push_str(&format!("  Skipped: {}\n", meta.skipped_iterations));
    }
    out.push('\n');

    match &output.outcome {
        InferenceOutcome::ConfidenceIntervals(intervals) => {
            for ci in intervals {
                out.push_str(&format_interval(ci));
            }
        }
        InferenceOutcome::PValues(p_values) => {
            for p in p_values {
                out.push_str(&format_p_value(p));
            }
        }
    }

    if !output.advisories.is_empty() {
        out.push('\n');
        for description in output.advisories.descriptions() {
            out.push_str(&format!("  {} {}\n", "\u{26A0}".yellow().bold(), description));
        }
    }

    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    out
}

fn format_interval(ci: &ConfidenceInterval) -> String {
    let mut out = format!(
        "  {}: {:.4}  {:.0}% CI [{:.4}, {:.4}]\n",
        ci.quantity.bold(),
        ci.point_estimate,
        ci.confidence_level * 100.0,
        ci.lower,
        ci.upper
    );
    if let Some(se) = ci.standard_error {
        out.push_str(&format!("    Standard error: {:.4}\n", se));
    }
    out
}

fn format_p_value(p: &PValueOutcome) -> String {
    let shown = format!("{:.4}", p.p_value);
    let shown = if p.p_value <= 0.05 {
        shown.green().bold().to_string()
    } else {
        shown
    };
    format!(
        "  {}: observed {:.4}\n    p-value ({}): {} ({} of {} resamples as extreme)\n",
        p.quantity.bold(),
        p.observed,
        p.sidedness.as_str(),
        shown,
        p.extreme_count,
        p.n_resamples
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Sidedness;
    use crate::preflight::{Advisories, LowReliabilityWarning};
    use crate::resampling::Mode;
    use crate::result::Metadata;

    fn metadata(mode: Mode) -> Metadata {
        Metadata {
            mode,
            iterations_requested: 2000,
            iterations_completed: 2000,
            skipped_iterations: 0,
            seed: 7,
            group_sizes: vec![("A".to_string(), 5)],
        }
    }

    #[test]
    fn test_format_interval_output() {
        let output = RunOutput {
            outcome: InferenceOutcome::ConfidenceIntervals(vec![ConfidenceInterval {
                quantity: "A".into(),
                point_estimate: 11.0,
                lower: 10.0,
                upper: 12.0,
                confidence_level: 0.9,
                standard_error: Some(0.63),
            }]),
            advisories: Advisories::new(),
            metadata: metadata(Mode::Bootstrap),
            distributions: None,
            resamples: None,
        };
        let text = format_output(&output);
        assert!(text.contains("resampled (bootstrap)"));
        assert!(text.contains("A (n=5)"));
        assert!(text.contains("90% CI"));
        assert!(text.contains("seed 7"));
    }

    #[test]
    fn test_format_p_value_with_advisory() {
        let mut advisories = Advisories::new();
        advisories.add_reliability_warning(LowReliabilityWarning::FewIterations {
            iterations: 20,
            minimum: 30,
        });
        let output = RunOutput {
            outcome: InferenceOutcome::PValues(vec![PValueOutcome {
                quantity: "B - A".into(),
                observed: 1.0,
                p_value: 0.5,
                sidedness: Sidedness::TwoSided,
                extreme_count: 10,
                n_resamples: 20,
            }]),
            advisories,
            metadata: metadata(Mode::Permutation),
            distributions: None,
            resamples: None,
        };
        let text = format_output(&output);
        assert!(text.contains("p-value (two-sided): 0.5000"));
        assert!(text.contains("10 of 20 resamples"));
        assert!(text.contains("Only 20 iterations"));
    }

    #[test]
    fn test_format_p_value_one_sided() {
        for (sidedness, shown) in [(Sidedness::Greater, "greater"), (Sidedness::Less, "less")] {
            let p = PValueOutcome {
                quantity: "B - A".into(),
                observed: -0.5,
                p_value: 0.02,
                sidedness,
                extreme_count: 19,
                n_resamples: 999,
            };
            assert!(format_p_value(&p).contains(&format!("p-value ({}):", shown)));
        }
    }
}
