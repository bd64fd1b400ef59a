//! Lifecycle of a single run.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stage of a run.
///
/// ```text
/// Configured -> Resampling -> Evaluating -> Accumulated -> Inferred
///        \            \            \             \
///         +------------+------------+-------------+--> Failed
/// ```
///
/// `Resampling` and `Evaluating` alternate once per iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// Inputs validated, nothing drawn yet.
    Configured,
    /// Drawing a resample.
    Resampling,
    /// Applying the statistic to a resample.
    Evaluating,
    /// All iterations accumulated.
    Accumulated,
    /// Interval or p-value derived. Terminal.
    Inferred,
    /// The run ended with an error. Terminal.
    Failed(String),
}

impl RunState {
    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Inferred | RunState::Failed(_))
    }

    /// Whether moving from `self` to `next` is legal.
    pub fn can_transition_to(&self, next: &RunState) -> bool {
        use RunState::{Accumulated, Configured, Evaluating, Failed, Inferred, Resampling};

        match (self, next) {
            (Inferred | Failed(_), _) => false,
            (_, Failed(_)) => true,
            (Configured, Resampling) => true,
            (Resampling, Evaluating) => true,
            (Evaluating, Resampling | Accumulated) => true,
            (Accumulated, Inferred) => true,
            _ => false,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Configured => f.write_str("configured"),
            RunState::Resampling => f.write_str("resampling"),
            RunState::Evaluating => f.write_str("evaluating"),
            RunState::Accumulated => f.write_str("accumulated"),
            RunState::Inferred => f.write_str("inferred"),
            RunState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Tracks the state of one run and rejects illegal transitions.
#[derive(Debug)]
pub(crate) struct RunMachine {
    state: RunState,
}

impl RunMachine {
    pub(crate) fn new() -> Self {
        Self {
            state: RunState::Configured,
        }
    }

    pub(crate) fn state(&self) -> &RunState {
        &self.state
    }

    /// Move to `next`.
    ///
    /// Illegal transitions are a bug in the engine, so they panic in debug
    /// builds and are ignored in release builds.
    pub(crate) fn advance(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_transition_to(&next),
            "illegal run transition {} -> {}",
            self.state,
            next
        );
        if self.state.can_transition_to(&next) {
            tracing::trace!(from = %self.state, to = %next, "run transition");
            self.state = next;
        }
    }

    pub(crate) fn fail(&mut self, reason: impl fmt::Display) {
        self.advance(RunState::Failed(reason.to_string()));
    }
}
