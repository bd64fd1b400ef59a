//! Cooperative cancellation of a running test.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag checked between iterations.
///
/// Clones observe the same flag, so one clone can be handed to the run and
/// another kept by the caller (or another thread) to stop it.
///
/// ```
/// use resampled::StopSignal;
///
/// let signal = StopSignal::new();
/// let handle = signal.clone();
/// handle.stop();
/// assert!(signal.is_stopped());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    /// Create an unset signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the run stop before its next iteration.
    pub fn stop(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether a stop was requested.
    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_is_visible_across_threads() {
        let signal = StopSignal::new();
        assert!(!signal.is_stopped());

        let remote = signal.clone();
        std::thread::spawn(move || remote.stop()).join().unwrap();
        assert!(signal.is_stopped());
    }
}
