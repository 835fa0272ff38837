use std::time::{Duration, Instant};

/// Elapsed-time reads for the active trial, backed by a monotonic clock
/// so wall-clock adjustments cannot skew recorded reaction times. The
/// live display may read this at any cadence; the recorded reaction time
/// is whatever single read happens at the moment of response.
#[derive(Debug, Clone, Copy)]
pub struct TrialTimer {
    started: Instant,
}

impl TrialTimer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Re-arms the timer for a newly presented trial.
    pub fn restart(&mut self) {
        self.started = Instant::now();
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}
