//! General time utility functions

use std::time::{Duration, Instant};

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Convert a chrono duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

/// A pausable stopwatch driven by externally sampled instants.
///
/// The timer never reads the clock itself, every operation is given the
/// current instant. This keeps the control loop deterministic under test.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timer {
    /// Instant the timer was last started with `tic`
    start: Option<Instant>,

    /// Instant the timer was paused at, if paused
    paused_at: Option<Instant>
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart the timer from `now`, clearing any pause.
    pub fn tic(&mut self, now: Instant) {
        self.start = Some(now);
        self.paused_at = None;
    }

    /// Seconds elapsed since the last `tic`, excluding time spent paused.
    ///
    /// A timer which has never been started reads zero.
    pub fn toc(&self, now: Instant) -> f64 {
        match self.start {
            Some(start) => {
                let end = self.paused_at.unwrap_or(now);
                end.saturating_duration_since(start).as_secs_f64()
            },
            None => 0.0
        }
    }

    /// True if at least `secs` seconds have elapsed since the last `tic`.
    pub fn has_elapsed(&self, now: Instant, secs: f64) -> bool {
        self.toc(now) >= secs
    }

    /// Freeze the elapsed time until `resume` is called.
    pub fn pause(&mut self, now: Instant) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    /// Continue counting from where `pause` froze the timer.
    pub fn resume(&mut self, now: Instant) {
        if let Some(paused_at) = self.paused_at.take() {
            let paused_for: Duration = now.saturating_duration_since(paused_at);
            self.start = self.start.map(|s| s + paused_for);
        }
    }
}
