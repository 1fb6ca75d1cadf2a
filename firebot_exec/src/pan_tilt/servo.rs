//! # Open-loop servo
//!
//! Hobby servos report nothing back, so the position of the horn is estimated
//! by slewing the commanded angle toward the target at a fixed rate.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use std::time::Instant;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct OpenLoopServo {
    /// Commanded angle this cycle
    angle_rad: f64,

    target_rad: f64,

    min_rad: f64,

    max_rad: f64,

    velocity_rads: f64,

    #[serde(skip)]
    last_update: Option<Instant>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl OpenLoopServo {
    /// Create a servo resting at `initial_rad`, clamped to the limits.
    pub fn new(min_rad: f64, max_rad: f64, initial_rad: f64, velocity_rads: f64) -> Self {
        let initial_rad = initial_rad.max(min_rad).min(max_rad);
        Self {
            angle_rad: initial_rad,
            target_rad: initial_rad,
            min_rad,
            max_rad,
            velocity_rads: velocity_rads.abs(),
            last_update: None,
        }
    }

    /// Set the target angle, clamped to the limits.
    pub fn set_angle(&mut self, target_rad: f64) {
        self.target_rad = target_rad.max(self.min_rad).min(self.max_rad);
    }

    /// Hold the current commanded angle.
    pub fn stop(&mut self) {
        self.target_rad = self.angle_rad;
    }

    /// Advance the commanded angle toward the target.
    pub fn update(&mut self, now: Instant) -> f64 {
        let dt_s = self
            .last_update
            .map(|t0| now.saturating_duration_since(t0).as_secs_f64())
            .unwrap_or(0f64);
        self.last_update = Some(now);

        let step_rad = self.velocity_rads * dt_s;
        let to_go_rad = self.target_rad - self.angle_rad;

        if to_go_rad.abs() <= step_rad {
            self.angle_rad = self.target_rad;
        } else {
            self.angle_rad += step_rad.copysign(to_go_rad);
        }

        self.angle_rad
    }

    pub fn at_target(&self) -> bool {
        self.angle_rad == self.target_rad
    }

    pub fn angle_rad(&self) -> f64 {
        self.angle_rad
    }

    pub fn target_rad(&self) -> f64 {
        self.target_rad
    }

    pub fn min_rad(&self) -> f64 {
        self.min_rad
    }

    pub fn max_rad(&self) -> f64 {
        self.max_rad
    }
}
