//! Running minimum of the flame sensor over a sweep

use serde::Serialize;

/// Tracks the brightest (lowest) flame sensor reading seen during a sweep and
/// the axis angle it was seen at.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MinTracker {
    min_reading: u16,
    angle_rad: f64,
}

impl MinTracker {
    /// Start a new sweep. Any reading below `reset_reading` will replace the
    /// initial angle.
    pub fn new(reset_reading: u16, initial_angle_rad: f64) -> Self {
        Self {
            min_reading: reset_reading,
            angle_rad: initial_angle_rad,
        }
    }

    pub fn observe(&mut self, reading: u16, angle_rad: f64) {
        if reading < self.min_reading {
            self.min_reading = reading;
            self.angle_rad = angle_rad;
        }
    }

    pub fn min_reading(&self) -> u16 {
        self.min_reading
    }

    /// Angle of the brightest reading so far
    pub fn angle_rad(&self) -> f64 {
        self.angle_rad
    }
}
