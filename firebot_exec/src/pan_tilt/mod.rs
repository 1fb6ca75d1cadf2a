//! # Pan-tilt module
//!
//! The flame sensor sits on a two axis pan-tilt head. Pan is measured
//! clockwise from straight ahead, tilt upwards from level.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod servo;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use std::time::Instant;

// Internal
pub use params::{AxisParams, Params};
pub use servo::OpenLoopServo;
use comms_if::eqpt::Servo;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The pan-tilt head
#[derive(Debug, Clone)]
pub struct PanTilt {
    pan: OpenLoopServo,
    tilt: OpenLoopServo,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PanTilt {
    /// Create the head with both axes at zero, or the nearest limit to zero.
    pub fn new(params: &Params) -> Self {
        Self {
            pan: make_servo(&params.pan, params.servo_velocity_max_rads),
            tilt: make_servo(&params.tilt, params.servo_velocity_max_rads),
        }
    }

    /// Advance both axes, call once per cycle.
    pub fn update(&mut self, now: Instant) {
        self.pan.update(now);
        self.tilt.update(now);
    }

    /// Keep both axes sweeping between their limits.
    ///
    /// The two sweeps are independent, each axis turns round when it reaches
    /// its target.
    pub fn sweep(&mut self) {
        sweep_axis(&mut self.pan);
        sweep_axis(&mut self.tilt);
    }

    pub fn set_pan(&mut self, angle_rad: f64) {
        debug!("PanTilt pan to {:.4} rad", angle_rad);
        self.pan.set_angle(angle_rad);
    }

    pub fn set_tilt(&mut self, angle_rad: f64) {
        debug!("PanTilt tilt to {:.4} rad", angle_rad);
        self.tilt.set_angle(angle_rad);
    }

    /// Hold the tilt axis where it is.
    pub fn stop_tilt(&mut self) {
        self.tilt.stop();
    }

    /// True once both axes have reached their targets.
    pub fn is_aimed(&self) -> bool {
        self.pan.at_target() && self.tilt.at_target()
    }

    pub fn pan_rad(&self) -> f64 {
        self.pan.angle_rad()
    }

    pub fn tilt_rad(&self) -> f64 {
        self.tilt.angle_rad()
    }

    pub fn pan_servo(&self) -> &OpenLoopServo {
        &self.pan
    }

    pub fn tilt_servo(&self) -> &OpenLoopServo {
        &self.tilt
    }

    /// Send the commanded angles to the servos.
    pub fn apply(&self, pan: &mut dyn Servo, tilt: &mut dyn Servo) {
        pan.set_angle(self.pan.angle_rad());
        tilt.set_angle(self.tilt.angle_rad());
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn make_servo(axis: &AxisParams, velocity_max_rads: f64) -> OpenLoopServo {
    OpenLoopServo::new(
        axis.min_rad,
        axis.max_rad,
        0f64,
        axis.sweep_velocity_rads.min(velocity_max_rads),
    )
}

fn sweep_axis(servo: &mut OpenLoopServo) {
    if servo.at_target() {
        if servo.target_rad() >= servo.max_rad() {
            servo.set_angle(servo.min_rad());
        } else {
            servo.set_angle(servo.max_rad());
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;
    use std::time::Duration;

    fn params() -> Params {
        util::params::from_str(include_str!("../../../params/pan_tilt.toml")).unwrap()
    }

    #[test]
    fn test_sweeps_back_and_forth() {
        let t0 = Instant::now();
        let mut pt = PanTilt::new(&params());
        pt.update(t0);

        assert_eq!(pt.pan_rad(), 0.0);
        pt.sweep();
        assert!(!pt.is_aimed());

        // Pan runs at pi/2 rad/s over pi/2 rad, tilt is faster
        let mut ms = 0;
        let mut pan_max_seen = 0f64;
        let mut pan_turned = false;
        while ms < 2500 {
            ms += 10;
            pt.update(t0 + Duration::from_millis(ms));
            pt.sweep();
            pan_max_seen = pan_max_seen.max(pt.pan_rad());
            if pan_max_seen > 1.5 && pt.pan_rad() < 1.0 {
                pan_turned = true;
            }
            assert!(pt.tilt_rad() >= -0.523599 - 1e-9 && pt.tilt_rad() <= 0.785398 + 1e-9);
        }

        assert_abs_diff_eq!(pan_max_seen, 1.570796, epsilon = 1e-9);
        assert!(pan_turned);
    }

    #[test]
    fn test_aim() {
        let t0 = Instant::now();
        let mut pt = PanTilt::new(&params());
        pt.update(t0);

        pt.set_pan(FRAC_PI_2);
        pt.set_tilt(0.2);
        pt.update(t0 + Duration::from_millis(500));
        assert!(!pt.is_aimed());

        pt.update(t0 + Duration::from_millis(1000));
        assert!(pt.is_aimed());
        assert_abs_diff_eq!(pt.pan_rad(), 1.570796);
        assert_abs_diff_eq!(pt.tilt_rad(), 0.2);
    }

    #[test]
    fn test_stop_tilt() {
        let t0 = Instant::now();
        let mut pt = PanTilt::new(&params());
        pt.update(t0);
        pt.set_tilt(0.7);
        pt.update(t0 + Duration::from_millis(100));
        pt.stop_tilt();

        assert!(pt.tilt_servo().at_target());
        assert_abs_diff_eq!(pt.tilt_rad(), 0.35, epsilon = 1e-9);
    }
}
