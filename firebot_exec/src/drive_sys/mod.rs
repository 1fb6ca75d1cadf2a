//! # Drive system module
//!
//! Differential drive control. A heading controller produces the voltage
//! difference between the wheels and either a velocity controller or the
//! caller produces the common voltage:
//!
//! ```text
//! left  = common + diff
//! right = common - diff
//! ```
//!
//! A positive differential voltage turns the robot clockwise, in the same
//! sense as the heading.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use std::f64::consts::{PI, TAU};
use std::time::Instant;

// Internal
pub use params::Params;
use crate::odom::Odometer;
use crate::pid::PidController;
use comms_if::eqpt::{DriveDems, WheelMotor};
use util::maths::wrap_2pi;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The drive system
#[derive(Debug, Clone)]
pub struct DriveSystem {
    params: Params,

    head_pid: PidController,

    vel_pid: PidController,

    /// Demands to be sent to the motors at the end of the cycle
    dems: DriveDems,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveSystem {
    pub fn new(params: Params) -> Self {
        Self {
            head_pid: PidController::new(&params.head_pid),
            vel_pid: PidController::new(&params.vel_pid),
            params,
            dems: DriveDems::brake(),
        }
    }

    /// Drive at the target heading and forward velocity.
    ///
    /// Returns true once the heading is at steady state.
    pub fn drive(
        &mut self,
        odom: &Odometer,
        target_heading_rad: f64,
        target_velocity_ms: f64,
        now: Instant,
    ) -> bool {
        let diff_v = self
            .head_pid
            .update(heading_error(target_heading_rad, odom.heading_rad()), now);
        let common_v = self
            .vel_pid
            .update(target_velocity_ms - odom.velocity_ms(), now);

        self.set_voltages(common_v + diff_v, common_v - diff_v);

        self.at_heading()
    }

    /// Drive at the target heading with a fixed common voltage.
    ///
    /// Returns true once the heading is at steady state.
    pub fn drive_voltage(
        &mut self,
        odom: &Odometer,
        target_heading_rad: f64,
        forward_v: f64,
        now: Instant,
    ) -> bool {
        let diff_v = self
            .head_pid
            .update(heading_error(target_heading_rad, odom.heading_rad()), now);

        self.set_voltages(forward_v + diff_v, forward_v - diff_v);

        self.at_heading()
    }

    /// Turn in place to the target heading.
    ///
    /// Returns true once the heading is at steady state.
    pub fn turn(&mut self, odom: &Odometer, target_heading_rad: f64, now: Instant) -> bool {
        self.drive_voltage(odom, target_heading_rad, 0f64, now)
    }

    /// Brake both wheels and reset the controllers.
    pub fn stop(&mut self) {
        debug!("DriveSystem stop");
        self.dems = DriveDems::brake();
        self.head_pid.reset();
        self.vel_pid.reset();
    }

    /// Directly set the wheel voltages, limited to the motor rating.
    pub fn set_voltages(&mut self, left_v: f64, right_v: f64) {
        let max = self.params.motor_volts_max_v;
        let left_v = left_v.max(-max).min(max);
        let right_v = right_v.max(-max).min(max);

        trace!("DriveSystem dems: L {:.3} V, R {:.3} V", left_v, right_v);

        self.dems = DriveDems::voltage(left_v, right_v);
    }

    /// True if the heading controller is at steady state.
    pub fn at_heading(&self) -> bool {
        self.head_pid.steady_state(
            self.params.steady_heading_tol_rad,
            self.params.steady_heading_rate_tol_rads,
        )
    }

    /// The current wheel demands.
    pub fn dems(&self) -> DriveDems {
        self.dems
    }

    /// Send the current demands to the motors.
    pub fn apply(&self, left: &mut dyn WheelMotor, right: &mut dyn WheelMotor) {
        left.apply(self.dems.left);
        right.apply(self.dems.right);
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Heading error from the current heading to the target heading, in (-pi, pi].
///
/// Both headings are normalised into [0, 2pi) first, so the error never
/// crosses the 0/2pi discontinuity the long way round.
pub fn heading_error(target_rad: f64, current_rad: f64) -> f64 {
    let ht = wrap_2pi(target_rad);
    let hc = wrap_2pi(current_rad);

    if ht <= PI {
        if hc < ht + PI {
            ht - hc
        } else {
            ht + TAU - hc
        }
    } else if hc < ht - PI {
        ht - TAU - hc
    } else {
        ht - hc
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
