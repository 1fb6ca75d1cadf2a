//! Parameters structure for the drive system

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::pid::PidParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the drive system.
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Absolute limit on the voltage sent to either motor.
    ///
    /// Units: volts
    pub motor_volts_max_v: f64,

    /// Heading error within which a turn is complete.
    ///
    /// Units: radians
    pub steady_heading_tol_rad: f64,

    /// Heading error rate within which a turn is complete.
    ///
    /// Units: radians/second
    pub steady_heading_rate_tol_rads: f64,

    /// Heading controller, output is the differential voltage
    pub head_pid: PidParams,

    /// Velocity controller, output is the common voltage
    pub vel_pid: PidParams,
}
