//! Parameters structure for the pan-tilt head

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the pan-tilt head.
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Fastest slew the servos can follow.
    ///
    /// Units: radians/second
    pub servo_velocity_max_rads: f64,

    /// Pan axis, positive pans clockwise
    pub pan: AxisParams,

    /// Tilt axis, positive tilts up
    pub tilt: AxisParams,
}

/// Limits and sweep speed of a single axis.
#[derive(Deserialize, Debug, Clone)]
pub struct AxisParams {
    /// Units: radians
    pub min_rad: f64,

    /// Units: radians
    pub max_rad: f64,

    /// Units: radians/second
    pub sweep_velocity_rads: f64,
}
