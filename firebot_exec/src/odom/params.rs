//! Parameters structure for the odometer

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the odometer.
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Diameter of the drive wheels.
    ///
    /// Units: meters
    pub wheel_diameter_m: f64,

    /// Distance from the origin within which the robot is home.
    ///
    /// Units: meters
    pub home_distance_threshold_m: f64,
}

impl Params {
    /// Half of the wheel radius, the factor converting the sum of both wheel
    /// angles into the arc length travelled by the VTC.
    pub fn half_wheel_radius_m(&self) -> f64 {
        self.wheel_diameter_m * 0.25
    }
}
