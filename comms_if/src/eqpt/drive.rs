//! # Drive motor interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A drive wheel motor with an incremental encoder.
pub trait WheelMotor {
    /// Wheel angle travelled since the last call to `reset_encoder`.
    ///
    /// Units: radians, positive driving forwards.
    fn encoder_angle_rad(&mut self) -> f64;

    /// Zero the incremental encoder angle.
    fn reset_encoder(&mut self);

    /// Apply a terminal voltage to the motor, positive drives forwards.
    fn set_voltage(&mut self, voltage_v: f64);

    /// Short the motor terminals.
    fn brake(&mut self);

    /// Apply a demand to the motor.
    fn apply(&mut self, dem: WheelDem) {
        match dem {
            WheelDem::Voltage(v) => self.set_voltage(v),
            WheelDem::Brake => self.brake(),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demands for both drive wheels.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct DriveDems {
    pub left: WheelDem,
    pub right: WheelDem,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Demand for a single drive wheel.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum WheelDem {
    /// Terminal voltage in volts
    Voltage(f64),

    /// Brake the wheel
    Brake,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DriveDems {
    /// Brake both wheels.
    pub fn brake() -> Self {
        Self {
            left: WheelDem::Brake,
            right: WheelDem::Brake,
        }
    }

    pub fn voltage(left_v: f64, right_v: f64) -> Self {
        Self {
            left: WheelDem::Voltage(left_v),
            right: WheelDem::Voltage(right_v),
        }
    }
}

impl Default for DriveDems {
    fn default() -> Self {
        Self::brake()
    }
}

impl WheelDem {
    /// The demanded voltage, braking counts as zero.
    pub fn volts(&self) -> f64 {
        match self {
            WheelDem::Voltage(v) => *v,
            WheelDem::Brake => 0.0,
        }
    }
}
