//! # Mechanisms and miscellaneous sensor interfaces

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A hobby servo driven open-loop by angle.
pub trait Servo {
    /// Command the servo horn to the given angle in radians.
    fn set_angle(&mut self, angle_rad: f64);
}

/// The extinguisher fan.
pub trait Fan {
    /// Set the fan speed, normalised to [0, 1].
    fn set_speed(&mut self, speed: f64);
}

/// The flame (infrared brightness) sensor.
pub trait FlameSensor {
    /// Raw ADC reading. Lower readings mean a brighter flame.
    fn read(&mut self) -> u16;
}

/// The pair of downward facing cliff sensors.
pub trait CliffSensors {
    fn read(&mut self) -> CliffReadings;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Raw ADC readings of the cliff sensors. Higher readings mean a further drop.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CliffReadings {
    pub left: u16,
    pub right: u16,
}
