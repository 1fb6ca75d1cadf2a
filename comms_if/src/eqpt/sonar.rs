//! # Ultrasonic ranging interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// An array of four ultrasonic range sensors fired in rotation.
///
/// All distances are measured from the sensor face. A distance of exactly zero is the
/// hardware's "no echo" sentinel.
pub trait SonarArray {
    /// Returns the sensor which completed a measurement since the last call, if any, along with
    /// its distance in meters.
    fn poll(&mut self) -> Option<(SonarId, f64)>;

    /// Fire the front sensor and block until it returns, or until the driver's own echo
    /// timeout expires.
    fn ping_front(&mut self) -> f64;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Identifies one of the four sonar sensors.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SonarId {
    Front,
    Back,
    Left,
    Right,
}

impl SonarId {
    /// All sensors in firing order.
    pub const ALL: [SonarId; 4] = [SonarId::Front, SonarId::Back, SonarId::Left, SonarId::Right];
}
