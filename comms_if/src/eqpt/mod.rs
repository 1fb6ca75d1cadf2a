//! # Equipment Interface
//!
//! This module defines the traits each equipment driver must implement to be used by the
//! control core. Drivers are simple I/O wrappers, none of the control logic lives behind these
//! traits.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod drive;
pub mod imu;
pub mod mech;
pub mod sonar;

pub use drive::{DriveDems, WheelDem, WheelMotor};
pub use imu::Imu;
pub use mech::{CliffReadings, CliffSensors, Fan, FlameSensor, Servo};
pub use sonar::{SonarArray, SonarId};
