//! The hardware the robot runs on

use comms_if::{
    eqpt::{CliffSensors, Fan, FlameSensor, Imu, Servo, SonarArray, WheelMotor},
    link::TmLink,
};

/// Handles to every equipment driver.
pub struct Platform {
    pub imu: Box<dyn Imu>,
    pub motor_left: Box<dyn WheelMotor>,
    pub motor_right: Box<dyn WheelMotor>,
    pub sonar: Box<dyn SonarArray>,
    pub cliff: Box<dyn CliffSensors>,
    pub flame: Box<dyn FlameSensor>,
    pub pan_servo: Box<dyn Servo>,
    pub tilt_servo: Box<dyn Servo>,
    pub fan: Box<dyn Fan>,
    pub link: Box<dyn TmLink>,
}
