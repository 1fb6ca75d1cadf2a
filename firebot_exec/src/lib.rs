//! # FireBot library.
//!
//! The control core of the robot. Everything here is independent of the
//! hardware, which is reached only through the equipment traits in
//! `comms_if`, so the same code runs on the robot, in the simulator and in
//! tests.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Drive system - heading and speed control of the differential drive
pub mod drive_sys;

/// Mission scheduler - owns every module and runs one control cycle at a time
pub mod firebot;

/// Flame finder - the mission state machine that finds and puts out the candle
pub mod flame_finder;

/// Odometer - dead reckoning from the wheel encoders and IMU
pub mod odom;

/// Pan-tilt head carrying the flame sensor
pub mod pan_tilt;

/// Discrete PID controller
pub mod pid;

/// Simulated arena and equipment
pub mod sim;

/// Sonar range cache
pub mod sonar;

/// Left wall follower
pub mod wall_follow;
