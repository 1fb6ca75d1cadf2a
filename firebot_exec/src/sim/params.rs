//! Parameters structure for the simulated platform

use serde::Deserialize;

/// Parameters for the simulated arena and robot.
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    // ---- ARENA ----

    /// Extent of the arena along x.
    ///
    /// Units: meters
    pub arena_width_m: f64,

    /// Extent of the arena along y.
    ///
    /// Units: meters
    pub arena_length_m: f64,

    /// Start position of the VTC, the robot faces +y.
    ///
    /// Units: meters
    pub start_x_m: f64,
    pub start_y_m: f64,

    /// Raw IMU heading when the robot faces +y
    pub imu_offset_rad: f64,

    // ---- DRIVE ----

    pub wheel_radius_m: f64,
    pub wheel_track_m: f64,

    /// Radius of the robot's footprint, used to keep it inside the walls
    pub robot_radius_m: f64,

    /// Steady wheel surface speed per volt
    pub speed_per_volt_ms: f64,

    /// First order lag of the wheel speed
    pub wheel_time_constant_s: f64,

    // ---- SONAR ----

    /// Time for one sensor in the rotation to complete
    pub sonar_period_s: f64,

    /// Echoes beyond this range are lost
    pub sonar_max_range_m: f64,

    pub front_offset_m: f64,
    pub back_offset_m: f64,
    pub left_offset_m: f64,
    pub right_offset_m: f64,

    // ---- CLIFF ----

    pub cliff_floor_reading: u16,

    // ---- CANDLE ----

    pub candle_x_m: f64,
    pub candle_y_m: f64,
    pub candle_base_radius_m: f64,

    /// Height of the flame above the floor
    pub flame_height_m: f64,

    // ---- FLAME SENSOR ----

    /// Height of the flame sensor above the floor
    pub sensor_height_m: f64,

    /// Reading with no flame in view
    pub flame_dark_reading: u16,

    /// Reading looking straight at a flame at the reference range
    pub flame_bright_reading: u16,

    /// Angular spread of the sensor's response in pan
    pub flame_beam_width_rad: f64,

    /// Angular spread of the sensor's response in tilt
    pub flame_tilt_beam_width_rad: f64,

    /// Range inside which the flame appears at full brightness
    pub flame_reference_range_m: f64,

    // ---- FAN ----

    /// The fan only affects a flame nearer than this
    pub fan_effective_range_m: f64,

    /// Time of full fan on the flame needed to put it out
    pub extinguish_time_s: f64,
}
