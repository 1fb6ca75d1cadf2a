//! Parameters structure for the flame finder

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the flame finder.
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    // ---- FLAME SENSOR ----

    /// Full scale flame sensor reading, the darkest possible reading
    pub adc_max: u16,

    /// Readings below this mean a flame is in view
    pub flame_found_threshold: u16,

    /// Readings above this mean the flame is out
    pub flame_out_threshold: u16,

    /// Time the flame must stay out before it is extinguished.
    ///
    /// Units: seconds
    pub flame_out_time_s: f64,

    /// Fan speed while extinguishing, [0, 1]
    pub fan_speed: f64,

    // ---- CANDLE APPROACH ----

    /// Stand-off range from the VTC to the candle.
    ///
    /// Units: meters
    pub candle_drive_distance_m: f64,

    /// Units: meters/second
    pub candle_drive_speed_ms: f64,

    /// Units: meters
    pub candle_base_radius_m: f64,

    // ---- PAN-TILT GEOMETRY ----

    /// Forward offset from the VTC to the tilt axis.
    ///
    /// Units: meters
    pub base_to_tilt_y_m: f64,

    /// Height of the tilt axis above the floor.
    ///
    /// Units: meters
    pub base_to_tilt_z_m: f64,

    /// Distance from the tilt axis to the flame sensor.
    ///
    /// Units: meters
    pub tilt_to_sensor_m: f64,

    /// If set, the longest a pan or tilt sweep may take before the search is
    /// abandoned.
    ///
    /// Units: seconds
    #[serde(default)]
    pub sweep_timeout_s: Option<f64>,
}
