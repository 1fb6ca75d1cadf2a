//! Parameters structure for the wall follower

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::pid::PidParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the wall follower.
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    // ---- WALLS ----

    /// Target distance from the VTC to the left wall, also the distance at
    /// which a front wall is approached.
    ///
    /// Units: meters
    pub wall_distance_m: f64,

    /// The left wall is lost when further than `wall_distance_m` plus this.
    ///
    /// Units: meters
    pub left_wall_tolerance_m: f64,

    /// A front wall is reached when nearer than `wall_distance_m` plus this.
    ///
    /// Units: meters
    pub front_wall_tolerance_m: f64,

    /// Raw cliff sensor reading at or above which there is a cliff.
    pub cliff_threshold: u16,

    // ---- MOTION ----

    /// Units: meters/second
    pub drive_velocity_max_ms: f64,

    /// Distance driven past the end of a left wall before turning into the
    /// opening.
    ///
    /// Units: meters
    pub pre_turn_distance_m: f64,

    /// Distance reversed away from a cliff.
    ///
    /// Units: meters
    pub cliff_back_distance_m: f64,

    /// Distance driven to confirm the left wall has really ended.
    ///
    /// Units: meters
    pub wall_check_distance_m: f64,

    /// If set, the time after a turn after which the left wall is checked
    /// for even if it has not been found.
    ///
    /// Units: seconds
    #[serde(default)]
    pub post_turn_time_s: Option<f64>,

    // ---- CONTROLLERS ----

    /// Left wall distance error to heading offset
    pub left_wall_pid: PidParams,

    /// Front wall distance error to forward velocity
    pub front_wall_pid: PidParams,
}

impl Params {
    /// Time to drive the pre-turn distance at full speed
    pub fn pre_turn_time_s(&self) -> f64 {
        self.pre_turn_distance_m / self.drive_velocity_max_ms
    }

    /// Time to reverse the cliff back-off distance at full speed
    pub fn cliff_back_time_s(&self) -> f64 {
        self.cliff_back_distance_m / self.drive_velocity_max_ms
    }

    /// Time to drive the wall check distance at full speed
    pub fn wall_check_time_s(&self) -> f64 {
        self.wall_check_distance_m / self.drive_velocity_max_ms
    }
}
