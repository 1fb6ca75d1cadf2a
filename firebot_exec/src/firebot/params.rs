//! Parameters for the mission scheduler and the modules it owns

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::{drive_sys, flame_finder, odom, pan_tilt, sonar, wall_follow};
use util::params::LoadError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Scheduler parameters.
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Control cycle period.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Maximum number of cycles to run before giving up on the mission
    pub max_cycles: u64,

    /// Run cycles against the wall clock rather than a synthetic one
    pub realtime: bool,

    /// Apply teleop commands to the wheels once home
    pub teleop_at_home: bool,
}

/// Parameters of every module on the robot.
#[derive(Debug, Clone)]
pub struct FireBotParams {
    pub firebot: Params,
    pub odom: odom::Params,
    pub drive_sys: drive_sys::Params,
    pub wall_follow: wall_follow::Params,
    pub pan_tilt: pan_tilt::Params,
    pub sonar: sonar::Params,
    pub flame_finder: flame_finder::Params,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FireBotParams {
    /// Load every parameter file from the software root.
    pub fn load() -> Result<Self, LoadError> {
        Ok(Self {
            firebot: util::params::load("firebot.toml")?,
            odom: util::params::load("odom.toml")?,
            drive_sys: util::params::load("drive_sys.toml")?,
            wall_follow: util::params::load("wall_follow.toml")?,
            pan_tilt: util::params::load("pan_tilt.toml")?,
            sonar: util::params::load("sonar.toml")?,
            flame_finder: util::params::load("flame_finder.toml")?,
        })
    }
}
