//! Parameters structure for the sonar cache

use serde::Deserialize;

/// Sonar mounting offsets, the distance from each sensor face to the VTC.
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    pub front_offset_m: f64,
    pub back_offset_m: f64,
    pub left_offset_m: f64,
    pub right_offset_m: f64,
}
