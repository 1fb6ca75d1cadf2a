//! # Telemetry

use serde::{Deserialize, Serialize};

/// Snapshot of the robot state sent to the operator.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct Telemetry {
    /// Position in the field frame, meters
    pub position_m: [f64; 2],

    /// Heading, radians in [0, 2pi), 0 along +y, clockwise positive
    pub heading_rad: f64,

    /// Forward speed, meters/second
    pub velocity_ms: f64,

    /// Wall follower state code
    pub nav_state: u8,

    /// Mission state code
    pub mission_state: u8,

    /// Front, back, left and right ranges to the VTC in meters, zero when invalid
    pub ranges_m: [f64; 4],
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_tm_json_fields() {
        let tm = Telemetry {
            position_m: [0.5, 1.25],
            nav_state: 2,
            ..Default::default()
        };

        let value = serde_json::to_value(&tm).unwrap();
        assert_eq!(value["position_m"][1], 1.25);
        assert_eq!(value["nav_state"], 2);
        assert_eq!(value["ranges_m"].as_array().map(|r| r.len()), Some(4));
    }
}
