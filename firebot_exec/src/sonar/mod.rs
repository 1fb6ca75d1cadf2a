//! # Sonar module
//!
//! Caches the most recent range from each of the four ultrasonic sensors,
//! normalised to the VTC.
//!
//! The hardware reports a distance of zero when no echo came back. That
//! sentinel never leaves this module, consumers see `None` instead.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use serde::Serialize;

pub use params::Params;
use comms_if::eqpt::{SonarArray, SonarId};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Provides the latest range to the VTC in each direction.
pub trait RangeSensors {
    fn front(&self) -> Option<f64>;
    fn back(&self) -> Option<f64>;
    fn left(&self) -> Option<f64>;
    fn right(&self) -> Option<f64>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A set of range readings to the VTC. `None` means the sensor has no valid
/// echo.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct RangeReadings {
    pub front_m: Option<f64>,
    pub back_m: Option<f64>,
    pub left_m: Option<f64>,
    pub right_m: Option<f64>,
}

/// The sonar cache
#[derive(Debug, Clone)]
pub struct Sonar {
    params: Params,
    readings: RangeReadings,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RangeReadings {
    /// Readings as sent in telemetry, front, back, left, right, with zero
    /// for invalid.
    pub fn to_array(&self) -> [f64; 4] {
        [
            self.front_m.unwrap_or(0f64),
            self.back_m.unwrap_or(0f64),
            self.left_m.unwrap_or(0f64),
            self.right_m.unwrap_or(0f64),
        ]
    }
}

impl RangeSensors for RangeReadings {
    fn front(&self) -> Option<f64> {
        self.front_m
    }

    fn back(&self) -> Option<f64> {
        self.back_m
    }

    fn left(&self) -> Option<f64> {
        self.left_m
    }

    fn right(&self) -> Option<f64> {
        self.right_m
    }
}

impl Sonar {
    pub fn new(params: Params) -> Self {
        Self {
            params,
            readings: RangeReadings::default(),
        }
    }

    /// Store the measurement completed since the last poll, if any.
    pub fn poll(&mut self, array: &mut dyn SonarArray) {
        if let Some((id, dist_m)) = array.poll() {
            let range = self.to_vtc(id, dist_m);
            trace!("Sonar {:?}: {:?}", id, range);

            match id {
                SonarId::Front => self.readings.front_m = range,
                SonarId::Back => self.readings.back_m = range,
                SonarId::Left => self.readings.left_m = range,
                SonarId::Right => self.readings.right_m = range,
            }
        }
    }

    /// Fire the front sensor and wait for its echo.
    ///
    /// The cached front reading is updated with the result.
    pub fn ping_front(&mut self, array: &mut dyn SonarArray) -> Option<f64> {
        let range = self.to_vtc(SonarId::Front, array.ping_front());
        self.readings.front_m = range;
        range
    }

    pub fn readings(&self) -> &RangeReadings {
        &self.readings
    }

    fn to_vtc(&self, id: SonarId, dist_m: f64) -> Option<f64> {
        if dist_m <= 0f64 {
            return None;
        }

        let offset_m = match id {
            SonarId::Front => self.params.front_offset_m,
            SonarId::Back => self.params.back_offset_m,
            SonarId::Left => self.params.left_offset_m,
            SonarId::Right => self.params.right_offset_m,
        };

        Some(dist_m + offset_m)
    }
}

impl RangeSensors for Sonar {
    fn front(&self) -> Option<f64> {
        self.readings.front_m
    }

    fn back(&self) -> Option<f64> {
        self.readings.back_m
    }

    fn left(&self) -> Option<f64> {
        self.readings.left_m
    }

    fn right(&self) -> Option<f64> {
        self.readings.right_m
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::collections::VecDeque;

    struct ScriptedArray {
        echoes: VecDeque<Option<(SonarId, f64)>>,
        front: f64,
    }

    impl SonarArray for ScriptedArray {
        fn poll(&mut self) -> Option<(SonarId, f64)> {
            self.echoes.pop_front().flatten()
        }

        fn ping_front(&mut self) -> f64 {
            self.front
        }
    }

    fn sonar() -> Sonar {
        Sonar::new(util::params::from_str(include_str!("../../../params/sonar.toml")).unwrap())
    }

    #[test]
    fn test_poll_adds_offsets() {
        let mut sonar = sonar();
        let mut array = ScriptedArray {
            echoes: vec![
                Some((SonarId::Left, 0.1)),
                None,
                Some((SonarId::Front, 0.5)),
                Some((SonarId::Right, 0.0)),
            ]
            .into(),
            front: 0.0,
        };

        for _ in 0..4 {
            sonar.poll(&mut array);
        }

        assert_abs_diff_eq!(sonar.left().unwrap(), 0.1 + 0.1248, epsilon = 1e-12);
        assert_abs_diff_eq!(sonar.front().unwrap(), 0.5 + 0.0489, epsilon = 1e-12);
        assert_eq!(sonar.right(), None);
        assert_eq!(sonar.back(), None);
        assert_eq!(sonar.readings().to_array()[3], 0.0);
    }

    #[test]
    fn test_lost_echo_invalidates() {
        let mut sonar = sonar();
        let mut array = ScriptedArray {
            echoes: vec![Some((SonarId::Back, 0.3)), Some((SonarId::Back, 0.0))].into(),
            front: 0.0,
        };

        sonar.poll(&mut array);
        assert!(sonar.back().is_some());
        sonar.poll(&mut array);
        assert!(sonar.back().is_none());
    }

    #[test]
    fn test_ping_front() {
        let mut sonar = sonar();
        let mut array = ScriptedArray {
            echoes: VecDeque::new(),
            front: 0.2,
        };

        let range = sonar.ping_front(&mut array).unwrap();
        assert_abs_diff_eq!(range, 0.2489, epsilon = 1e-12);
        assert_eq!(sonar.front(), Some(range));

        array.front = 0.0;
        assert_eq!(sonar.ping_front(&mut array), None);
    }
}
