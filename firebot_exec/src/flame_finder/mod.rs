//! # Flame finder module
//!
//! The mission state machine. While no flame is in view it runs the wall
//! follower and sweeps the pan-tilt head. Once a flame is seen it stops the
//! follower, locates the flame in heading with a pan sweep, turns and drives up
//! to the candle, locates the flame in elevation with a tilt sweep, and runs
//! the fan until the flame has stayed out for a dwell time. It then reverses
//! back to the wall and follows the walls home.
//!
//! The states in order are:
//!
//! - `SearchForFlame` - wall following with the head sweeping
//! - `ZeroPan` - pan returns to its minimum to start the heading sweep
//! - `GetFlameHeading` - pan sweep to its maximum, tracking the brightest reading
//! - `TurnToFlameHeading` - turn in place to face the flame
//! - `DriveToCandle` - drive at the flame until inside the stand-off range
//! - `LowerTilt` - tilt drops to its minimum to start the elevation sweep
//! - `GetFlameTilt` - tilt sweep to its maximum, tracking the brightest reading
//! - `AimAtFlame` - point the head at the flame
//! - `ExtinguishFlame` - fan on, waiting for the flame to go out
//! - `CheckFlame` - flame out, waiting for it to stay out
//! - `BackFromCandle` - reverse for as long as the approach took
//! - `TurnToWall` - turn back to the wall follower's heading
//! - `GoHome` - wall following until near the origin
//! - `AtHome` - mission complete

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod tracker;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use nalgebra::{Vector2, Vector3};
use serde::Serialize;
use std::time::Instant;

// Internal
pub use params::Params;
pub use tracker::MinTracker;
use crate::drive_sys::DriveSystem;
use crate::odom::Odometer;
use crate::pan_tilt::PanTilt;
use crate::sonar::Sonar;
use crate::wall_follow::WallFollower;
use comms_if::eqpt::{CliffReadings, SonarArray};
use util::maths::wrap_2pi;
use util::time::Timer;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The subsystems the flame finder commands.
pub struct Subsystems<'a> {
    pub odom: &'a Odometer,
    pub drive: &'a mut DriveSystem,
    pub nav: &'a mut WallFollower,
    pub pan_tilt: &'a mut PanTilt,
    pub sonar: &'a mut Sonar,
}

/// Sensor inputs for one cycle.
pub struct Inputs<'a> {
    pub sonar_array: &'a mut dyn SonarArray,

    /// Raw flame sensor reading, lower is brighter
    pub flame_reading: u16,

    pub cliff: CliffReadings,
}

/// What has been learnt about the flame so far.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct FlameEstimate {
    /// Pan angle of the brightest reading in the heading sweep
    pub pan_rad: f64,

    /// Tilt angle of the brightest reading in the elevation sweep
    pub tilt_rad: f64,

    /// Field frame heading from the robot to the flame
    pub heading_rad: f64,

    /// Distance from the VTC to the centre of the candle
    pub distance_m: f64,

    /// Position of the flame in the field frame
    pub position_m: Option<Vector3<f64>>,

    pub extinguished: bool,
}

/// The flame finder
#[derive(Debug, Clone)]
pub struct FlameFinder {
    params: Params,

    state: FlameState,

    estimate: FlameEstimate,

    tracker: MinTracker,

    /// Times the sweeps against the optional timeout
    sweep_timer: Timer,

    /// Times the approach, then the reverse
    candle_timer: Timer,

    /// Time taken to approach the candle
    candle_drive_time_s: f64,

    /// Times how long the flame has stayed out
    flame_timer: Timer,

    fan_speed: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The states of the flame finder, see the module documentation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum FlameState {
    SearchForFlame,
    ZeroPan,
    GetFlameHeading,
    TurnToFlameHeading,
    DriveToCandle,
    LowerTilt,
    GetFlameTilt,
    AimAtFlame,
    ExtinguishFlame,
    CheckFlame,
    BackFromCandle,
    TurnToWall,
    GoHome,
    AtHome,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FlameState {
    /// Numeric code for telemetry.
    pub fn code(&self) -> u8 {
        use FlameState::*;
        match self {
            SearchForFlame => 1,
            ZeroPan => 2,
            GetFlameHeading => 3,
            TurnToFlameHeading => 4,
            DriveToCandle => 5,
            LowerTilt => 6,
            GetFlameTilt => 7,
            AimAtFlame => 8,
            ExtinguishFlame => 9,
            CheckFlame => 10,
            BackFromCandle => 11,
            TurnToWall => 12,
            GoHome => 13,
            AtHome => 14,
        }
    }
}

impl FlameFinder {
    pub fn new(params: Params) -> Self {
        Self {
            tracker: MinTracker::new(params.adc_max, 0f64),
            params,
            state: FlameState::SearchForFlame,
            estimate: FlameEstimate::default(),
            sweep_timer: Timer::new(),
            candle_timer: Timer::new(),
            candle_drive_time_s: 0f64,
            flame_timer: Timer::new(),
            fan_speed: 0f64,
        }
    }

    /// Run one cycle of the mission.
    pub fn step(
        &mut self,
        sys: &mut Subsystems,
        inputs: &mut Inputs,
        now: Instant,
    ) -> FlameState {
        let next = self.transition(sys, inputs, now);

        if next != self.state {
            info!("FlameFinder state change: {:?} -> {:?}", self.state, next);
            self.state = next;
        }

        self.state
    }

    pub fn state(&self) -> FlameState {
        self.state
    }

    pub fn estimate(&self) -> &FlameEstimate {
        &self.estimate
    }

    /// Fan speed demand, [0, 1]
    pub fn fan_speed(&self) -> f64 {
        self.fan_speed
    }

    /// Time the approach to the candle took
    pub fn candle_drive_time_s(&self) -> f64 {
        self.candle_drive_time_s
    }

    pub fn flame_detected(&self, reading: u16) -> bool {
        reading < self.params.flame_found_threshold
    }

    pub fn flame_extinguished(&self, reading: u16) -> bool {
        reading > self.params.flame_out_threshold
    }

    /// Run the current state and pick the next one.
    fn transition(
        &mut self,
        sys: &mut Subsystems,
        inputs: &mut Inputs,
        now: Instant,
    ) -> FlameState {
        use FlameState::*;

        let reading = inputs.flame_reading;

        match self.state {
            SearchForFlame => {
                sys.sonar.poll(inputs.sonar_array);
                sys.nav
                    .step(sys.drive, sys.odom, &*sys.sonar, inputs.cliff, now);
                sys.pan_tilt.sweep();

                if self.flame_detected(reading) && sys.nav.in_pausable_state() {
                    info!("Flame detected, reading {}", reading);
                    sys.nav.stop(sys.drive, now);
                    sys.pan_tilt.stop_tilt();
                    let pan_min_rad = sys.pan_tilt.pan_servo().min_rad();
                    sys.pan_tilt.set_pan(pan_min_rad);
                    ZeroPan
                } else {
                    SearchForFlame
                }
            }

            ZeroPan => {
                if sys.pan_tilt.is_aimed() {
                    self.tracker = MinTracker::new(self.params.adc_max, sys.pan_tilt.pan_rad());
                    let pan_max_rad = sys.pan_tilt.pan_servo().max_rad();
                    sys.pan_tilt.set_pan(pan_max_rad);
                    self.sweep_timer.tic(now);
                    GetFlameHeading
                } else {
                    ZeroPan
                }
            }

            GetFlameHeading => {
                self.tracker.observe(reading, sys.pan_tilt.pan_rad());

                if sys.pan_tilt.is_aimed() {
                    self.estimate.pan_rad = self.tracker.angle_rad();
                    self.estimate.heading_rad =
                        wrap_2pi(sys.odom.heading_rad() + self.estimate.pan_rad);
                    info!(
                        "Flame at pan {:.4} rad, heading {:.4} rad (reading {})",
                        self.estimate.pan_rad,
                        self.estimate.heading_rad,
                        self.tracker.min_reading()
                    );
                    sys.pan_tilt.set_pan(0f64);
                    TurnToFlameHeading
                } else if self.sweep_timed_out(now) {
                    self.abandon_search(sys, now)
                } else {
                    GetFlameHeading
                }
            }

            TurnToFlameHeading => {
                let turned = sys.drive.turn(sys.odom, self.estimate.heading_rad, now);
                if turned && sys.pan_tilt.is_aimed() {
                    sys.drive.stop();
                    self.candle_timer.tic(now);
                    DriveToCandle
                } else {
                    TurnToFlameHeading
                }
            }

            DriveToCandle => match sys.sonar.ping_front(inputs.sonar_array) {
                Some(range_m) if range_m < self.params.candle_drive_distance_m => {
                    sys.drive.stop();
                    self.candle_drive_time_s = self.candle_timer.toc(now);
                    self.estimate.distance_m = range_m + self.params.candle_base_radius_m;
                    info!(
                        "At candle, range {:.3} m after {:.2} s",
                        range_m, self.candle_drive_time_s
                    );
                    let tilt_min_rad = sys.pan_tilt.tilt_servo().min_rad();
                    sys.pan_tilt.set_tilt(tilt_min_rad);
                    LowerTilt
                }
                _ => {
                    sys.drive.drive(
                        sys.odom,
                        self.estimate.heading_rad,
                        self.params.candle_drive_speed_ms,
                        now,
                    );
                    DriveToCandle
                }
            },

            LowerTilt => {
                if sys.pan_tilt.is_aimed() {
                    self.tracker = MinTracker::new(self.params.adc_max, sys.pan_tilt.tilt_rad());
                    let tilt_max_rad = sys.pan_tilt.tilt_servo().max_rad();
                    sys.pan_tilt.set_tilt(tilt_max_rad);
                    self.sweep_timer.tic(now);
                    GetFlameTilt
                } else {
                    LowerTilt
                }
            }

            GetFlameTilt => {
                self.tracker.observe(reading, sys.pan_tilt.tilt_rad());

                if sys.pan_tilt.is_aimed() {
                    self.estimate.tilt_rad = self.tracker.angle_rad();
                    let position_m = flame_position(
                        &self.params,
                        &sys.odom.pose().position_m,
                        self.estimate.heading_rad,
                        self.estimate.distance_m,
                        self.estimate.tilt_rad,
                    );
                    info!(
                        "Flame at tilt {:.4} rad, position ({:.3}, {:.3}, {:.3}) m",
                        self.estimate.tilt_rad, position_m[0], position_m[1], position_m[2]
                    );
                    self.estimate.position_m = Some(position_m);
                    sys.pan_tilt.set_tilt(self.estimate.tilt_rad);
                    AimAtFlame
                } else if self.sweep_timed_out(now) {
                    self.abandon_search(sys, now)
                } else {
                    GetFlameTilt
                }
            }

            AimAtFlame => {
                if sys.pan_tilt.is_aimed() {
                    self.fan_speed = self.params.fan_speed;
                    self.flame_timer.tic(now);
                    ExtinguishFlame
                } else {
                    AimAtFlame
                }
            }

            ExtinguishFlame => {
                // The dwell is timed from the last cycle the flame was seen
                self.flame_timer.tic(now);
                if self.flame_extinguished(reading) {
                    CheckFlame
                } else {
                    ExtinguishFlame
                }
            }

            CheckFlame => {
                if !self.flame_extinguished(reading) {
                    debug!("Flame flickered back, reading {}", reading);
                    ExtinguishFlame
                } else if self
                    .flame_timer
                    .has_elapsed(now, self.params.flame_out_time_s)
                {
                    info!("Flame extinguished");
                    self.fan_speed = 0f64;
                    self.estimate.extinguished = true;
                    self.candle_timer.tic(now);
                    BackFromCandle
                } else {
                    CheckFlame
                }
            }

            BackFromCandle => {
                if self.candle_timer.has_elapsed(now, self.candle_drive_time_s) {
                    sys.drive.stop();
                    TurnToWall
                } else {
                    sys.drive.drive(
                        sys.odom,
                        self.estimate.heading_rad,
                        -self.params.candle_drive_speed_ms,
                        now,
                    );
                    BackFromCandle
                }
            }

            TurnToWall => {
                if sys.drive.turn(sys.odom, sys.nav.target_heading_rad(), now) {
                    sys.drive.stop();
                    sys.nav.start(now);
                    GoHome
                } else {
                    TurnToWall
                }
            }

            GoHome => {
                sys.sonar.poll(inputs.sonar_array);
                sys.nav
                    .step(sys.drive, sys.odom, &*sys.sonar, inputs.cliff, now);

                if sys.odom.near_home() {
                    sys.nav.stop(sys.drive, now);
                    AtHome
                } else {
                    GoHome
                }
            }

            AtHome => AtHome,
        }
    }

    fn sweep_timed_out(&self, now: Instant) -> bool {
        match self.params.sweep_timeout_s {
            Some(t) => self.sweep_timer.has_elapsed(now, t),
            None => false,
        }
    }

    /// Give up on the current flame and go back to wall following.
    fn abandon_search(&mut self, sys: &mut Subsystems, now: Instant) -> FlameState {
        warn!(
            "Flame sweep took longer than {:?} s, resuming search",
            self.params.sweep_timeout_s
        );
        sys.drive.stop();
        sys.nav.start(now);
        FlameState::SearchForFlame
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Position of the flame in the field frame.
///
/// The candle is `distance_m` from the VTC along `heading_rad`. The flame
/// height follows from the tilt angle and the position of the sensor on the
/// tilt arm.
pub fn flame_position(
    params: &Params,
    robot_position_m: &Vector2<f64>,
    heading_rad: f64,
    distance_m: f64,
    tilt_rad: f64,
) -> Vector3<f64> {
    let d1 = distance_m + params.base_to_tilt_y_m + params.tilt_to_sensor_m * tilt_rad.sin();
    let d2 = params.base_to_tilt_z_m + params.tilt_to_sensor_m * tilt_rad.cos();
    let d3 = d1 * tilt_rad.tan();

    Vector3::new(
        robot_position_m[0] + distance_m * heading_rad.sin(),
        robot_position_m[1] + distance_m * heading_rad.cos(),
        d2 + d3,
    )
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{drive_sys, odom, pan_tilt, sonar, wall_follow};
    use approx::assert_abs_diff_eq;
    use comms_if::eqpt::SonarId;
    use std::f64::consts::FRAC_PI_2;
    use std::time::Duration;

    struct NoSonar {
        front_m: f64,
    }

    impl SonarArray for NoSonar {
        fn poll(&mut self) -> Option<(SonarId, f64)> {
            None
        }

        fn ping_front(&mut self) -> f64 {
            self.front_m
        }
    }

    struct Rig {
        ff: FlameFinder,
        odom: Odometer,
        drive: DriveSystem,
        nav: WallFollower,
        pan_tilt: PanTilt,
        sonar: Sonar,
        array: NoSonar,
        t0: Instant,
    }

    impl Rig {
        fn new() -> Self {
            let t0 = Instant::now();
            let pt_params: pan_tilt::Params =
                util::params::from_str(include_str!("../../../params/pan_tilt.toml")).unwrap();
            let mut pan_tilt = PanTilt::new(&pt_params);
            pan_tilt.update(t0);

            Self {
                ff: FlameFinder::new(
                    util::params::from_str(include_str!("../../../params/flame_finder.toml"))
                        .unwrap(),
                ),
                odom: odom::stationary(0.0, t0),
                drive: DriveSystem::new(
                    util::params::from_str::<drive_sys::Params>(include_str!(
                        "../../../params/drive_sys.toml"
                    ))
                    .unwrap(),
                ),
                nav: WallFollower::new(
                    util::params::from_str::<wall_follow::Params>(include_str!(
                        "../../../params/wall_follow.toml"
                    ))
                    .unwrap(),
                ),
                pan_tilt,
                sonar: Sonar::new(
                    util::params::from_str::<sonar::Params>(include_str!(
                        "../../../params/sonar.toml"
                    ))
                    .unwrap(),
                ),
                array: NoSonar { front_m: 0.0 },
                t0,
            }
        }

        fn at(&self, ms: u64) -> Instant {
            self.t0 + Duration::from_millis(ms)
        }

        /// Update the head and step the finder with the given reading.
        fn step(&mut self, ms: u64, reading: u16) -> FlameState {
            let now = self.at(ms);
            self.pan_tilt.update(now);

            let mut sys = Subsystems {
                odom: &self.odom,
                drive: &mut self.drive,
                nav: &mut self.nav,
                pan_tilt: &mut self.pan_tilt,
                sonar: &mut self.sonar,
            };
            let mut inputs = Inputs {
                sonar_array: &mut self.array,
                flame_reading: reading,
                cliff: CliffReadings::default(),
            };

            self.ff.step(&mut sys, &mut inputs, now)
        }
    }

    fn params() -> Params {
        util::params::from_str(include_str!("../../../params/flame_finder.toml")).unwrap()
    }

    #[test]
    fn test_thresholds() {
        let ff = FlameFinder::new(params());
        assert!(ff.flame_detected(749));
        assert!(!ff.flame_detected(750));
        assert!(ff.flame_extinguished(851));
        assert!(!ff.flame_extinguished(850));
    }

    #[test]
    fn test_flame_position_level() {
        let p = params();
        let pos = flame_position(&p, &Vector2::new(1.0, 2.0), 0.0, 0.3, 0.0);

        assert_abs_diff_eq!(pos[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pos[1], 2.3, epsilon = 1e-12);
        assert_abs_diff_eq!(pos[2], 0.18 + 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_flame_position_tilted() {
        let p = params();
        let tilt = 0.2f64;
        let pos = flame_position(&p, &Vector2::new(0.0, 0.0), FRAC_PI_2, 0.3, tilt);

        let d1 = 0.3 + 0.038 + 0.05 * tilt.sin();
        let z = 0.18 + 0.05 * tilt.cos() + d1 * tilt.tan();

        assert_abs_diff_eq!(pos[0], 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(pos[1], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pos[2], z, epsilon = 1e-12);
    }

    #[test]
    fn test_no_detection_while_turning() {
        let mut rig = Rig::new();

        // Stopped wall follower is not pausable
        assert_eq!(rig.step(0, 100), FlameState::SearchForFlame);

        rig.nav.start(rig.at(0));
        assert_eq!(rig.step(10, 800), FlameState::SearchForFlame);
        assert_eq!(rig.step(20, 100), FlameState::ZeroPan);
        assert_eq!(rig.nav.state(), wall_follow::WallFollowState::Stopped);
    }

    #[test]
    fn test_pan_sweep_finds_heading() {
        let mut rig = Rig::new();
        rig.nav.start(rig.t0);

        // Brightest at a pan of 0.4 rad
        let reading_at = |pan: f64| (100.0 + 1000.0 * (pan - 0.4).abs()).min(1023.0) as u16;

        let mut ms = 0;
        assert_eq!(rig.step(ms, 600), FlameState::ZeroPan);

        let mut state = FlameState::ZeroPan;
        while state != FlameState::TurnToFlameHeading {
            ms += 10;
            assert!(ms < 5000, "sweep never finished, stuck in {:?}", state);
            let reading = reading_at(rig.pan_tilt.pan_rad());
            state = rig.step(ms, reading);
        }

        // Sweep steps are 10 ms at pi/2 rad/s
        assert_abs_diff_eq!(rig.ff.estimate().pan_rad, 0.4, epsilon = 0.016);
        assert_abs_diff_eq!(
            rig.ff.estimate().heading_rad,
            rig.ff.estimate().pan_rad,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_extinguish_dwell() {
        let mut rig = Rig::new();
        rig.ff.state = FlameState::ExtinguishFlame;
        rig.ff.fan_speed = 1.0;

        // Flame goes out
        assert_eq!(rig.step(0, 900), FlameState::CheckFlame);
        assert_eq!(rig.step(2000, 900), FlameState::CheckFlame);
        assert_eq!(rig.step(4900, 900), FlameState::CheckFlame);

        // Flickers back before the dwell completes
        assert_eq!(rig.step(4950, 500), FlameState::ExtinguishFlame);
        assert!(!rig.ff.estimate().extinguished);
        assert_abs_diff_eq!(rig.ff.fan_speed(), 1.0);

        // Out again, the dwell restarts
        assert_eq!(rig.step(5000, 900), FlameState::CheckFlame);
        assert_eq!(rig.step(9900, 900), FlameState::CheckFlame);
        assert!(!rig.ff.estimate().extinguished);

        assert_eq!(rig.step(10_000, 900), FlameState::BackFromCandle);
        assert!(rig.ff.estimate().extinguished);
        assert_abs_diff_eq!(rig.ff.fan_speed(), 0.0);
    }

    #[test]
    fn test_drive_to_candle_stops_in_range() {
        let mut rig = Rig::new();
        rig.ff.state = FlameState::DriveToCandle;
        rig.ff.candle_timer.tic(rig.t0);

        // No echo, keep driving
        assert_eq!(rig.step(100, 500), FlameState::DriveToCandle);

        // Front sensor face is 0.0489 m ahead of the VTC
        rig.array.front_m = 0.25;
        assert_eq!(rig.step(200, 500), FlameState::DriveToCandle);

        rig.array.front_m = 0.19;
        assert_eq!(rig.step(1500, 500), FlameState::LowerTilt);
        assert_abs_diff_eq!(rig.ff.candle_drive_time_s(), 1.5, epsilon = 1e-9);
        assert_abs_diff_eq!(rig.ff.estimate().distance_m, 0.19 + 0.0489 + 0.06, epsilon = 1e-9);
        assert_eq!(rig.drive.dems().left, comms_if::eqpt::WheelDem::Brake);
    }

    #[test]
    fn test_back_from_candle_reverses_for_approach_time() {
        let mut rig = Rig::new();
        rig.ff.state = FlameState::BackFromCandle;
        rig.ff.candle_drive_time_s = 1.0;
        rig.ff.candle_timer.tic(rig.t0);

        assert_eq!(rig.step(500, 900), FlameState::BackFromCandle);
        assert_eq!(rig.step(1000, 900), FlameState::TurnToWall);
    }

    #[test]
    fn test_sweep_timeout_resumes_search() {
        let mut rig = Rig::new();
        rig.ff.params.sweep_timeout_s = Some(0.5);
        rig.nav.start(rig.t0);

        assert_eq!(rig.step(0, 600), FlameState::ZeroPan);
        assert_eq!(rig.step(10, 600), FlameState::GetFlameHeading);

        // Sweep takes a second, so gives up half way
        assert_eq!(rig.step(300, 600), FlameState::GetFlameHeading);
        assert_eq!(rig.step(510, 600), FlameState::SearchForFlame);
        assert!(rig.nav.in_forward_state());
    }

    #[test]
    fn test_tilt_sweep_timeout_resumes_search() {
        let mut rig = Rig::new();
        rig.ff.params.sweep_timeout_s = Some(0.2);
        rig.ff.state = FlameState::LowerTilt;
        rig.pan_tilt.set_tilt(rig.pan_tilt.tilt_servo().min_rad());

        assert_eq!(rig.step(0, 600), FlameState::LowerTilt);
        assert_eq!(rig.step(200, 600), FlameState::GetFlameTilt);

        // Full tilt range at 3.5 rad/s needs about 0.37 s
        assert_eq!(rig.step(300, 600), FlameState::GetFlameTilt);
        assert!(!rig.pan_tilt.is_aimed());
        assert_eq!(rig.step(410, 600), FlameState::SearchForFlame);

        assert!(rig.ff.estimate().position_m.is_none());
        assert!(rig.nav.in_forward_state());
        assert_eq!(rig.drive.dems().left, comms_if::eqpt::WheelDem::Brake);
    }
}
