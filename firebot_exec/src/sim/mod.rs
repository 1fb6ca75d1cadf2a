//! # Simulated platform
//!
//! A rectangular arena with a lit candle, and a differential drive robot with
//! the FireBot's sensors and actuators. Every equipment trait has a simulated
//! implementation sharing one [`SimWorld`], so the control core runs unchanged
//! without hardware.
//!
//! The world uses the same frame conventions as the odometer: heading is
//! measured clockwise from +y. The arena walls lie along `x = 0`,
//! `x = arena_width_m`, `y = 0` and `y = arena_length_m`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod devices;
mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use std::cell::RefCell;
use std::f64::consts::{FRAC_PI_2, PI};
use std::rc::Rc;

// Internal
pub use devices::*;
pub use params::Params;
use crate::firebot::Platform;
use comms_if::eqpt::{SonarId, WheelDem};
use util::maths::{get_ang_dist_2pi, wrap_2pi};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A world shared between the simulated devices.
pub type SharedWorld = Rc<RefCell<SimWorld>>;

/// State of the simulated arena and robot.
#[derive(Debug, Clone)]
pub struct SimWorld {
    params: Params,

    /// Position of the VTC in the arena
    x_m: f64,
    y_m: f64,

    heading_rad: f64,

    /// Left and right wheel surface speeds
    wheel_speed_ms: [f64; 2],

    /// Left and right wheel demands
    wheel_dems: [WheelDem; 2],

    /// Left and right wheel angles since the last encoder reset
    enc_rad: [f64; 2],

    pan_rad: f64,
    tilt_rad: f64,
    fan_speed: f64,

    candle_lit: bool,

    /// Time the fan has spent blowing on the flame
    blow_time_s: f64,

    /// Time until the next sonar in the rotation completes
    sonar_timer_s: f64,
    sonar_index: usize,
    pending_echo: Option<SonarId>,

    elapsed_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimWorld {
    pub fn new(params: Params) -> Self {
        Self {
            x_m: params.start_x_m,
            y_m: params.start_y_m,
            heading_rad: 0f64,
            wheel_speed_ms: [0f64; 2],
            wheel_dems: [WheelDem::Brake; 2],
            enc_rad: [0f64; 2],
            pan_rad: 0f64,
            tilt_rad: 0f64,
            fan_speed: 0f64,
            candle_lit: true,
            blow_time_s: 0f64,
            sonar_timer_s: params.sonar_period_s,
            sonar_index: 0,
            pending_echo: None,
            elapsed_s: 0f64,
            params,
        }
    }

    /// Create a world ready to be shared between devices.
    pub fn shared(params: Params) -> SharedWorld {
        Rc::new(RefCell::new(Self::new(params)))
    }

    /// Advance the world by `dt_s` seconds.
    pub fn step(&mut self, dt_s: f64) {
        if dt_s <= 0f64 {
            return;
        }
        self.elapsed_s += dt_s;

        // ---- DRIVE ----

        let alpha = (dt_s / self.params.wheel_time_constant_s).min(1f64);
        for i in 0..2 {
            let target_ms = match self.wheel_dems[i] {
                WheelDem::Voltage(v) => v * self.params.speed_per_volt_ms,
                WheelDem::Brake => 0f64,
            };
            self.wheel_speed_ms[i] += (target_ms - self.wheel_speed_ms[i]) * alpha;
            self.enc_rad[i] += self.wheel_speed_ms[i] * dt_s / self.params.wheel_radius_m;
        }

        let [left_ms, right_ms] = self.wheel_speed_ms;
        let speed_ms = 0.5 * (left_ms + right_ms);
        let yaw_rate_rads = (left_ms - right_ms) / self.params.wheel_track_m;

        let mid_heading_rad = self.heading_rad + 0.5 * yaw_rate_rads * dt_s;
        let r = self.params.robot_radius_m;
        self.x_m = (self.x_m + speed_ms * dt_s * mid_heading_rad.sin())
            .max(r)
            .min(self.params.arena_width_m - r);
        self.y_m = (self.y_m + speed_ms * dt_s * mid_heading_rad.cos())
            .max(r)
            .min(self.params.arena_length_m - r);
        self.heading_rad = wrap_2pi(self.heading_rad + yaw_rate_rads * dt_s);

        // ---- SONAR ----

        self.sonar_timer_s -= dt_s;
        if self.sonar_timer_s <= 0f64 {
            self.sonar_timer_s += self.params.sonar_period_s;
            self.pending_echo = Some(SonarId::ALL[self.sonar_index]);
            self.sonar_index = (self.sonar_index + 1) % SonarId::ALL.len();
        }

        // ---- FAN ----

        if self.candle_lit && self.fan_on_flame() {
            self.blow_time_s += self.fan_speed * dt_s;
            if self.blow_time_s >= self.params.extinguish_time_s {
                info!("Sim: candle blown out at {:.2} s", self.elapsed_s);
                self.candle_lit = false;
            }
        }
    }

    /// Distance from a sensor's face to the first obstacle along its axis.
    ///
    /// Zero if there is no echo within range.
    pub fn range_m(&self, id: SonarId) -> f64 {
        let (axis_rad, offset_m) = match id {
            SonarId::Front => (0f64, self.params.front_offset_m),
            SonarId::Right => (FRAC_PI_2, self.params.right_offset_m),
            SonarId::Back => (PI, self.params.back_offset_m),
            SonarId::Left => (-FRAC_PI_2, self.params.left_offset_m),
        };

        let range_m = self.ray_cast(self.heading_rad + axis_rad) - offset_m;
        if range_m <= 0f64 || range_m > self.params.sonar_max_range_m {
            0f64
        } else {
            range_m
        }
    }

    /// Raw flame sensor reading for the current head pose.
    pub fn flame_reading(&self) -> u16 {
        let dark = self.params.flame_dark_reading as f64;
        if !self.candle_lit {
            return self.params.flame_dark_reading;
        }

        let (bearing_rad, dist_m) = self.candle_bearing();
        let sensor_az_rad = wrap_2pi(self.heading_rad + self.pan_rad);
        let az_err_rad = get_ang_dist_2pi(sensor_az_rad, bearing_rad);

        let elevation_rad = (self.params.flame_height_m - self.params.sensor_height_m)
            .atan2(dist_m.max(1e-3));
        let el_err_rad = self.tilt_rad - elevation_rad;

        let az = az_err_rad / self.params.flame_beam_width_rad;
        let el = el_err_rad / self.params.flame_tilt_beam_width_rad;
        let falloff = (self.params.flame_reference_range_m / dist_m.max(1e-3)).min(1f64);
        let intensity = (-0.5 * (az * az + el * el)).exp() * falloff;

        let bright = self.params.flame_bright_reading as f64;
        (dark - (dark - bright) * intensity).round().max(0f64) as u16
    }

    /// True if the candle is still burning.
    pub fn candle_lit(&self) -> bool {
        self.candle_lit
    }

    /// Position of the VTC in the arena.
    pub fn position_m(&self) -> (f64, f64) {
        (self.x_m, self.y_m)
    }

    pub fn heading_rad(&self) -> f64 {
        self.heading_rad
    }

    /// Heading as read by the IMU, which has its own arbitrary zero.
    pub fn imu_heading_rad(&self) -> f64 {
        wrap_2pi(self.heading_rad + self.params.imu_offset_rad)
    }

    pub fn elapsed_s(&self) -> f64 {
        self.elapsed_s
    }

    pub fn fan_speed(&self) -> f64 {
        self.fan_speed
    }

    /// Put the robot at the given pose, at rest.
    pub fn place_robot(&mut self, x_m: f64, y_m: f64, heading_rad: f64) {
        self.x_m = x_m;
        self.y_m = y_m;
        self.heading_rad = wrap_2pi(heading_rad);
        self.wheel_speed_ms = [0f64; 2];
    }

    pub(crate) fn set_wheel_dem(&mut self, index: usize, dem: WheelDem) {
        self.wheel_dems[index] = dem;
    }

    pub(crate) fn encoder_rad(&self, index: usize) -> f64 {
        self.enc_rad[index]
    }

    pub(crate) fn reset_encoder(&mut self, index: usize) {
        self.enc_rad[index] = 0f64;
    }

    pub(crate) fn set_pan(&mut self, angle_rad: f64) {
        self.pan_rad = angle_rad;
    }

    pub(crate) fn set_tilt(&mut self, angle_rad: f64) {
        self.tilt_rad = angle_rad;
    }

    pub(crate) fn set_fan(&mut self, speed: f64) {
        self.fan_speed = speed.max(0f64).min(1f64);
    }

    pub(crate) fn take_echo(&mut self) -> Option<(SonarId, f64)> {
        self.pending_echo.take().map(|id| (id, self.range_m(id)))
    }

    pub(crate) fn cliff_reading(&self) -> u16 {
        self.params.cliff_floor_reading
    }

    /// Bearing (clockwise from +y) and horizontal distance from the VTC to
    /// the candle.
    fn candle_bearing(&self) -> (f64, f64) {
        let dx = self.params.candle_x_m - self.x_m;
        let dy = self.params.candle_y_m - self.y_m;
        (wrap_2pi(dx.atan2(dy)), dx.hypot(dy))
    }

    fn fan_on_flame(&self) -> bool {
        if self.fan_speed <= 0f64 {
            return false;
        }
        let (bearing_rad, dist_m) = self.candle_bearing();
        let az_err_rad =
            get_ang_dist_2pi(wrap_2pi(self.heading_rad + self.pan_rad), bearing_rad);

        dist_m <= self.params.fan_effective_range_m
            && az_err_rad.abs() <= 2f64 * self.params.flame_beam_width_rad
    }

    /// Distance from the VTC to the nearest wall or the candle base along the
    /// given heading.
    fn ray_cast(&self, heading_rad: f64) -> f64 {
        let (dx, dy) = heading_rad.sin_cos();
        let mut dist_m = f64::INFINITY;

        // Walls
        if dx > 1e-9 {
            dist_m = dist_m.min((self.params.arena_width_m - self.x_m) / dx);
        } else if dx < -1e-9 {
            dist_m = dist_m.min(-self.x_m / dx);
        }
        if dy > 1e-9 {
            dist_m = dist_m.min((self.params.arena_length_m - self.y_m) / dy);
        } else if dy < -1e-9 {
            dist_m = dist_m.min(-self.y_m / dy);
        }

        // Candle base
        let cx = self.params.candle_x_m - self.x_m;
        let cy = self.params.candle_y_m - self.y_m;
        let along_m = cx * dx + cy * dy;
        let miss_sq = cx * cx + cy * cy - along_m * along_m;
        let radius_sq = self.params.candle_base_radius_m.powi(2);
        if along_m > 0f64 && miss_sq <= radius_sq {
            dist_m = dist_m.min(along_m - (radius_sq - miss_sq).sqrt());
        }

        debug_assert!(dist_m.is_finite());
        dist_m
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Build a platform of simulated devices sharing the given world.
pub fn platform(world: &SharedWorld) -> Platform {
    debug!("Building simulated platform");
    Platform {
        imu: Box::new(SimImu::new(world)),
        motor_left: Box::new(SimMotor::new(world, Side::Left)),
        motor_right: Box::new(SimMotor::new(world, Side::Right)),
        sonar: Box::new(SimSonar::new(world)),
        cliff: Box::new(SimCliff::new(world)),
        flame: Box::new(SimFlame::new(world)),
        pan_servo: Box::new(SimServo::new(world, Axis::Pan)),
        tilt_servo: Box::new(SimServo::new(world, Axis::Tilt)),
        fan: Box::new(SimFan::new(world)),
        link: Box::new(SimLink::default()),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn world() -> SimWorld {
        SimWorld::new(util::params::from_str(include_str!("../../../params/sim.toml")).unwrap())
    }

    #[test]
    fn test_ranges_from_start() {
        let w = world();

        // Start is 0.23 m from the x = 0 wall, facing +y
        assert_abs_diff_eq!(w.range_m(SonarId::Left), 0.23 - 0.1248, epsilon = 1e-9);
        assert_abs_diff_eq!(w.range_m(SonarId::Back), 0.3 - 0.1284, epsilon = 1e-9);
        assert_abs_diff_eq!(w.range_m(SonarId::Front), 2.4 - 0.3 - 0.0489, epsilon = 1e-9);
        assert_abs_diff_eq!(w.range_m(SonarId::Right), 2.4 - 0.23 - 0.1248, epsilon = 1e-9);
    }

    #[test]
    fn test_no_echo_when_against_wall() {
        let mut w = world();
        w.place_robot(0.23, 0.12, 0.0);
        assert_eq!(w.range_m(SonarId::Back), 0.0);
    }

    #[test]
    fn test_ray_hits_candle() {
        let mut w = world();
        w.place_robot(1.5, 0.5, 0.0);

        // Candle centre is 0.7 m ahead
        assert_abs_diff_eq!(w.range_m(SonarId::Front), 0.7 - 0.06 - 0.0489, epsilon = 1e-9);
    }

    #[test]
    fn test_drives_straight() {
        let mut w = world();
        w.set_wheel_dem(0, WheelDem::Voltage(3.0));
        w.set_wheel_dem(1, WheelDem::Voltage(3.0));

        for _ in 0..200 {
            w.step(0.01);
        }

        let (x, y) = w.position_m();
        assert_abs_diff_eq!(x, 0.23, epsilon = 1e-9);
        assert!(y > 0.3 + 0.2);
        assert_abs_diff_eq!(w.heading_rad(), 0.0, epsilon = 1e-12);

        // Both encoders agree with the distance travelled
        let arc = 0.5 * (w.encoder_rad(0) + w.encoder_rad(1)) * 0.03505;
        assert_abs_diff_eq!(arc, y - 0.3, epsilon = 1e-9);
    }

    #[test]
    fn test_turns_clockwise() {
        let mut w = world();
        w.set_wheel_dem(0, WheelDem::Voltage(2.0));
        w.set_wheel_dem(1, WheelDem::Voltage(-2.0));
        w.step(0.1);

        assert!(w.heading_rad() > 0.0 && w.heading_rad() < 1.0);
    }

    #[test]
    fn test_flame_brightest_when_aimed() {
        let mut w = world();
        w.place_robot(1.5, 0.8, 0.0);

        let aimed = w.flame_reading();
        w.set_pan(0.5);
        let off = w.flame_reading();

        assert!(aimed < 750, "aimed reading {}", aimed);
        assert!(off > aimed);
    }

    #[test]
    fn test_fan_blows_out_candle() {
        let mut w = world();
        w.place_robot(1.5, 0.9, 0.0);
        w.set_fan(1.0);

        for _ in 0..100 {
            w.step(0.01);
        }
        assert!(w.candle_lit());

        for _ in 0..60 {
            w.step(0.01);
        }
        assert!(!w.candle_lit());
        assert_eq!(w.flame_reading(), 1000);
    }

    #[test]
    fn test_sonar_rotation() {
        let mut w = world();
        let mut seen = Vec::new();
        for _ in 0..10 {
            w.step(0.025);
            if let Some((id, _)) = w.take_echo() {
                seen.push(id);
            }
        }
        assert_eq!(&seen[..4], &SonarId::ALL[..]);
    }
}
