//! # Odometer module
//!
//! Dead-reckoning pose estimation from the IMU heading and the drive wheel
//! encoders.
//!
//! Motion between two updates is modelled as a constant-curvature arc. The
//! arc length comes from the encoders, the change in heading from the IMU.
//!
//! ## Frames
//!
//! The field frame has its origin at the robot's start position. Heading is
//! measured from the +y axis, positive clockwise, and is kept in [0, 2pi). In
//! the robot's own frame +y is forward and +x is to the right.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace};
use nalgebra::{Matrix2, Vector2};
use serde::Serialize;
use std::time::Instant;

// Internal
pub use params::Params;
use comms_if::eqpt::{Imu, WheelMotor};
use util::maths::{get_ang_dist_2pi, wrap_2pi};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Position and heading of the VTC in the field frame.
#[derive(Debug, Copy, Clone, Serialize, PartialEq)]
pub struct Pose {
    /// Position of the VTC
    ///
    /// Units: meters
    pub position_m: Vector2<f64>,

    /// Heading, 0 along +y, clockwise positive, in [0, 2pi)
    ///
    /// Units: radians
    pub heading_rad: f64,
}

/// One sample of the odometry sensors.
#[derive(Debug, Copy, Clone)]
pub struct OdomInput {
    /// Raw IMU heading, arbitrary zero
    pub imu_heading_rad: f64,

    /// Left wheel angle since the last encoder reset
    pub enc_left_rad: f64,

    /// Right wheel angle since the last encoder reset
    pub enc_right_rad: f64,

    /// Time the sample was taken
    pub now: Instant,
}

/// The odometer
#[derive(Debug, Clone)]
pub struct Odometer {
    params: Params,

    /// Raw IMU heading captured at setup, subtracted from every sample
    heading_calib_rad: f64,

    pose: Pose,

    /// Forward velocity of the VTC
    velocity_ms: f64,

    /// Clockwise yaw rate
    yaw_rate_rads: f64,

    last_update: Option<Instant>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum OdomError {
    #[error("The IMU did not respond during setup")]
    ImuNotConnected,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Pose {
    fn default() -> Self {
        Self {
            position_m: Vector2::zeros(),
            heading_rad: 0f64,
        }
    }
}

impl Pose {
    /// Straight line distance from the origin.
    pub fn distance_from_origin_m(&self) -> f64 {
        self.position_m.norm()
    }
}

impl Odometer {
    pub fn new(params: Params) -> Self {
        Self {
            params,
            heading_calib_rad: 0f64,
            pose: Pose::default(),
            velocity_ms: 0f64,
            yaw_rate_rads: 0f64,
            last_update: None,
        }
    }

    /// Connect to the IMU and zero the pose on the current heading.
    ///
    /// The encoders are reset so that motion before setup is not counted.
    pub fn setup(
        &mut self,
        imu: &mut dyn Imu,
        left: &mut dyn WheelMotor,
        right: &mut dyn WheelMotor,
        now: Instant,
    ) -> Result<(), OdomError> {
        if !imu.setup() {
            return Err(OdomError::ImuNotConnected);
        }

        left.reset_encoder();
        right.reset_encoder();

        self.zero(imu.heading_rad(), now);

        info!(
            "Odometer zeroed on IMU heading {:.4} rad",
            self.heading_calib_rad
        );

        Ok(())
    }

    /// Zero the pose at the origin, taking the given raw IMU heading as the
    /// field frame's heading zero.
    pub fn zero(&mut self, imu_heading_rad: f64, now: Instant) {
        self.heading_calib_rad = imu_heading_rad;
        self.pose = Pose::default();
        self.velocity_ms = 0f64;
        self.yaw_rate_rads = 0f64;
        self.last_update = Some(now);
    }

    /// Read the sensors, reset the encoders and update the pose.
    pub fn sample(
        &mut self,
        imu: &mut dyn Imu,
        left: &mut dyn WheelMotor,
        right: &mut dyn WheelMotor,
        now: Instant,
    ) -> &Pose {
        let input = OdomInput {
            imu_heading_rad: imu.heading_rad(),
            enc_left_rad: left.encoder_angle_rad(),
            enc_right_rad: right.encoder_angle_rad(),
            now,
        };
        left.reset_encoder();
        right.reset_encoder();

        self.update(&input)
    }

    /// Integrate one odometry sample into the pose.
    pub fn update(&mut self, input: &OdomInput) -> &Pose {
        let heading_rad = wrap_2pi(input.imu_heading_rad - self.heading_calib_rad);
        let d_heading_rad = get_ang_dist_2pi(self.pose.heading_rad, heading_rad);

        let arc_m =
            (input.enc_left_rad + input.enc_right_rad) * self.params.half_wheel_radius_m();

        let dt_s = self
            .last_update
            .map(|t0| input.now.saturating_duration_since(t0).as_secs_f64())
            .unwrap_or(0f64);

        if dt_s > 0f64 {
            self.velocity_ms = arc_m / dt_s;
            self.yaw_rate_rads = d_heading_rad / dt_s;
        } else {
            self.velocity_ms = 0f64;
            self.yaw_rate_rads = 0f64;
        }

        // Displacement along the arc in the robot frame. An exactly zero
        // heading change is a straight line and would otherwise be 0/0.
        let delta_m_rb = if d_heading_rad == 0f64 {
            Vector2::new(0f64, arc_m)
        } else {
            let radius_m = arc_m / d_heading_rad;
            Vector2::new(
                radius_m * (1f64 - d_heading_rad.cos()),
                radius_m * d_heading_rad.sin(),
            )
        };

        // Rotate into the field frame by the current heading
        let (sin_h, cos_h) = heading_rad.sin_cos();
        let rb_to_field = Matrix2::new(cos_h, sin_h, -sin_h, cos_h);

        self.pose.position_m += rb_to_field * delta_m_rb;
        self.pose.heading_rad = heading_rad;
        self.last_update = Some(input.now);

        trace!(
            "Odometer: pos ({:.4}, {:.4}) m, head {:.4} rad, vel {:.4} m/s",
            self.pose.position_m[0],
            self.pose.position_m[1],
            self.pose.heading_rad,
            self.velocity_ms
        );

        &self.pose
    }

    /// True if the robot is within the home threshold of the origin.
    pub fn near_home(&self) -> bool {
        let near = self.pose.distance_from_origin_m() <= self.params.home_distance_threshold_m;
        if near {
            debug!(
                "Odometer near home ({:.3} m from origin)",
                self.pose.distance_from_origin_m()
            );
        }
        near
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn heading_rad(&self) -> f64 {
        self.pose.heading_rad
    }

    pub fn velocity_ms(&self) -> f64 {
        self.velocity_ms
    }

    pub fn yaw_rate_rads(&self) -> f64 {
        self.yaw_rate_rads
    }
}

/// An odometer at rest at the origin with the given heading, for tests of the
/// modules which consume it.
#[cfg(test)]
pub(crate) fn stationary(heading_rad: f64, now: Instant) -> Odometer {
    let mut odom = Odometer::new(Params {
        wheel_diameter_m: 0.0701,
        home_distance_threshold_m: 0.3,
    });
    odom.zero(0f64, now);
    odom.update(&OdomInput {
        imu_heading_rad: heading_rad,
        enc_left_rad: 0f64,
        enc_right_rad: 0f64,
        now,
    });
    odom
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
