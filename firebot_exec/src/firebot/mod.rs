//! # FireBot module
//!
//! The top level of the robot. [`FireBot`] owns every control module and the
//! equipment [`Platform`], and runs them in a fixed order once per cycle:
//!
//! 1. Odometry
//! 2. Pan-tilt servo slewing
//! 3. The mission state machine, which runs the wall follower while searching
//!    and going home
//! 4. Actuator output
//! 5. Telemetry and teleop over the operator link

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod platform;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, error, info, warn};
use serde::Serialize;
use std::time::Instant;

// Internal
pub use params::{FireBotParams, Params};
pub use platform::Platform;
use crate::drive_sys::DriveSystem;
use crate::flame_finder::{FlameEstimate, FlameFinder, FlameState, Inputs, Subsystems};
use crate::odom::{OdomError, Odometer, Pose};
use crate::pan_tilt::PanTilt;
use crate::sonar::Sonar;
use crate::wall_follow::WallFollower;
use comms_if::{
    link::{LinkError, LinkEvent, TeleopCmd},
    tm::Telemetry,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The robot
pub struct FireBot {
    params: Params,

    platform: Platform,

    odom: Odometer,

    drive: DriveSystem,

    nav: WallFollower,

    pan_tilt: PanTilt,

    sonar: Sonar,

    flame: FlameFinder,

    /// Latest command from the operator
    teleop: Option<TeleopCmd>,

    /// Set when the operator disconnects, no further cycles are run
    halted: bool,

    num_cycles: u64,
}

/// Summary of the mission saved at the end of a run.
#[derive(Debug, Clone, Serialize)]
pub struct MissionSummary {
    pub num_cycles: u64,
    pub mission_state: FlameState,
    pub halted: bool,
    pub final_pose: Pose,
    pub flame: FlameEstimate,
    pub candle_drive_time_s: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Failures while bringing the robot up. The mission never starts.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("IMU setup failed: {0}")]
    Imu(OdomError),

    #[error("Operator link setup failed: {0}")]
    LinkSetup(LinkError),

    #[error("Operator begin handshake failed: {0}")]
    Begin(LinkError),
}

/// Failures during a cycle. Retrying is up to the caller.
#[derive(Debug, thiserror::Error)]
pub enum FireBotError {
    #[error("Operator link error: {0}")]
    Link(LinkError),
}

/// Outcome of a cycle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TickStatus {
    /// The mission is in progress in the given state
    Running(FlameState),

    /// The robot is home
    Complete,

    /// The operator disconnected, the robot is braked
    Halted,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl InitError {
    /// Numeric code identifying the failed subsystem.
    pub fn code(&self) -> u8 {
        match self {
            InitError::Imu(_) => 1,
            InitError::LinkSetup(_) => 2,
            InitError::Begin(_) => 3,
        }
    }
}

impl FireBotError {
    /// Numeric code of the underlying failure.
    pub fn code(&self) -> u8 {
        match self {
            FireBotError::Link(e) => e.code(),
        }
    }
}

impl FireBot {
    /// Bring up the equipment and wait for the operator to begin.
    pub fn init(
        mut platform: Platform,
        params: FireBotParams,
        now: Instant,
    ) -> Result<Self, InitError> {
        platform.motor_left.brake();
        platform.motor_right.brake();
        platform.fan.set_speed(0f64);

        let mut odom = Odometer::new(params.odom);
        odom.setup(
            platform.imu.as_mut(),
            platform.motor_left.as_mut(),
            platform.motor_right.as_mut(),
            now,
        )
        .map_err(InitError::Imu)?;

        platform.link.setup().map_err(InitError::LinkSetup)?;

        info!("Waiting for the operator to begin");
        platform.link.wait_for_begin().map_err(InitError::Begin)?;

        let mut nav = WallFollower::new(params.wall_follow);
        nav.start(now);

        info!("FireBot initialised, searching for flame");

        Ok(Self {
            params: params.firebot,
            platform,
            odom,
            drive: DriveSystem::new(params.drive_sys),
            nav,
            pan_tilt: PanTilt::new(&params.pan_tilt),
            sonar: Sonar::new(params.sonar),
            flame: FlameFinder::new(params.flame_finder),
            teleop: None,
            halted: false,
            num_cycles: 0,
        })
    }

    /// Run one control cycle.
    pub fn step(&mut self, now: Instant) -> Result<TickStatus, FireBotError> {
        if self.halted {
            return Ok(TickStatus::Halted);
        }

        self.num_cycles += 1;

        // ---- ODOMETRY ----

        self.odom.sample(
            self.platform.imu.as_mut(),
            self.platform.motor_left.as_mut(),
            self.platform.motor_right.as_mut(),
            now,
        );

        // ---- PAN-TILT ----

        self.pan_tilt.update(now);

        // ---- MISSION ----

        let mut inputs = Inputs {
            sonar_array: self.platform.sonar.as_mut(),
            flame_reading: self.platform.flame.read(),
            cliff: self.platform.cliff.read(),
        };
        let mut sys = Subsystems {
            odom: &self.odom,
            drive: &mut self.drive,
            nav: &mut self.nav,
            pan_tilt: &mut self.pan_tilt,
            sonar: &mut self.sonar,
        };
        let state = self.flame.step(&mut sys, &mut inputs, now);

        if state == FlameState::AtHome && self.params.teleop_at_home {
            if let Some(cmd) = self.teleop {
                self.drive.set_voltages(cmd.left_v, cmd.right_v);
            }
        }

        // ---- ACTUATORS ----

        self.drive.apply(
            self.platform.motor_left.as_mut(),
            self.platform.motor_right.as_mut(),
        );
        self.pan_tilt.apply(
            self.platform.pan_servo.as_mut(),
            self.platform.tilt_servo.as_mut(),
        );
        self.platform.fan.set_speed(self.flame.fan_speed());

        // ---- OPERATOR LINK ----

        let tm = self.telemetry();
        match self.platform.link.poll(&tm) {
            Ok(LinkEvent::Teleop(cmd)) => {
                debug!("Teleop: L {:.2} V, R {:.2} V", cmd.left_v, cmd.right_v);
                self.teleop = Some(cmd);
            }
            Ok(LinkEvent::Disconnect) => {
                warn!("Operator disconnected, halting");
                self.halt();
                return Ok(TickStatus::Halted);
            }
            Ok(LinkEvent::None) | Ok(LinkEvent::TmSent) => (),
            Err(e) => {
                error!("Operator link error (code {}): {}", e.code(), e);
                return Err(FireBotError::Link(e));
            }
        }

        Ok(match state {
            FlameState::AtHome => TickStatus::Complete,
            s => TickStatus::Running(s),
        })
    }

    /// Brake, stop the fan and refuse to run any more cycles.
    pub fn halt(&mut self) {
        self.drive.stop();
        self.drive.apply(
            self.platform.motor_left.as_mut(),
            self.platform.motor_right.as_mut(),
        );
        self.platform.fan.set_speed(0f64);
        self.halted = true;

        info!("FireBot halted after {} cycles", self.num_cycles);
    }

    /// Snapshot of the robot state for the operator.
    pub fn telemetry(&self) -> Telemetry {
        let pose = self.odom.pose();
        Telemetry {
            position_m: [pose.position_m[0], pose.position_m[1]],
            heading_rad: pose.heading_rad,
            velocity_ms: self.odom.velocity_ms(),
            nav_state: self.nav.state().code(),
            mission_state: self.flame.state().code(),
            ranges_m: self.sonar.readings().to_array(),
        }
    }

    pub fn summary(&self) -> MissionSummary {
        MissionSummary {
            num_cycles: self.num_cycles,
            mission_state: self.flame.state(),
            halted: self.halted,
            final_pose: *self.odom.pose(),
            flame: *self.flame.estimate(),
            candle_drive_time_s: self.flame.candle_drive_time_s(),
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn odom(&self) -> &Odometer {
        &self.odom
    }

    pub fn nav(&self) -> &WallFollower {
        &self.nav
    }

    pub fn flame_finder(&self) -> &FlameFinder {
        &self.flame
    }

    pub fn pan_tilt(&self) -> &PanTilt {
        &self.pan_tilt
    }

    pub fn drive(&self) -> &DriveSystem {
        &self.drive
    }

    /// The latest teleop command received, if any.
    pub fn teleop(&self) -> Option<TeleopCmd> {
        self.teleop
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn num_cycles(&self) -> u64 {
        self.num_cycles
    }
}
