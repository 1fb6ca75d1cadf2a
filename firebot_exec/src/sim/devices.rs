//! Simulated equipment drivers
//!
//! Each driver holds a handle to the shared [`SimWorld`] and reads or writes
//! the part of it the real device would sense or move.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use std::rc::Rc;

// Internal
use super::SharedWorld;
use comms_if::{
    eqpt::{
        CliffReadings, CliffSensors, Fan, FlameSensor, Imu, Servo, SonarArray, SonarId,
        WheelDem, WheelMotor,
    },
    link::{LinkError, LinkEvent, TmLink},
    tm::Telemetry,
};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Which drive wheel a motor turns.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Which axis of the pan-tilt head a servo turns.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Axis {
    Pan,
    Tilt,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct SimImu {
    world: SharedWorld,
}

pub struct SimMotor {
    world: SharedWorld,
    side: Side,
}

pub struct SimSonar {
    world: SharedWorld,
}

pub struct SimCliff {
    world: SharedWorld,
}

pub struct SimFlame {
    world: SharedWorld,
}

pub struct SimServo {
    world: SharedWorld,
    axis: Axis,
}

pub struct SimFan {
    world: SharedWorld,
}

/// An operator link with nobody on the other end. Begins immediately and
/// never sends a command.
#[derive(Default)]
pub struct SimLink {
    num_tm: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Side {
    fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

impl SimImu {
    pub fn new(world: &SharedWorld) -> Self {
        Self { world: Rc::clone(world) }
    }
}

impl Imu for SimImu {
    fn setup(&mut self) -> bool {
        true
    }

    fn heading_rad(&mut self) -> f64 {
        self.world.borrow().imu_heading_rad()
    }
}

impl SimMotor {
    pub fn new(world: &SharedWorld, side: Side) -> Self {
        Self {
            world: Rc::clone(world),
            side,
        }
    }
}

impl WheelMotor for SimMotor {
    fn encoder_angle_rad(&mut self) -> f64 {
        self.world.borrow().encoder_rad(self.side.index())
    }

    fn reset_encoder(&mut self) {
        self.world.borrow_mut().reset_encoder(self.side.index());
    }

    fn set_voltage(&mut self, voltage_v: f64) {
        self.world
            .borrow_mut()
            .set_wheel_dem(self.side.index(), WheelDem::Voltage(voltage_v));
    }

    fn brake(&mut self) {
        self.world
            .borrow_mut()
            .set_wheel_dem(self.side.index(), WheelDem::Brake);
    }
}

impl SimSonar {
    pub fn new(world: &SharedWorld) -> Self {
        Self { world: Rc::clone(world) }
    }
}

impl SonarArray for SimSonar {
    fn poll(&mut self) -> Option<(SonarId, f64)> {
        self.world.borrow_mut().take_echo()
    }

    fn ping_front(&mut self) -> f64 {
        self.world.borrow().range_m(SonarId::Front)
    }
}

impl SimCliff {
    pub fn new(world: &SharedWorld) -> Self {
        Self { world: Rc::clone(world) }
    }
}

impl CliffSensors for SimCliff {
    fn read(&mut self) -> CliffReadings {
        let reading = self.world.borrow().cliff_reading();
        CliffReadings {
            left: reading,
            right: reading,
        }
    }
}

impl SimFlame {
    pub fn new(world: &SharedWorld) -> Self {
        Self { world: Rc::clone(world) }
    }
}

impl FlameSensor for SimFlame {
    fn read(&mut self) -> u16 {
        self.world.borrow().flame_reading()
    }
}

impl SimServo {
    pub fn new(world: &SharedWorld, axis: Axis) -> Self {
        Self {
            world: Rc::clone(world),
            axis,
        }
    }
}

impl Servo for SimServo {
    fn set_angle(&mut self, angle_rad: f64) {
        let mut world = self.world.borrow_mut();
        match self.axis {
            Axis::Pan => world.set_pan(angle_rad),
            Axis::Tilt => world.set_tilt(angle_rad),
        }
    }
}

impl SimFan {
    pub fn new(world: &SharedWorld) -> Self {
        Self { world: Rc::clone(world) }
    }
}

impl Fan for SimFan {
    fn set_speed(&mut self, speed: f64) {
        self.world.borrow_mut().set_fan(speed);
    }
}

impl TmLink for SimLink {
    fn setup(&mut self) -> Result<(), LinkError> {
        Ok(())
    }

    fn wait_for_begin(&mut self) -> Result<(), LinkError> {
        Ok(())
    }

    fn poll(&mut self, tm: &Telemetry) -> Result<LinkEvent, LinkError> {
        self.num_tm += 1;
        trace!(
            "TM {}: ({:.3}, {:.3}) m, {:.3} rad, nav {}, mission {}",
            self.num_tm,
            tm.position_m[0],
            tm.position_m[1],
            tm.heading_rad,
            tm.nav_state,
            tm.mission_state
        );
        Ok(LinkEvent::None)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
