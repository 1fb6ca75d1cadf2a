//! Scripted hardware shared by the mission tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use comms_if::{
    eqpt::{
        CliffReadings, CliffSensors, Fan, FlameSensor, Imu, Servo, SonarArray, SonarId,
        WheelDem, WheelMotor,
    },
    link::{LinkError, LinkEvent, TmLink},
    tm::Telemetry,
};
use firebot_lib::firebot::{FireBotParams, Platform};

/// Everything the scripted devices read from or record to.
#[derive(Debug)]
pub struct Bench {
    pub imu_connected: bool,
    pub imu_heading_rad: f64,

    pub link_setup: Result<(), LinkError>,
    pub begin: Result<(), LinkError>,
    pub link_script: VecDeque<Result<LinkEvent, LinkError>>,
    pub last_tm: Option<Telemetry>,

    pub flame_reading: u16,
    pub front_ping_m: f64,

    pub left_dem: WheelDem,
    pub right_dem: WheelDem,
    pub pan_rad: f64,
    pub tilt_rad: f64,
    pub fan_speed: f64,
}

pub type SharedBench = Rc<RefCell<Bench>>;

impl Default for Bench {
    fn default() -> Self {
        Self {
            imu_connected: true,
            imu_heading_rad: 0.5,
            link_setup: Ok(()),
            begin: Ok(()),
            link_script: VecDeque::new(),
            last_tm: None,
            flame_reading: 1000,
            front_ping_m: 0.0,
            left_dem: WheelDem::Voltage(1.0),
            right_dem: WheelDem::Voltage(1.0),
            pan_rad: 0.0,
            tilt_rad: 0.0,
            fan_speed: 1.0,
        }
    }
}

struct BenchImu(SharedBench);

impl Imu for BenchImu {
    fn setup(&mut self) -> bool {
        self.0.borrow().imu_connected
    }

    fn heading_rad(&mut self) -> f64 {
        self.0.borrow().imu_heading_rad
    }
}

struct BenchMotor {
    bench: SharedBench,
    left: bool,
}

impl WheelMotor for BenchMotor {
    fn encoder_angle_rad(&mut self) -> f64 {
        0.0
    }

    fn reset_encoder(&mut self) {}

    fn set_voltage(&mut self, voltage_v: f64) {
        let mut b = self.bench.borrow_mut();
        if self.left {
            b.left_dem = WheelDem::Voltage(voltage_v);
        } else {
            b.right_dem = WheelDem::Voltage(voltage_v);
        }
    }

    fn brake(&mut self) {
        let mut b = self.bench.borrow_mut();
        if self.left {
            b.left_dem = WheelDem::Brake;
        } else {
            b.right_dem = WheelDem::Brake;
        }
    }
}

/// Sonar that only ever reports the left wall at the follow distance.
struct BenchSonar(SharedBench);

impl SonarArray for BenchSonar {
    fn poll(&mut self) -> Option<(SonarId, f64)> {
        Some((SonarId::Left, 0.23 - 0.1248))
    }

    fn ping_front(&mut self) -> f64 {
        self.0.borrow().front_ping_m
    }
}

struct BenchCliff;

impl CliffSensors for BenchCliff {
    fn read(&mut self) -> CliffReadings {
        CliffReadings { left: 100, right: 100 }
    }
}

struct BenchFlame(SharedBench);

impl FlameSensor for BenchFlame {
    fn read(&mut self) -> u16 {
        self.0.borrow().flame_reading
    }
}

struct BenchServo {
    bench: SharedBench,
    pan: bool,
}

impl Servo for BenchServo {
    fn set_angle(&mut self, angle_rad: f64) {
        let mut b = self.bench.borrow_mut();
        if self.pan {
            b.pan_rad = angle_rad;
        } else {
            b.tilt_rad = angle_rad;
        }
    }
}

struct BenchFan(SharedBench);

impl Fan for BenchFan {
    fn set_speed(&mut self, speed: f64) {
        self.0.borrow_mut().fan_speed = speed;
    }
}

struct BenchLink(SharedBench);

impl TmLink for BenchLink {
    fn setup(&mut self) -> Result<(), LinkError> {
        self.0.borrow().link_setup.clone()
    }

    fn wait_for_begin(&mut self) -> Result<(), LinkError> {
        self.0.borrow().begin.clone()
    }

    fn poll(&mut self, tm: &Telemetry) -> Result<LinkEvent, LinkError> {
        let mut b = self.0.borrow_mut();
        b.last_tm = Some(*tm);
        b.link_script.pop_front().unwrap_or(Ok(LinkEvent::None))
    }
}

pub fn bench() -> SharedBench {
    Rc::new(RefCell::new(Bench::default()))
}

pub fn platform(bench: &SharedBench) -> Platform {
    Platform {
        imu: Box::new(BenchImu(bench.clone())),
        motor_left: Box::new(BenchMotor {
            bench: bench.clone(),
            left: true,
        }),
        motor_right: Box::new(BenchMotor {
            bench: bench.clone(),
            left: false,
        }),
        sonar: Box::new(BenchSonar(bench.clone())),
        cliff: Box::new(BenchCliff),
        flame: Box::new(BenchFlame(bench.clone())),
        pan_servo: Box::new(BenchServo {
            bench: bench.clone(),
            pan: true,
        }),
        tilt_servo: Box::new(BenchServo {
            bench: bench.clone(),
            pan: false,
        }),
        fan: Box::new(BenchFan(bench.clone())),
        link: Box::new(BenchLink(bench.clone())),
    }
}

pub fn params() -> FireBotParams {
    use util::params::from_str;

    FireBotParams {
        firebot: from_str(include_str!("../../../params/firebot.toml")).unwrap(),
        odom: from_str(include_str!("../../../params/odom.toml")).unwrap(),
        drive_sys: from_str(include_str!("../../../params/drive_sys.toml")).unwrap(),
        wall_follow: from_str(include_str!("../../../params/wall_follow.toml")).unwrap(),
        pan_tilt: from_str(include_str!("../../../params/pan_tilt.toml")).unwrap(),
        sonar: from_str(include_str!("../../../params/sonar.toml")).unwrap(),
        flame_finder: from_str(include_str!("../../../params/flame_finder.toml")).unwrap(),
    }
}
