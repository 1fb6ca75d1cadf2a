//! Running the robot in the simulated arena

mod common;

use std::time::{Duration, Instant};

use firebot_lib::{
    firebot::{FireBot, TickStatus},
    flame_finder::FlameState,
    sim::{self, SimWorld},
    wall_follow::WallFollowState,
};
use util::maths::{get_ang_dist_2pi, wrap_2pi};

const DT: Duration = Duration::from_millis(10);

fn sim_params() -> sim::Params {
    util::params::from_str(include_str!("../../params/sim.toml")).unwrap()
}

#[test]
fn test_follows_wall_from_start() {
    // A candle the sensor can't see
    let mut params = sim_params();
    params.flame_bright_reading = params.flame_dark_reading;

    let world = SimWorld::shared(params);
    let t0 = Instant::now();
    let mut firebot = FireBot::init(sim::platform(&world), common::params(), t0).unwrap();

    let (x0, y0) = world.borrow().position_m();
    let mut now = t0;

    for _ in 0..500 {
        world.borrow_mut().step(DT.as_secs_f64());
        now += DT;

        let status = firebot.step(now).unwrap();
        assert_eq!(status, TickStatus::Running(FlameState::SearchForFlame));
    }

    // The robot has moved away from the start along the wall
    let (x, y) = world.borrow().position_m();
    assert!(y - y0 > 0.1, "robot only reached y = {:.3}", y);
    assert!((x - x0).abs() < 0.1, "robot wandered to x = {:.3}", x);

    // Odometry agrees with the world, relative to the start pose
    let pose = firebot.odom().pose();
    assert!((pose.position_m[0] - (x - x0)).abs() < 0.05);
    assert!((pose.position_m[1] - (y - y0)).abs() < 0.05);
    assert!(!firebot.is_halted());
}

#[test]
fn test_finds_flame_heading() {
    let params = sim_params();
    let (candle_x, candle_y) = (params.candle_x_m, params.candle_y_m);

    let world = SimWorld::shared(params);
    let t0 = Instant::now();
    let mut firebot = FireBot::init(sim::platform(&world), common::params(), t0).unwrap();
    let mut now = t0;

    let mut sighted = false;
    for _ in 0..1000 {
        world.borrow_mut().step(DT.as_secs_f64());
        now += DT;

        match firebot.step(now).unwrap() {
            TickStatus::Running(FlameState::SearchForFlame) => (),
            TickStatus::Running(FlameState::TurnToFlameHeading) => break,
            TickStatus::Running(_) => {
                sighted = true;
                assert_eq!(firebot.nav().state(), WallFollowState::Stopped);
            }
            s => panic!("unexpected status {:?}", s),
        }
    }

    assert!(sighted);
    assert_eq!(
        firebot.flame_finder().state(),
        FlameState::TurnToFlameHeading
    );

    // The estimated heading points at the candle
    let (x, y) = world.borrow().position_m();
    let bearing = wrap_2pi((candle_x - x).atan2(candle_y - y));
    let est = firebot.flame_finder().estimate().heading_rad;
    assert!(
        get_ang_dist_2pi(est, bearing).abs() < 0.15,
        "estimated {:.3} rad, candle at {:.3} rad",
        est,
        bearing
    );
}

#[test]
fn test_puts_out_candle_and_returns_home() {
    let world = SimWorld::shared(sim_params());
    let t0 = Instant::now();
    let mut firebot = FireBot::init(sim::platform(&world), common::params(), t0).unwrap();
    let mut now = t0;

    let mut cycles = 0;
    loop {
        cycles += 1;
        assert!(
            cycles < 6000,
            "mission stuck in {:?}",
            firebot.flame_finder().state()
        );

        world.borrow_mut().step(DT.as_secs_f64());
        now += DT;

        match firebot.step(now).unwrap() {
            TickStatus::Complete => break,
            TickStatus::Running(_) => (),
            s => panic!("unexpected status {:?}", s),
        }
    }

    let est = firebot.flame_finder().estimate();
    assert!(est.extinguished);
    assert!(est.position_m.is_some());
    assert!(!world.borrow().candle_lit());
    assert_eq!(world.borrow().fan_speed(), 0.0);

    assert!(firebot.odom().near_home());
    assert_eq!(firebot.nav().state(), WallFollowState::Stopped);
    assert_eq!(firebot.summary().mission_state, FlameState::AtHome);
}
