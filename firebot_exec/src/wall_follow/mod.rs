//! # Wall follower module
//!
//! Reactive left hand wall following. The robot drives along one of four
//! compass directions, holding the left wall at a fixed distance and slowing
//! for walls ahead. Outside corners are turned left, inside corners and cliffs
//! are turned right.
//!
//! The follower is a state machine stepped once per cycle. Each step drives
//! the [`DriveSystem`] for the current state and then picks the next state.
//! Where several conditions hold at once a cliff wins over a lost left wall,
//! which wins over a wall ahead.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace};
use std::time::Instant;

// Internal
pub use params::Params;
pub use state::{Direction, WallFollowState};
use crate::drive_sys::DriveSystem;
use crate::odom::Odometer;
use crate::pid::PidController;
use crate::sonar::RangeSensors;
use comms_if::eqpt::CliffReadings;
use util::time::Timer;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The wall follower
#[derive(Debug, Clone)]
pub struct WallFollower {
    params: Params,

    state: WallFollowState,

    /// State to resume in after a stop
    paused_state: WallFollowState,

    /// Compass direction being followed
    direction: Direction,

    /// Times the timed states, started on entry to each
    timer: Timer,

    left_wall_pid: PidController,

    front_wall_pid: PidController,

    /// Forward velocity demand while following a wall
    drive_velocity_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WallFollower {
    /// Create a stopped follower facing +y, which will start following when
    /// [`WallFollower::start`] is called.
    pub fn new(params: Params) -> Self {
        Self {
            left_wall_pid: PidController::new(&params.left_wall_pid),
            front_wall_pid: PidController::new(&params.front_wall_pid),
            drive_velocity_ms: params.drive_velocity_max_ms,
            params,
            state: WallFollowState::Stopped,
            paused_state: WallFollowState::Forward,
            direction: Direction::PosY,
            timer: Timer::new(),
        }
    }

    /// Resume from the state the follower was stopped in.
    pub fn start(&mut self, now: Instant) {
        if self.state != WallFollowState::Stopped {
            return;
        }

        self.drive_velocity_ms = self.params.drive_velocity_max_ms;
        self.timer.resume(now);
        self.state = self.paused_state;

        info!("WallFollower started in {:?}", self.state);
    }

    /// Stop the robot, remembering the current state to resume later.
    pub fn stop(&mut self, drive: &mut DriveSystem, now: Instant) {
        if self.state != WallFollowState::Stopped {
            self.paused_state = self.state;
            self.timer.pause(now);
            self.state = WallFollowState::Stopped;

            info!("WallFollower stopped in {:?}", self.paused_state);
        }

        drive.stop();
    }

    /// Run one cycle of the follower.
    pub fn step(
        &mut self,
        drive: &mut DriveSystem,
        odom: &Odometer,
        ranges: &dyn RangeSensors,
        cliff: CliffReadings,
        now: Instant,
    ) -> WallFollowState {
        let next = self.transition(drive, odom, ranges, cliff, now);

        if next != self.state {
            self.enter(next, drive, now);
        }

        self.state
    }

    pub fn state(&self) -> WallFollowState {
        self.state
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The heading of the compass direction being followed.
    pub fn target_heading_rad(&self) -> f64 {
        self.direction.heading_rad()
    }

    /// True in states the follower can be stopped in and resumed from without
    /// losing track of a turn.
    pub fn in_pausable_state(&self) -> bool {
        matches!(
            self.state,
            WallFollowState::Forward | WallFollowState::PostTurn
        )
    }

    pub fn in_forward_state(&self) -> bool {
        self.state == WallFollowState::Forward
    }

    /// True unless the left range shows the wall is further than tolerance.
    /// An invalid reading is treated as near.
    pub fn near_left_wall(&self, ranges: &dyn RangeSensors) -> bool {
        match ranges.left() {
            Some(d) => d <= self.params.wall_distance_m + self.params.left_wall_tolerance_m,
            None => true,
        }
    }

    /// True if the front range shows a wall within tolerance. An invalid
    /// reading is treated as not near.
    pub fn near_front_wall(&self, ranges: &dyn RangeSensors) -> bool {
        match ranges.front() {
            Some(d) => d <= self.params.wall_distance_m + self.params.front_wall_tolerance_m,
            None => false,
        }
    }

    pub fn near_cliff(&self, cliff: CliffReadings) -> bool {
        cliff.left >= self.params.cliff_threshold || cliff.right >= self.params.cliff_threshold
    }

    /// Drive for the current state and decide on the next one.
    fn transition(
        &mut self,
        drive: &mut DriveSystem,
        odom: &Odometer,
        ranges: &dyn RangeSensors,
        cliff: CliffReadings,
        now: Instant,
    ) -> WallFollowState {
        use WallFollowState::*;

        let heading_rad = self.target_heading_rad();
        let vmax_ms = self.params.drive_velocity_max_ms;

        match self.state {
            Stopped => Stopped,

            Forward => {
                let mut drive_heading_rad = heading_rad;
                if let Some(left_m) = ranges.left() {
                    drive_heading_rad += self
                        .left_wall_pid
                        .update(self.params.wall_distance_m - left_m, now);
                }
                if let Some(front_m) = ranges.front() {
                    self.drive_velocity_ms = self
                        .front_wall_pid
                        .update(front_m - self.params.wall_distance_m, now);
                }

                trace!(
                    "WallFollower forward: head {:.4} rad, vel {:.4} m/s",
                    drive_heading_rad,
                    self.drive_velocity_ms
                );
                drive.drive(odom, drive_heading_rad, self.drive_velocity_ms, now);

                if self.near_cliff(cliff) {
                    BackFromCliff
                } else if !self.near_left_wall(ranges) {
                    CheckLeft
                } else if self.near_front_wall(ranges) {
                    TurnRight
                } else {
                    Forward
                }
            }

            CheckLeft => {
                drive.drive(odom, heading_rad, vmax_ms, now);

                if self.near_cliff(cliff) {
                    BackFromCliff
                } else if self.near_left_wall(ranges) {
                    Forward
                } else if self.timer.has_elapsed(now, self.params.wall_check_time_s()) {
                    PreTurnLeft
                } else {
                    CheckLeft
                }
            }

            PreTurnLeft => {
                drive.drive(odom, heading_rad, vmax_ms, now);

                if self.near_cliff(cliff) {
                    BackFromCliff
                } else if self.near_front_wall(ranges) {
                    TurnRight
                } else if self.timer.has_elapsed(now, self.params.pre_turn_time_s()) {
                    TurnLeft
                } else {
                    PreTurnLeft
                }
            }

            TurnLeft | TurnRight => {
                if drive.turn(odom, heading_rad, now) {
                    PostTurn
                } else {
                    self.state
                }
            }

            PostTurn => {
                drive.drive(odom, heading_rad, vmax_ms, now);

                let timed_out = match self.params.post_turn_time_s {
                    Some(t) => self.timer.has_elapsed(now, t),
                    None => false,
                };

                if self.near_cliff(cliff) {
                    BackFromCliff
                } else if self.near_left_wall(ranges) {
                    Forward
                } else if self.near_front_wall(ranges) {
                    TurnRight
                } else if timed_out {
                    CheckLeft
                } else {
                    PostTurn
                }
            }

            BackFromCliff => {
                drive.drive(odom, heading_rad, -vmax_ms, now);

                if self.timer.has_elapsed(now, self.params.cliff_back_time_s()) {
                    TurnRight
                } else {
                    BackFromCliff
                }
            }
        }
    }

    /// Entry actions of each state.
    fn enter(&mut self, next: WallFollowState, drive: &mut DriveSystem, now: Instant) {
        use WallFollowState::*;

        match next {
            Forward => {
                self.drive_velocity_ms = self.params.drive_velocity_max_ms;
                self.left_wall_pid.reset();
                self.front_wall_pid.reset();
            }
            CheckLeft | PreTurnLeft | PostTurn => self.timer.tic(now),
            BackFromCliff => {
                drive.stop();
                self.timer.tic(now);
            }
            TurnLeft => self.direction = self.direction.left(),
            TurnRight => self.direction = self.direction.right(),
            Stopped => (),
        }

        info!(
            "WallFollower state change: {:?} -> {:?} (direction {:?})",
            self.state, next, self.direction
        );

        self.state = next;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
