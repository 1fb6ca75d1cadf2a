//! Wall follower states and compass directions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use std::f64::consts::{FRAC_PI_2, PI};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The states of the wall follower.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum WallFollowState {
    /// Not moving
    Stopped,

    /// Following the left wall
    Forward,

    /// Left wall lost, driving on to see if it comes back
    CheckLeft,

    /// Driving past the end of the left wall
    PreTurnLeft,

    /// Turning in place 90 degrees left
    TurnLeft,

    /// Driving out of a turn looking for the left wall
    PostTurn,

    /// Reversing away from a cliff
    BackFromCliff,

    /// Turning in place 90 degrees right
    TurnRight,
}

/// The compass direction the robot is following, in the field frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Direction {
    PosY,
    PosX,
    NegY,
    NegX,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WallFollowState {
    /// Numeric code for telemetry.
    pub fn code(&self) -> u8 {
        match self {
            WallFollowState::Stopped => 1,
            WallFollowState::Forward => 2,
            WallFollowState::CheckLeft => 3,
            WallFollowState::PreTurnLeft => 4,
            WallFollowState::TurnLeft => 5,
            WallFollowState::PostTurn => 6,
            WallFollowState::BackFromCliff => 7,
            WallFollowState::TurnRight => 8,
        }
    }
}

impl Direction {
    /// The heading of this direction.
    pub fn heading_rad(&self) -> f64 {
        match self {
            Direction::PosY => 0f64,
            Direction::PosX => FRAC_PI_2,
            Direction::NegY => PI,
            Direction::NegX => 3f64 * FRAC_PI_2,
        }
    }

    /// The direction 90 degrees to the right (clockwise).
    pub fn right(&self) -> Self {
        match self {
            Direction::PosY => Direction::PosX,
            Direction::PosX => Direction::NegY,
            Direction::NegY => Direction::NegX,
            Direction::NegX => Direction::PosY,
        }
    }

    /// The direction 90 degrees to the left (anticlockwise).
    pub fn left(&self) -> Self {
        match self {
            Direction::PosY => Direction::NegX,
            Direction::PosX => Direction::PosY,
            Direction::NegY => Direction::PosX,
            Direction::NegX => Direction::NegY,
        }
    }
}
