//! # Telemetry link
//!
//! The wireless serial link to the operator's ground station. Framing is the driver's concern,
//! the control core only sees decoded events and the telemetry it hands over.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tm::Telemetry;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// The operator link, polled once per control cycle.
pub trait TmLink {
    /// Bring up the link hardware.
    fn setup(&mut self) -> Result<(), LinkError>;

    /// Block until the operator sends the begin message.
    fn wait_for_begin(&mut self) -> Result<(), LinkError>;

    /// Process any pending message, replying with the given telemetry where the protocol asks
    /// for it.
    fn poll(&mut self, tm: &Telemetry) -> Result<LinkEvent, LinkError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Teleoperation drive command.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct TeleopCmd {
    /// Left wheel voltage
    pub left_v: f64,

    /// Right wheel voltage
    pub right_v: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Outcome of polling the link.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum LinkEvent {
    /// Nothing to act on
    None,

    /// A telemetry request was answered
    TmSent,

    /// The operator sent a teleoperation command
    Teleop(TeleopCmd),

    /// The operator closed the link
    Disconnect,
}

/// Link failures, each with a numeric code for the status indicator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LinkError {
    #[error("Link hardware did not respond during setup")]
    NoResponse,

    #[error("Operator sent an unexpected byte ({0:#04x}) instead of the begin message")]
    BadBegin(u8),

    #[error("No message received within the link timeout")]
    Timeout,

    #[error("Received a frame with an invalid type byte ({0:#04x})")]
    InvalidFrame(u8),

    #[error("Teleop payload did not arrive within the link timeout")]
    PayloadTimeout,
}

impl LinkError {
    /// Numeric code reported on the status indicator.
    pub fn code(&self) -> u8 {
        match self {
            LinkError::NoResponse => 1,
            LinkError::BadBegin(_) => 2,
            LinkError::Timeout => 3,
            LinkError::InvalidFrame(_) => 4,
            LinkError::PayloadTimeout => 5,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_link_error_codes_distinct() {
        let errors = [
            LinkError::NoResponse,
            LinkError::BadBegin(0x07),
            LinkError::Timeout,
            LinkError::InvalidFrame(0xff),
            LinkError::PayloadTimeout,
        ];

        let mut codes: Vec<u8> = errors.iter().map(|e| e.code()).collect();
        codes.dedup();
        assert_eq!(codes, vec![1, 2, 3, 4, 5]);
        assert!(format!("{}", LinkError::InvalidFrame(0x0a)).contains("0x0a"));
    }
}
