//! # Communications interface crate.
//!
//! Provides the interfaces between the FireBot control core and everything
//! outside it: the equipment drivers and the wireless telemetry link.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Equipment interfaces (sensors and actuators) consumed by the control core
pub mod eqpt;

/// Telemetry link interface and teleoperation commands
pub mod link;

/// Telemetry snapshot sent over the link
pub mod tm;
