//! # Inertial measurement unit interface

/// An absolute heading sensor.
pub trait Imu {
    /// Check the connection to the sensor and configure it.
    ///
    /// Returns `false` if the sensor did not respond.
    fn setup(&mut self) -> bool;

    /// Absolute heading of the sensor.
    ///
    /// Units: radians, clockwise positive, arbitrary zero.
    fn heading_rad(&mut self) -> f64;
}
