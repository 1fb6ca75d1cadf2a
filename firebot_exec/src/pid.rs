//! # PID controller module
//!
//! This module provides the PID controller used by every control loop on the
//! robot (heading, velocity and wall distance).
//!
//! The controller is time-aware, the caller passes in the instant at which the
//! error was measured and the controller works out its own delta-time.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::{Deserialize, Serialize};
use std::time::Instant;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gains and limits of a single PID controller.
#[derive(Deserialize, Debug, Clone)]
pub struct PidParams {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,

    /// Minimum output
    pub out_min: f64,

    /// Maximum output
    pub out_max: f64,

    /// If more than this time passes between two updates the controller is
    /// treated as freshly reset before computing the output.
    ///
    /// Units: seconds
    #[serde(default)]
    pub reset_timeout_s: Option<f64>,
}

/// A PID controller
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Previous instant that the error was passed in
    #[serde(skip)]
    prev_time: Option<Instant>,

    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// Output limits
    out_min: f64,
    out_max: f64,

    /// Stale controller timeout
    reset_timeout_s: Option<f64>,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64,

    /// The most recent derivative
    deriv: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {
    /// Create a new controller from the given parameters.
    pub fn new(params: &PidParams) -> Self {
        Self {
            prev_time: None,
            k_p: params.k_p,
            k_i: params.k_i,
            k_d: params.k_d,
            out_min: params.out_min,
            out_max: params.out_max,
            reset_timeout_s: params.reset_timeout_s,
            prev_error: None,
            integral: 0f64,
            deriv: 0f64,
        }
    }

    /// Get the value of the controller for the given error measured at `now`.
    pub fn update(&mut self, error: f64, now: Instant) -> f64 {
        // Calculate dt
        let mut dt = self
            .prev_time
            .map(|t0| now.saturating_duration_since(t0).as_secs_f64());

        // A controller which hasn't been updated for a while starts cold, so
        // that an old integral doesn't kick the output.
        if let (Some(t), Some(timeout)) = (dt, self.reset_timeout_s) {
            if t > timeout {
                trace!("PID stale for {:.3} s, resetting", t);
                self.reset();
                dt = None;
            }
        }

        // Accumulate the integral and calculate the derivative.
        //
        // Without a time difference neither term is updated, adding the raw
        // error would spike the output compared to normal operation.
        match (dt, self.prev_error) {
            (Some(t), Some(e)) if t > 0f64 => {
                self.integral += error * t;
                self.deriv = (error - e) / t;
            }
            _ => self.deriv = 0f64,
        }

        let out = self.k_p * error + self.k_i * self.integral + self.k_d * self.deriv;

        // Remember the previous error and time
        self.prev_error = Some(error);
        self.prev_time = Some(now);

        out.max(self.out_min).min(self.out_max)
    }

    /// Returns true if the last error and derivative are both within the given
    /// tolerances.
    ///
    /// A controller that has never been updated is not at steady state.
    pub fn steady_state(&self, value_tol: f64, deriv_tol: f64) -> bool {
        match self.prev_error {
            Some(e) => e.abs() <= value_tol && self.deriv.abs() <= deriv_tol,
            None => false,
        }
    }

    /// Clear the integral and the error history.
    pub fn reset(&mut self) {
        self.integral = 0f64;
        self.deriv = 0f64;
        self.prev_error = None;
        self.prev_time = None;
    }

    /// The integral accumulation
    pub fn integral(&self) -> f64 {
        self.integral
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::time::Duration;

    fn params(k_p: f64, k_i: f64, k_d: f64) -> PidParams {
        PidParams {
            k_p,
            k_i,
            k_d,
            out_min: -100.0,
            out_max: 100.0,
            reset_timeout_s: Some(0.2),
        }
    }

    fn ms(t0: Instant, ms: u64) -> Instant {
        t0 + Duration::from_millis(ms)
    }

    #[test]
    fn test_first_update_is_proportional() {
        let t0 = Instant::now();
        let mut pid = PidController::new(&params(2.0, 5.0, 3.0));

        assert_abs_diff_eq!(pid.update(1.5, t0), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pid.integral(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_integral_and_derivative() {
        let t0 = Instant::now();
        let mut pid = PidController::new(&params(1.0, 2.0, 0.5));

        pid.update(1.0, t0);
        let out = pid.update(2.0, ms(t0, 100));

        // P = 2, I = 2 * (2 * 0.1), D = 0.5 * (1 / 0.1)
        assert_abs_diff_eq!(out, 2.0 + 0.4 + 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_output_clamped() {
        let t0 = Instant::now();
        let mut pid = PidController::new(&PidParams {
            out_min: -3.0,
            out_max: 3.0,
            ..params(40.0, 0.0, 0.0)
        });

        assert_abs_diff_eq!(pid.update(1.0, t0), 3.0);
        assert_abs_diff_eq!(pid.update(-1.0, ms(t0, 10)), -3.0);
    }

    #[test]
    fn test_zero_error_settles_without_integral() {
        let t0 = Instant::now();
        let mut pid = PidController::new(&params(3.0, 0.0, 0.2));

        pid.update(0.5, t0);
        let mut out = 1.0;
        for i in 1..10 {
            out = pid.update(0.0, ms(t0, i * 10));
        }

        assert_abs_diff_eq!(out, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_stale_controller_matches_cold_start() {
        let t0 = Instant::now();
        let mut pid = PidController::new(&params(1.0, 10.0, 1.0));

        // Build up a large integral
        for i in 0..20 {
            pid.update(5.0, ms(t0, i * 10));
        }
        assert!(pid.integral() > 0.5);

        // Wait past the reset timeout
        let late = ms(t0, 190 + 500);
        let out = pid.update(0.7, late);

        let mut fresh = PidController::new(&params(1.0, 10.0, 1.0));
        assert_abs_diff_eq!(out, fresh.update(0.7, late), epsilon = 1e-12);
        assert_abs_diff_eq!(pid.integral(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_no_timeout_keeps_integral() {
        let t0 = Instant::now();
        let mut pid = PidController::new(&PidParams {
            reset_timeout_s: None,
            ..params(0.0, 1.0, 0.0)
        });

        pid.update(1.0, t0);
        let out = pid.update(1.0, ms(t0, 2000));

        assert_abs_diff_eq!(out, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_steady_state() {
        let t0 = Instant::now();
        let mut pid = PidController::new(&params(1.0, 0.0, 0.0));

        assert!(!pid.steady_state(0.02, 0.002));

        pid.update(0.5, t0);
        pid.update(0.01, ms(t0, 10));
        // Error is in tolerance but still moving fast
        assert!(!pid.steady_state(0.02, 0.002));

        pid.update(0.01, ms(t0, 20));
        assert!(pid.steady_state(0.02, 0.002));

        pid.reset();
        assert!(!pid.steady_state(0.02, 0.002));
    }
}
