//! # Trajectory controllers module
//!
//! This module provides the PID controller used by TrajCtrl.
//!
//! The controller has an optional overshoot limiter to prevent integral windup. While it is
//! enabled the integral gain is ignored until the error first changes sign, and the integral is
//! reset each time the error changes sign after that.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gains and options of a PID controller
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PidParams {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,

    /// Enable the overshoot limiter
    pub overshoot_limiter: bool,
}

/// A PID controller
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Derivative gain
    k_d: f64,

    overshoot_limiter: bool,

    /// The value the controller is driving the measurement towards
    setpoint: f64,

    /// Error of the previous update, zero before the first
    prev_error: f64,

    /// The integral accumulation
    integral: f64,

    /// True once the error has changed sign
    crossed_setpoint: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, thiserror::Error)]
pub enum PidError {
    #[error("The time step must be positive and finite, got {0}")]
    InvalidTimeStep(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for PidParams {
    fn default() -> Self {
        Self {
            k_p: 0.3,
            k_i: 0.0,
            k_d: 0.05,
            overshoot_limiter: true,
        }
    }
}

impl Default for PidController {
    fn default() -> Self {
        Self::from_params(&PidParams::default())
    }
}

impl PidController {
    /// Create a new controller with the given gains and the overshoot limiter enabled.
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self::from_params(&PidParams {
            k_p,
            k_i,
            k_d,
            overshoot_limiter: true,
        })
    }

    pub fn from_params(params: &PidParams) -> Self {
        Self {
            k_p: params.k_p,
            k_i: params.k_i,
            k_d: params.k_d,
            overshoot_limiter: params.overshoot_limiter,
            setpoint: 0.0,
            prev_error: 0.0,
            integral: 0.0,
            crossed_setpoint: false,
        }
    }

    /// Get the control variable for the given measurement, `dt_s` seconds after the previous
    /// update.
    ///
    /// An invalid time step is rejected without changing the state of the controller.
    pub fn get_control_variable(&mut self, measured: f64, dt_s: f64) -> Result<f64, PidError> {
        if !(dt_s.is_finite() && dt_s > 0.0) {
            return Err(PidError::InvalidTimeStep(dt_s));
        }

        let error = self.setpoint - measured;

        // Reset the integral each time the setpoint is crossed
        if self.overshoot_limiter && error * self.prev_error < 0.0 {
            self.integral = 0.0;
            self.crossed_setpoint = true;
        }

        // No integral action before the first crossing
        let k_i = if self.overshoot_limiter && !self.crossed_setpoint {
            0.0
        } else {
            self.k_i
        };

        self.integral += error * dt_s;
        let deriv = (error - self.prev_error) / dt_s;

        let out = self.k_p * error + k_i * self.integral + self.k_d * deriv;

        self.prev_error = error;

        Ok(out)
    }

    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Change the setpoint. The controller's history is kept.
    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    /// Clear the controller's history, keeping its gains and setpoint.
    pub fn reset(&mut self) {
        self.prev_error = 0.0;
        self.integral = 0.0;
        self.crossed_setpoint = false;
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn crossed_setpoint(&self) -> bool {
        self.crossed_setpoint
    }

    pub fn prev_error(&self) -> f64 {
        self.prev_error
    }

    pub fn overshoot_limiter(&self) -> bool {
        self.overshoot_limiter
    }

    pub fn set_overshoot_limiter(&mut self, enabled: bool) {
        self.overshoot_limiter = enabled;
    }

    /// The `(k_p, k_i, k_d)` gains.
    pub fn gains(&self) -> (f64, f64, f64) {
        (self.k_p, self.k_i, self.k_d)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
