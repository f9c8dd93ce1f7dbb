//! Trajectory control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use serde::Serialize;

// Internal
use super::*;
use crate::auto::{loc::FrenetState, nav::Selection};
use util::{maths::poly_val, params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct TrajCtrl {
    params: Params,

    report: StatusReport,

    /// Lateral offset controller, output is a curvature demand
    lat_ctrl: PidController,

    /// Heading controller, output is a curvature demand
    head_ctrl: PidController,

    /// Speed controller, output is a throttle demand
    speed_ctrl: PidController,
}

/// The command sent to the vehicle's actuation layer.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize)]
pub struct DriveCmd {
    /// Demanded path curvature, +ve turning left
    pub curv_m: f64,

    /// The speed the throttle demand is driving towards
    pub speed_dem_ms: f64,

    /// Normalised throttle demand, -1 is full braking and 1 full throttle
    pub throttle: f64,
}

/// The status report containing various error flags and monitoring quantities.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct StatusReport {
    /// Lateral error to the local target, +ve if the target is to the left
    pub lat_error_m: f64,

    /// Heading error to the candidate at the local target
    pub head_error_rad: f64,

    /// Speed error to the speed demand
    pub speed_error_ms: f64,

    /// If true the limit on the lateral error has been exceeded
    pub lat_error_limit_exceeded: bool,

    /// If true the curvature demand was limited
    pub curv_dem_saturated: bool,

    /// If true the throttle demand was limited
    pub throttle_saturated: bool,

    /// If true a stop was demanded since no candidate was feasible
    pub stopped_no_feasible: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Potential errors that can occur during processing of the module.
#[derive(Debug, thiserror::Error)]
pub enum TrajCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(params::LoadError),

    #[error("Controller error: {0}")]
    Pid(#[from] PidError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajCtrl {
    /// Intiailise the TrajCtrl module from the parameter file at `params_path`, relative to the
    /// parameters directory.
    pub fn init(params_path: &str) -> Result<Self, TrajCtrlError> {
        let params = params::load(params_path).map_err(TrajCtrlError::ParamLoadError)?;

        Ok(Self::new(params))
    }

    pub fn new(params: Params) -> Self {
        info!(
            "TrajCtrl initialised, lookahead {:.2} m, speed demand limits [{:.2}, {:.2}] m/s",
            params.lookahead_m, params.min_speed_dem_ms, params.max_speed_dem_ms
        );

        Self {
            lat_ctrl: PidController::from_params(&params.lat_pid),
            head_ctrl: PidController::from_params(&params.head_pid),
            speed_ctrl: PidController::from_params(&params.speed_pid),
            report: StatusReport::default(),
            params,
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The report of the most recent step.
    pub fn report(&self) -> StatusReport {
        self.report
    }

    /// Reset all controllers, for instance after the vehicle is stopped.
    pub fn reset(&mut self) {
        self.lat_ctrl.reset();
        self.head_ctrl.reset();
        self.speed_ctrl.reset();
        self.report = StatusReport::default();
    }

    /// Calculate the drive command which follows the selected candidate.
    ///
    /// `state` is the vehicle's current state relative to the centerline, `speed_ms` its current
    /// speed and `dt_s` the time since the previous step.
    pub fn step(
        &mut self,
        selection: &Selection,
        state: &FrenetState,
        speed_ms: f64,
        dt_s: f64,
    ) -> Result<DriveCmd, TrajCtrlError> {
        // Check up front so that no controller is updated when another would reject the step
        if !(dt_s.is_finite() && dt_s > 0.0) {
            return Err(PidError::InvalidTimeStep(dt_s).into());
        }

        let mut report = StatusReport::default();

        let target = selection.local_target(self.params.lookahead_m);

        // Lateral and heading errors to the target, the heading of the vehicle and target
        // relative to the centerline coming from their slopes
        let target_head_rad = target.slope.atan();
        let head_rad = state.slope.atan();

        report.lat_error_m = target.rho_m - state.rho_m;
        report.head_error_rad = target_head_rad - head_rad;

        if report.lat_error_m.abs() > self.params.lat_error_limit_m {
            report.lat_error_limit_exceeded = true;
        }

        self.lat_ctrl.set_setpoint(target.rho_m);
        self.head_ctrl.set_setpoint(target_head_rad);

        // Both controllers output curvature demands, which are summed and saturated
        let curv_raw_m = self.lat_ctrl.get_control_variable(state.rho_m, dt_s)?
            + self.head_ctrl.get_control_variable(head_rad, dt_s)?;
        let curv_dem_m = curv_raw_m.clamp(self.params.min_curv_dem_m, self.params.max_curv_dem_m);
        report.curv_dem_saturated = curv_dem_m != curv_raw_m;

        // Speed demand from the curvature, the tighter the turn the slower the speed
        let speed_dem_ms = if !selection.is_feasible() && self.params.stop_on_infeasible {
            report.stopped_no_feasible = true;
            warn!("No feasible candidate, demanding a stop");
            0.0
        } else {
            poly_val(curv_dem_m.abs(), &self.params.curv_speed_map_coeffs)
                .clamp(self.params.min_speed_dem_ms, self.params.max_speed_dem_ms)
        };

        self.speed_ctrl.set_setpoint(speed_dem_ms);
        report.speed_error_ms = speed_dem_ms - speed_ms;

        let throttle_raw = self.speed_ctrl.get_control_variable(speed_ms, dt_s)?;
        let throttle = throttle_raw.clamp(-1.0, 1.0);
        report.throttle_saturated = throttle != throttle_raw;

        debug!(
            "TrajCtrl: lat err {:.3} m, head err {:.3} rad, curv {:.3} 1/m, speed dem {:.2} m/s, \
             throttle {:.2}",
            report.lat_error_m, report.head_error_rad, curv_dem_m, speed_dem_ms, throttle
        );

        self.report = report;

        Ok(DriveCmd {
            curv_m: curv_dem_m,
            speed_dem_ms,
            throttle,
        })
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
