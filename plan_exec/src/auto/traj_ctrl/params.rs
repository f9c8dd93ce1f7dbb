//! Trajectory control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::PidParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for trajectory control
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct Params {
    /// Lateral offset controller
    pub lat_pid: PidParams,

    /// Heading error controller
    pub head_pid: PidParams,

    /// Speed controller
    pub speed_pid: PidParams,

    /// Distance along the chosen candidate of the point the vehicle steers towards
    pub lookahead_m: f64,

    /// Curvature demand minimum limit
    pub min_curv_dem_m: f64,

    /// Curvature demand maximum limit
    pub max_curv_dem_m: f64,

    /// Curvature to speed map coefficients
    ///
    /// The order of these coefficients is highest power first, i.e if there
    /// are 3 coefficients it's a 2nd order polynomial with c[0]*x^2 + c[1]*x
    /// + c[2]. The map is applied to the absolute curvature demand.
    pub curv_speed_map_coeffs: Vec<f64>,

    /// Minimum speed demand
    pub min_speed_dem_ms: f64,

    /// Maximum speed demand
    pub max_speed_dem_ms: f64,

    /// Demand zero speed when the planner finds no feasible candidate
    pub stop_on_infeasible: bool,

    /// The limit on lateral error, exceeding it is flagged in the status report
    pub lat_error_limit_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            lat_pid: PidParams::default(),
            head_pid: PidParams {
                k_p: 1.0,
                k_i: 0.0,
                k_d: 0.0,
                overshoot_limiter: true,
            },
            speed_pid: PidParams {
                k_p: 0.5,
                k_i: 0.1,
                k_d: 0.0,
                overshoot_limiter: true,
            },
            lookahead_m: 3.0,
            min_curv_dem_m: -0.5,
            max_curv_dem_m: 0.5,
            curv_speed_map_coeffs: vec![-4.0, 2.0],
            min_speed_dem_ms: 0.0,
            max_speed_dem_ms: 2.0,
            stop_on_infeasible: true,
            lat_error_limit_m: 2.0,
        }
    }
}
