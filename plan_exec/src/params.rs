//! # Planning Executable Parameters
//!
//! This module provide parameters for the planning executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use plan_lib::sim::{VehicleParams, WorldParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanExecParams {
    /// Maximum number of cycles to run for
    pub num_cycles: usize,

    /// If true each cycle is padded out to the cycle period, otherwise the loop runs as fast as
    /// it can
    pub real_time: bool,

    /// Arc length along the centerline the vehicle starts at
    pub start_s_m: f64,

    /// Lateral offset from the centerline the vehicle starts at
    pub start_rho_m: f64,

    /// The run ends once the vehicle is this close to the end of the centerline
    pub goal_margin_m: f64,

    /// Save the candidates of each cycle into the session
    pub save_candidates: bool,

    /// Save the candidates of every n-th cycle only
    pub save_decimation: usize,

    /// Distance between the points saved for each candidate
    pub save_sample_step_m: f64,

    pub world: WorldParams,

    pub vehicle: VehicleParams,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for PlanExecParams {
    fn default() -> Self {
        Self {
            num_cycles: 2000,
            real_time: false,
            start_s_m: 2.0,
            start_rho_m: 0.0,
            goal_margin_m: 5.0,
            save_candidates: false,
            save_decimation: 10,
            save_sample_step_m: 1.0,
            world: WorldParams::default(),
            vehicle: VehicleParams::default(),
        }
    }
}
