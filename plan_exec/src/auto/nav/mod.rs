//! # Navigation module
//!
//! The local planner and the pieces it is built from. Each cycle the [`CandidateGenerator`]
//! builds a family of [`Candidate`]s around the centerline, the [`Evaluator`] scores each one
//! against a [`PlanningSnapshot`] of the world, and the selector ranks them into a
//! [`Selection`]. [`LocalPlanner`] runs the whole cycle.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod candidate;
pub mod evaluator;
pub mod generator;
pub mod local_planner;
pub mod polynomial;
pub mod renderer;
pub mod selector;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use candidate::{Candidate, CandidateError};
pub use evaluator::{CostWeights, Evaluator, EvaluatorParams};
pub use generator::{CandidateGenerator, GeneratorParams, TerminalOffsets};
pub use local_planner::{LocalPlanner, LocalPlannerParams};
pub use polynomial::Polynomial;
pub use renderer::{CandidateRenderer, SessionRenderer};
pub use selector::{Feasibility, LocalTarget, Selection};

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use super::{
    map::{MovingObstacle, OccupancyGrid, TerrainLabels},
    path::{Centerline, PathError},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The read-only view of the world a planning cycle works on.
#[derive(Debug, Clone, Copy)]
pub struct PlanningSnapshot<'a> {
    pub centerline: &'a Centerline,

    pub occupancy_grid: &'a OccupancyGrid,

    pub terrain_labels: &'a TerrainLabels,

    pub moving_obstacles: &'a [MovingObstacle],

    /// Current speed of the vehicle, used to predict when it reaches each point of a candidate
    pub speed_ms: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, thiserror::Error)]
pub enum NavError {
    #[error("Candidate horizons must be positive and finite, got {0}")]
    InvalidHorizon(f64),

    #[error("Invalid terminal offsets: {0}")]
    InvalidOffsets(String),

    #[error("Evaluation sample step must be positive and finite, got {0}")]
    InvalidSampleStep(f64),

    #[error("The infeasible cost must be positive and finite, got {0}")]
    InvalidInfeasibleCost(f64),

    #[error("There are no candidates to select from")]
    NoCandidates,

    #[error("Centerline error: {0}")]
    PathError(#[from] PathError),

    #[error("Candidate error: {0}")]
    CandidateError(#[from] CandidateError),
}
