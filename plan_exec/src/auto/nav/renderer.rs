//! # Candidate Renderer
//!
//! Debug output of the local planner. The planner only knows the [`CandidateRenderer`] trait,
//! [`SessionRenderer`] is the implementation used on the vehicle, writing each candidate set into
//! the session directory as JSON for offline plotting.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::Serialize;

use super::Candidate;
use crate::auto::{map::OccupancyGrid, path::Centerline};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Something which can display or record the candidates of a planning cycle.
pub trait CandidateRenderer: Send {
    /// Render the candidates, along with the grid they were evaluated against and the centerline
    /// waypoints they were built around.
    fn render(&mut self, candidates: &[Candidate], grid: &OccupancyGrid, waypoints: &Centerline);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Saves candidate sets to `local_planner/candidates_{timestamp}.json` in the session.
#[derive(Debug, Clone)]
pub struct SessionRenderer {
    /// Distance between the points saved for each candidate
    sample_step_m: f64,

    /// Include the occupancy grid in the saved data
    save_grid: bool,

    /// Only every `decimation`th call saves anything, never zero
    decimation: usize,

    num_calls: usize,
}

#[derive(Debug, Serialize)]
struct CandidateSetRecord {
    time_s: f64,
    waypoints_m: Vec<Vector2<f64>>,
    candidates: Vec<CandidateRecord>,
    grid: Option<OccupancyGrid>,
}

#[derive(Debug, Serialize)]
struct CandidateRecord {
    rank: Option<usize>,
    feasible: bool,
    cost: f64,
    points_m: Vec<Vector2<f64>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SessionRenderer {
    /// A `decimation` of zero is treated as one, saving on every call.
    pub fn new(sample_step_m: f64, save_grid: bool, decimation: usize) -> Self {
        Self {
            sample_step_m,
            save_grid,
            decimation: decimation.max(1),
            num_calls: 0,
        }
    }

    pub fn decimation(&self) -> usize {
        self.decimation
    }

    /// Number of times `render` has been called.
    pub fn num_calls(&self) -> usize {
        self.num_calls
    }

    fn record(
        &self,
        candidates: &[Candidate],
        grid: &OccupancyGrid,
        waypoints: &Centerline,
    ) -> CandidateSetRecord {
        CandidateSetRecord {
            time_s: util::session::get_elapsed_seconds(),
            waypoints_m: waypoints.points_m.clone(),
            candidates: candidates
                .iter()
                .map(|c| CandidateRecord {
                    rank: c.rank(),
                    feasible: c.is_feasible(),
                    cost: c.cost(),
                    points_m: c.sample_world(waypoints, self.sample_step_m),
                })
                .collect(),
            grid: if self.save_grid {
                Some(grid.clone())
            } else {
                None
            },
        }
    }
}

impl CandidateRenderer for SessionRenderer {
    fn render(&mut self, candidates: &[Candidate], grid: &OccupancyGrid, waypoints: &Centerline) {
        let call = self.num_calls;
        self.num_calls += 1;

        if call % self.decimation != 0 {
            return;
        }

        util::session::save_with_timestamp(
            "local_planner/candidates.json",
            self.record(candidates, grid, waypoints),
        );
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
