//! # Local Planner
//!
//! Runs one planning cycle: generate the candidate set around the centerline, evaluate every
//! candidate against the planning snapshot, then rank them and choose one.
//!
//! Evaluation of each candidate only reads the snapshot and writes to the candidate itself, so
//! the candidate set is split into chunks which are evaluated on scoped worker threads. All
//! workers are joined before selection.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::{
    generator::{CandidateGenerator, GeneratorParams},
    renderer::CandidateRenderer,
    selector::{self, Selection},
    Candidate, Evaluator, EvaluatorParams, NavError, PlanningSnapshot,
};
use crate::auto::loc::FrenetState;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the local planner, loaded from `local_planner.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalPlannerParams {
    pub generator: GeneratorParams,

    pub evaluator: EvaluatorParams,

    /// Maximum number of threads candidates are evaluated on. 0 or 1 evaluates on the calling
    /// thread.
    pub num_workers: usize,

    /// Expected maximum duration of one cycle. Longer cycles are reported but not interrupted.
    pub cycle_budget_s: f64,
}

/// The local planner
pub struct LocalPlanner {
    params: LocalPlannerParams,

    generator: CandidateGenerator,

    evaluator: Evaluator,

    renderer: Option<Box<dyn CandidateRenderer>>,

    num_cycles: usize,

    last_cycle_s: Option<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for LocalPlannerParams {
    fn default() -> Self {
        Self {
            generator: GeneratorParams::default(),
            evaluator: EvaluatorParams::default(),
            num_workers: 4,
            cycle_budget_s: 0.05,
        }
    }
}

impl LocalPlanner {
    /// Create a new planner, validating the generator and evaluator parameters.
    pub fn new(params: LocalPlannerParams) -> Result<Self, NavError> {
        let generator = CandidateGenerator::new(&params.generator)?;

        let step_m = params.evaluator.sample_step_m;
        if !(step_m.is_finite() && step_m > 0.0) {
            return Err(NavError::InvalidSampleStep(step_m));
        }

        let infeasible_cost = params.evaluator.infeasible_cost;
        if !(infeasible_cost.is_finite() && infeasible_cost > 0.0) {
            return Err(NavError::InvalidInfeasibleCost(infeasible_cost));
        }

        let evaluator = Evaluator::new(params.evaluator.clone());

        info!(
            "LocalPlanner initialised with {} candidates per cycle on up to {} workers",
            generator.num_candidates(),
            params.num_workers.max(1)
        );

        Ok(Self {
            params,
            generator,
            evaluator,
            renderer: None,
            num_cycles: 0,
            last_cycle_s: None,
        })
    }

    /// Attach a renderer which will be given the ranked candidates of every cycle.
    pub fn set_renderer(&mut self, renderer: Box<dyn CandidateRenderer>) {
        self.renderer = Some(renderer);
    }

    pub fn params(&self) -> &LocalPlannerParams {
        &self.params
    }

    /// Number of completed planning cycles.
    pub fn num_cycles(&self) -> usize {
        self.num_cycles
    }

    /// Duration of the most recent cycle.
    pub fn last_cycle_s(&self) -> Option<f64> {
        self.last_cycle_s
    }

    /// Run one planning cycle for a vehicle in `state`.
    pub fn plan(
        &mut self,
        snapshot: &PlanningSnapshot,
        state: &FrenetState,
    ) -> Result<Selection, NavError> {
        let start = Instant::now();

        let mut candidates = self.generator.generate(state)?;

        evaluate_all(
            &self.evaluator,
            &mut candidates,
            snapshot,
            state.curvature_m,
            self.params.num_workers,
        );

        let selection = selector::select(candidates)?;

        if let Some(ref mut renderer) = self.renderer {
            renderer.render(
                &selection.ranked,
                snapshot.occupancy_grid,
                snapshot.centerline,
            );
        }

        let cycle_s = start.elapsed().as_secs_f64();
        self.num_cycles += 1;
        self.last_cycle_s = Some(cycle_s);

        debug!(
            "Planning cycle {} took {:.4} s for {} candidates",
            self.num_cycles,
            cycle_s,
            selection.ranked.len()
        );
        if cycle_s > self.params.cycle_budget_s {
            warn!(
                "Planning cycle {} took {:.4} s, over the budget of {:.4} s",
                self.num_cycles, cycle_s, self.params.cycle_budget_s
            );
        }

        Ok(selection)
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Evaluate every candidate, splitting the set between up to `num_workers` threads.
pub fn evaluate_all(
    evaluator: &Evaluator,
    candidates: &mut [Candidate],
    snapshot: &PlanningSnapshot,
    k0_m: f64,
    num_workers: usize,
) {
    if candidates.is_empty() {
        return;
    }

    if num_workers <= 1 || candidates.len() == 1 {
        for c in candidates.iter_mut() {
            evaluator.evaluate(c, snapshot, k0_m);
        }
        return;
    }

    let chunk_size = (candidates.len() + num_workers - 1) / num_workers;

    std::thread::scope(|scope| {
        for chunk in candidates.chunks_mut(chunk_size) {
            scope.spawn(move || {
                for c in chunk.iter_mut() {
                    evaluator.evaluate(c, snapshot, k0_m);
                }
            });
        }
    });
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
