//! # Candidate Evaluator
//!
//! Scores a single candidate against the current planning snapshot. The candidate is sampled
//! along its length, each sample being placed into the world via the centerline, and the
//! feasibility flags and cost terms are accumulated over the samples.
//!
//! | Term                 | Meaning                                                           |
//! |----------------------|-------------------------------------------------------------------|
//! | `comfortability`     | Integral of squared curvature and squared curvature rate          |
//! | `static_safety`      | 1 touching an occupied cell, falling to 0 at the clearance radius |
//! | `dynamic_safety`     | As above, using the predicted positions of moving obstacles       |
//! | `segmentation_cost`  | Integral of the terrain weight under the candidate                |
//! | `rho_deviation_cost` | Mean squared lateral offset from the centerline                   |
//! | `max_curvature`      | Largest absolute curvature along the candidate                    |

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use serde::{Deserialize, Serialize};

use super::{candidate::sample_stations, Candidate, PlanningSnapshot};
use crate::auto::map::TerrainCostTable;
use util::maths::lin_map;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the evaluator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorParams {
    /// Distance between samples along each candidate
    pub sample_step_m: f64,

    /// Radius of a circle bounding the vehicle. Samples closer than this to an occupied cell hit
    /// the obstacle.
    pub vehicle_radius_m: f64,

    /// Maximum lateral offset from the centerline a sample may have
    pub corridor_half_width_m: f64,

    /// Clearance beyond which static obstacles no longer contribute to the cost
    pub static_clearance_radius_m: f64,

    /// Clearance beyond which moving obstacles no longer contribute to the cost
    pub dynamic_clearance_radius_m: f64,

    /// Lower bound on the speed used to predict when each sample is reached
    pub min_speed_ms: f64,

    /// Weight of the squared curvature rate in the comfort term
    pub jerk_weight: f64,

    /// Weight of the curvature discontinuity at the start of the candidate in the comfort term
    pub origin_curvature_weight: f64,

    /// Cost added to candidates which are out of bounds or hit an obstacle
    pub infeasible_cost: f64,

    pub weights: CostWeights,

    pub terrain_costs: TerrainCostTable,
}

/// Weights applied to each cost term to form the aggregate cost of a candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CostWeights {
    pub comfortability: f64,
    pub static_safety: f64,
    pub dynamic_safety: f64,
    pub segmentation: f64,
    pub rho_deviation: f64,
    pub max_curvature: f64,
}

/// Evaluates candidates
#[derive(Debug, Clone)]
pub struct Evaluator {
    params: EvaluatorParams,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for EvaluatorParams {
    fn default() -> Self {
        Self {
            sample_step_m: 0.5,
            vehicle_radius_m: 1.0,
            corridor_half_width_m: 4.0,
            static_clearance_radius_m: 3.0,
            dynamic_clearance_radius_m: 5.0,
            min_speed_ms: 0.5,
            jerk_weight: 0.1,
            origin_curvature_weight: 1.0,
            infeasible_cost: 1e9,
            weights: CostWeights::default(),
            terrain_costs: TerrainCostTable::default(),
        }
    }
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            comfortability: 1.0,
            static_safety: 10.0,
            dynamic_safety: 10.0,
            segmentation: 1.0,
            rho_deviation: 0.5,
            max_curvature: 5.0,
        }
    }
}

impl Evaluator {
    pub fn new(params: EvaluatorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &EvaluatorParams {
        &self.params
    }

    /// Evaluate a candidate, setting its feasibility flags, its cost terms and its aggregate
    /// cost.
    ///
    /// `k0_m` is the vehicle's current curvature, which the start of the candidate is compared
    /// against in the comfort term.
    pub fn evaluate(&self, candidate: &mut Candidate, snapshot: &PlanningSnapshot, k0_m: f64) {
        let p = &self.params;

        let length_m = candidate.max_length();
        let pred_speed_ms = snapshot.speed_ms.max(p.min_speed_ms);
        let search_radius_m = p.static_clearance_radius_m.max(p.vehicle_radius_m);

        // Unusable step, only the two end points are sampled
        let step_m = if p.sample_step_m.is_finite() && p.sample_step_m > 0.0 {
            p.sample_step_m
        } else {
            length_m
        };

        let mut out_of_bounds = false;
        let mut hits_obstacle = false;

        let mut max_curvature = 0f64;
        let mut curvature_integral = 0.0;
        let mut min_static_clearance_m = std::f64::INFINITY;
        let mut min_dynamic_clearance_m = std::f64::INFINITY;
        let mut segmentation_cost = 0.0;
        let mut rho_sq_integral = 0.0;

        let mut prev: Option<(f64, f64)> = None;

        for s_m in sample_stations(length_m, step_m) {
            let rho_m = candidate.at(s_m);
            let curv_m = candidate.second_derivative_at(s_m);
            let point_m = snapshot.centerline.to_world(candidate.s0() + s_m, rho_m);

            // Feasibility
            if rho_m.abs() > p.corridor_half_width_m {
                out_of_bounds = true;
            }

            match snapshot.occupancy_grid.is_occupied(&point_m) {
                Some(true) => hits_obstacle = true,
                Some(false) => (),
                None => out_of_bounds = true,
            }

            let clearance_m = snapshot
                .occupancy_grid
                .clearance_m(&point_m, search_radius_m);
            if clearance_m < p.vehicle_radius_m {
                hits_obstacle = true;
            }
            min_static_clearance_m = min_static_clearance_m.min(clearance_m);

            let dt_s = s_m / pred_speed_ms;
            for obs in snapshot.moving_obstacles {
                min_dynamic_clearance_m =
                    min_dynamic_clearance_m.min(obs.clearance_m(&point_m, dt_s));
            }

            max_curvature = max_curvature.max(curv_m.abs());

            // Integrals over the interval ending at this sample
            if let Some((prev_s_m, prev_curv_m)) = prev {
                let ds_m = s_m - prev_s_m;

                if ds_m > 0.0 {
                    let curv_rate = (curv_m - prev_curv_m) / ds_m;
                    curvature_integral +=
                        (curv_m * curv_m + p.jerk_weight * curv_rate * curv_rate) * ds_m;

                    segmentation_cost += p
                        .terrain_costs
                        .weight(snapshot.terrain_labels.label_at(&point_m))
                        * ds_m;

                    rho_sq_integral += rho_m * rho_m * ds_m;
                }
            }

            prev = Some((s_m, curv_m));
        }

        let origin_curv_err = candidate.second_derivative_at(0.0) - k0_m;
        let comfortability =
            curvature_integral + p.origin_curvature_weight * origin_curv_err * origin_curv_err;

        let static_safety = safety_map(min_static_clearance_m, p.static_clearance_radius_m);
        let dynamic_safety = if snapshot.moving_obstacles.is_empty() {
            0.0
        } else {
            safety_map(min_dynamic_clearance_m, p.dynamic_clearance_radius_m)
        };

        let rho_deviation_cost = rho_sq_integral / length_m;

        let w = &p.weights;
        let mut cost = w.comfortability * comfortability
            + w.static_safety * static_safety
            + w.dynamic_safety * dynamic_safety
            + w.segmentation * segmentation_cost
            + w.rho_deviation * rho_deviation_cost
            + w.max_curvature * max_curvature;

        if out_of_bounds || hits_obstacle {
            cost += p.infeasible_cost;
        }

        candidate.set_out_of_bounds(out_of_bounds);
        candidate.set_hits_obstacle(hits_obstacle);
        candidate.set_max_curvature(max_curvature);
        candidate.set_comfortability(comfortability);
        candidate.set_static_safety(static_safety);
        candidate.set_dynamic_safety(dynamic_safety);
        candidate.set_segmentation_cost(segmentation_cost);
        candidate.set_rho_deviation_cost(rho_deviation_cost);
        candidate.set_cost(cost);

        trace!(
            "Evaluated candidate to {:.2} m over {:.1} m: cost {:.3}, oob {}, obstacle {}",
            candidate.terminal_offset(),
            length_m,
            cost,
            out_of_bounds,
            hits_obstacle
        );
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Map a clearance onto `[0, 1]`, 1 at zero clearance falling linearly to 0 at `radius_m`.
fn safety_map(clearance_m: f64, radius_m: f64) -> f64 {
    if radius_m <= 0.0 {
        return if clearance_m <= 0.0 { 1.0 } else { 0.0 };
    }

    lin_map((0.0, radius_m), (1.0, 0.0), clearance_m).clamp(0.0, 1.0)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::{
        map::{GridGeometry, MovingObstacle, OccupancyGrid, TerrainLabel, TerrainLabels},
        nav::Polynomial,
        path::Centerline,
    };
    use approx::assert_relative_eq;
    use nalgebra::Vector2;

    struct World {
        centerline: Centerline,
        grid: OccupancyGrid,
        labels: TerrainLabels,
        obstacles: Vec<MovingObstacle>,
    }

    impl World {
        fn new() -> Self {
            let geom = GridGeometry::new(Vector2::zeros(), 1.0, Vector2::new(40, 20)).unwrap();

            Self {
                centerline: Centerline::from_points(vec![
                    Vector2::new(0.0, 10.0),
                    Vector2::new(40.0, 10.0),
                ])
                .unwrap(),
                grid: OccupancyGrid::new(geom),
                labels: TerrainLabels::new(geom),
                obstacles: vec![],
            }
        }

        fn snapshot(&self) -> PlanningSnapshot {
            PlanningSnapshot {
                centerline: &self.centerline,
                occupancy_grid: &self.grid,
                terrain_labels: &self.labels,
                moving_obstacles: &self.obstacles,
                speed_ms: 2.0,
            }
        }
    }

    fn candidate(coeffs: [f64; 4], length_m: f64) -> Candidate {
        let mut c = Candidate::new(Polynomial::new(coeffs));
        c.set_max_length(length_m).unwrap();
        c.set_s0(5.0);
        c
    }

    #[test]
    fn test_zero_curve() {
        let world = World::new();
        let evaluator = Evaluator::new(EvaluatorParams::default());

        let mut c = candidate([0.0; 4], 20.0);
        evaluator.evaluate(&mut c, &world.snapshot(), 0.0);

        assert!(c.is_feasible());
        assert_eq!(c.max_curvature(), 0.0);
        assert_eq!(c.comfortability(), 0.0);
        assert_eq!(c.rho_deviation_cost(), 0.0);
        assert_eq!(c.static_safety(), 0.0);
        assert_eq!(c.dynamic_safety(), 0.0);

        // Every cell is unlabelled
        assert_relative_eq!(c.segmentation_cost(), 20.0, epsilon = 1e-9);
        assert_relative_eq!(c.cost(), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_terrain() {
        let mut world = World::new();
        world
            .labels
            .fill_box(&Vector2::new(0.0, 0.0), &Vector2::new(40.0, 20.0), TerrainLabel::Road);
        world
            .labels
            .fill_box(&Vector2::new(10.0, 0.0), &Vector2::new(15.0, 20.0), TerrainLabel::Mud);

        let evaluator = Evaluator::new(EvaluatorParams::default());
        let mud = evaluator.params().terrain_costs.mud;

        let mut c = candidate([0.0; 4], 20.0);
        evaluator.evaluate(&mut c, &world.snapshot(), 0.0);

        // Samples at x in [10, 15), each charging the interval behind it
        assert_relative_eq!(c.segmentation_cost(), mud * 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_obstacle() {
        let mut world = World::new();
        world
            .grid
            .set_occupied(&Vector2::new(15.5, 10.5), true)
            .unwrap();

        let evaluator = Evaluator::new(EvaluatorParams::default());

        let mut c = candidate([0.0; 4], 20.0);
        evaluator.evaluate(&mut c, &world.snapshot(), 0.0);

        assert!(c.hits_obstacle());
        assert!(!c.out_of_bounds());
        assert!(!c.is_feasible());
        assert_relative_eq!(c.static_safety(), 1.0);
        assert!(c.cost() >= 1e9);

        // Passing 2 m to the side clears the obstacle, but not by the full clearance radius
        let mut c = candidate([-2.0, 0.0, 0.0, 0.0], 20.0);
        evaluator.evaluate(&mut c, &world.snapshot(), 0.0);
        assert!(c.is_feasible());
        assert!(c.static_safety() > 0.0 && c.static_safety() < 1.0);
    }

    #[test]
    fn test_out_of_bounds() {
        let world = World::new();
        let evaluator = Evaluator::new(EvaluatorParams::default());

        // Leaves the corridor
        let mut c = candidate([0.0, 0.3, 0.0, 0.0], 20.0);
        evaluator.evaluate(&mut c, &world.snapshot(), 0.0);
        assert!(c.out_of_bounds());
        assert!(!c.hits_obstacle());

        // Runs off the end of the grid
        let mut c = candidate([0.0; 4], 50.0);
        evaluator.evaluate(&mut c, &world.snapshot(), 0.0);
        assert!(c.out_of_bounds());
        assert!(c.cost() >= 1e9);
    }

    #[test]
    fn test_comfort() {
        let world = World::new();
        let params = EvaluatorParams {
            corridor_half_width_m: 5.0,
            ..Default::default()
        };
        let evaluator = Evaluator::new(params);

        // Constant curvature of 0.02
        let mut c = candidate([0.0, 0.0, 0.01, 0.0], 20.0);

        evaluator.evaluate(&mut c, &world.snapshot(), 0.02);
        assert!(c.is_feasible());
        assert_relative_eq!(c.max_curvature(), 0.02, epsilon = 1e-12);
        assert_relative_eq!(c.comfortability(), 0.0004 * 20.0, epsilon = 1e-9);

        // Starting off a straight path
        evaluator.evaluate(&mut c, &world.snapshot(), 0.0);
        assert_relative_eq!(c.comfortability(), 0.0004 * 20.0 + 0.0004, epsilon = 1e-9);
    }

    #[test]
    fn test_dynamic_safety() {
        let mut world = World::new();
        world.obstacles.push(MovingObstacle {
            position_m: Vector2::new(35.0, 10.0),
            velocity_ms: Vector2::new(-2.0, 0.0),
            radius_m: 1.0,
        });

        let evaluator = Evaluator::new(EvaluatorParams::default());

        // Obstacle and vehicle meet at x = 20: at s = 15 the vehicle has taken 7.5 s, in which
        // the obstacle covers 15 m.
        let mut c = candidate([0.0; 4], 20.0);
        evaluator.evaluate(&mut c, &world.snapshot(), 0.0);
        assert_relative_eq!(c.dynamic_safety(), 1.0);

        // A stationary track far to the side contributes nothing
        world.obstacles[0] = MovingObstacle {
            position_m: Vector2::new(20.0, 19.0),
            velocity_ms: Vector2::zeros(),
            radius_m: 1.0,
        };
        evaluator.evaluate(&mut c, &world.snapshot(), 0.0);
        assert_eq!(c.dynamic_safety(), 0.0);
    }

    #[test]
    fn test_safety_map() {
        assert_eq!(safety_map(0.0, 2.0), 1.0);
        assert_relative_eq!(safety_map(0.5, 2.0), 0.75);
        assert_eq!(safety_map(2.0, 2.0), 0.0);
        assert_eq!(safety_map(5.0, 2.0), 0.0);
        assert_eq!(safety_map(-1.0, 2.0), 1.0);
    }
}
