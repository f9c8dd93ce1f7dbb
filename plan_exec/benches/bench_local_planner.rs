//! # Local Planner Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use nalgebra::Vector2;
use plan_lib::{
    auto::{
        loc::FrenetState,
        map::MovingObstacle,
        nav::{local_planner, LocalPlanner, LocalPlannerParams},
    },
    sim::{ObstacleBox, World, WorldParams},
};

fn local_planner_benchmark(c: &mut Criterion) {
    // ---- Build the synthetic world ----

    let world = World::generate(&WorldParams {
        obstacles: vec![
            ObstacleBox {
                min_m: [20.0, 13.0],
                max_m: [21.0, 17.0],
            },
            ObstacleBox {
                min_m: [30.0, 17.0],
                max_m: [32.0, 19.0],
            },
        ],
        moving_obstacles: vec![MovingObstacle {
            position_m: Vector2::new(40.0, 16.0),
            velocity_ms: Vector2::new(-1.0, 0.0),
            radius_m: 0.5,
        }],
        ..Default::default()
    })
    .unwrap();

    let state = FrenetState {
        s_m: 10.0,
        rho_m: 0.3,
        slope: 0.05,
        curvature_m: 0.01,
    };
    let snapshot = world.snapshot(1.5);

    // ---- Benchmarks ----

    let params = LocalPlannerParams {
        num_workers: 1,
        ..Default::default()
    };
    let mut planner = LocalPlanner::new(params.clone()).unwrap();

    c.bench_function("LocalPlanner::plan::inline", |b| {
        b.iter(|| planner.plan(&snapshot, &state).unwrap())
    });

    let mut planner = LocalPlanner::new(LocalPlannerParams {
        num_workers: 4,
        ..params
    })
    .unwrap();

    c.bench_function("LocalPlanner::plan::4_workers", |b| {
        b.iter(|| planner.plan(&snapshot, &state).unwrap())
    });

    // Evaluation of the candidate set only
    let planner_params = LocalPlannerParams::default();
    let generator =
        plan_lib::auto::nav::CandidateGenerator::new(&planner_params.generator).unwrap();
    let evaluator = plan_lib::auto::nav::Evaluator::new(planner_params.evaluator);
    let candidates = generator.generate(&state).unwrap();

    c.bench_function("local_planner::evaluate_all", |b| {
        b.iter(|| {
            let mut set = candidates.clone();
            local_planner::evaluate_all(&evaluator, &mut set, &snapshot, state.curvature_m, 1);
            set
        })
    });
}

criterion_group!(benches, local_planner_benchmark);
criterion_main!(benches);
