//! # Local Planning Test
//!
//! This binary runs the local planner and trajectory controller in closed loop against a
//! synthetic world and kinematic vehicle model. It is designed to allow quick and easy
//! development of the planner without requiring perception, localisation or a vehicle.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    thread,
    time::{Duration, Instant},
};

use color_eyre::{eyre::WrapErr, Result};
use log::{debug, info, warn};
use serde::Serialize;

use plan_lib::{
    auto::{
        loc::Pose,
        nav::{LocalPlanner, LocalPlannerParams, SessionRenderer},
        traj_ctrl::TrajCtrl,
    },
    sim::{Vehicle, World},
};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

use params::PlanExecParams;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.10;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Summary of the run, saved into the session at exit.
#[derive(Debug, Default, Serialize)]
struct RunSummary {
    num_cycles: usize,
    reached_goal: bool,
    distance_m: f64,
    final_s_m: f64,
    num_infeasible_cycles: usize,
    num_collision_cycles: usize,
    num_overruns: usize,
    max_abs_rho_m: f64,
    mean_plan_time_s: f64,
    max_plan_time_s: f64,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("plan_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Local Planning Test\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: PlanExecParams =
        util::params::load("plan_exec.toml").wrap_err("Could not load plan_exec params")?;
    let planner_params: LocalPlannerParams =
        util::params::load("local_planner.toml").wrap_err("Could not load local_planner params")?;

    // ---- MODULE INIT ----

    let mut world = World::generate(&exec_params.world).wrap_err("Failed to generate the world")?;

    let mut planner =
        LocalPlanner::new(planner_params).wrap_err("Failed to initialise the LocalPlanner")?;
    if exec_params.save_candidates {
        planner.set_renderer(Box::new(SessionRenderer::new(
            exec_params.save_sample_step_m,
            false,
            exec_params.save_decimation,
        )));
    }
    info!("LocalPlanner init complete");

    let mut traj_ctrl = TrajCtrl::init("traj_ctrl.toml").wrap_err("Failed to initialise TrajCtrl")?;
    info!("TrajCtrl init complete");

    // Starting pose, aligned with the centerline
    let start_pose = Pose::new(
        world
            .centerline
            .to_world(exec_params.start_s_m, exec_params.start_rho_m),
        world.centerline.heading_at(exec_params.start_s_m),
    );
    let mut vehicle = Vehicle::new(exec_params.vehicle.clone(), start_pose);

    session.save("world/centerline.json", world.centerline.clone());
    session.save("world/occupancy_grid.json", world.occupancy_grid.clone());

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    let goal_s_m = world.centerline.length_m() - exec_params.goal_margin_m;
    let mut summary = RunSummary::default();
    let mut total_plan_time_s = 0.0;

    while summary.num_cycles < exec_params.num_cycles {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        let state = vehicle.frenet_state(&world.centerline);

        if state.s_m >= goal_s_m {
            info!("Goal reached after {} cycles", summary.num_cycles);
            summary.reached_goal = true;
            break;
        }

        // ---- PLANNING ----

        let selection = planner
            .plan(&world.snapshot(vehicle.speed_ms), &state)
            .wrap_err("Error running the local planner")?;

        let plan_time_s = planner.last_cycle_s().unwrap_or(0.0);
        total_plan_time_s += plan_time_s;
        summary.max_plan_time_s = summary.max_plan_time_s.max(plan_time_s);

        if !selection.is_feasible() {
            summary.num_infeasible_cycles += 1;
        }

        // ---- CONTROL ----

        let cmd = traj_ctrl
            .step(&selection, &state, vehicle.speed_ms, CYCLE_PERIOD_S)
            .wrap_err("Error stepping TrajCtrl")?;

        // ---- SIMULATION PROCESSING ----

        vehicle.step(&cmd, CYCLE_PERIOD_S);
        world.step(CYCLE_PERIOD_S);

        if world.in_collision(&vehicle.pose.position_m, vehicle.params().radius_m) {
            warn!(
                "Vehicle in collision at {:?} (s = {:.2} m)",
                vehicle.pose.position_m, state.s_m
            );
            summary.num_collision_cycles += 1;
        }

        summary.max_abs_rho_m = summary.max_abs_rho_m.max(state.rho_m.abs());

        debug!(
            "Cycle {}: s = {:.2} m, rho = {:.2} m, speed = {:.2} m/s, curv = {:.3} 1/m",
            summary.num_cycles, state.s_m, state.rho_m, vehicle.speed_ms, cmd.curv_m
        );

        // ---- CYCLE MANAGEMENT ----

        summary.num_cycles += 1;

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                if exec_params.real_time {
                    thread::sleep(d);
                }
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                summary.num_overruns += 1;
            }
        }
    }

    // ---- SUMMARY ----

    summary.distance_m = vehicle.odometer_m;
    summary.final_s_m = vehicle.frenet_state(&world.centerline).s_m;
    if summary.num_cycles > 0 {
        summary.mean_plan_time_s = total_plan_time_s / summary.num_cycles as f64;
    }

    info!("Run summary: {:#?}", summary);
    session.save("plan_exec/summary.json", summary);

    session.exit();

    Ok(())
}
