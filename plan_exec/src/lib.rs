//! # Local planning library.
//!
//! This library allows other crates in the workspace, and the `plan_exec` test harness, to access
//! the local planner and trajectory controllers.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Autonomy module - local planning and trajectory control
pub mod auto;

/// Simulation module - synthetic world and vehicle model for closed loop testing
pub mod sim;
