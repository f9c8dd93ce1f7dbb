//! # Autonomy Module
//!
//! This module provides the local planning and low level control for the vehicle. Each cycle the
//! [`nav::LocalPlanner`] generates and scores a fan of candidate trajectories around the
//! reference centerline, and [`traj_ctrl::TrajCtrl`] drives the vehicle towards the chosen one.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Localisation module - vehicle pose and its state relative to the centerline
pub mod loc;

/// Trajectory control module - keeps the vehicle on the chosen candidate
pub mod traj_ctrl;

/// Defines the reference centerline
pub mod path;

/// Navigation module - candidate generation, evaluation and selection
pub mod nav;

/// Map module - occupancy grid, terrain labels and moving obstacles
pub mod map;
