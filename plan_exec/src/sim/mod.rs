//! # Simulation module
//!
//! A synthetic world and kinematic vehicle model, allowing the local planner and trajectory
//! controller to be run in closed loop without perception, localisation or a physical vehicle.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod vehicle;
mod world;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use vehicle::{Vehicle, VehicleParams};
pub use world::{ObstacleBox, World, WorldError, WorldParams};
