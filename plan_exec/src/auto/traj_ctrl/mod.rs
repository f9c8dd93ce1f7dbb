//! # Trajectory control module
//!
//! Trajectory control is responsible for keeping the vehicle on the candidate chosen by the local
//! planner. Each cycle it takes a local target, a point a fixed lookahead distance along the
//! chosen candidate, and drives the vehicle towards it using a pair of PID controllers operating
//! on the lateral error and heading error respectively.
//!
//! The lateral error is the difference between the lateral offset of the target and that of the
//! vehicle, both measured from the centerline. The heading error is the difference between the
//! heading of the candidate at the target and the heading of the vehicle, both relative to the
//! centerline. The controllers output curvature demands which are then summed and saturated.
//! Speed demands are calculated based off of the curvature demand, the tighter the turn the
//! slower the desired speed, and a third controller converts the speed error into a throttle
//! demand.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod controllers;
pub mod params;
pub mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use controllers::*;
pub use params::Params;
pub use state::*;
