//! # Localisation module
//!
//! Localisation itself is provided by an external collaborator. This module defines the pose it
//! produces and the conversion of that pose into the vehicle's state relative to the reference
//! centerline, which is what the local planner works with.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use super::path::Centerline;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The current pose (position and heading in the world frame) of the vehicle.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Pose {
    /// The position in the world frame
    pub position_m: Vector2<f64>,

    /// The heading (angle to the +ve x axis) in radians
    pub heading_rad: f64,
}

/// The vehicle's state relative to the centerline.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FrenetState {
    /// Arc length of the vehicle along the centerline
    pub s_m: f64,

    /// Signed lateral offset from the centerline, +ve to the left
    pub rho_m: f64,

    /// Lateral slope, d(rho)/ds, derived from the heading error to the centerline
    pub slope: f64,

    /// Curvature of the vehicle's current path, in 1/meters
    pub curvature_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    pub fn new(position_m: Vector2<f64>, heading_rad: f64) -> Self {
        Self {
            position_m,
            heading_rad,
        }
    }

    /// Unit vector pointing along the pose's heading.
    pub fn forward(&self) -> Vector2<f64> {
        Vector2::new(self.heading_rad.cos(), self.heading_rad.sin())
    }
}

impl FrenetState {
    /// Compute the state of a vehicle at `pose`, currently following a path of curvature
    /// `curvature_m`, relative to the centerline.
    pub fn from_pose(pose: &Pose, curvature_m: f64, centerline: &Centerline) -> Self {
        let (s_m, rho_m) = centerline.project(&pose.position_m);

        // Heading error to the centerline, wrapped into [-pi, pi)
        let head_err_rad = util::maths::wrap_angle(pose.heading_rad - centerline.heading_at(s_m));

        Self {
            s_m,
            rho_m,
            slope: head_err_rad.tan(),
            curvature_m,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn test_from_pose() {
        let centerline = Centerline::from_points(vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(0.0, 20.0),
        ])
        .unwrap();

        // Heading along the centerline (+y) but displaced to its right (+x)
        let pose = Pose::new(Vector2::new(1.5, 4.0), std::f64::consts::FRAC_PI_2);
        let state = FrenetState::from_pose(&pose, 0.1, &centerline);

        assert_relative_eq!(state.s_m, 4.0);
        assert_relative_eq!(state.rho_m, -1.5);
        assert_relative_eq!(state.slope, 0.0, epsilon = 1e-12);
        assert_relative_eq!(state.curvature_m, 0.1);

        // Pointing 45 degrees left of the centerline
        let pose = Pose::new(Vector2::new(0.0, 2.0), 3.0 * FRAC_PI_4);
        let state = FrenetState::from_pose(&pose, 0.0, &centerline);
        assert_relative_eq!(state.slope, 1.0, epsilon = 1e-12);
    }
}
