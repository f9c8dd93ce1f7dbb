//! # Vehicle Model
//!
//! Kinematic model of the vehicle. The curvature demand is followed exactly and the throttle
//! accelerates or brakes the vehicle at a rate proportional to the demand.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::auto::{
    loc::{FrenetState, Pose},
    path::Centerline,
    traj_ctrl::DriveCmd,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleParams {
    /// Acceleration at full throttle
    pub max_accel_mss: f64,

    /// Deceleration at full braking
    pub max_decel_mss: f64,

    /// Top speed of the vehicle
    pub max_speed_ms: f64,

    /// Radius of a circle bounding the vehicle
    pub radius_m: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Vehicle {
    pub pose: Pose,

    pub speed_ms: f64,

    /// Curvature of the path the vehicle is currently following
    pub curv_m: f64,

    /// Total distance travelled
    pub odometer_m: f64,

    #[serde(skip)]
    params: VehicleParams,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            max_accel_mss: 1.0,
            max_decel_mss: 2.0,
            max_speed_ms: 3.0,
            radius_m: 0.8,
        }
    }
}

impl Vehicle {
    /// A stationary vehicle at the given pose.
    pub fn new(params: VehicleParams, pose: Pose) -> Self {
        Self {
            pose,
            speed_ms: 0.0,
            curv_m: 0.0,
            odometer_m: 0.0,
            params,
        }
    }

    pub fn params(&self) -> &VehicleParams {
        &self.params
    }

    /// State of the vehicle relative to the centerline.
    pub fn frenet_state(&self, centerline: &Centerline) -> FrenetState {
        FrenetState::from_pose(&self.pose, self.curv_m, centerline)
    }

    /// Execute the drive command for `dt_s` seconds.
    pub fn step(&mut self, cmd: &DriveCmd, dt_s: f64) {
        let accel_mss = if cmd.throttle >= 0.0 {
            cmd.throttle * self.params.max_accel_mss
        } else {
            cmd.throttle * self.params.max_decel_mss
        };

        self.speed_ms = (self.speed_ms + accel_mss * dt_s).clamp(0.0, self.params.max_speed_ms);
        self.curv_m = cmd.curv_m;

        let dist_m = self.speed_ms * dt_s;
        let heading_rad = self.pose.heading_rad;

        // Case: curv approx zero, straight line
        if self.curv_m.abs() < std::f64::EPSILON {
            self.pose.position_m += self.pose.forward() * dist_m;
        } else {
            // Position of the centre of the turning circle, to the left for +ve curvature
            let radius_m = 1.0 / self.curv_m;
            let left = Vector2::new(-heading_rad.sin(), heading_rad.cos());
            let centre_m = self.pose.position_m + left * radius_m;

            // Angular distance to move along the circle
            let delta_angle = dist_m * self.curv_m;
            let end_head = heading_rad + delta_angle;

            self.pose.position_m =
                centre_m + radius_m * Vector2::new(end_head.sin(), -end_head.cos());
            self.pose.heading_rad = util::maths::wrap_angle(end_head);
        }

        self.odometer_m += dist_m;
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn cmd(curv_m: f64, throttle: f64) -> DriveCmd {
        DriveCmd {
            curv_m,
            speed_dem_ms: 0.0,
            throttle,
        }
    }

    #[test]
    fn test_straight() {
        let mut v = Vehicle::new(VehicleParams::default(), Pose::new(Vector2::zeros(), 0.0));

        v.step(&cmd(0.0, 1.0), 1.0);
        assert_relative_eq!(v.speed_ms, 1.0);
        assert_relative_eq!(v.pose.position_m, Vector2::new(1.0, 0.0));

        // Brake harder than the vehicle is moving
        v.step(&cmd(0.0, -1.0), 1.0);
        assert_eq!(v.speed_ms, 0.0);
        assert_relative_eq!(v.odometer_m, 1.0);
    }

    #[test]
    fn test_turn() {
        let mut v = Vehicle::new(VehicleParams::default(), Pose::new(Vector2::zeros(), 0.0));
        v.speed_ms = 2.0;

        // Quarter of a circle of radius 2 to the left
        let quarter_s = (FRAC_PI_2 * 2.0) / 2.0;
        v.step(&cmd(0.5, 0.0), quarter_s);

        assert_relative_eq!(v.pose.position_m, Vector2::new(2.0, 2.0), epsilon = 1e-9);
        assert_relative_eq!(v.pose.heading_rad, FRAC_PI_2, epsilon = 1e-9);
    }
}
