//! # Moving Obstacle

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// A tracked obstacle, predicted forward assuming constant velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingObstacle {
    /// Position at the time the snapshot was taken
    pub position_m: Vector2<f64>,

    /// Velocity in the world frame
    pub velocity_ms: Vector2<f64>,

    /// Radius of a circle bounding the obstacle
    pub radius_m: f64,
}

impl MovingObstacle {
    /// Predicted position `dt_s` seconds after the snapshot.
    pub fn predicted_position(&self, dt_s: f64) -> Vector2<f64> {
        self.position_m + self.velocity_ms * dt_s
    }

    /// Distance between `position_m` and the edge of the obstacle at its predicted position
    /// `dt_s` seconds after the snapshot. Negative inside the obstacle.
    pub fn clearance_m(&self, position_m: &Vector2<f64>, dt_s: f64) -> f64 {
        (self.predicted_position(dt_s) - position_m).norm() - self.radius_m
    }
}
