//! # Path
//!
//! This module defines the reference centerline the local planner works around, and the
//! conversions between the curvilinear `(s, rho)` frame and the world frame.
//!
//! The centerline is a polyline. `s` is the arc length along it, measured from the first point,
//! and `rho` the signed lateral offset from it, positive to the left (right hand rule about Z).
//! Arc lengths outside `[0, length]` are extrapolated along the first or last segment.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The reference centerline, supplied once per cycle by route management.
#[derive(Clone, Serialize, Debug)]
pub struct Centerline {
    /// Points of the centerline in the world frame
    pub points_m: Vec<Vector2<f64>>,

    /// Cumulative arc length at each point, starting at zero
    arc_length_m: Vec<f64>,
}

/// A segment between two centerline points
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    /// The start point of the segment
    pub start_m: Vector2<f64>,

    /// Arc length of the start point along the centerline
    pub start_s_m: f64,

    /// The length of the segment
    pub length_m: f64,

    /// Unit vector pointing in the direction of the segment
    pub direction: Vector2<f64>,
}

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

#[derive(Debug, Clone, thiserror::Error)]
pub enum PathError {
    #[error("A centerline needs at least two points, but {0} were given")]
    NotEnoughPoints(usize),

    #[error("Centerline point {0} is coincident with the previous point")]
    DegenerateSegment(usize),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Centerline {
    /// Build a centerline from an ordered list of points.
    pub fn from_points(points_m: Vec<Vector2<f64>>) -> Result<Self, PathError> {
        if points_m.len() < 2 {
            return Err(PathError::NotEnoughPoints(points_m.len()));
        }

        let mut arc_length_m = Vec::with_capacity(points_m.len());
        arc_length_m.push(0.0);

        for i in 1..points_m.len() {
            let length_m = (points_m[i] - points_m[i - 1]).norm();
            if length_m <= std::f64::EPSILON {
                return Err(PathError::DegenerateSegment(i));
            }
            arc_length_m.push(arc_length_m[i - 1] + length_m);
        }

        Ok(Self {
            points_m,
            arc_length_m,
        })
    }

    /// Produces a straight centerline between the two points, with each point having at most the
    /// given separation.
    pub fn direct(
        from: Vector2<f64>,
        to: Vector2<f64>,
        point_sep_m: f64,
    ) -> Result<Self, PathError> {
        let dist = (to - from).norm();
        let num_segments = (dist / point_sep_m).ceil().max(1.0) as usize;

        let points_m = (0..=num_segments)
            .map(|i| from + (to - from) * (i as f64 / num_segments as f64))
            .collect();

        Self::from_points(points_m)
    }

    /// Total arc length of the centerline.
    pub fn length_m(&self) -> f64 {
        // Safe since construction guarantees at least two points
        self.arc_length_m[self.arc_length_m.len() - 1]
    }

    /// Arc length of each point.
    pub fn arc_lengths_m(&self) -> &[f64] {
        &self.arc_length_m
    }

    /// Get the segment which contains arc length `s_m`. Arc lengths before the start or beyond
    /// the end return the first or last segment respectively.
    pub fn segment_at(&self, s_m: f64) -> Segment {
        let last = self.points_m.len() - 2;
        let index = self
            .arc_length_m
            .partition_point(|&a| a <= s_m)
            .saturating_sub(1)
            .min(last);

        self.segment(index)
    }

    /// World position of the centerline at arc length `s_m`.
    pub fn point_at(&self, s_m: f64) -> Vector2<f64> {
        let seg = self.segment_at(s_m);
        seg.start_m + seg.direction * (s_m - seg.start_s_m)
    }

    /// Heading of the centerline (angle to the +ve x axis) at arc length `s_m`.
    pub fn heading_at(&self, s_m: f64) -> f64 {
        let seg = self.segment_at(s_m);
        seg.direction.y.atan2(seg.direction.x)
    }

    /// Convert a curvilinear `(s, rho)` coordinate into the world frame.
    pub fn to_world(&self, s_m: f64, rho_m: f64) -> Vector2<f64> {
        let seg = self.segment_at(s_m);

        // Left hand normal of the segment
        let normal = Vector2::new(-seg.direction.y, seg.direction.x);

        seg.start_m + seg.direction * (s_m - seg.start_s_m) + normal * rho_m
    }

    /// Project a world position onto the centerline, returning its `(s, rho)` coordinate.
    ///
    /// The closest point over all segments is used. Positions before the start or beyond the end
    /// of the centerline are extrapolated along the first or last segment.
    pub fn project(&self, position_m: &Vector2<f64>) -> (f64, f64) {
        let last = self.points_m.len() - 2;

        let mut best = (std::f64::INFINITY, 0.0, 0.0);

        for index in 0..=last {
            let seg = self.segment(index);
            let rel = position_m - seg.start_m;

            // Distance along the segment, only allowed past the ends on the first and last
            let mut along = rel.dot(&seg.direction);
            if index != 0 {
                along = along.max(0.0);
            }
            if index != last {
                along = along.min(seg.length_m);
            }

            let closest = seg.start_m + seg.direction * along;
            let dist = (position_m - closest).norm();

            if dist < best.0 {
                // Sign from the cross product of the direction and the relative position, +ve is
                // left.
                let cross = seg.direction.x * rel.y - seg.direction.y * rel.x;
                let side = if cross < 0.0 { -1.0 } else { 1.0 };

                best = (dist, seg.start_s_m + along, dist * side);
            }
        }

        (best.1, best.2)
    }

    fn segment(&self, index: usize) -> Segment {
        let start_m = self.points_m[index];
        let diff = self.points_m[index + 1] - start_m;
        let length_m = self.arc_length_m[index + 1] - self.arc_length_m[index];

        Segment {
            start_m,
            start_s_m: self.arc_length_m[index],
            length_m,
            direction: diff / length_m,
        }
    }
}
