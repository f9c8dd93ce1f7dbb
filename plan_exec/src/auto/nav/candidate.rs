//! # Candidate
//!
//! A candidate is one trajectory hypothesis of the local planner, a lateral offset curve
//! `rho(s)` laid over the centerline starting at arc length `s0`. The candidate caches the exact
//! first and second derivatives of its curve, and carries the feasibility flags and cost terms
//! filled in by the evaluator and selector.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::Serialize;

use super::Polynomial;
use crate::auto::path::Centerline;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Length of a freshly constructed candidate, in meters.
pub const DEFAULT_MAX_LENGTH_M: f64 = 100.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single trajectory hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candidate {
    curve: Polynomial,
    first_deriv: Polynomial,
    second_deriv: Polynomial,

    out_of_bounds: bool,
    hits_obstacle: bool,

    cost: f64,
    comfortability: f64,
    static_safety: f64,
    dynamic_safety: f64,
    segmentation_cost: f64,
    rho_deviation_cost: f64,
    max_curvature: f64,

    rank: Option<usize>,

    max_length_m: f64,
    s0_m: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, thiserror::Error)]
pub enum CandidateError {
    #[error("Candidate length must be positive and finite, got {0}")]
    InvalidLength(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Candidate {
    /// Create a new unscored candidate from the given curve.
    pub fn new(curve: Polynomial) -> Self {
        Self {
            curve,
            first_deriv: curve.derivative(),
            second_deriv: curve.derivative().derivative(),
            out_of_bounds: false,
            hits_obstacle: false,
            cost: 0.0,
            comfortability: 0.0,
            static_safety: 0.0,
            dynamic_safety: 0.0,
            segmentation_cost: 0.0,
            rho_deviation_cost: 0.0,
            max_curvature: 0.0,
            rank: None,
            max_length_m: DEFAULT_MAX_LENGTH_M,
            s0_m: 0.0,
        }
    }

    /// Replace the curve of the candidate, recomputing its derivatives.
    pub fn set_curve(&mut self, curve: Polynomial) {
        self.curve = curve;
        self.first_deriv = curve.derivative();
        self.second_deriv = self.first_deriv.derivative();
    }

    pub fn curve(&self) -> &Polynomial {
        &self.curve
    }

    pub fn first_deriv(&self) -> &Polynomial {
        &self.first_deriv
    }

    pub fn second_deriv(&self) -> &Polynomial {
        &self.second_deriv
    }

    /// Lateral offset at arc length `s_m` from the start of the candidate.
    pub fn at(&self, s_m: f64) -> f64 {
        self.curve.at(s_m)
    }

    /// Lateral slope, `d(rho)/ds`, at `s_m`.
    pub fn derivative_at(&self, s_m: f64) -> f64 {
        self.first_deriv.at(s_m)
    }

    /// Second derivative of the lateral offset at `s_m`, used as the curvature of the candidate.
    pub fn second_derivative_at(&self, s_m: f64) -> f64 {
        self.second_deriv.at(s_m)
    }

    /// Lateral offset at the end of the candidate.
    pub fn terminal_offset(&self) -> f64 {
        self.at(self.max_length_m)
    }

    pub fn is_feasible(&self) -> bool {
        !self.out_of_bounds && !self.hits_obstacle
    }

    /// World positions along the candidate every `step_m`, including the end point.
    pub fn sample_world(&self, centerline: &Centerline, step_m: f64) -> Vec<Vector2<f64>> {
        if !(step_m.is_finite() && step_m > 0.0) {
            return vec![
                centerline.to_world(self.s0_m, self.at(0.0)),
                centerline.to_world(self.s0_m + self.max_length_m, self.terminal_offset()),
            ];
        }

        sample_stations(self.max_length_m, step_m)
            .map(|s| centerline.to_world(self.s0_m + s, self.at(s)))
            .collect()
    }

    pub fn out_of_bounds(&self) -> bool {
        self.out_of_bounds
    }

    pub fn set_out_of_bounds(&mut self, out_of_bounds: bool) {
        self.out_of_bounds = out_of_bounds;
    }

    pub fn hits_obstacle(&self) -> bool {
        self.hits_obstacle
    }

    pub fn set_hits_obstacle(&mut self, hits_obstacle: bool) {
        self.hits_obstacle = hits_obstacle;
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn set_cost(&mut self, cost: f64) {
        self.cost = cost;
    }

    pub fn comfortability(&self) -> f64 {
        self.comfortability
    }

    pub fn set_comfortability(&mut self, comfortability: f64) {
        self.comfortability = comfortability;
    }

    pub fn static_safety(&self) -> f64 {
        self.static_safety
    }

    pub fn set_static_safety(&mut self, static_safety: f64) {
        self.static_safety = static_safety;
    }

    pub fn dynamic_safety(&self) -> f64 {
        self.dynamic_safety
    }

    pub fn set_dynamic_safety(&mut self, dynamic_safety: f64) {
        self.dynamic_safety = dynamic_safety;
    }

    pub fn segmentation_cost(&self) -> f64 {
        self.segmentation_cost
    }

    pub fn set_segmentation_cost(&mut self, segmentation_cost: f64) {
        self.segmentation_cost = segmentation_cost;
    }

    pub fn rho_deviation_cost(&self) -> f64 {
        self.rho_deviation_cost
    }

    pub fn set_rho_deviation_cost(&mut self, rho_deviation_cost: f64) {
        self.rho_deviation_cost = rho_deviation_cost;
    }

    pub fn max_curvature(&self) -> f64 {
        self.max_curvature
    }

    pub fn set_max_curvature(&mut self, max_curvature: f64) {
        self.max_curvature = max_curvature;
    }

    /// Position of the candidate in the ranking, `None` until ranked. Zero is the best.
    pub fn rank(&self) -> Option<usize> {
        self.rank
    }

    pub fn set_rank(&mut self, rank: Option<usize>) {
        self.rank = rank;
    }

    pub fn max_length(&self) -> f64 {
        self.max_length_m
    }

    pub fn set_max_length(&mut self, max_length_m: f64) -> Result<(), CandidateError> {
        if !(max_length_m.is_finite() && max_length_m > 0.0) {
            return Err(CandidateError::InvalidLength(max_length_m));
        }

        self.max_length_m = max_length_m;
        Ok(())
    }

    /// Arc length along the centerline at which the candidate starts.
    pub fn s0(&self) -> f64 {
        self.s0_m
    }

    pub fn set_s0(&mut self, s0_m: f64) {
        self.s0_m = s0_m;
    }
}

impl From<Polynomial> for Candidate {
    fn from(curve: Polynomial) -> Self {
        Self::new(curve)
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Stations `0, step, 2*step, ...` up to and including `length_m`, with the last station placed
/// exactly at `length_m`.
///
/// `step_m` must be positive.
pub(crate) fn sample_stations(length_m: f64, step_m: f64) -> impl Iterator<Item = f64> {
    let num_steps = (length_m / step_m).ceil().max(1.0) as usize;

    (0..=num_steps).map(move |i| {
        if i == num_steps {
            length_m
        } else {
            i as f64 * step_m
        }
    })
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new() {
        let c = Candidate::new(Polynomial::new([1.0, 0.5, -0.25, 0.125]));

        assert!(!c.out_of_bounds());
        assert!(!c.hits_obstacle());
        assert!(c.is_feasible());
        assert_eq!(c.rank(), None);
        assert_eq!(c.max_curvature(), 0.0);
        assert_eq!(c.max_length(), DEFAULT_MAX_LENGTH_M);

        assert_eq!(c.first_deriv(), &Polynomial::new([0.5, -0.5, 0.375, 0.0]));
        assert_eq!(c.second_deriv(), &Polynomial::new([-0.5, 0.75, 0.0, 0.0]));
    }

    #[test]
    fn test_set_curve() {
        // Whichever curve the candidate was built with, the cached derivatives follow the latest
        let a = Polynomial::new([0.0, 1.0, 2.0, 3.0]);
        let b = Polynomial::new([4.0, -1.0, 0.0, 0.5]);

        let mut c = Candidate::new(a);
        c.set_curve(b);

        assert_eq!(c, Candidate::new(b));
        for &s in &[0.0, 1.0, 2.5, 10.0] {
            assert_relative_eq!(c.derivative_at(s), -1.0 + 1.5 * s * s);
            assert_relative_eq!(c.second_derivative_at(s), 3.0 * s);
        }
    }

    #[test]
    fn test_zero_curve() {
        let c = Candidate::new(Polynomial::zero());

        for &s in &[0.0, 10.0, 50.0, 100.0] {
            assert_eq!(c.at(s), 0.0);
            assert_eq!(c.derivative_at(s), 0.0);
            assert_eq!(c.second_derivative_at(s), 0.0);
        }
    }

    #[test]
    fn test_max_length() {
        let mut c = Candidate::new(Polynomial::new([0.0, 0.1, 0.0, 0.0]));

        assert!(c.set_max_length(0.0).is_err());
        assert!(c.set_max_length(-3.0).is_err());
        assert!(c.set_max_length(std::f64::NAN).is_err());
        assert_eq!(c.max_length(), DEFAULT_MAX_LENGTH_M);

        c.set_max_length(20.0).unwrap();
        assert_relative_eq!(c.terminal_offset(), 2.0);
    }

    #[test]
    fn test_feasibility_flags() {
        let mut c = Candidate::new(Polynomial::zero());

        c.set_hits_obstacle(true);
        assert!(!c.is_feasible());

        c.set_hits_obstacle(false);
        c.set_out_of_bounds(true);
        assert!(!c.is_feasible());
    }

    #[test]
    fn test_sample_stations() {
        let s: Vec<f64> = sample_stations(1.0, 0.3).collect();
        assert_eq!(s.len(), 5);
        assert_relative_eq!(s[3], 0.9, epsilon = 1e-12);
        assert_eq!(s[4], 1.0);

        let s: Vec<f64> = sample_stations(1.0, 0.5).collect();
        assert_eq!(s, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_sample_world() {
        let line =
            Centerline::from_points(vec![Vector2::new(0.0, 0.0), Vector2::new(50.0, 0.0)])
                .unwrap();

        let mut c = Candidate::new(Polynomial::new([1.0, 0.0, 0.0, 0.0]));
        c.set_max_length(10.0).unwrap();
        c.set_s0(5.0);

        let points = c.sample_world(&line, 2.5);
        assert_eq!(points.len(), 5);
        assert_relative_eq!(points[0], Vector2::new(5.0, 1.0));
        assert_relative_eq!(points[4], Vector2::new(15.0, 1.0));
    }
}
