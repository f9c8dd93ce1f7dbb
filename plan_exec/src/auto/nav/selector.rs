//! # Candidate Selector
//!
//! Ranks an evaluated candidate set and picks the candidate to execute.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, warn};
use serde::Serialize;
use std::cmp::Ordering;

use super::{Candidate, NavError};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The outcome of a planning cycle.
#[derive(Debug, Clone, Serialize)]
pub struct Selection {
    /// All candidates of the cycle, best first, with their ranks assigned
    pub ranked: Vec<Candidate>,

    pub feasibility: Feasibility,
}

/// A point on the chosen candidate for the trajectory controller to steer toward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocalTarget {
    /// Arc length along the centerline
    pub s_m: f64,

    /// Lateral offset from the centerline
    pub rho_m: f64,

    /// Lateral slope of the candidate at the target
    pub slope: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Feasibility {
    /// The chosen candidate is feasible
    Feasible,

    /// No candidate was feasible, the chosen candidate is the least bad of them
    NoFeasibleCandidate,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Selection {
    /// The chosen candidate.
    pub fn best(&self) -> &Candidate {
        // Never empty, `select` refuses empty sets
        &self.ranked[0]
    }

    pub fn is_feasible(&self) -> bool {
        self.feasibility == Feasibility::Feasible
    }

    /// The point `lookahead_m` along the chosen candidate, or its end point if the candidate is
    /// shorter than that.
    pub fn local_target(&self, lookahead_m: f64) -> LocalTarget {
        let best = self.best();
        let s_m = lookahead_m.max(0.0).min(best.max_length());

        LocalTarget {
            s_m: best.s0() + s_m,
            rho_m: best.at(s_m),
            slope: best.derivative_at(s_m),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Rank the candidates and choose the one to execute.
///
/// Feasible candidates always rank above infeasible ones, and the costs of infeasible
/// candidates are first raised by [`lift_infeasible_costs`] so that cost never decreases with
/// rank. Within each group candidates are ordered by cost, then by their distance from the
/// centerline at their ends, then by the order in which they were generated.
pub fn select(mut candidates: Vec<Candidate>) -> Result<Selection, NavError> {
    if candidates.is_empty() {
        return Err(NavError::NoCandidates);
    }

    lift_infeasible_costs(&mut candidates);

    let mut indexed: Vec<(usize, Candidate)> = candidates.into_iter().enumerate().collect();
    indexed.sort_by(compare);

    let ranked: Vec<Candidate> = indexed
        .into_iter()
        .enumerate()
        .map(|(rank, (_, mut c))| {
            c.set_rank(Some(rank));
            c
        })
        .collect();

    let feasibility = if ranked[0].is_feasible() {
        Feasibility::Feasible
    } else {
        warn!(
            "No feasible candidate among {}, least cost candidate has cost {:.3}",
            ranked.len(),
            ranked[0].cost()
        );
        Feasibility::NoFeasibleCandidate
    };

    debug!(
        "Selected candidate to {:.2} m (cost {:.3}) from {} candidates",
        ranked[0].terminal_offset(),
        ranked[0].cost(),
        ranked.len()
    );

    Ok(Selection {
        ranked,
        feasibility,
    })
}

/// Raise the cost of every infeasible candidate by the same amount, so that the cheapest of them
/// costs at least as much as the most expensive feasible candidate.
///
/// The order of the infeasible candidates among themselves is kept. Nothing changes if either
/// group is empty or if the infeasible candidates already cost more.
pub fn lift_infeasible_costs(candidates: &mut [Candidate]) {
    let feasible_max = candidates
        .iter()
        .filter(|c| c.is_feasible())
        .map(|c| c.cost())
        .fold(std::f64::NEG_INFINITY, f64::max);

    let infeasible_min = candidates
        .iter()
        .filter(|c| !c.is_feasible())
        .map(|c| c.cost())
        .fold(std::f64::INFINITY, f64::min);

    if !(feasible_max.is_finite() && infeasible_min.is_finite()) || infeasible_min >= feasible_max
    {
        return;
    }

    let lift = feasible_max - infeasible_min;
    debug!(
        "Raising infeasible candidate costs by {:.3} above the feasible maximum {:.3}",
        lift, feasible_max
    );

    for c in candidates.iter_mut().filter(|c| !c.is_feasible()) {
        // Rounding in the sum must not leave a candidate below the feasible maximum
        c.set_cost((c.cost() + lift).max(feasible_max));
    }
}

/// Ranking order of two `(generation index, candidate)` pairs.
fn compare(a: &(usize, Candidate), b: &(usize, Candidate)) -> Ordering {
    let (ia, ca) = a;
    let (ib, cb) = b;

    // `false` sorts before `true`, so feasible candidates come first
    (!ca.is_feasible())
        .cmp(&!cb.is_feasible())
        .then_with(|| ca.cost().total_cmp(&cb.cost()))
        .then_with(|| {
            ca.terminal_offset()
                .abs()
                .total_cmp(&cb.terminal_offset().abs())
        })
        .then_with(|| ia.cmp(ib))
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::nav::{generator::boundary_cubic, Polynomial};
    use approx::assert_relative_eq;

    fn scored(offset_m: f64, cost: f64, feasible: bool) -> Candidate {
        let mut c = Candidate::new(boundary_cubic(0.0, 0.0, offset_m, 10.0));
        c.set_max_length(10.0).unwrap();
        c.set_cost(cost);
        c.set_hits_obstacle(!feasible);
        c
    }

    #[test]
    fn test_empty() {
        assert!(matches!(select(vec![]), Err(NavError::NoCandidates)));
    }

    #[test]
    fn test_ranking() {
        let selection = select(vec![
            scored(-1.0, 3.0, true),
            scored(0.0, 1.0, true),
            scored(1.0, 2.0, true),
        ])
        .unwrap();

        assert!(selection.is_feasible());

        let ranks: Vec<Option<usize>> = selection.ranked.iter().map(|c| c.rank()).collect();
        assert_eq!(ranks, vec![Some(0), Some(1), Some(2)]);

        let costs: Vec<f64> = selection.ranked.iter().map(|c| c.cost()).collect();
        assert_eq!(costs, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_feasible_first() {
        // The infeasible candidate starts out cheaper than the feasible one
        let selection =
            select(vec![scored(0.0, 0.5, false), scored(2.0, 10.0, true)]).unwrap();

        assert!(selection.is_feasible());
        assert_relative_eq!(selection.best().terminal_offset(), 2.0, epsilon = 1e-9);
        assert_eq!(selection.ranked[1].rank(), Some(1));

        let costs: Vec<f64> = selection.ranked.iter().map(|c| c.cost()).collect();
        assert!(costs[0] <= costs[1]);
        assert_relative_eq!(costs[1], 10.0);
    }

    #[test]
    fn test_lift_infeasible_costs() {
        let mut set = vec![
            scored(0.0, 0.5, false),
            scored(1.0, 3.0, true),
            scored(-1.0, 2.0, false),
            scored(2.0, 10.0, true),
        ];
        lift_infeasible_costs(&mut set);

        // Feasible costs untouched, infeasible ones shifted by 9.5 keeping their order
        assert_eq!(set[1].cost(), 3.0);
        assert_eq!(set[3].cost(), 10.0);
        assert_relative_eq!(set[0].cost(), 10.0);
        assert_relative_eq!(set[2].cost(), 11.5);

        // Already above the feasible maximum, nothing to do
        let mut set = vec![scored(0.0, 1e9, false), scored(1.0, 3.0, true)];
        lift_infeasible_costs(&mut set);
        assert_eq!(set[0].cost(), 1e9);

        // Only infeasible candidates
        let mut set = vec![scored(0.0, 0.5, false), scored(1.0, 0.2, false)];
        lift_infeasible_costs(&mut set);
        assert_eq!(set[0].cost(), 0.5);
        assert_eq!(set[1].cost(), 0.2);
    }

    #[test]
    fn test_no_feasible() {
        let selection =
            select(vec![scored(0.0, 1e9 + 5.0, false), scored(1.0, 1e9 + 1.0, false)]).unwrap();

        assert_eq!(selection.feasibility, Feasibility::NoFeasibleCandidate);
        assert_relative_eq!(selection.best().terminal_offset(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_tie_breaks() {
        let selection = select(vec![
            scored(2.0, 1.0, true),
            scored(-0.5, 1.0, true),
            scored(0.5, 1.0, true),
        ])
        .unwrap();

        // Closest to the centerline first, then generation order
        let offsets: Vec<f64> = selection
            .ranked
            .iter()
            .map(|c| (c.terminal_offset() * 10.0).round() / 10.0)
            .collect();
        assert_eq!(offsets, vec![-0.5, 0.5, 2.0]);
    }

    #[test]
    fn test_local_target() {
        let mut c = Candidate::new(Polynomial::new([1.0, 0.1, 0.0, 0.0]));
        c.set_max_length(10.0).unwrap();
        c.set_s0(3.0);

        let selection = select(vec![c]).unwrap();

        let target = selection.local_target(4.0);
        assert_relative_eq!(target.s_m, 7.0);
        assert_relative_eq!(target.rho_m, 1.4);
        assert_relative_eq!(target.slope, 0.1);

        // Clamped to the end of the candidate
        let target = selection.local_target(25.0);
        assert_relative_eq!(target.s_m, 13.0);
        assert_relative_eq!(target.rho_m, 2.0);
    }
}
