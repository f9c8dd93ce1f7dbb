//! # Candidate Generator
//!
//! Builds the family of candidates considered in a planning cycle. Every candidate is a cubic
//! which starts at the vehicle's current lateral offset and slope and finishes, after one of the
//! configured horizons, at one of the configured terminal offsets parallel to the centerline.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::{Candidate, NavError, Polynomial};
use crate::auto::loc::FrenetState;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the candidate generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorParams {
    /// Candidate lengths to generate for each terminal offset
    pub horizons_m: Vec<f64>,

    /// Lateral offsets from the centerline at which candidates end
    pub terminal_offsets: TerminalOffsets,

    /// If set, terminal offsets further than this from the centerline are not generated
    #[serde(default)]
    pub corridor_half_width_m: Option<f64>,
}

/// Generates candidate sets, holding the validated and ordered offsets and horizons.
#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    offsets_m: Vec<f64>,
    horizons_m: Vec<f64>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The set of terminal lateral offsets to generate candidates for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerminalOffsets {
    /// An explicit list of offsets
    Discrete { offsets_m: Vec<f64> },

    /// Evenly spaced offsets from `min_m` up to and including `max_m`
    Range { min_m: f64, max_m: f64, step_m: f64 },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            horizons_m: vec![10.0, 15.0, 20.0],
            terminal_offsets: TerminalOffsets::Range {
                min_m: -3.0,
                max_m: 3.0,
                step_m: 0.5,
            },
            corridor_half_width_m: None,
        }
    }
}

impl TerminalOffsets {
    /// Expand into an ascending list of offsets.
    pub fn expand(&self) -> Result<Vec<f64>, NavError> {
        let mut offsets_m = match self {
            TerminalOffsets::Discrete { offsets_m } => {
                if let Some(o) = offsets_m.iter().find(|o| !o.is_finite()) {
                    return Err(NavError::InvalidOffsets(format!(
                        "offset {} is not finite",
                        o
                    )));
                }
                offsets_m.clone()
            }
            TerminalOffsets::Range {
                min_m,
                max_m,
                step_m,
            } => {
                if !(step_m.is_finite() && *step_m > 0.0) {
                    return Err(NavError::InvalidOffsets(format!(
                        "range step must be positive, got {}",
                        step_m
                    )));
                }
                if !(min_m.is_finite() && max_m.is_finite() && min_m <= max_m) {
                    return Err(NavError::InvalidOffsets(format!(
                        "invalid range {} to {}",
                        min_m, max_m
                    )));
                }

                // Small tolerance so that a max which is a whole number of steps is included
                let num_steps = ((max_m - min_m) / step_m + 1e-9).floor() as usize;

                (0..=num_steps)
                    .map(|i| min_m + i as f64 * step_m)
                    .collect()
            }
        };

        if offsets_m.is_empty() {
            return Err(NavError::InvalidOffsets(String::from("no offsets given")));
        }

        offsets_m.sort_by(|a, b| a.total_cmp(b));
        offsets_m.dedup();

        Ok(offsets_m)
    }
}

impl CandidateGenerator {
    /// Create a new generator, validating the parameters.
    pub fn new(params: &GeneratorParams) -> Result<Self, NavError> {
        let mut offsets_m = params.terminal_offsets.expand()?;

        if let Some(half_width_m) = params.corridor_half_width_m {
            offsets_m.retain(|o| o.abs() <= half_width_m);
        }

        Ok(Self {
            offsets_m,
            horizons_m: validate_horizons(&params.horizons_m)?,
        })
    }

    /// The terminal offsets candidates are generated for, ascending.
    pub fn offsets_m(&self) -> &[f64] {
        &self.offsets_m
    }

    /// The horizons candidates are generated for, ascending.
    pub fn horizons_m(&self) -> &[f64] {
        &self.horizons_m
    }

    /// Total number of candidates produced each cycle.
    pub fn num_candidates(&self) -> usize {
        self.offsets_m.len() * self.horizons_m.len()
    }

    /// Generate the candidate set for a vehicle in the given state.
    pub fn generate(&self, state: &FrenetState) -> Result<Vec<Candidate>, NavError> {
        generate_candidates(state, &self.offsets_m, &self.horizons_m)
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Generate one candidate per (terminal offset, horizon) pair.
///
/// Candidates start with the lateral offset and slope of `state` and end at the terminal offset
/// with zero slope. The output is ordered by ascending terminal offset, then ascending horizon.
pub fn generate_candidates(
    state: &FrenetState,
    offsets_m: &[f64],
    horizons_m: &[f64],
) -> Result<Vec<Candidate>, NavError> {
    let mut offsets_m = offsets_m.to_vec();
    offsets_m.sort_by(|a, b| a.total_cmp(b));
    let horizons_m = validate_horizons(horizons_m)?;

    let mut candidates = Vec::with_capacity(offsets_m.len() * horizons_m.len());

    for &offset_m in offsets_m.iter() {
        for &horizon_m in horizons_m.iter() {
            let curve = boundary_cubic(state.rho_m, state.slope, offset_m, horizon_m);

            let mut candidate = Candidate::new(curve);
            candidate.set_max_length(horizon_m)?;
            candidate.set_s0(state.s_m);

            trace!(
                "Candidate {}: offset {:.2} m, horizon {:.1} m, coeffs {:?}",
                candidates.len(),
                offset_m,
                horizon_m,
                curve.coeffs()
            );

            candidates.push(candidate);
        }
    }

    debug!("Generated {} candidates", candidates.len());

    Ok(candidates)
}

/// The cubic with `rho(0) = r0`, `rho'(0) = m0`, `rho(L) = rt` and `rho'(L) = 0`.
pub fn boundary_cubic(r0: f64, m0: f64, rt: f64, length_m: f64) -> Polynomial {
    let l = length_m;
    let d = rt - r0 - m0 * l;

    Polynomial::new([
        r0,
        m0,
        (3.0 * d + m0 * l) / (l * l),
        -(2.0 * d + m0 * l) / (l * l * l),
    ])
}

/// Check every horizon is usable and return them ascending.
fn validate_horizons(horizons_m: &[f64]) -> Result<Vec<f64>, NavError> {
    if let Some(&h) = horizons_m.iter().find(|h| !(h.is_finite() && **h > 0.0)) {
        return Err(NavError::InvalidHorizon(h));
    }

    let mut horizons_m = horizons_m.to_vec();
    horizons_m.sort_by(|a, b| a.total_cmp(b));
    horizons_m.dedup();

    Ok(horizons_m)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn state(rho_m: f64, slope: f64) -> FrenetState {
        FrenetState {
            s_m: 12.0,
            rho_m,
            slope,
            curvature_m: 0.0,
        }
    }

    #[test]
    fn test_boundary_conditions() {
        for &(r0, m0, rt, l) in &[
            (0.0, 0.0, 2.0, 10.0),
            (1.5, -0.2, -1.0, 20.0),
            (-0.5, 0.4, 0.0, 7.5),
        ] {
            let p = boundary_cubic(r0, m0, rt, l);
            let d = p.derivative();

            assert_relative_eq!(p.at(0.0), r0, epsilon = 1e-9);
            assert_relative_eq!(d.at(0.0), m0, epsilon = 1e-9);
            assert_relative_eq!(p.at(l), rt, epsilon = 1e-9);
            assert_relative_eq!(d.at(l), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_centerline_candidate_is_zero() {
        let candidates = generate_candidates(&state(0.0, 0.0), &[0.0], &[15.0]).unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].curve().degree(), None);
        assert_eq!(candidates[0].max_length(), 15.0);
        assert_eq!(candidates[0].s0(), 12.0);
    }

    #[test]
    fn test_ordering() {
        let candidates =
            generate_candidates(&state(0.3, 0.05), &[1.0, -1.0, 0.0], &[20.0, 10.0]).unwrap();

        let keys: Vec<(f64, f64)> = candidates
            .iter()
            .map(|c| (c.terminal_offset(), c.max_length()))
            .collect();

        let expected = [
            (-1.0, 10.0),
            (-1.0, 20.0),
            (0.0, 10.0),
            (0.0, 20.0),
            (1.0, 10.0),
            (1.0, 20.0),
        ];

        assert_eq!(keys.len(), expected.len());
        for (k, e) in keys.iter().zip(expected.iter()) {
            assert_relative_eq!(k.0, e.0, epsilon = 1e-9);
            assert_eq!(k.1, e.1);
        }
    }

    #[test]
    fn test_invalid_horizon() {
        assert!(matches!(
            generate_candidates(&state(0.0, 0.0), &[0.0], &[10.0, 0.0]),
            Err(NavError::InvalidHorizon(h)) if h == 0.0
        ));
        assert!(matches!(
            generate_candidates(&state(0.0, 0.0), &[0.0], &[-5.0]),
            Err(NavError::InvalidHorizon(_))
        ));
    }

    #[test]
    fn test_offsets() {
        let range = TerminalOffsets::Range {
            min_m: -1.0,
            max_m: 1.0,
            step_m: 0.5,
        };
        assert_eq!(range.expand().unwrap(), vec![-1.0, -0.5, 0.0, 0.5, 1.0]);

        let bad_step = TerminalOffsets::Range {
            min_m: -1.0,
            max_m: 1.0,
            step_m: 0.0,
        };
        assert!(matches!(bad_step.expand(), Err(NavError::InvalidOffsets(_))));

        let discrete = TerminalOffsets::Discrete {
            offsets_m: vec![2.0, -2.0, 0.0, 2.0],
        };
        assert_eq!(discrete.expand().unwrap(), vec![-2.0, 0.0, 2.0]);

        let empty = TerminalOffsets::Discrete { offsets_m: vec![] };
        assert!(empty.expand().is_err());
    }

    #[test]
    fn test_generator_corridor() {
        let params = GeneratorParams {
            horizons_m: vec![10.0, 20.0],
            terminal_offsets: TerminalOffsets::Range {
                min_m: -3.0,
                max_m: 3.0,
                step_m: 1.0,
            },
            corridor_half_width_m: Some(2.0),
        };

        let gen = CandidateGenerator::new(&params).unwrap();
        assert_eq!(gen.offsets_m(), &[-2.0, -1.0, 0.0, 1.0, 2.0]);
        assert_eq!(gen.num_candidates(), 10);

        let candidates = gen.generate(&state(0.5, 0.0)).unwrap();
        assert_eq!(candidates.len(), 10);
        assert!(candidates.iter().all(|c| c.rank().is_none()));
    }

    #[test]
    fn test_params_from_toml() {
        let params: GeneratorParams = util::params::from_str(
            "horizons_m = [10.0, 20.0]\n\
             [terminal_offsets]\n\
             kind = \"discrete\"\n\
             offsets_m = [-1.0, 0.0, 1.0]\n",
        )
        .unwrap();

        assert_eq!(params.corridor_half_width_m, None);
        assert_eq!(
            params.terminal_offsets,
            TerminalOffsets::Discrete {
                offsets_m: vec![-1.0, 0.0, 1.0]
            }
        );
    }
}
