//! Property tests of the candidate machinery, the selector and the PID controller.

use plan_lib::auto::{
    loc::FrenetState,
    nav::{generator, selector, Candidate, Feasibility, Polynomial},
    traj_ctrl::PidController,
};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

const MIN_PROPTEST_CASES: u32 = 256;
const ABS_TOL: f64 = 1e-7;

fn proptest_cases() -> u32 {
    std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .map(|parsed| parsed.max(MIN_PROPTEST_CASES))
        .unwrap_or(MIN_PROPTEST_CASES)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= ABS_TOL * (1.0 + a.abs().max(b.abs()))
}

fn coeffs_strategy() -> impl Strategy<Value = [f64; 4]> {
    prop::array::uniform4(-5.0f64..5.0)
}

/// `(offset, cost, feasible)` of each candidate in a set.
fn scored_set_strategy() -> impl Strategy<Value = Vec<(f64, f64, bool)>> {
    prop::collection::vec(
        (
            prop::sample::select(vec![-2.0, -1.0, 0.0, 1.0, 2.0]),
            prop::sample::select(vec![0.0, 0.5, 1.0, 2.5, 10.0, 1e9]),
            any::<bool>(),
        ),
        1..24,
    )
}

fn scored_set(scores: &[(f64, f64, bool)]) -> Vec<Candidate> {
    scores.iter()
        .map(|&(offset_m, cost, feasible)| {
            let mut c = Candidate::new(generator::boundary_cubic(0.0, 0.0, offset_m, 10.0));
            c.set_max_length(10.0).unwrap();
            c.set_cost(cost);
            c.set_out_of_bounds(!feasible);
            c
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: proptest_cases(),
        .. ProptestConfig::default()
    })]

    #[test]
    fn polynomial_derivative_matches_analytic(coeffs in coeffs_strategy(), s in -20.0f64..20.0) {
        let p = Polynomial::new(coeffs);
        let [_, a1, a2, a3] = coeffs;

        prop_assert!(close(p.derivative().at(s), a1 + 2.0 * a2 * s + 3.0 * a3 * s * s));
        prop_assert!(close(p.derivative().derivative().at(s), 2.0 * a2 + 6.0 * a3 * s));
        prop_assert_eq!(p.derivative().derivative().derivative().derivative(), Polynomial::zero());
    }

    #[test]
    fn candidate_derivatives_follow_latest_curve(
        first in coeffs_strategy(),
        second in coeffs_strategy(),
        s in 0.0f64..100.0,
    ) {
        let mut replaced = Candidate::new(Polynomial::new(first));
        replaced.set_curve(Polynomial::new(second));
        let direct = Candidate::new(Polynomial::new(second));

        let expected = Polynomial::new(second).derivative().derivative().at(s);

        prop_assert!(close(replaced.second_derivative_at(s), expected));
        prop_assert_eq!(replaced.second_derivative_at(s), direct.second_derivative_at(s));
        prop_assert_eq!(replaced.derivative_at(s), direct.derivative_at(s));
    }

    #[test]
    fn generated_candidates_meet_boundary_conditions(
        r0 in -3.0f64..3.0,
        m0 in -0.5f64..0.5,
        offsets in prop::collection::vec(-4.0f64..4.0, 1..6),
        horizons in prop::collection::vec(2.0f64..40.0, 1..4),
    ) {
        let state = FrenetState { s_m: 7.0, rho_m: r0, slope: m0, curvature_m: 0.0 };
        let candidates = generator::generate_candidates(&state, &offsets, &horizons).unwrap();

        for c in candidates.iter() {
            let l = c.max_length();

            prop_assert!(close(c.at(0.0), r0));
            prop_assert!(close(c.derivative_at(0.0), m0));
            prop_assert!(close(c.derivative_at(l), 0.0));
            prop_assert!(offsets.iter().any(|&o| close(c.terminal_offset(), o)));
            prop_assert_eq!(c.s0(), 7.0);
        }

        // Ascending offset, then ascending horizon
        for pair in candidates.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(
                a.terminal_offset() < b.terminal_offset() + ABS_TOL
                    || a.max_length() < b.max_length()
            );
        }
    }

    #[test]
    fn selector_ranks_are_a_permutation_feasible_first(scores in scored_set_strategy()) {
        let n = scores.len();
        let num_feasible = scores.iter().filter(|s| s.2).count();

        let selection = selector::select(scored_set(&scores)).unwrap();

        prop_assert_eq!(selection.ranked.len(), n);

        let ranks: Vec<usize> = selection.ranked.iter().map(|c| c.rank().unwrap()).collect();
        prop_assert_eq!(ranks, (0..n).collect::<Vec<_>>());

        // Feasible block first, cost non-decreasing over the whole ranking
        for (i, c) in selection.ranked.iter().enumerate() {
            prop_assert_eq!(c.is_feasible(), i < num_feasible);
        }
        for pair in selection.ranked.windows(2) {
            prop_assert!(pair[0].cost() <= pair[1].cost());
        }

        let expected = if num_feasible > 0 {
            Feasibility::Feasible
        } else {
            Feasibility::NoFeasibleCandidate
        };
        prop_assert_eq!(selection.feasibility, expected);
    }

    #[test]
    fn pid_ignores_ki_before_crossing(
        setpoint in 1.0f64..100.0,
        fractions in prop::collection::vec(0.0f64..0.99, 1..20),
        k_i in 0.0f64..10.0,
        dt in 0.01f64..1.0,
    ) {
        let mut without = PidController::new(0.3, 0.0, 0.05);
        let mut with = PidController::new(0.3, k_i, 0.05);
        without.set_setpoint(setpoint);
        with.set_setpoint(setpoint);

        // Measurements all below the setpoint
        for f in fractions {
            let m = setpoint * f;
            prop_assert_eq!(
                without.get_control_variable(m, dt).unwrap(),
                with.get_control_variable(m, dt).unwrap()
            );
        }
        prop_assert!(!with.crossed_setpoint());
    }

    #[test]
    fn pid_integral_resets_on_crossing(
        below in prop::collection::vec(0.0f64..9.9, 1..10),
        overshoot in 10.1f64..20.0,
        dt in 0.01f64..1.0,
    ) {
        let mut pid = PidController::new(0.3, 0.5, 0.05);
        pid.set_setpoint(10.0);

        for m in below {
            pid.get_control_variable(m, dt).unwrap();
        }
        pid.get_control_variable(overshoot, dt).unwrap();

        prop_assert!(pid.crossed_setpoint());
        prop_assert!(close(pid.integral(), (10.0 - overshoot) * dt));
    }
}
