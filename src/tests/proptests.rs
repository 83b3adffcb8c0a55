use proptest::prelude::*;

use crate::{Config, ConvergenceRate, Equation, Lagrangian, StopReason, solve, solver::rate};

/// A quadratic objective with one linear constraint. Its KKT system is
/// linear, so Newton lands on the solution in a single exact step from
/// anywhere.
fn constrained_quadratic(a: f64, b: f64, c: f64) -> Lagrangian {
    let x = Equation::variable;
    let objective =
        (x(0) - Equation::constant(a)).powi(2) + (x(1) - Equation::constant(b)).powi(2);
    let constraint = x(0) + x(1) - Equation::constant(c);
    Lagrangian::new(objective, [constraint], 2)
}

proptest! {
    #[test]
    fn quadratic_solves_from_anywhere(
        a in -10.0..10.0,
        b in -10.0..10.0,
        c in -10.0..10.0,
        guess_x in -10.0..10.0,
        guess_y in -10.0..10.0,
        guess_lambda in -5.0..5.0,
    ) {
        let system = constrained_quadratic(a, b, c);
        let outcome = solve(
            &system,
            &[guess_x, guess_y],
            &[guess_lambda],
            Config::default(),
        ).expect("a linear KKT system should always be solvable");

        // Invariant: the histories always line up with the iteration count,
        // and the first entry echoes the starting point.
        prop_assert_eq!(outcome.all_solutions.len(), outcome.iterations + 1);
        prop_assert_eq!(outcome.distances.len(), outcome.iterations);
        prop_assert_eq!(
            &outcome.all_solutions[0],
            &vec![guess_x, guess_y, guess_lambda]
        );

        // Invariant: one exact step, then at most two vanishing ones.
        prop_assert!(outcome.iterations <= 3);
        prop_assert_ne!(outcome.stop_reason, StopReason::IterationBudget);

        // Invariant: the constraint holds at the final iterate.
        let x0 = outcome.final_primal()[0];
        let x1 = outcome.final_primal()[1];
        prop_assert!((x0 + x1 - c).abs() < 1e-6);
    }

    #[test]
    fn rate_estimation_never_panics(
        distances in proptest::collection::vec(-1e6..1e6, 0..20),
    ) {
        let (mu, classified) = rate::estimate(&distances);
        prop_assert_eq!(mu.is_some(), distances.len() >= 3);
        match (mu, classified) {
            (None, r) => prop_assert_eq!(r, ConvergenceRate::InsufficientData),
            (Some(m), ConvergenceRate::SuperlinearOrQuadratic) => prop_assert!(m < 1.0),
            (Some(m), ConvergenceRate::SublinearOrDivergent) => prop_assert!(m > 1.0),
            (Some(m), ConvergenceRate::Linear) => prop_assert_eq!(m, 1.0),
            (Some(_), ConvergenceRate::InsufficientData) => {
                panic!("a rate constant rules out the insufficient-data class")
            }
        }
    }
}
