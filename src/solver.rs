use std::time::Instant;

use faer::{ColRef, Mat, prelude::Solve};
use libm::fmax;

use crate::{
    ConfigError, LpNorm, SolveError,
    kkt::KktSystem,
    outcome::{SolveOutcome, StopReason},
};

pub(crate) mod rate;

// Tikhonov regularization added to the KKT matrix diagonal before each solve.
const REGULARIZATION_EPSILON: f64 = 1e-9;

// Singular values below this fraction of the largest one count as zero when
// judging invertibility.
const RANK_TOLERANCE: f64 = 1e-8;

/// Iteration controls for the Newton engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Hard cap on the number of Newton iterations.
    pub max_iterations: usize,
    /// Threshold shared by all three stopping criteria.
    pub tolerance: f64,
    /// Which Lp norm the distances and stopping criteria use.
    pub norm: LpNorm,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 1e-8,
            norm: LpNorm::Two,
        }
    }
}

impl Config {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(ConfigError::ZeroIterationBudget);
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ConfigError::NonPositiveTolerance(self.tolerance));
        }
        Ok(())
    }
}

/// Run Newton's method on the KKT stationarity conditions of `system`.
///
/// The starting point is the concatenation of `initial_primal` and
/// `initial_multipliers`, in the system's variable order. Each iteration
/// evaluates the Hessian and gradient at the current iterate, regularizes
/// the Hessian, solves for the Newton step, and applies it; the loop ends
/// when a stopping criterion fires or the iteration budget runs out.
/// Exhausting the budget is a normal outcome, reported through
/// [`StopReason::IterationBudget`].
pub fn solve<S: KktSystem + ?Sized>(
    system: &S,
    initial_primal: &[f64],
    initial_multipliers: &[f64],
    config: Config,
) -> Result<SolveOutcome, SolveError> {
    config.validate()?;
    let n = system.num_variables();
    if n == 0 {
        return Err(SolveError::EmptySystem);
    }
    let guesses = initial_primal.len() + initial_multipliers.len();
    if guesses != n {
        return Err(SolveError::WrongNumberGuesses {
            variables: n,
            guesses,
        });
    }

    let mut current: Vec<f64> = initial_primal
        .iter()
        .chain(initial_multipliers)
        .copied()
        .collect();
    let mut all_solutions = vec![current.clone()];
    let mut distances: Vec<f64> = Vec::new();

    let mut hessian = Mat::<f64>::zeros(n, n);
    let mut gradient = vec![0.0; n];
    let mut stop_reason = StopReason::IterationBudget;

    let start = Instant::now();
    for iteration in 0..config.max_iterations {
        system.hessian(&current, &mut hessian)?;
        system.gradient(&current, &mut gradient)?;

        for i in 0..n {
            hessian[(i, i)] += REGULARIZATION_EPSILON;
        }
        ensure_invertible(&hessian, iteration, &current)?;

        // Newton step: solve H.step = g, then walk against it.
        let factored = hessian.full_piv_lu();
        let solved = factored.solve(ColRef::from_slice(&gradient));
        let step: Vec<f64> = solved.iter().copied().collect();

        let previous = current.clone();
        for (x, s) in current.iter_mut().zip(&step) {
            *x -= s;
        }
        all_solutions.push(current.clone());
        distances.push(config.norm.norm(&gradient));

        // Stopping criteria, in order; any one is sufficient.
        if config.norm.norm(&step) < config.tolerance {
            stop_reason = StopReason::StepSize;
            break;
        }
        let change: Vec<f64> = current
            .iter()
            .zip(&previous)
            .map(|(c, p)| c - p)
            .collect();
        if config.norm.norm(&change) < config.tolerance {
            stop_reason = StopReason::SolutionChange;
            break;
        }
        if distances.len() > 2 {
            let trend = rate::trend_gradient(&distances);
            if config.norm.norm(&trend) < config.tolerance {
                stop_reason = StopReason::GradientTrend;
                break;
            }
        }
    }
    let cpu_time = start.elapsed();
    let (rate_constant, convergence_rate) = rate::estimate(&distances);

    Ok(SolveOutcome {
        iterations: distances.len(),
        all_solutions,
        final_solution: current,
        distances,
        cpu_time,
        convergence_rate,
        rate_constant,
        stop_reason,
        num_primal: initial_primal.len(),
    })
}

/// Reject a (numerically) non-invertible KKT matrix before factorizing it.
///
/// Singular values below `RANK_TOLERANCE` times the largest count as zero.
/// The absolute floor catches a matrix whose only content is the
/// regularization shift itself: `1e-9.I` is invertible on paper, but a
/// Newton step against it is pure noise.
fn ensure_invertible(
    hessian: &Mat<f64>,
    iteration: usize,
    iterate: &[f64],
) -> Result<(), SolveError> {
    let svd = hessian.svd().map_err(SolveError::Svd)?;
    let sigma = svd.S().column_vector();
    let largest = sigma
        .iter()
        .copied()
        .reduce(fmax)
        .ok_or(SolveError::EmptySystem)?;

    let singular = largest <= REGULARIZATION_EPSILON * 10.0
        || sigma.iter().any(|&s| s <= RANK_TOLERANCE * largest);
    if singular {
        return Err(SolveError::SingularSystem {
            iteration,
            iterate: iterate.to_vec(),
        });
    }
    Ok(())
}
