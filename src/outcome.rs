use std::time::Duration;

/// Which stopping criterion ended the iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The Newton step's norm dropped below the tolerance.
    StepSize,
    /// The difference between successive iterates dropped below the
    /// tolerance.
    SolutionChange,
    /// The numerical gradient of the residual-distance sequence dropped
    /// below the tolerance: progress has stalled even though neither the
    /// step nor the change is small yet.
    GradientTrend,
    /// No criterion fired before the iteration budget ran out. Not an error;
    /// inspect the final residual to judge the result's quality.
    IterationBudget,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            StopReason::StepSize => "small step size",
            StopReason::SolutionChange => "small solution change",
            StopReason::GradientTrend => "gradient convergence",
            StopReason::IterationBudget => "iteration budget exhausted",
        };
        write!(f, "{msg}")
    }
}

/// Classification of the observed convergence rate, from the ratio of
/// successive first differences of the distance sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConvergenceRate {
    /// Last difference ratio below 1.
    SuperlinearOrQuadratic,
    /// Last difference ratio exactly 1.
    Linear,
    /// Last difference ratio above 1.
    SublinearOrDivergent,
    /// Fewer than two differences were available; nothing to classify.
    InsufficientData,
}

impl std::fmt::Display for ConvergenceRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            ConvergenceRate::SuperlinearOrQuadratic => "Superlinear or Quadratic",
            ConvergenceRate::Linear => "Linear",
            ConvergenceRate::SublinearOrDivergent => "Sublinear or Divergent",
            ConvergenceRate::InsufficientData => "Insufficient data to determine rate",
        };
        write!(f, "{msg}")
    }
}

/// Data from a finished Newton solve.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    /// The final iterate: primal variables first, multipliers after.
    pub final_solution: Vec<f64>,
    /// Every iterate in order, starting with the initial point.
    /// Always one entry longer than `iterations`.
    pub all_solutions: Vec<Vec<f64>>,
    /// Norm of the pre-update gradient, one entry per iteration.
    pub distances: Vec<f64>,
    /// How many iterations ran.
    pub iterations: usize,
    /// Wall-clock time spent in the iteration loop. Reporting only; it never
    /// influences control flow.
    pub cpu_time: Duration,
    /// Observed convergence-rate classification.
    pub convergence_rate: ConvergenceRate,
    /// The last difference ratio backing the classification, if one existed.
    pub rate_constant: Option<f64>,
    /// Which criterion ended the loop.
    pub stop_reason: StopReason,
    /// How many leading entries of each iterate are primal variables.
    /// The rest are Lagrange multipliers.
    pub num_primal: usize,
}

impl SolveOutcome {
    /// The primal block of the final iterate.
    pub fn final_primal(&self) -> &[f64] {
        &self.final_solution[..self.num_primal]
    }

    /// The multiplier block of the final iterate.
    pub fn final_multipliers(&self) -> &[f64] {
        &self.final_solution[self.num_primal..]
    }

    /// Human-readable multi-line report of the solve.
    pub fn summary(&self) -> String {
        let rate_constant = match self.rate_constant {
            Some(mu) => format!("{mu}"),
            None => "n/a".to_owned(),
        };
        format!(
            "Final solution x: {:?}\n\
             Final multipliers lambda: {:?}\n\
             Total iterations: {}\n\
             CPU time: {} seconds\n\
             Stopped because: {}\n\
             Convergence rate: {} (rate constant: {rate_constant})",
            self.final_primal(),
            self.final_multipliers(),
            self.iterations,
            self.cpu_time.as_secs_f64(),
            self.stop_reason,
            self.convergence_rate,
        )
    }
}
