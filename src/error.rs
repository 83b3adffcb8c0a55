use faer::linalg::svd::SvdError;

use crate::equations::Var;

/// Rejected solver configuration, checked before the iteration loop starts.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// The iteration budget must allow at least one iteration.
    #[error("max_iterations must be at least 1")]
    ZeroIterationBudget,
    /// Tolerances must be positive finite reals.
    #[error("tolerance must be a positive real, got {0}")]
    NonPositiveTolerance(f64),
}

/// Errors that could occur while running the Newton-KKT solve.
#[derive(thiserror::Error, Debug)]
pub enum SolveError {
    /// The configuration was rejected up front.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// An equation referenced a variable that has no slot in the
    /// variable vector.
    #[error("variable {0} not found in the variable vector")]
    UnknownVariable(Var),
    /// There should be exactly 1 initial value per variable, but you
    /// supplied the wrong number.
    #[error(
        "The system has {variables} variables (primal plus multipliers) but {guesses} initial values were supplied"
    )]
    WrongNumberGuesses {
        /// How many variables the KKT system declares.
        variables: usize,
        /// How many initial values were given.
        guesses: usize,
    },
    /// The regularized KKT matrix was numerically non-invertible, so no
    /// Newton step exists. Fatal; the solve is aborted where it stood.
    #[error("singular KKT matrix at iteration {iteration}")]
    SingularSystem {
        /// Which iteration hit the singular matrix (0-based).
        iteration: usize,
        /// The iterate the matrix was evaluated at.
        iterate: Vec<f64>,
    },
    /// Faer: could not decompose the KKT matrix.
    #[error("something went wrong doing SVD in faer")]
    Svd(SvdError),
    /// You provided a system with no variables.
    #[error("cannot solve an empty system")]
    EmptySystem,
}
