//! Newton's method on the Karush-Kuhn-Tucker conditions of an
//! equality-constrained optimization problem.
//!
//! Build an augmented Lagrangian from symbolic [`Equation`]s (or supply a
//! closed-form Hessian/gradient pair through [`ClosureSystem`]), then run
//! [`solve`] to iterate `H.step = g` from a starting point until one of three
//! stopping criteria fires or the iteration budget runs out. The returned
//! [`SolveOutcome`] carries the full iterate trajectory, the residual
//! distances, and a convergence-rate classification for downstream reporting.

pub use crate::equations::Equation;
pub use crate::error::{ConfigError, SolveError};
pub use crate::kkt::{ClosureSystem, KktSystem, Lagrangian};
pub use crate::norm::LpNorm;
pub use crate::outcome::{ConvergenceRate, SolveOutcome, StopReason};
pub use crate::solver::{Config, solve};

/// Symbolic equations with first and second derivatives.
pub mod equations;
/// Everything that can go wrong while configuring or running a solve.
mod error;
/// The KKT system seam between problem construction and the engine.
pub mod kkt;
/// Lp vector norms.
mod norm;
/// Result records.
mod outcome;
/// The Newton iteration engine.
mod solver;
