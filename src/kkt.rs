//! The seam between problem construction and the Newton engine.
//!
//! A [`KktSystem`] supplies the Hessian and gradient of an augmented
//! Lagrangian as pure functions of the current point. The engine never cares
//! how they were produced: [`Lagrangian`] derives them from symbolic
//! [`Equation`]s, [`ClosureSystem`] wraps a hand-derived closed form.

use faer::Mat;

use crate::{SolveError, equations::Equation};

/// The KKT Hessian and gradient of an augmented Lagrangian, evaluable at any
/// point.
///
/// The variable vector is ordered: primal variables first, one Lagrange
/// multiplier per equality constraint after. Implementations must be pure
/// with respect to `point`.
pub trait KktSystem {
    /// Length of the variable vector (primal variables plus multipliers).
    fn num_variables(&self) -> usize;

    /// Write the Hessian of the Lagrangian at `point` into `out`.
    /// `out` is square with side [`Self::num_variables`]; every cell is
    /// overwritten.
    fn hessian(&self, point: &[f64], out: &mut Mat<f64>) -> Result<(), SolveError>;

    /// Write the gradient of the Lagrangian at `point` into `out`.
    /// `out` has length [`Self::num_variables`]; every entry is overwritten.
    fn gradient(&self, point: &[f64], out: &mut [f64]) -> Result<(), SolveError>;
}

/// An augmented Lagrangian `objective + Σ multiplier_i · constraint_i`
/// assembled from symbolic equations.
///
/// Multiplier `i` is assigned variable index `num_primal + i`, so the
/// constraint residuals fall out of the gradient and the constraint Jacobian
/// blocks fall out of the Hessian without any special casing.
pub struct Lagrangian {
    lagrangian: Equation,
    num_primal: usize,
    num_constraints: usize,
}

impl Lagrangian {
    /// Build the Lagrangian for an objective over `num_primal` primal
    /// variables (indices `0..num_primal`) and a set of equality constraints
    /// (each implicitly `= 0`). Constraint equations must only reference
    /// primal variables.
    pub fn new(
        objective: Equation,
        constraints: impl IntoIterator<Item = Equation>,
        num_primal: usize,
    ) -> Self {
        let mut lagrangian = objective;
        let mut num_constraints = 0;
        for constraint in constraints {
            let multiplier = Equation::variable(num_primal + num_constraints);
            lagrangian = lagrangian + multiplier * constraint;
            num_constraints += 1;
        }
        Self {
            lagrangian,
            num_primal,
            num_constraints,
        }
    }

    /// How many primal variables the objective ranges over.
    pub fn num_primal(&self) -> usize {
        self.num_primal
    }

    /// How many equality constraints (and therefore multipliers) there are.
    pub fn num_constraints(&self) -> usize {
        self.num_constraints
    }
}

impl KktSystem for Lagrangian {
    fn num_variables(&self) -> usize {
        self.num_primal + self.num_constraints
    }

    fn hessian(&self, point: &[f64], out: &mut Mat<f64>) -> Result<(), SolveError> {
        let eval = self.lagrangian.evaluate(point)?;
        let n = self.num_variables();
        for i in 0..n {
            for j in 0..n {
                out[(i, j)] = 0.0;
            }
        }
        // Curvature stores each symmetric pair once; mirror it.
        for (&(i, j), &dd) in &eval.curvature {
            out[(i, j)] = dd;
            out[(j, i)] = dd;
        }
        Ok(())
    }

    fn gradient(&self, point: &[f64], out: &mut [f64]) -> Result<(), SolveError> {
        let eval = self.lagrangian.evaluate(point)?;
        out.fill(0.0);
        for (&i, &d) in &eval.gradient {
            out[i] = d;
        }
        Ok(())
    }
}

/// A KKT system given directly as a pair of closures, for callers who already
/// have a closed-form Hessian and gradient.
pub struct ClosureSystem<H, G> {
    num_variables: usize,
    hessian_fn: H,
    gradient_fn: G,
}

impl<H, G> ClosureSystem<H, G>
where
    H: Fn(&[f64]) -> Mat<f64>,
    G: Fn(&[f64]) -> Vec<f64>,
{
    /// Wrap `hessian_fn` and `gradient_fn`, which must return an
    /// `num_variables`-sided matrix and an `num_variables`-length vector
    /// respectively for any point of that length.
    pub fn new(num_variables: usize, hessian_fn: H, gradient_fn: G) -> Self {
        Self {
            num_variables,
            hessian_fn,
            gradient_fn,
        }
    }
}

impl<H, G> KktSystem for ClosureSystem<H, G>
where
    H: Fn(&[f64]) -> Mat<f64>,
    G: Fn(&[f64]) -> Vec<f64>,
{
    fn num_variables(&self) -> usize {
        self.num_variables
    }

    fn hessian(&self, point: &[f64], out: &mut Mat<f64>) -> Result<(), SolveError> {
        let h = (self.hessian_fn)(point);
        out.as_mut().copy_from(h.as_ref());
        Ok(())
    }

    fn gradient(&self, point: &[f64], out: &mut [f64]) -> Result<(), SolveError> {
        let g = (self.gradient_fn)(point);
        out.copy_from_slice(&g);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::Var;

    fn x(var: Var) -> Equation {
        Equation::variable(var)
    }

    #[track_caller]
    fn assert_nearly(lhs: f64, rhs: f64) {
        assert!(
            (lhs - rhs).abs() < 1e-12,
            "LHS was {lhs}, RHS was {rhs}"
        );
    }

    #[test]
    fn lagrangian_gradient_holds_constraint_residuals() {
        // minimize-ish x0.x1 subject to x0 + x1 - 3 = 0.
        // dL/dlambda is the constraint residual itself.
        let system = Lagrangian::new(
            x(0) * x(1),
            [x(0) + x(1) - Equation::constant(3.0)],
            2,
        );
        assert_eq!(system.num_variables(), 3);

        let point = [1.0, 4.0, 2.0];
        let mut gradient = vec![0.0; 3];
        system.gradient(&point, &mut gradient).unwrap();
        // dL/dx0 = x1 + lambda, dL/dx1 = x0 + lambda, dL/dlambda = x0+x1-3.
        assert_nearly(gradient[0], 6.0);
        assert_nearly(gradient[1], 3.0);
        assert_nearly(gradient[2], 2.0);
    }

    #[test]
    fn lagrangian_hessian_is_symmetric_with_constraint_jacobian_blocks() {
        let system = Lagrangian::new(
            x(0) * x(1),
            [x(0).powi(2) + x(1).powi(2) - Equation::constant(4.0)],
            2,
        );
        let point = [1.0, 2.0, 0.5];
        let mut hessian = Mat::zeros(3, 3);
        system.hessian(&point, &mut hessian).unwrap();

        // d2L/dx0dx1 = 1, d2L/dx0^2 = 2.lambda,
        // d2L/dx0 dlambda = dg/dx0 = 2.x0, d2L/dlambda^2 = 0.
        assert_nearly(hessian[(0, 1)], 1.0);
        assert_nearly(hessian[(0, 0)], 1.0);
        assert_nearly(hessian[(1, 1)], 1.0);
        assert_nearly(hessian[(0, 2)], 2.0);
        assert_nearly(hessian[(1, 2)], 4.0);
        assert_nearly(hessian[(2, 2)], 0.0);
        for i in 0..3 {
            for j in 0..3 {
                assert_nearly(hessian[(i, j)], hessian[(j, i)]);
            }
        }
    }

    #[test]
    fn hessian_overwrites_stale_values() {
        let system = Lagrangian::new(x(0) * x(1), [], 2);
        let mut hessian = Mat::from_fn(2, 2, |_, _| 99.0);
        system.hessian(&[0.0, 0.0], &mut hessian).unwrap();
        assert_nearly(hessian[(0, 0)], 0.0);
        assert_nearly(hessian[(0, 1)], 1.0);
    }
}
