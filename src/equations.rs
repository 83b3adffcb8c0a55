// Closure-based forward evaluation: an equation knows how to produce its
// value and its first and second partial derivatives at any concrete point.
use indexmap::IndexMap;
use libm::pow;

use crate::SolveError;

/// Index of a variable in the shared ordered variable vector.
pub type Var = usize;

/// First partial derivatives, one entry per involved variable.
pub type Gradient = IndexMap<Var, f64>;

/// Second partial derivatives, one entry per ordered `(low, high)` pair of
/// involved variables. Symmetric entries are stored once.
pub type Curvature = IndexMap<(Var, Var), f64>;

/// Result of evaluating an equation at a point.
#[derive(Debug, PartialEq)]
pub struct Eval {
    /// The value of the equation.
    pub value: f64,
    /// All first derivatives.
    pub gradient: Gradient,
    /// All second derivatives.
    pub curvature: Curvature,
}

impl Eval {
    /// First derivative with respect to `var` (0 if `var` isn't involved).
    pub fn first(&self, var: Var) -> f64 {
        self.gradient.get(&var).copied().unwrap_or_default()
    }

    /// Second derivative with respect to `i` and `j`, in either order
    /// (0 if the pair isn't involved).
    pub fn second(&self, i: Var, j: Var) -> f64 {
        self.curvature
            .get(&ordered(i, j))
            .copied()
            .unwrap_or_default()
    }
}

fn ordered(i: Var, j: Var) -> (Var, Var) {
    if i <= j { (i, j) } else { (j, i) }
}

/// This is basically a newtype for
/// `Fn(&[f64]) -> Result<Eval>`.
trait Evaluate: Fn(&[f64]) -> Result<Eval, SolveError> {}
impl<F> Evaluate for F where F: Fn(&[f64]) -> Result<Eval, SolveError> {}

/// Symbolic equation that can be evaluated.
pub struct Equation {
    /// An equation really is nothing more than something to be evaluated.
    /// So all the significant logic for the equation lives in this closure.
    eval: Box<dyn Evaluate>,
    #[cfg(test)]
    debug_repr: String,
}

#[cfg(test)]
impl std::fmt::Debug for Equation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.debug_repr)
    }
}

impl Equation {
    /// Simplest equation: a constant.
    /// Does not depend on input variables at all.
    pub fn constant(value: f64) -> Self {
        let eval = move |_point: &[f64]| {
            Ok(Eval {
                value,
                gradient: Gradient::new(),
                curvature: Curvature::new(),
            })
        };
        Self {
            eval: Box::new(eval),
            #[cfg(test)]
            debug_repr: value.to_string(),
        }
    }

    /// Simple equation with a single variable, e.g. `x3`.
    /// The variable is the entry at index `var` of the point vector.
    pub fn variable(var: Var) -> Self {
        let eval = move |point: &[f64]| {
            let Some(value) = point.get(var).copied() else {
                return Err(SolveError::UnknownVariable(var));
            };
            let mut gradient = Gradient::with_capacity(1);
            gradient.insert(var, 1.0);
            Ok(Eval {
                value,
                gradient,
                curvature: Curvature::new(),
            })
        };
        Self {
            eval: Box::new(eval),
            #[cfg(test)]
            debug_repr: format!("x{var}"),
        }
    }

    /// Evaluate at a concrete point.
    pub fn evaluate(&self, point: &[f64]) -> Result<Eval, SolveError> {
        (self.eval)(point)
    }

    /// Raise to a non-negative integer power.
    pub fn powi(self, n: u32) -> Self {
        #[cfg(test)]
        let debug_repr = format!("({})^{n}", self.debug_repr);
        let eval = move |point: &[f64]| {
            let Eval {
                value: u,
                gradient: du,
                curvature: mut ddu,
            } = self.evaluate(point)?;

            let nf = f64::from(n);
            // d(u^n) = n.u^(n-1).du
            let c1 = if n == 0 { 0.0 } else { nf * pow(u, nf - 1.0) };
            ddu.values_mut().for_each(|d| *d *= c1);
            // dd(u^n) = n.(n-1).u^(n-2).du.du + n.u^(n-1).ddu
            if n >= 2 {
                let c2 = nf * (nf - 1.0) * pow(u, nf - 2.0);
                for a in 0..du.len() {
                    for b in a..du.len() {
                        let (&i, &di) = du.get_index(a).unwrap();
                        let (&j, &dj) = du.get_index(b).unwrap();
                        upsert(&mut ddu, ordered(i, j), c2 * di * dj);
                    }
                }
            }
            let mut gradient = du;
            gradient.values_mut().for_each(|d| *d *= c1);

            Ok(Eval {
                value: pow(u, nf),
                gradient,
                curvature: ddu,
            })
        };
        Self {
            eval: Box::new(eval),
            #[cfg(test)]
            debug_repr,
        }
    }
}

impl std::ops::Add for Equation {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        #[cfg(test)]
        let debug_repr = format!("({} + {})", self.debug_repr, rhs.debug_repr);

        let eval = move |point: &[f64]| {
            let a = self.evaluate(point)?;
            let b = rhs.evaluate(point)?;
            Ok(Eval {
                value: a.value + b.value,
                gradient: union_with(a.gradient, b.gradient, |x, y| x + y),
                curvature: union_with(a.curvature, b.curvature, |x, y| x + y),
            })
        };
        Self {
            eval: Box::new(eval),
            #[cfg(test)]
            debug_repr,
        }
    }
}

impl std::ops::Sub for Equation {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self + (-rhs)
    }
}

impl std::ops::Mul for Equation {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        #[cfg(test)]
        let debug_repr = format!("({} * {})", self.debug_repr, rhs.debug_repr);
        let eval = move |point: &[f64]| {
            let Eval {
                value: va,
                gradient: da,
                curvature: mut dda,
            } = self.evaluate(point)?;
            let Eval {
                value: vb,
                gradient: db,
                curvature: mut ddb,
            } = rhs.evaluate(point)?;

            // Product rule, second order:
            //   (ab)_ij = a_ij.b + a.b_ij + a_i.b_j + a_j.b_i
            // Reuse the existing maps rather than collecting new ones.
            dda.values_mut().for_each(|d| *d *= vb);
            ddb.values_mut().for_each(|d| *d *= va);
            let mut curvature = union_with(dda, ddb, |x, y| x + y);
            for (&i, &dai) in &da {
                for (&j, &dbj) in &db {
                    // The (i, j) and (j, i) passes each land one of the two
                    // cross terms in the shared ordered slot, except on the
                    // diagonal where a single pass must carry both.
                    let cross = if i == j { 2.0 * dai * dbj } else { dai * dbj };
                    upsert(&mut curvature, ordered(i, j), cross);
                }
            }

            let mut da = da;
            let mut db = db;
            da.values_mut().for_each(|d| *d *= vb);
            db.values_mut().for_each(|d| *d *= va);

            Ok(Eval {
                value: va * vb,
                gradient: union_with(da, db, |x, y| x + y),
                curvature,
            })
        };
        Self {
            eval: Box::new(eval),
            #[cfg(test)]
            debug_repr,
        }
    }
}

impl std::ops::Neg for Equation {
    type Output = Self;

    fn neg(self) -> Self::Output {
        #[cfg(test)]
        let debug_repr = format!("-{}", self.debug_repr);
        let eval = move |point: &[f64]| {
            let Eval {
                value,
                mut gradient,
                mut curvature,
            } = self.evaluate(point)?;
            gradient.values_mut().for_each(|d| *d = -*d);
            curvature.values_mut().for_each(|d| *d = -*d);
            Ok(Eval {
                value: -value,
                gradient,
                curvature,
            })
        };
        Self {
            eval: Box::new(eval),
            #[cfg(test)]
            debug_repr,
        }
    }
}

/// Add `value` into the entry at `key`, inserting it if absent.
fn upsert<K: std::hash::Hash + Eq>(map: &mut IndexMap<K, f64>, key: K, value: f64) {
    if let Some(existing) = map.get_mut(&key) {
        *existing += value;
    } else {
        map.insert(key, value);
    }
}

/// Union two maps. If a value appears in both maps,
/// pass both instances into `f` and insert that value.
fn union_with<K: std::hash::Hash + Eq, V: Copy>(
    a: IndexMap<K, V>,
    b: IndexMap<K, V>,
    f: impl Fn(V, V) -> V,
) -> IndexMap<K, V> {
    let mut out = a;
    out.reserve(b.len());
    for (b_key, b_val) in b {
        if let Some(a_val) = out.get(&b_key) {
            out.insert(b_key, f(*a_val, b_val));
        } else {
            out.insert(b_key, b_val);
        }
    }
    out
}
