use libm::fmax;

/// Order of the Lp vector norm used for residual distances, step sizes, and
/// the stopping criteria. These are the recognized orders; there are no
/// others.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LpNorm {
    /// Sum of absolute values.
    One,
    /// Euclidean norm.
    #[default]
    Two,
    /// Largest absolute value.
    Infinity,
}

impl LpNorm {
    /// The norm of `v` at this order.
    pub fn norm(self, v: &[f64]) -> f64 {
        match self {
            LpNorm::One => v.iter().map(|x| x.abs()).sum(),
            LpNorm::Two => v.iter().map(|x| x * x).sum::<f64>().sqrt(),
            LpNorm::Infinity => v.iter().map(|x| x.abs()).fold(0.0, fmax),
        }
    }
}
