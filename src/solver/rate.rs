//! Convergence diagnostics over the residual-distance sequence.

use crate::outcome::ConvergenceRate;

/// Second-order-accurate numerical gradient of a uniformly spaced sequence:
/// central differences at interior points, three-point one-sided stencils at
/// both edges. Callers must supply at least 3 entries.
pub(crate) fn trend_gradient(d: &[f64]) -> Vec<f64> {
    let n = d.len();
    debug_assert!(n >= 3, "edge stencils need 3 points, got {n}");
    let mut g = Vec::with_capacity(n);
    g.push((-3.0 * d[0] + 4.0 * d[1] - d[2]) / 2.0);
    for i in 1..n - 1 {
        g.push((d[i + 1] - d[i - 1]) / 2.0);
    }
    g.push((3.0 * d[n - 1] - 4.0 * d[n - 2] + d[n - 3]) / 2.0);
    g
}

/// Estimate the convergence rate from the distance sequence.
///
/// Takes first differences, then the ratio of each difference to its
/// successor; the last such ratio is the rate constant. Fewer than two
/// differences means there is nothing to classify.
pub(crate) fn estimate(distances: &[f64]) -> (Option<f64>, ConvergenceRate) {
    let differences: Vec<f64> = distances.windows(2).map(|w| w[1] - w[0]).collect();
    let k = differences.len();
    if k < 2 {
        return (None, ConvergenceRate::InsufficientData);
    }
    let mu = ratio(differences[k - 2], differences[k - 1]);
    let rate = if mu < 1.0 {
        ConvergenceRate::SuperlinearOrQuadratic
    } else if mu > 1.0 {
        ConvergenceRate::SublinearOrDivergent
    } else {
        ConvergenceRate::Linear
    };
    (Some(mu), rate)
}

/// A zero denominator (or a 0/0) contributes a 0 rather than propagating
/// inf/NaN into the classification.
#[allow(clippy::float_cmp)]
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let r = numerator / denominator;
    if r.is_nan() { 0.0 } else { r }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn assert_nearly(lhs: f64, rhs: f64) {
        assert!((lhs - rhs).abs() < 1e-12, "LHS was {lhs}, RHS was {rhs}");
    }

    #[test]
    fn trend_of_linear_sequence_is_constant() {
        let g = trend_gradient(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(g.len(), 4);
        for v in g {
            assert_nearly(v, 1.0);
        }
    }

    #[test]
    fn trend_is_exact_for_quadratics() {
        // d_i = i^2, so the derivative is 2i everywhere, edges included.
        let g = trend_gradient(&[0.0, 1.0, 4.0, 9.0, 16.0]);
        for (i, v) in g.into_iter().enumerate() {
            assert_nearly(v, 2.0 * i as f64);
        }
    }

    #[test]
    fn trend_of_three_points() {
        let g = trend_gradient(&[1.0, 0.5, 0.4]);
        assert_eq!(g.len(), 3);
        assert_nearly(g[0], (-3.0 + 2.0 - 0.4) / 2.0);
        assert_nearly(g[1], (0.4 - 1.0) / 2.0);
        assert_nearly(g[2], (1.2 - 2.0 + 1.0) / 2.0);
    }

    #[test]
    fn shrinking_difference_ratios_classify_superlinear() {
        // Differences -0.1, -0.2, -0.4: each ratio is 0.5.
        let (mu, rate) = estimate(&[1.0, 0.9, 0.7, 0.3]);
        assert_nearly(mu.unwrap(), 0.5);
        assert_eq!(rate, ConvergenceRate::SuperlinearOrQuadratic);
    }

    #[test]
    fn constant_differences_classify_linear() {
        let (mu, rate) = estimate(&[4.0, 3.0, 2.0, 1.0]);
        assert_nearly(mu.unwrap(), 1.0);
        assert_eq!(rate, ConvergenceRate::Linear);
    }

    #[test]
    fn collapsing_differences_classify_sublinear() {
        // A quadratically-shrinking distance sequence has growing difference
        // ratios: -0.4 / -0.09 is about 4.4.
        let (mu, rate) = estimate(&[1.0, 0.5, 0.1, 0.01]);
        assert!(mu.unwrap() > 1.0);
        assert_eq!(rate, ConvergenceRate::SublinearOrDivergent);
    }

    #[test]
    fn zero_denominator_becomes_zero_ratio() {
        // Differences -1, 0: the ratio's denominator is exactly zero.
        let (mu, rate) = estimate(&[2.0, 1.0, 1.0]);
        assert_nearly(mu.unwrap(), 0.0);
        assert_eq!(rate, ConvergenceRate::SuperlinearOrQuadratic);
    }

    #[test]
    fn short_sequences_are_insufficient() {
        assert_eq!(estimate(&[]), (None, ConvergenceRate::InsufficientData));
        assert_eq!(estimate(&[1.0]), (None, ConvergenceRate::InsufficientData));
        assert_eq!(
            estimate(&[1.0, 0.5]),
            (None, ConvergenceRate::InsufficientData)
        );
    }
}
