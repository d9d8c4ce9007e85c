//! Least-squares fitting: polynomials and general nonlinear models.
//!
//! The nonlinear solver is a plain Levenberg–Marquardt loop with a
//! forward-difference Jacobian, enough for the one- and two-parameter
//! calibration models used by the water workflow.

use nalgebra::{DMatrix, DVector};

use crate::error::{check_xy, Result, SignalError};

// ---------------------------------------------------------------------------
// Polynomials
// ---------------------------------------------------------------------------

/// Least-squares polynomial of degree `order`, coefficients lowest order first.
pub fn polyfit(x: &[f64], y: &[f64], order: usize) -> Result<Vec<f64>> {
    check_xy(x, y)?;
    if x.len() <= order {
        return Err(SignalError::InsufficientSamples {
            found: x.len(),
            needed: order + 1,
        });
    }
    let vander = DMatrix::from_fn(x.len(), order + 1, |i, j| x[i].powi(j as i32));
    let rhs = DVector::from_column_slice(y);
    let coeffs = vander
        .svd(true, true)
        .solve(&rhs, 1e-12)
        .map_err(|_| SignalError::Singular)?;
    Ok(coeffs.iter().copied().collect())
}

/// Evaluate a polynomial (lowest order first) at `x` with Horner's scheme.
pub fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

// ---------------------------------------------------------------------------
// Levenberg–Marquardt
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug)]
pub struct FitOptions {
    pub max_iterations: usize,
    /// Relative change of the residual sum (or of the parameters) at which
    /// the fit is considered converged.
    pub tolerance: f64,
    pub damping: f64,
    pub damping_step_up: f64,
    pub damping_step_down: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-12,
            damping: 1e-3,
            damping_step_up: 10.0,
            damping_step_down: 10.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct FitResult {
    pub params: Vec<f64>,
    /// Parameter covariance `s² (JᵀJ)⁻¹`; infinite when it cannot be estimated.
    pub covariance: Vec<Vec<f64>>,
    pub residual_sum: f64,
    pub iterations: usize,
}

fn sum_squares(observed: &[f64], predicted: &[f64]) -> f64 {
    observed
        .iter()
        .zip(predicted)
        .map(|(o, p)| (o - p) * (o - p))
        .sum()
}

fn jacobian<F>(model: &F, params: &[f64], base: &[f64]) -> Result<DMatrix<f64>>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    let n = base.len();
    let mut jac = DMatrix::zeros(n, params.len());
    let mut shifted = params.to_vec();
    for j in 0..params.len() {
        let h = f64::EPSILON.sqrt() * params[j].abs().max(1e-3);
        shifted[j] = params[j] + h;
        let moved = model(&shifted);
        if moved.len() != n {
            return Err(SignalError::LengthMismatch {
                x: n,
                y: moved.len(),
            });
        }
        for i in 0..n {
            jac[(i, j)] = (moved[i] - base[i]) / h;
        }
        shifted[j] = params[j];
    }
    Ok(jac)
}

/// Fit `model(params)` to `observed` in the least-squares sense.
///
/// `model` returns one prediction per observation.
pub fn curve_fit<F>(
    observed: &[f64],
    model: F,
    initial: &[f64],
    options: &FitOptions,
) -> Result<FitResult>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    let n = observed.len();
    let m = initial.len();
    if m == 0 {
        return Err(SignalError::InvalidParameter(
            "at least one parameter is required".into(),
        ));
    }
    if n < m {
        return Err(SignalError::InsufficientSamples { found: n, needed: m });
    }

    let mut params = initial.to_vec();
    let mut predicted = model(&params);
    if predicted.len() != n {
        return Err(SignalError::LengthMismatch {
            x: n,
            y: predicted.len(),
        });
    }
    let mut sse = sum_squares(observed, &predicted);
    if !sse.is_finite() {
        return Err(SignalError::InvalidParameter(
            "model is not finite at the initial parameters".into(),
        ));
    }

    let mut mu = options.damping;
    let mut iterations = 0;

    while iterations < options.max_iterations {
        iterations += 1;
        let jac = jacobian(&model, &params, &predicted)?;
        let residual = DVector::from_iterator(n, observed.iter().zip(&predicted).map(|(o, p)| o - p));
        let jtj = jac.transpose() * &jac;
        let gradient = jac.transpose() * residual;

        let mut accepted = None;
        for _ in 0..32 {
            let mut damped = jtj.clone();
            for j in 0..m {
                let d = jtj[(j, j)];
                damped[(j, j)] += mu * if d > 0.0 { d } else { 1.0 };
            }
            let Some(step) = damped.lu().solve(&gradient) else {
                mu *= options.damping_step_up;
                continue;
            };
            let candidate: Vec<f64> = params.iter().zip(step.iter()).map(|(p, s)| p + s).collect();
            let candidate_pred = model(&candidate);
            let candidate_sse = sum_squares(observed, &candidate_pred);
            if candidate_sse.is_finite() && candidate_sse <= sse {
                mu /= options.damping_step_down;
                accepted = Some((candidate, candidate_pred, candidate_sse, step));
                break;
            }
            mu *= options.damping_step_up;
        }

        let Some((candidate, candidate_pred, candidate_sse, step)) = accepted else {
            break;
        };
        let improvement = sse - candidate_sse;
        let small_step = step
            .iter()
            .zip(&candidate)
            .all(|(s, p)| s.abs() <= options.tolerance * (p.abs() + options.tolerance));
        params = candidate;
        predicted = candidate_pred;
        sse = candidate_sse;
        if improvement <= options.tolerance * sse.max(f64::MIN_POSITIVE) || small_step {
            break;
        }
    }

    log::debug!("curve_fit: {iterations} iterations, residual sum {sse:e}, params {params:?}");

    let jac = jacobian(&model, &params, &predicted)?;
    let jtj = jac.transpose() * &jac;
    let covariance = match (n > m, jtj.try_inverse()) {
        (true, Some(inv)) => {
            let s2 = sse / (n - m) as f64;
            (0..m).map(|i| (0..m).map(|j| inv[(i, j)] * s2).collect()).collect()
        }
        _ => vec![vec![f64::INFINITY; m]; m],
    };

    Ok(FitResult {
        params,
        covariance,
        residual_sum: sse,
        iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polyfit_recovers_cubic() {
        let x: Vec<f64> = (0..20).map(|i| i as f64 * 0.25 - 2.0).collect();
        let y: Vec<f64> = x.iter().map(|v| 1.0 - 2.0 * v + 0.5 * v * v * v).collect();
        let c = polyfit(&x, &y, 3).unwrap();
        let expected = [1.0, -2.0, 0.0, 0.5];
        for (a, b) in c.iter().zip(expected) {
            assert!((a - b).abs() < 1e-9, "{c:?}");
        }
        assert!((polyval(&c, 1.0) - (-0.5)).abs() < 1e-9);
    }

    #[test]
    fn polyfit_needs_enough_samples() {
        assert_eq!(
            polyfit(&[0.0, 1.0], &[1.0, 2.0], 2),
            Err(SignalError::InsufficientSamples { found: 2, needed: 3 })
        );
    }

    #[test]
    fn curve_fit_recovers_exponential_decay() {
        let x: Vec<f64> = (0..30).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.5 * (-0.3 * v).exp()).collect();
        let model = |p: &[f64]| x.iter().map(|v| p[0] * (-p[1] * v).exp()).collect::<Vec<_>>();

        let fit = curve_fit(&y, model, &[1.0, 0.1], &FitOptions::default()).unwrap();
        assert!((fit.params[0] - 2.5).abs() < 1e-6, "{:?}", fit.params);
        assert!((fit.params[1] - 0.3).abs() < 1e-6, "{:?}", fit.params);
        assert!(fit.residual_sum < 1e-10);
    }

    #[test]
    fn curve_fit_rejects_underdetermined_problem() {
        let err = curve_fit(&[1.0], |p: &[f64]| vec![p[0] + p[1]], &[0.0, 0.0], &FitOptions::default());
        assert!(matches!(err, Err(SignalError::InsufficientSamples { .. })));
    }
}
