use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use super::banded::Pentadiagonal;
use super::fit::polyval;
use crate::error::{Result, SignalError};

// ---------------------------------------------------------------------------
// Smoothing filters
// ---------------------------------------------------------------------------

/// Smoothing applied to a spectrum before reducing it (e.g. to a centroid).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Smoothing {
    /// Penalised least squares with a second-difference roughness penalty.
    Whittaker { lambda: f64 },
    /// Local polynomial fit over a sliding window.
    SavitzkyGolay { window: usize, order: usize },
}

impl Default for Smoothing {
    fn default() -> Self {
        Smoothing::Whittaker {
            lambda: 10f64.powf(0.5),
        }
    }
}

impl Smoothing {
    pub fn apply(&self, y: &[f64]) -> Result<Vec<f64>> {
        match *self {
            Smoothing::Whittaker { lambda } => whittaker(y, lambda, None),
            Smoothing::SavitzkyGolay { window, order } => savitzky_golay(y, window, order),
        }
    }
}

/// Whittaker smoother: solves `(W + λ DᵀD) z = W y`.
///
/// `weights` defaults to one for every sample. Signals shorter than three
/// samples have no curvature to penalise and are returned as is.
pub fn whittaker(y: &[f64], lambda: f64, weights: Option<&[f64]>) -> Result<Vec<f64>> {
    if y.is_empty() {
        return Err(SignalError::Empty);
    }
    if !(lambda >= 0.0) || !lambda.is_finite() {
        return Err(SignalError::InvalidParameter(format!(
            "smoothing lambda must be a finite non-negative number, got {lambda}"
        )));
    }
    if let Some(w) = weights {
        if w.len() != y.len() {
            return Err(SignalError::LengthMismatch {
                x: y.len(),
                y: w.len(),
            });
        }
    }
    let n = y.len();
    if n < 3 {
        return Ok(y.to_vec());
    }

    let mut system = Pentadiagonal::second_difference_penalty(n);
    for k in 0..n {
        system.diag[k] *= lambda;
        system.off1[k] *= lambda;
        system.off2[k] *= lambda;
    }
    let mut rhs = Vec::with_capacity(n);
    for k in 0..n {
        let w = weights.map_or(1.0, |w| w[k]);
        system.diag[k] += w;
        rhs.push(w * y[k]);
    }
    system.solve(&rhs)
}

/// Savitzky–Golay filter.
///
/// Interior samples use the central convolution weights; the first and last
/// `window / 2` samples are taken from the polynomial fitted to the edge
/// window instead of padding the signal.
pub fn savitzky_golay(y: &[f64], window: usize, order: usize) -> Result<Vec<f64>> {
    let n = y.len();
    if n == 0 {
        return Err(SignalError::Empty);
    }
    if window % 2 == 0 || window <= order || window > n {
        return Err(SignalError::InvalidParameter(format!(
            "window must be odd, larger than the order ({order}) and at most {n}, got {window}"
        )));
    }
    let half = window / 2;
    let vander = DMatrix::from_fn(window, order + 1, |i, j| {
        (i as f64 - half as f64).powi(j as i32)
    });
    let pinv = vander
        .pseudo_inverse(1e-12)
        .map_err(|_| SignalError::Singular)?;

    let mut out = vec![0.0; n];
    for i in half..n - half {
        out[i] = (0..window).map(|k| pinv[(0, k)] * y[i - half + k]).sum();
    }

    let edge_fit = |start: usize| -> Vec<f64> {
        let segment = DVector::from_column_slice(&y[start..start + window]);
        (&pinv * segment).iter().copied().collect()
    };
    let left = edge_fit(0);
    for (i, slot) in out.iter_mut().enumerate().take(half) {
        *slot = polyval(&left, i as f64 - half as f64);
    }
    let right = edge_fit(n - window);
    for i in n - half..n {
        let t = (i - (n - window)) as f64 - half as f64;
        out[i] = polyval(&right, t);
    }

    Ok(out)
}
