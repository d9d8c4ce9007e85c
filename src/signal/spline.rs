use super::banded::Pentadiagonal;
use crate::error::{check_increasing, check_xy, Result, SignalError};

// ---------------------------------------------------------------------------
// Natural cubic smoothing spline (Reinsch)
// ---------------------------------------------------------------------------

/// Natural cubic spline minimising `Σ (yᵢ − g(xᵢ))² + λ ∫ g''²`.
///
/// Stored as fitted values `g` and second derivatives `gamma` at the knots;
/// `gamma` is zero at both ends, so the curve continues linearly outside
/// the knot range.
#[derive(Debug, Clone)]
pub struct SmoothingSpline {
    knots: Vec<f64>,
    g: Vec<f64>,
    gamma: Vec<f64>,
}

impl SmoothingSpline {
    /// Fit the spline to strictly increasing `x` (at least two samples).
    pub fn fit(x: &[f64], y: &[f64], lambda: f64) -> Result<Self> {
        check_xy(x, y)?;
        check_increasing(x)?;
        if x.len() < 2 {
            return Err(SignalError::InsufficientSamples {
                found: x.len(),
                needed: 2,
            });
        }
        if !(lambda >= 0.0) || !lambda.is_finite() {
            return Err(SignalError::InvalidParameter(format!(
                "spline smoothing must be a finite non-negative number, got {lambda}"
            )));
        }

        let n = x.len();
        let m = n - 2;
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

        // Column k of Q (interior knot k + 1) has entries a, b, c on rows k, k+1, k+2.
        let a: Vec<f64> = (0..m).map(|k| 1.0 / h[k]).collect();
        let c: Vec<f64> = (0..m).map(|k| 1.0 / h[k + 1]).collect();
        let b: Vec<f64> = (0..m).map(|k| -a[k] - c[k]).collect();

        let mut system = Pentadiagonal::zeros(m);
        let mut rhs = vec![0.0; m];
        for k in 0..m {
            system.diag[k] = (h[k] + h[k + 1]) / 3.0 + lambda * (a[k] * a[k] + b[k] * b[k] + c[k] * c[k]);
            if k + 1 < m {
                system.off1[k] = h[k + 1] / 6.0 + lambda * (b[k] * a[k + 1] + c[k] * b[k + 1]);
            }
            if k + 2 < m {
                system.off2[k] = lambda * c[k] * a[k + 2];
            }
            rhs[k] = a[k] * y[k] + b[k] * y[k + 1] + c[k] * y[k + 2];
        }
        let interior = system.solve(&rhs)?;

        let mut g = y.to_vec();
        for r in 0..n {
            let mut q_gamma = 0.0;
            if r < m {
                q_gamma += a[r] * interior[r];
            }
            if r >= 1 && r - 1 < m {
                q_gamma += b[r - 1] * interior[r - 1];
            }
            if r >= 2 && r - 2 < m {
                q_gamma += c[r - 2] * interior[r - 2];
            }
            g[r] -= lambda * q_gamma;
        }

        let mut gamma = vec![0.0; n];
        gamma[1..n - 1].copy_from_slice(&interior);

        Ok(Self {
            knots: x.to_vec(),
            g,
            gamma,
        })
    }

    pub fn eval(&self, t: f64) -> f64 {
        let x = &self.knots;
        let n = x.len();
        if t <= x[0] {
            let h = x[1] - x[0];
            let slope = (self.g[1] - self.g[0]) / h - h * self.gamma[1] / 6.0;
            return self.g[0] + (t - x[0]) * slope;
        }
        if t >= x[n - 1] {
            let h = x[n - 1] - x[n - 2];
            let slope = (self.g[n - 1] - self.g[n - 2]) / h + h * self.gamma[n - 2] / 6.0;
            return self.g[n - 1] + (t - x[n - 1]) * slope;
        }
        let i = x.partition_point(|&v| v <= t).saturating_sub(1).min(n - 2);
        let (xl, xr) = (x[i], x[i + 1]);
        let h = xr - xl;
        let dl = t - xl;
        let dr = xr - t;
        (dl * self.g[i + 1] + dr * self.g[i]) / h
            - dl * dr / 6.0 * ((1.0 + dl / h) * self.gamma[i + 1] + (1.0 + dr / h) * self.gamma[i])
    }
}
