use serde::{Deserialize, Serialize};

use super::fit::{polyfit, polyval};
use super::smoothing::whittaker;
use super::spline::SmoothingSpline;
use crate::data::filter::{roi_indices, take};
use crate::data::model::Roi;
use crate::error::{check_increasing, check_xy, Result, SignalError};

// ---------------------------------------------------------------------------
// Baseline models
// ---------------------------------------------------------------------------

/// How the baseline is estimated.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BaselineMethod {
    /// Least-squares polynomial through the ROI samples.
    Poly { order: usize },
    /// Natural cubic smoothing spline through the ROI samples.
    Spline { smoothing: f64 },
    /// Asymmetric least squares over the whole spectrum; ignores the ROI.
    Als { lambda: f64, p: f64, iterations: usize },
}

impl BaselineMethod {
    pub fn als() -> Self {
        BaselineMethod::Als {
            lambda: 1e5,
            p: 0.01,
            iterations: 10,
        }
    }
}

/// Output of [`baseline`].
#[derive(Clone, Debug, PartialEq)]
pub struct BaselineFit {
    /// `y - baseline`.
    pub corrected: Vec<f64>,
    pub baseline: Vec<f64>,
}

/// Mean and (population) standard deviation used to standardise a series.
#[derive(Clone, Copy, Debug)]
struct Scaler {
    mean: f64,
    scale: f64,
}

impl Scaler {
    fn fit(v: &[f64]) -> Self {
        let n = v.len() as f64;
        let mean = v.iter().sum::<f64>() / n;
        let var = v.iter().map(|a| (a - mean) * (a - mean)).sum::<f64>() / n;
        let std = var.sqrt();
        Self {
            mean,
            scale: if std > 0.0 && std.is_finite() { std } else { 1.0 },
        }
    }

    fn forward(&self, v: f64) -> f64 {
        (v - self.mean) / self.scale
    }

    fn inverse(&self, v: f64) -> f64 {
        v * self.scale + self.mean
    }
}

/// Fit a baseline to the samples inside `rois` and subtract it.
///
/// Positions and intensities are standardised over the whole spectrum
/// before fitting, so smoothing values are independent of units. The fitted
/// curve is evaluated over the full axis; beyond the ROI samples it follows
/// whatever the model extrapolates to.
pub fn baseline(x: &[f64], y: &[f64], rois: &[Roi], method: &BaselineMethod) -> Result<BaselineFit> {
    check_xy(x, y)?;
    check_increasing(x)?;
    for roi in rois {
        roi.validate()?;
    }

    let xs = Scaler::fit(x);
    let ys = Scaler::fit(y);
    let x_scaled: Vec<f64> = x.iter().map(|&v| xs.forward(v)).collect();
    let y_scaled: Vec<f64> = y.iter().map(|&v| ys.forward(v)).collect();

    let fitted_scaled: Vec<f64> = match *method {
        BaselineMethod::Poly { order } => {
            let idx = anchor_indices(x, rois, order + 1)?;
            let coeffs = polyfit(&take(&x_scaled, &idx), &take(&y_scaled, &idx), order)?;
            x_scaled.iter().map(|&t| polyval(&coeffs, t)).collect()
        }
        BaselineMethod::Spline { smoothing } => {
            let idx = anchor_indices(x, rois, 2)?;
            let spline = SmoothingSpline::fit(&take(&x_scaled, &idx), &take(&y_scaled, &idx), smoothing)?;
            x_scaled.iter().map(|&t| spline.eval(t)).collect()
        }
        BaselineMethod::Als { lambda, p, iterations } => als(&y_scaled, lambda, p, iterations)?,
    };

    let baseline: Vec<f64> = fitted_scaled.iter().map(|&v| ys.inverse(v)).collect();
    let corrected = y.iter().zip(&baseline).map(|(a, b)| a - b).collect();
    Ok(BaselineFit { corrected, baseline })
}

fn anchor_indices(x: &[f64], rois: &[Roi], needed: usize) -> Result<Vec<usize>> {
    let idx = roi_indices(x, rois);
    if idx.len() < needed {
        return Err(SignalError::InsufficientSamples {
            found: idx.len(),
            needed,
        });
    }
    log::debug!("baseline anchored on {} of {} samples", idx.len(), x.len());
    Ok(idx)
}

/// Asymmetric least squares (Eilers & Boelens): samples above the current
/// estimate get weight `p`, the others `1 - p`.
fn als(y: &[f64], lambda: f64, p: f64, iterations: usize) -> Result<Vec<f64>> {
    if !(p > 0.0 && p < 1.0) {
        return Err(SignalError::InvalidParameter(format!(
            "asymmetry p must lie in (0, 1), got {p}"
        )));
    }
    let mut weights = vec![1.0; y.len()];
    let mut z = y.to_vec();
    for _ in 0..iterations.max(1) {
        z = whittaker(y, lambda, Some(&weights))?;
        for ((w, &yi), &zi) in weights.iter_mut().zip(y).zip(&z) {
            *w = if yi > zi { p } else { 1.0 - p };
        }
    }
    Ok(z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::rois;

    fn gaussian(x: f64, mu: f64, sigma: f64, amp: f64) -> f64 {
        amp * (-(x - mu).powi(2) / (2.0 * sigma * sigma)).exp()
    }

    #[test]
    fn polynomial_background_is_recovered() {
        let x: Vec<f64> = (0..501).map(|i| i as f64 * 2.0).collect();
        let background: Vec<f64> = x.iter().map(|v| 3.0 + 0.002 * v - 1.5e-6 * v * v).collect();
        let y: Vec<f64> = x
            .iter()
            .zip(&background)
            .map(|(&v, b)| b + gaussian(v, 500.0, 15.0, 4.0))
            .collect();

        let fit = baseline(&x, &y, &rois(&[[0.0, 300.0], [700.0, 1000.0]]), &BaselineMethod::Poly { order: 2 }).unwrap();
        for (b, e) in fit.baseline.iter().zip(&background) {
            assert!((b - e).abs() < 1e-6, "{b} vs {e}");
        }
        let peak = fit.corrected[250];
        assert!((peak - 4.0).abs() < 1e-6);
    }

    #[test]
    fn spline_corrected_signal_vanishes_inside_roi() {
        let x: Vec<f64> = (0..401).map(|i| i as f64 * 2.5).collect();
        let y: Vec<f64> = x
            .iter()
            .map(|&v| 0.5 + 0.001 * v + gaussian(v, 500.0, 20.0, 2.0))
            .collect();
        let roi = rois(&[[0.0, 300.0], [700.0, 1000.0]]);

        let fit = baseline(&x, &y, &roi, &BaselineMethod::Spline { smoothing: 0.001 }).unwrap();
        for (i, &xi) in x.iter().enumerate() {
            if roi.iter().any(|r| r.contains(xi)) {
                assert!(fit.corrected[i].abs() < 1e-6, "x = {xi}: {}", fit.corrected[i]);
            }
        }
        assert!((fit.corrected[200] - 2.0).abs() < 1e-3);
    }

    #[test]
    fn als_follows_flat_background() {
        let x: Vec<f64> = (0..300).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|&v| 1.0 + gaussian(v, 150.0, 5.0, 5.0)).collect();
        let fit = baseline(&x, &y, &[], &BaselineMethod::als()).unwrap();
        for i in (0..100).chain(200..300) {
            assert!(fit.corrected[i].abs() < 0.1, "i = {i}: {}", fit.corrected[i]);
        }
        assert!(fit.corrected[150] > 4.0);
    }

    #[test]
    fn empty_roi_is_rejected() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [1.0, 1.0, 1.0, 1.0];
        let err = baseline(&x, &y, &rois(&[[10.0, 20.0]]), &BaselineMethod::Poly { order: 1 });
        assert_eq!(err, Err(SignalError::InsufficientSamples { found: 0, needed: 2 }));
    }

    #[test]
    fn reversed_roi_is_rejected() {
        let x = [1.0, 2.0, 3.0];
        let err = baseline(&x, &x, &rois(&[[3.0, 1.0]]), &BaselineMethod::Poly { order: 1 });
        assert!(matches!(err, Err(SignalError::InvalidRoi { .. })));
    }

    #[test]
    fn descending_axis_is_rejected() {
        let x = [3.0, 2.0, 1.0];
        let err = baseline(&x, &x, &rois(&[[0.0, 4.0]]), &BaselineMethod::Poly { order: 1 });
        assert_eq!(err, Err(SignalError::NotIncreasing(1)));
    }
}
