use super::smoothing::Smoothing;
use crate::data::model::Spectrum;
use crate::error::{check_xy, Result, SignalError};

// ---------------------------------------------------------------------------
// Intensity-weighted centroids
// ---------------------------------------------------------------------------

/// Intensity-weighted mean position `Σ xᵢ·yᵢ / Σ yᵢ` of one spectrum.
///
/// With `smoothing`, the intensities are smoothed first. A non-positive (or
/// non-finite) intensity sum has no meaningful centroid and is an error.
pub fn centroid(x: &[f64], y: &[f64], smoothing: Option<&Smoothing>) -> Result<f64> {
    check_xy(x, y)?;
    let smoothed;
    let y = match smoothing {
        Some(s) => {
            smoothed = s.apply(y)?;
            &smoothed[..]
        }
        None => y,
    };

    let total: f64 = y.iter().sum();
    if !(total > 0.0) || !total.is_finite() {
        return Err(SignalError::DegenerateIntensity(total));
    }
    Ok(x.iter().zip(y).map(|(xi, yi)| xi * yi / total).sum())
}

/// Centroid of every spectrum, each with its own position axis.
pub fn centroids(spectra: &[Spectrum], smoothing: Option<&Smoothing>) -> Result<Vec<f64>> {
    spectra
        .iter()
        .map(|sp| centroid(&sp.x, &sp.y, smoothing))
        .collect()
}

/// Centroid of every intensity series in `ys`, all sampled on `x`.
pub fn centroids_shared(x: &[f64], ys: &[Vec<f64>], smoothing: Option<&Smoothing>) -> Result<Vec<f64>> {
    ys.iter().map(|y| centroid(x, y, smoothing)).collect()
}
