use serde::Serialize;

use crate::config::ExternalCalibrationOptions;
use crate::data::model::Spectrum;
use crate::error::{Result, SignalError};
use crate::signal::interp::trapezoid_between;
use crate::signal::{baseline, BaselineFit, BaselineMethod};

/// Water content of a sample scaled from a reference glass of known water content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalEstimate {
    /// Water content in wt%, rounded to two decimals.
    pub water: f64,
    pub area_sample: f64,
    pub area_reference: f64,
    /// Ascending sample spectrum and its linear baseline.
    #[serde(skip)]
    pub sample: Spectrum,
    #[serde(skip)]
    pub sample_fit: BaselineFit,
    #[serde(skip)]
    pub reference: Spectrum,
    #[serde(skip)]
    pub reference_fit: BaselineFit,
}

/// Compare the water band areas of `sample` and `reference` after a linear
/// baseline on `options.rois`: `water = area_sample · water_reference / area_reference`.
pub fn external_calibration(
    sample: &Spectrum,
    reference: &Spectrum,
    water_reference: f64,
    options: &ExternalCalibrationOptions,
) -> Result<ExternalEstimate> {
    let sample = sample.ascending();
    let reference = reference.ascending();
    let linear = BaselineMethod::Poly { order: 1 };

    let sample_fit = baseline(&sample.x, &sample.y, &options.rois, &linear)?;
    let reference_fit = baseline(&reference.x, &reference.y, &options.rois, &linear)?;

    let (lo, hi) = (options.low_bound, options.high_bound);
    let area_sample = trapezoid_between(&sample.x, &sample_fit.corrected, lo, hi);
    let area_reference = trapezoid_between(&reference.x, &reference_fit.corrected, lo, hi);
    if area_reference == 0.0 || !area_reference.is_finite() {
        return Err(SignalError::InvalidParameter(format!(
            "reference water band area is {area_reference}"
        )));
    }

    let water = (area_sample * water_reference / area_reference * 100.0).round() / 100.0;
    log::debug!("external: area {area_sample:.4e} vs reference {area_reference:.4e} -> {water} wt%");

    Ok(ExternalEstimate {
        water,
        area_sample,
        area_reference,
        sample,
        sample_fit,
        reference,
        reference_fit,
    })
}
