use serde::Serialize;

use crate::config::{Method, ReductionConfig};
use crate::data::model::{rois, Roi, Spectrum};
use crate::error::Result;
use crate::signal::correction::{temperature_laser_correction, CorrectionModel, Normalisation};
use crate::signal::interp::{arange, resample, trapezoid_between};
use crate::signal::{baseline, BaselineMethod};

/// Silicate band integration bounds (cm⁻¹, exclusive).
pub const SILICATE_BAND: (f64, f64) = (150.0, 1250.0);
/// Water band integration bounds (cm⁻¹, exclusive).
pub const WATER_BAND: (f64, f64) = (3100.0, 3750.0);

/// DG2017 fits the low- and high-frequency baselines on either side of this shift.
const DG2017_SPLIT: f64 = 2000.0;
const DG2017_LOW_ROI: [[f64; 2]; 2] = [[0.0, 200.0], [1240.0, 1500.0]];
const DG2017_HIGH_ROI: [[f64; 2]; 2] = [[2500.0, 3100.0], [3750.0, 3900.0]];

/// Shared axis every spectrum is resampled onto: 50–1399 and 2800–3799 cm⁻¹.
pub fn common_axis() -> Vec<f64> {
    let mut x = arange(50.0, 1400.0, 1.0);
    x.extend(arange(2800.0, 3800.0, 1.0));
    x
}

/// One spectrum after correction, baseline subtraction and integration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReducedSpectrum {
    /// Temperature/laser corrected, intensity-normalised signal.
    pub y: Vec<f64>,
    pub corrected: Vec<f64>,
    pub baseline: Vec<f64>,
    /// Water band area.
    pub rw: f64,
    /// Silicate band area.
    pub rs: f64,
    pub rws: f64,
}

/// Reduced spectra of a sample list on the common axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reduction {
    /// Method whose baseline scheme produced the spectra.
    pub method: Method,
    pub x: Vec<f64>,
    pub names: Vec<String>,
    pub spectra: Vec<ReducedSpectrum>,
}

impl Reduction {
    pub fn len(&self) -> usize {
        self.spectra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spectra.is_empty()
    }

    pub fn rws(&self) -> Vec<f64> {
        self.spectra.iter().map(|s| s.rws).collect()
    }
}

/// Reduce one raw spectrum on the common axis.
///
/// `sample_rois` and `smoothing` anchor the LL2012 spline; DG2017 uses fixed regions.
pub fn reduce_spectrum(
    spectrum: &Spectrum,
    sample_rois: &[Roi],
    smoothing: f64,
    config: &ReductionConfig,
) -> Result<ReducedSpectrum> {
    let raw = spectrum.ascending();
    let x = common_axis();
    let resampled = resample(&raw.x, &raw.y, &x)?;
    let y = temperature_laser_correction(
        &x,
        &resampled,
        config.temperature_c,
        config.laser_nm,
        CorrectionModel::Long,
        Normalisation::Intensity,
    )?
    .y;

    let (corrected, base) = match config.method {
        Method::Ll2012 => {
            let fit = baseline(&x, &y, sample_rois, &BaselineMethod::Spline { smoothing })?;
            (fit.corrected, fit.baseline)
        }
        Method::Dg2017 => {
            let split = x.partition_point(|&v| v < DG2017_SPLIT);
            let method = BaselineMethod::Poly {
                order: config.poly_order,
            };
            let low = baseline(&x[..split], &y[..split], &rois(&DG2017_LOW_ROI), &method)?;
            let high = baseline(&x[split..], &y[split..], &rois(&DG2017_HIGH_ROI), &method)?;
            (
                [low.corrected, high.corrected].concat(),
                [low.baseline, high.baseline].concat(),
            )
        }
    };

    let rs = trapezoid_between(&x, &corrected, SILICATE_BAND.0, SILICATE_BAND.1);
    let rw = trapezoid_between(&x, &corrected, WATER_BAND.0, WATER_BAND.1);
    if rs <= 0.0 {
        log::warn!("silicate band area is {rs:.4e}; the water/silicate ratio is meaningless");
    }
    let rws = rw / rs;
    log::debug!("rw = {rw:.4e}, rs = {rs:.4e}, rws = {rws:.4}");

    Ok(ReducedSpectrum {
        y,
        corrected,
        baseline: base,
        rw,
        rs,
        rws,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Gaussian bands on a sloping background, sampled descending like many instruments.
    fn glass_spectrum(water_height: f64) -> Spectrum {
        let mut x: Vec<f64> = arange(20.0, 4000.0, 2.0);
        x.reverse();
        let y = x
            .iter()
            .map(|&v| {
                let silicate = 80.0 * (-((v - 500.0) / 80.0).powi(2)).exp()
                    + 40.0 * (-((v - 1000.0) / 60.0).powi(2)).exp();
                let water = water_height * (-((v - 3550.0) / 120.0).powi(2)).exp();
                10.0 + 0.002 * v + silicate + water
            })
            .collect();
        Spectrum { x, y }
    }

    #[test]
    fn common_axis_has_two_windows() {
        let x = common_axis();
        assert_eq!(x.len(), 1350 + 1000);
        assert_eq!(x[0], 50.0);
        assert_eq!(x[1349], 1399.0);
        assert_eq!(x[1350], 2800.0);
        assert_eq!(*x.last().unwrap(), 3799.0);
    }

    #[test]
    fn more_water_gives_larger_ratio() {
        let cfg = ReductionConfig::default();
        let roi = rois(&[[50.0, 200.0], [1240.0, 1400.0], [2800.0, 3100.0], [3750.0, 3800.0]]);
        let dry = reduce_spectrum(&glass_spectrum(5.0), &roi, 0.001, &cfg).unwrap();
        let wet = reduce_spectrum(&glass_spectrum(30.0), &roi, 0.001, &cfg).unwrap();
        assert!(dry.rs > 0.0 && wet.rs > 0.0);
        assert!(wet.rws > dry.rws, "{} vs {}", wet.rws, dry.rws);
        assert_eq!(wet.corrected.len(), common_axis().len());
    }

    #[test]
    fn dg2017_ignores_sample_rois() {
        let cfg = ReductionConfig {
            method: Method::Dg2017,
            ..Default::default()
        };
        let r = reduce_spectrum(&glass_spectrum(20.0), &[], 0.0, &cfg).unwrap();
        assert!(r.rw > 0.0 && r.rs > 0.0);
        for (c, (y, b)) in r.corrected.iter().zip(r.y.iter().zip(&r.baseline)) {
            assert!((c - (y - b)).abs() < 1e-9);
        }
    }

    #[test]
    fn repeated_shift_is_tolerated() {
        let cfg = ReductionConfig::default();
        let roi = rois(&[[50.0, 200.0], [1240.0, 1400.0], [2800.0, 3100.0], [3750.0, 3800.0]]);
        let clean = glass_spectrum(20.0);
        let mut doubled = clean.clone();
        doubled.x.insert(500, doubled.x[500]);
        doubled.y.insert(500, doubled.y[500]);

        let a = reduce_spectrum(&clean, &roi, 0.001, &cfg).unwrap();
        let b = reduce_spectrum(&doubled, &roi, 0.001, &cfg).unwrap();
        assert!((a.rws - b.rws).abs() < 1e-12);
    }

    #[test]
    fn ll2012_needs_rois() {
        let cfg = ReductionConfig::default();
        assert!(reduce_spectrum(&glass_spectrum(5.0), &[], 0.001, &cfg).is_err());
    }
}
