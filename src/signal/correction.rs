//! Temperature and excitation-line correction of Raman intensities.
//!
//! # References
//! * D. A. Long (1977). *Raman Spectroscopy*. McGraw-Hill.
//! * F. L. Galeener, P. N. Sen (1978). "Theory of the first-order vibrational
//!   spectra of disordered solids." Phys. Rev. B 17, 1928.
//! * M. Hehlen et al. (2010). "Hyper-Raman scattering in silica glass."
//!   J. Non-Cryst. Solids 356, 1848.

use serde::{Deserialize, Serialize};

use super::interp::trapezoid;
use crate::error::{check_xy, Result, SignalError};

const PLANCK: f64 = 6.626_070_040e-34; // J s
const BOLTZMANN: f64 = 1.380_648_52e-23; // J K-1
const LIGHT_SPEED: f64 = 299_792_458.0; // m s-1

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionModel {
    Long,
    Galeener,
    /// Needs the glass density in kg m⁻³.
    Hehlen { density: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalisation {
    /// Divide by the trapezoidal area.
    Area,
    /// Divide by the maximum.
    Intensity,
    /// Rescale to `[0, 1]`.
    MinMax,
    None,
}

/// Corrected intensities and their absolute (Poisson-propagated) errors.
#[derive(Clone, Debug)]
pub struct CorrectedSpectrum {
    pub y: Vec<f64>,
    pub error: Vec<f64>,
}

/// Correct `y` for temperature (°C) and excitation wavelength (nm).
///
/// `x` is the Raman shift in cm⁻¹.
pub fn temperature_laser_correction(
    x: &[f64],
    y: &[f64],
    temperature_c: f64,
    laser_nm: f64,
    model: CorrectionModel,
    normalisation: Normalisation,
) -> Result<CorrectedSpectrum> {
    check_xy(x, y)?;
    if !(laser_nm > 0.0) {
        return Err(SignalError::InvalidParameter(format!(
            "laser wavelength must be positive, got {laser_nm}"
        )));
    }
    let t_kelvin = temperature_c + 273.15;
    if !(t_kelvin > 0.0) {
        return Err(SignalError::InvalidParameter(format!(
            "temperature must be above absolute zero, got {temperature_c} °C"
        )));
    }

    let nu0 = 1.0e9 / laser_nm; // m-1
    let mut corrected: Vec<f64> = x
        .iter()
        .zip(y)
        .map(|(&shift, &intensity)| {
            let nu = 100.0 * shift; // cm-1 -> m-1
            let boltzmann = 1.0 - (-PLANCK * LIGHT_SPEED * nu / (BOLTZMANN * t_kelvin)).exp();
            let frequency = match model {
                CorrectionModel::Long => nu0.powi(3) * nu / (nu0 - nu).powi(4),
                CorrectionModel::Galeener => nu / (nu0 - nu).powi(4),
                CorrectionModel::Hehlen { density } => 1.0 / (nu0.powi(3) * density),
            };
            intensity * frequency * boltzmann
        })
        .collect();

    let scale = |what: &str, value: f64| {
        if value > 0.0 && value.is_finite() {
            Ok(value)
        } else {
            Err(SignalError::InvalidParameter(format!(
                "cannot normalise by a {what} of {value}"
            )))
        }
    };
    match normalisation {
        Normalisation::Area => {
            let area = scale("area", trapezoid(x, &corrected))?;
            corrected.iter_mut().for_each(|v| *v /= area);
        }
        Normalisation::Intensity => {
            let max = scale("maximum", corrected.iter().copied().fold(f64::NEG_INFINITY, f64::max))?;
            corrected.iter_mut().for_each(|v| *v /= max);
        }
        Normalisation::MinMax => {
            let min = corrected.iter().copied().fold(f64::INFINITY, f64::min);
            let max = corrected.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let range = scale("range", max - min)?;
            corrected.iter_mut().for_each(|v| *v = (*v - min) / range);
        }
        Normalisation::None => {}
    }

    // relative error sqrt(|y|)/|y| carried over to the corrected values;
    // zero counts carry no error
    let error = y
        .iter()
        .zip(&corrected)
        .map(|(&raw, &c)| if raw == 0.0 { 0.0 } else { c / raw.abs().sqrt() })
        .collect();

    Ok(CorrectedSpectrum { y: corrected, error })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intensity_normalisation_peaks_at_one() {
        let x: Vec<f64> = (1..200).map(|i| i as f64 * 10.0).collect();
        let y: Vec<f64> = x.iter().map(|v| 1.0 + (v / 300.0).sin().abs()).collect();
        let out = temperature_laser_correction(&x, &y, 23.0, 514.532, CorrectionModel::Long, Normalisation::Intensity)
            .unwrap();
        let max = out.y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!((max - 1.0).abs() < 1e-12);
        assert!(out.y.iter().all(|v| *v > 0.0));
    }

    #[test]
    fn long_correction_rises_with_shift() {
        let x = [100.0, 500.0, 1000.0];
        let y = [1.0, 1.0, 1.0];
        let out = temperature_laser_correction(&x, &y, 23.0, 514.532, CorrectionModel::Long, Normalisation::None)
            .unwrap();
        assert!(out.y[0] < out.y[1] && out.y[1] < out.y[2]);
    }

    #[test]
    fn area_normalisation_integrates_to_one() {
        let x: Vec<f64> = (1..100).map(|i| i as f64 * 5.0).collect();
        let y = vec![2.0; x.len()];
        let out = temperature_laser_correction(&x, &y, 25.0, 488.0, CorrectionModel::Galeener, Normalisation::Area)
            .unwrap();
        assert!((trapezoid(&x, &out.y) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn minmax_spans_unit_interval() {
        let x: Vec<f64> = (1..300).map(|i| i as f64 * 4.0).collect();
        let y: Vec<f64> = x.iter().map(|v| 5.0 + (v / 150.0).cos()).collect();
        let out = temperature_laser_correction(&x, &y, 23.0, 532.0, CorrectionModel::Long, Normalisation::MinMax)
            .unwrap();
        let min = out.y.iter().copied().fold(f64::INFINITY, f64::min);
        let max = out.y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(min, 0.0);
        assert!((max - 1.0).abs() < 1e-12);
        assert!(out.y.iter().all(|v| (0.0..=1.0 + 1e-12).contains(v)));
    }

    #[test]
    fn hehlen_scales_with_density() {
        let x = [200.0, 800.0, 1200.0];
        let y = [3.0, 3.0, 3.0];
        let light = temperature_laser_correction(
            &x,
            &y,
            23.0,
            514.532,
            CorrectionModel::Hehlen { density: 2200.0 },
            Normalisation::None,
        )
        .unwrap();
        let heavy = temperature_laser_correction(
            &x,
            &y,
            23.0,
            514.532,
            CorrectionModel::Hehlen { density: 4400.0 },
            Normalisation::None,
        )
        .unwrap();
        for (l, h) in light.y.iter().zip(&heavy.y) {
            assert!(*l > 0.0);
            assert!((l / h - 2.0).abs() < 1e-12);
        }
        // only the Bose-Einstein factor depends on the shift, and it grows towards 1
        assert!(light.y[0] < light.y[1] && light.y[1] < light.y[2]);
    }

    #[test]
    fn non_positive_maximum_cannot_normalise() {
        let err = temperature_laser_correction(
            &[100.0, 200.0],
            &[-1.0, -2.0],
            23.0,
            514.532,
            CorrectionModel::Long,
            Normalisation::Intensity,
        );
        assert!(matches!(err, Err(SignalError::InvalidParameter(_))));

        let flat = temperature_laser_correction(&[100.0], &[1.0], 23.0, 514.532, CorrectionModel::Long, Normalisation::MinMax);
        assert!(matches!(flat, Err(SignalError::InvalidParameter(_))));
    }

    #[test]
    fn zero_counts_have_zero_error() {
        let out = temperature_laser_correction(&[100.0, 200.0], &[0.0, 4.0], 23.0, 514.532, CorrectionModel::Long, Normalisation::None)
            .unwrap();
        assert_eq!(out.error[0], 0.0);
        assert!((out.error[1] - out.y[1] / 2.0).abs() < 1e-24);
    }

    #[test]
    fn rejects_bad_laser() {
        let err = temperature_laser_correction(&[1.0], &[1.0], 20.0, 0.0, CorrectionModel::Long, Normalisation::None);
        assert!(matches!(err, Err(SignalError::InvalidParameter(_))));
    }
}
