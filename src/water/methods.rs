//! Calibrations between the water/silicate area ratio (Rws) and water content.
//!
//! # References
//! * C. Le Losq, D. R. Neuville, R. Moretti, J. Roux (2012). "Determination of
//!   water content in silicate glasses using Raman spectrometry: Implications
//!   for the study of explosive volcanism." American Mineralogist 97, 779–790.
//! * D. Di Genova et al. (2017). "Effect of iron and nanolites on Raman spectra
//!   of volcanic glasses: A reassessment of existing strategies to estimate the
//!   water content." Chemical Geology 475, 76–86.

use serde::{Deserialize, Serialize};

use crate::config::Method;
use crate::error::{Result, SignalError};
use crate::signal::fit::{curve_fit, FitOptions};

/// `A` of equation (3) in Le Losq et al. (2012).
pub const LL2012_A: f64 = 0.007609;
/// `a` of `K = a·[FeO] + b` in Di Genova et al. (2017).
pub const DG2017_A: f64 = 0.096;
/// `b` of `K = a·[FeO] + b` in Di Genova et al. (2017).
pub const DG2017_B: f64 = 0.663;

/// Water content (wt%) from Rws with the LL2012 relation.
pub fn ll2012_predict(rws: f64, a: f64) -> f64 {
    100.0 * a * rws / (1.0 + a * rws)
}

/// Water content (wt%) from Rws and FeO (wt%) with the DG2017 relation.
pub fn dg2017_predict(rws: f64, feo: f64, a: f64, b: f64) -> f64 {
    rws * (feo * a + b)
}

fn check_lengths(a: &[f64], b: &[f64]) -> Result<()> {
    if a.len() != b.len() {
        return Err(SignalError::LengthMismatch {
            x: a.len(),
            y: b.len(),
        });
    }
    if a.is_empty() {
        return Err(SignalError::Empty);
    }
    Ok(())
}

/// Least-squares `A` of the LL2012 relation for known water contents.
pub fn ll2012_calibrate(rws: &[f64], water: &[f64]) -> Result<f64> {
    check_lengths(rws, water)?;
    let model = |p: &[f64]| rws.iter().map(|&r| ll2012_predict(r, p[0])).collect::<Vec<_>>();
    let fit = curve_fit(water, model, &[LL2012_A], &FitOptions::default())?;
    Ok(fit.params[0])
}

/// Least-squares `(a, b)` of the DG2017 relation for known water contents.
pub fn dg2017_calibrate(rws: &[f64], feo: &[f64], water: &[f64]) -> Result<(f64, f64)> {
    check_lengths(rws, water)?;
    check_lengths(rws, feo)?;
    let model = |p: &[f64]| {
        rws.iter()
            .zip(feo)
            .map(|(&r, &f)| dg2017_predict(r, f, p[0], p[1]))
            .collect::<Vec<_>>()
    };
    let fit = curve_fit(water, model, &[DG2017_A, DG2017_B], &FitOptions::default())?;
    Ok((fit.params[0], fit.params[1]))
}

// ---------------------------------------------------------------------------
// Calibration – fitted or literature coefficients
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum Calibration {
    #[serde(rename = "LL2012")]
    Ll2012 { a: f64 },
    #[serde(rename = "DG2017")]
    Dg2017 { a: f64, b: f64 },
}

impl Calibration {
    /// Coefficients published with the method.
    pub fn literature(method: Method) -> Self {
        match method {
            Method::Ll2012 => Calibration::Ll2012 { a: LL2012_A },
            Method::Dg2017 => Calibration::Dg2017 {
                a: DG2017_A,
                b: DG2017_B,
            },
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Calibration::Ll2012 { .. } => Method::Ll2012,
            Calibration::Dg2017 { .. } => Method::Dg2017,
        }
    }

    /// Predict water content; DG2017 needs the FeO content.
    pub fn predict(&self, rws: f64, feo: Option<f64>) -> Result<f64> {
        match *self {
            Calibration::Ll2012 { a } => Ok(ll2012_predict(rws, a)),
            Calibration::Dg2017 { a, b } => {
                let feo = feo.ok_or_else(|| {
                    SignalError::InvalidParameter("DG2017 needs the FeO content".into())
                })?;
                Ok(dg2017_predict(rws, feo, a, b))
            }
        }
    }
}

impl std::fmt::Display for Calibration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Calibration::Ll2012 { a } => write!(f, "LL2012 (A = {a:.6})"),
            Calibration::Dg2017 { a, b } => write!(f, "DG2017 (a = {a:.4}, b = {b:.4})"),
        }
    }
}
