use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SignalError};
use crate::signal::interp::sort_ascending;

// ---------------------------------------------------------------------------
// Roi – one region of interest
// ---------------------------------------------------------------------------

/// A `[start, end]` interval of positions anchoring a baseline fit.
///
/// Membership is strict: a sample belongs to the region when
/// `start < x < end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Roi {
    pub start: f64,
    pub end: f64,
}

impl Roi {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Whether `x` lies strictly inside the region.
    pub fn contains(&self, x: f64) -> bool {
        x > self.start && x < self.end
    }

    /// Reject empty, reversed or non-finite intervals.
    pub fn validate(&self) -> Result<()> {
        if !self.start.is_finite() || !self.end.is_finite() || self.start >= self.end {
            return Err(SignalError::InvalidRoi {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Roi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Build a region list from `[start, end]` pairs.
pub fn rois(pairs: &[[f64; 2]]) -> Vec<Roi> {
    pairs.iter().map(|&[s, e]| Roi::new(s, e)).collect()
}

// ---------------------------------------------------------------------------
// Spectrum – one measured signal
// ---------------------------------------------------------------------------

/// A single spectrum: intensities sampled at monotonic positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    /// Position axis (Raman shift, cm⁻¹).
    pub x: Vec<f64>,
    /// Intensity axis – same length as `x`.
    pub y: Vec<f64>,
}

impl Spectrum {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(SignalError::LengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }
        Ok(Self { x, y })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// The same spectrum ordered by ascending position, with repeated
    /// positions averaged into one sample.
    pub fn ascending(&self) -> Self {
        let (x, y) = sort_ascending(&self.x, &self.y);
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// SampleRecord – one row of a sample list
// ---------------------------------------------------------------------------

/// Description of one glass sample and how to process its spectrum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Spectrum file name, relative to the spectra folder.
    pub name: String,
    /// Known water content in wt% (calibration samples).
    #[serde(default)]
    pub water: Option<f64>,
    /// FeO content in wt% (DG2017 method).
    #[serde(default)]
    pub feo: Option<f64>,
    /// Regions anchoring the spline baseline.
    #[serde(default)]
    pub rois: Vec<Roi>,
    /// Per-sample spline smoothing overriding the configured one.
    #[serde(default)]
    pub spline_smoothing: Option<f64>,
    /// Reference spectrum file name (external calibration).
    #[serde(default)]
    pub reference: Option<String>,
    /// Water content of the reference in wt%.
    #[serde(default)]
    pub water_reference: Option<f64>,
}

impl SampleRecord {
    /// Display label: the file name without its extension.
    pub fn label(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.name,
        }
    }
}
