use std::fmt;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::model::Roi;

// ---------------------------------------------------------------------------
// Water quantification method
// ---------------------------------------------------------------------------

/// Calibration scheme relating the water/silicate area ratio to water content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Method {
    /// Le Losq et al. (2012): spline baseline, `H2O = 100·A·R / (1 + A·R)`.
    #[default]
    #[serde(rename = "LL2012")]
    Ll2012,
    /// Di Genova et al. (2017): cubic baselines, `H2O = R·(a·FeO + b)`.
    #[serde(rename = "DG2017")]
    Dg2017,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Ll2012 => write!(f, "LL2012"),
            Method::Dg2017 => write!(f, "DG2017"),
        }
    }
}

// ---------------------------------------------------------------------------
// Spectrum file delimiter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    #[default]
    Tab,
    Comma,
    /// Any run of spaces or tabs.
    Whitespace,
}

impl Delimiter {
    pub const ALL: [Delimiter; 3] = [Delimiter::Tab, Delimiter::Comma, Delimiter::Whitespace];
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delimiter::Tab => write!(f, "tab"),
            Delimiter::Comma => write!(f, "comma"),
            Delimiter::Whitespace => write!(f, "whitespace"),
        }
    }
}

// ---------------------------------------------------------------------------
// Reduction settings
// ---------------------------------------------------------------------------

/// Settings of the spectrum reduction (correction, baseline, integration).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReductionConfig {
    pub method: Method,
    pub delimiter: Delimiter,
    /// Whether spectrum files start with a header line.
    pub skip_header: bool,
    /// Excitation line in nm.
    pub laser_nm: f64,
    /// Acquisition temperature in °C.
    pub temperature_c: f64,
    /// Spline smoothing (LL2012), unless a sample overrides it.
    pub spline_smoothing: f64,
    /// Polynomial baseline order (DG2017; 2 reproduces Behrens et al. 2006).
    pub poly_order: usize,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        Self {
            method: Method::Ll2012,
            delimiter: Delimiter::Tab,
            skip_header: true,
            laser_nm: 514.532,
            temperature_c: 23.0,
            spline_smoothing: 0.001,
            poly_order: 3,
        }
    }
}

impl ReductionConfig {
    /// Defaults used when reducing a separate calibration set.
    pub fn calibration_defaults() -> Self {
        Self {
            laser_nm: 488.0,
            spline_smoothing: 0.005,
            ..Self::default()
        }
    }

    /// Load settings from a JSON file; missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings {}", path.display()))?;
        let config: Self = serde_json::from_str(&text).context("parsing settings JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).context("serialising settings")?;
        std::fs::write(path, text).with_context(|| format!("writing settings {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.laser_nm > 0.0) {
            bail!("laser wavelength must be positive, got {}", self.laser_nm);
        }
        if !(self.spline_smoothing >= 0.0) {
            bail!("spline smoothing must be non-negative, got {}", self.spline_smoothing);
        }
        if self.poly_order == 0 {
            bail!("polynomial order must be at least 1");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// External calibration settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalCalibrationOptions {
    /// Regions on both sides of the water band anchoring a linear baseline.
    pub rois: Vec<Roi>,
    /// Lower bound of the water band integration.
    pub low_bound: f64,
    /// Upper bound of the water band integration.
    pub high_bound: f64,
    pub delimiter: Delimiter,
    pub skip_header: bool,
}

impl Default for ExternalCalibrationOptions {
    fn default() -> Self {
        Self {
            rois: vec![Roi::new(2900.0, 3100.0), Roi::new(3700.0, 3800.0)],
            low_bound: 3200.0,
            high_bound: 3750.0,
            delimiter: Delimiter::Whitespace,
            skip_header: false,
        }
    }
}
