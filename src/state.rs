use std::path::{Path, PathBuf};

use eframe::egui::Color32;
use raman_glass::config::{ExternalCalibrationOptions, ReductionConfig};
use raman_glass::data::loader::{load_sample_list, load_spectrum};
use raman_glass::data::model::{SampleRecord, Spectrum};
use raman_glass::water::WaterAnalysis;

use crate::color::generate_palette;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// What the central plot shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Spectra as read from disk, with the sample ROIs.
    Raw,
    /// Corrected spectra on the common axis with their baselines.
    Baseline,
    /// Baseline-subtracted spectra.
    Corrected,
    /// Water band of samples and references used by the external calibration.
    External,
}

impl ViewMode {
    pub const ALL: [ViewMode; 4] = [
        ViewMode::Raw,
        ViewMode::Baseline,
        ViewMode::Corrected,
        ViewMode::External,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Raw => "Raw",
            ViewMode::Baseline => "Baseline",
            ViewMode::Corrected => "Corrected",
            ViewMode::External => "External",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Status {
    Info(String),
    Error(String),
}

/// A separate set of standards used for calibration.
#[derive(Debug, Clone)]
pub struct CalibrationSet {
    pub samples: Vec<SampleRecord>,
    pub spectra_dir: PathBuf,
    pub config: ReductionConfig,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: ReductionConfig,
    pub external_options: ExternalCalibrationOptions,

    /// Loaded sample list and everything computed from it.
    pub analysis: Option<WaterAnalysis>,

    /// Raw spectra, one per sample (None when the file could not be read).
    pub raw: Vec<Option<Spectrum>>,

    /// Per-sample visibility and colour.
    pub visible: Vec<bool>,
    pub colors: Vec<Color32>,

    pub calibration_set: Option<CalibrationSet>,

    pub view: ViewMode,
    pub minmax_scaling: bool,
    pub show_rois: bool,

    /// Status / error message shown in the UI.
    pub status: Option<Status>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            config: ReductionConfig::default(),
            external_options: ExternalCalibrationOptions::default(),
            analysis: None,
            raw: Vec::new(),
            visible: Vec::new(),
            colors: Vec::new(),
            calibration_set: None,
            view: ViewMode::Raw,
            minmax_scaling: false,
            show_rois: true,
            status: None,
        }
    }
}

impl AppState {
    /// Ingest a newly opened sample list and read its raw spectra.
    pub fn set_analysis(&mut self, analysis: WaterAnalysis) {
        let n = analysis.samples.len();
        self.visible = vec![true; n];
        self.colors = generate_palette(n);
        self.analysis = Some(analysis);
        self.reload_raw();
        self.view = ViewMode::Raw;
        self.info(format!("{n} samples loaded"));
    }

    /// Re-read raw spectra, e.g. after the spectra folder or delimiter changed.
    pub fn reload_raw(&mut self) {
        let Some(analysis) = &self.analysis else {
            return;
        };
        self.raw = analysis
            .samples
            .iter()
            .map(|s| {
                let path = analysis.spectra_dir.join(&s.name);
                match load_spectrum(&path, self.config.delimiter, self.config.skip_header) {
                    Ok(sp) => Some(sp.ascending()),
                    Err(e) => {
                        log::warn!("{e:#}");
                        None
                    }
                }
            })
            .collect();
    }

    pub fn set_spectra_dir(&mut self, dir: PathBuf) {
        if let Some(analysis) = &mut self.analysis {
            analysis.spectra_dir = dir;
            analysis.reduction = None;
            analysis.predicted = None;
            analysis.external = None;
        }
        self.reload_raw();
    }

    pub fn load_calibration_set(&mut self, list: &Path) -> anyhow::Result<usize> {
        let samples = load_sample_list(list)?;
        let n = samples.len();
        self.calibration_set = Some(CalibrationSet {
            samples,
            spectra_dir: list.parent().map(Path::to_path_buf).unwrap_or_default(),
            config: ReductionConfig {
                method: self.config.method,
                ..ReductionConfig::calibration_defaults()
            },
        });
        Ok(n)
    }

    // -- workflow actions --

    pub fn reduce(&mut self) {
        let Some(analysis) = &mut self.analysis else {
            return;
        };
        let result = analysis.reduce(&self.config).map(|r| r.len());
        match result {
            Ok(n) => {
                self.view = ViewMode::Corrected;
                self.info(format!("{n} spectra reduced with {}", self.config.method));
            }
            Err(e) => self.error(e),
        }
    }

    pub fn calibrate(&mut self) {
        let Some(analysis) = &mut self.analysis else {
            return;
        };
        let result = match &self.calibration_set {
            Some(set) => {
                let config = ReductionConfig {
                    method: self.config.method,
                    ..set.config.clone()
                };
                analysis.calibrate_with(&set.samples, &set.spectra_dir, &config)
            }
            None => analysis.calibrate(self.config.method),
        };
        match result {
            Ok(c) => self.info(format!("calibrated: {c}")),
            Err(e) => self.error(e),
        }
    }

    pub fn predict(&mut self) {
        let Some(analysis) = &mut self.analysis else {
            return;
        };
        let result = analysis.predict(self.config.method).map(|p| p.len());
        match result {
            Ok(n) => self.info(format!("water predicted for {n} samples")),
            Err(e) => self.error(e),
        }
    }

    pub fn external_calibration(&mut self, reference_dir: &Path) {
        let Some(analysis) = &mut self.analysis else {
            return;
        };
        // spectra are read with the same format as the reduction
        let options = ExternalCalibrationOptions {
            delimiter: self.config.delimiter,
            skip_header: self.config.skip_header,
            ..self.external_options.clone()
        };
        let result = analysis
            .external_calibration(reference_dir, &options)
            .map(|e| e.len());
        match result {
            Ok(n) => {
                self.view = ViewMode::External;
                self.info(format!("{n} samples scaled against their references"));
            }
            Err(e) => self.error(e),
        }
    }

    // -- sample visibility --

    pub fn select_all(&mut self, visible: bool) {
        self.visible.iter_mut().for_each(|v| *v = visible);
    }

    pub fn is_visible(&self, idx: usize) -> bool {
        self.visible.get(idx).copied().unwrap_or(false)
    }

    pub fn color(&self, idx: usize) -> Color32 {
        self.colors.get(idx).copied().unwrap_or(Color32::LIGHT_BLUE)
    }

    // -- status line --

    pub fn info(&mut self, msg: String) {
        log::info!("{msg}");
        self.status = Some(Status::Info(msg));
    }

    pub fn error(&mut self, err: anyhow::Error) {
        log::error!("{err:#}");
        self.status = Some(Status::Error(format!("Error: {err:#}")));
    }
}
