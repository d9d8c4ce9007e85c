use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use super::external::{external_calibration, ExternalEstimate};
use super::methods::{dg2017_calibrate, ll2012_calibrate, Calibration};
use super::reduction::{common_axis, reduce_spectrum, Reduction};
use crate::config::{ExternalCalibrationOptions, Method, ReductionConfig};
use crate::data::loader::{load_sample_list, load_spectrum};
use crate::data::model::SampleRecord;

/// Reduce every sample of a list, reading spectra from `spectra_dir`.
pub fn reduce_samples(samples: &[SampleRecord], spectra_dir: &Path, config: &ReductionConfig) -> Result<Reduction> {
    config.validate()?;
    let mut reduction = Reduction {
        method: config.method,
        x: common_axis(),
        ..Default::default()
    };
    for sample in samples {
        let path = spectra_dir.join(&sample.name);
        let spectrum = load_spectrum(&path, config.delimiter, config.skip_header)?;
        let smoothing = sample.spline_smoothing.unwrap_or(config.spline_smoothing);
        let reduced = reduce_spectrum(&spectrum, &sample.rois, smoothing, config)
            .with_context(|| format!("reducing sample {}", sample.name))?;
        log::debug!("{}: rws = {:.4}", sample.name, reduced.rws);
        reduction.names.push(sample.label().to_string());
        reduction.spectra.push(reduced);
    }
    log::info!("reduced {} spectra with {}", reduction.len(), config.method);
    Ok(reduction)
}

/// Fit `method` to reduced samples whose water content is known.
pub fn fit_calibration(samples: &[SampleRecord], reduction: &Reduction, method: Method) -> Result<Calibration> {
    if samples.len() != reduction.len() {
        bail!(
            "{} samples but {} reduced spectra; reduce again",
            samples.len(),
            reduction.len()
        );
    }
    if reduction.method != method {
        bail!("spectra were reduced for {}, not {method}", reduction.method);
    }
    let rws = reduction.rws();
    let water = samples
        .iter()
        .map(|s| {
            s.water
                .with_context(|| format!("sample {} has no known water content", s.name))
        })
        .collect::<Result<Vec<f64>>>()?;

    let calibration = match method {
        Method::Ll2012 => Calibration::Ll2012 {
            a: ll2012_calibrate(&rws, &water)?,
        },
        Method::Dg2017 => {
            let feo = samples
                .iter()
                .map(|s| s.feo.with_context(|| format!("sample {} has no FeO content", s.name)))
                .collect::<Result<Vec<f64>>>()?;
            let (a, b) = dg2017_calibrate(&rws, &feo, &water)?;
            Calibration::Dg2017 { a, b }
        }
    };
    log::info!("calibrated {calibration} on {} samples", samples.len());
    Ok(calibration)
}

// ---------------------------------------------------------------------------
// WaterAnalysis – one sample list and everything computed from it
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct WaterAnalysis {
    pub samples: Vec<SampleRecord>,
    pub spectra_dir: PathBuf,
    pub reduction: Option<Reduction>,
    pub calibration: Option<Calibration>,
    /// Predicted water content (wt%), one per sample.
    pub predicted: Option<Vec<f64>>,
    /// External calibration results keyed by sample label.
    pub external: Option<Vec<(String, ExternalEstimate)>>,
}

impl WaterAnalysis {
    pub fn new(samples: Vec<SampleRecord>, spectra_dir: PathBuf) -> Self {
        Self {
            samples,
            spectra_dir,
            ..Default::default()
        }
    }

    /// Load a sample list; spectra are looked up next to it unless `spectra_dir` is given.
    pub fn open(list_path: &Path, spectra_dir: Option<&Path>) -> Result<Self> {
        let samples = load_sample_list(list_path)?;
        let dir = match spectra_dir {
            Some(d) => d.to_path_buf(),
            None => list_path.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        log::info!("loaded {} samples from {}", samples.len(), list_path.display());
        Ok(Self::new(samples, dir))
    }

    /// Reduce all spectra; earlier predictions are discarded.
    pub fn reduce(&mut self, config: &ReductionConfig) -> Result<&Reduction> {
        let reduction = reduce_samples(&self.samples, &self.spectra_dir, config)?;
        self.predicted = None;
        Ok(&*self.reduction.insert(reduction))
    }

    /// Calibrate `method` on this list's own samples (all need a known water content).
    pub fn calibrate(&mut self, method: Method) -> Result<Calibration> {
        let Some(reduction) = &self.reduction else {
            bail!("reduce the spectra before calibrating");
        };
        let calibration = fit_calibration(&self.samples, reduction, method)?;
        self.calibration = Some(calibration);
        Ok(calibration)
    }

    /// Calibrate on a separate set of standards reduced with `config`.
    pub fn calibrate_with(
        &mut self,
        standards: &[SampleRecord],
        standards_dir: &Path,
        config: &ReductionConfig,
    ) -> Result<Calibration> {
        let reduction = reduce_samples(standards, standards_dir, config).context("reducing calibration set")?;
        let calibration = fit_calibration(standards, &reduction, config.method)?;
        self.calibration = Some(calibration);
        Ok(calibration)
    }

    /// Predict water content of every reduced sample with `method`.
    ///
    /// Uses the stored calibration when it belongs to `method`, the literature
    /// coefficients when nothing was calibrated.
    pub fn predict(&mut self, method: Method) -> Result<&[f64]> {
        let Some(reduction) = &self.reduction else {
            bail!("reduce the spectra before predicting");
        };
        let calibration = match self.calibration {
            Some(c) if c.method() == method => c,
            Some(c) => bail!("stored calibration is {}, cannot predict with {method}", c.method()),
            None => {
                log::info!("no calibration, using literature coefficients for {method}");
                Calibration::literature(method)
            }
        };
        if reduction.method != method {
            bail!("spectra were reduced for {}, reduce again for {method}", reduction.method);
        }
        let predicted = reduction
            .spectra
            .iter()
            .zip(&self.samples)
            .map(|(r, s)| {
                calibration
                    .predict(r.rws, s.feo)
                    .with_context(|| format!("predicting sample {}", s.name))
            })
            .collect::<Result<Vec<f64>>>()?;
        Ok(self.predicted.insert(predicted).as_slice())
    }

    /// Scale each sample that names a reference spectrum against it.
    ///
    /// Reference files are read from `reference_dir`; samples without a
    /// reference are skipped.
    pub fn external_calibration(
        &mut self,
        reference_dir: &Path,
        options: &ExternalCalibrationOptions,
    ) -> Result<&[(String, ExternalEstimate)]> {
        let mut estimates = Vec::new();
        for sample in &self.samples {
            let (Some(reference), Some(water_ref)) = (&sample.reference, sample.water_reference) else {
                log::debug!("{}: no reference, skipped", sample.name);
                continue;
            };
            let spectrum = load_spectrum(&self.spectra_dir.join(&sample.name), options.delimiter, options.skip_header)?;
            let reference = load_spectrum(&reference_dir.join(reference), options.delimiter, options.skip_header)?;
            let estimate = external_calibration(&spectrum, &reference, water_ref, options)
                .with_context(|| format!("external calibration of {}", sample.name))?;
            log::info!("{}: {} wt% H2O", sample.name, estimate.water);
            estimates.push((sample.label().to_string(), estimate));
        }
        if estimates.is_empty() {
            bail!("no sample names a reference spectrum with its water content");
        }
        Ok(self.external.insert(estimates).as_slice())
    }
}
