//! Water content of silicate glasses from their Raman spectra.
//!
//! A spectrum is resampled onto [`reduction::common_axis`], corrected for
//! temperature and excitation line, baseline-subtracted and integrated over
//! the silicate and water bands. The band ratio `rws` maps to water content
//! through a [`methods::Calibration`].

pub mod analysis;
pub mod external;
pub mod methods;
pub mod reduction;

pub use analysis::WaterAnalysis;
pub use external::{external_calibration, ExternalEstimate};
pub use methods::Calibration;
pub use reduction::{reduce_spectrum, ReducedSpectrum, Reduction};
