//! Numeric transforms on sampled spectra.
//!
//! ```text
//!   raw (x, y)
//!       │  interp::sort_ascending / interp::resample
//!       ▼
//!   correction::temperature_laser_correction
//!       │
//!       ▼
//!   baseline::baseline ──(Poly / Spline / Als)──► corrected, baseline
//!       │
//!       ▼
//!   interp::trapezoid_between     centroid::centroid (+ smoothing)
//! ```
//!
//! Every function is pure and reports bad input through [`crate::error::SignalError`].

pub mod banded;
pub mod baseline;
pub mod centroid;
pub mod correction;
pub mod fit;
pub mod interp;
pub mod smoothing;
pub mod spline;

pub use baseline::{baseline, BaselineFit, BaselineMethod};
pub use centroid::{centroid, centroids, centroids_shared};
pub use smoothing::Smoothing;
