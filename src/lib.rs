//! Raman spectra of glasses: ROI-anchored baselines, centroids and the
//! water-in-glass workflow.

pub mod config;
pub mod data;
pub mod error;
pub mod signal;
pub mod water;
