use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors raised by the numeric core
// ---------------------------------------------------------------------------

/// Input validation and numerical failures of the signal transforms.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalError {
    #[error("x has {x} values but y has {y}")]
    LengthMismatch { x: usize, y: usize },

    #[error("signal is empty")]
    Empty,

    #[error("positions must be strictly increasing (index {0})")]
    NotIncreasing(usize),

    #[error("invalid region of interest [{start}, {end}]")]
    InvalidRoi { start: f64, end: f64 },

    #[error("{found} samples fall inside the regions of interest, at least {needed} required")]
    InsufficientSamples { found: usize, needed: usize },

    #[error("intensity sum is {0}, centroid is undefined")]
    DegenerateIntensity(f64),

    #[error("linear system is singular or not positive definite")]
    Singular,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, SignalError>;

/// Check that `x` and `y` describe a usable spectrum.
pub(crate) fn check_xy(x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(SignalError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    if x.is_empty() {
        return Err(SignalError::Empty);
    }
    Ok(())
}

/// Check that positions are strictly increasing.
pub(crate) fn check_increasing(x: &[f64]) -> Result<()> {
    match x.windows(2).position(|w| !(w[1] > w[0])) {
        Some(i) => Err(SignalError::NotIncreasing(i + 1)),
        None => Ok(()),
    }
}
