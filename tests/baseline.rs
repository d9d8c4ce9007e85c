use raman_glass::data::model::rois;
use raman_glass::error::SignalError;
use raman_glass::signal::{baseline, BaselineMethod};

fn gaussian(x: f64, mu: f64, sigma: f64, amp: f64) -> f64 {
    amp * (-(x - mu).powi(2) / (2.0 * sigma * sigma)).exp()
}

/// Curved background with one peak at 100, sampled on 0..=200.
fn peak_on_background() -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let x: Vec<f64> = (0..=200).map(f64::from).collect();
    let background: Vec<f64> = x.iter().map(|&v| 2.0 + 0.05 * v + 1e-4 * v * v).collect();
    let y = x
        .iter()
        .zip(&background)
        .map(|(&v, b)| b + gaussian(v, 100.0, 5.0, 10.0))
        .collect();
    (x, y, background)
}

fn assert_vec_close(a: &[f64], b: &[f64], tol: f64) {
    assert_eq!(a.len(), b.len(), "length mismatch ({} vs {})", a.len(), b.len());
    for (i, (ai, bi)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (ai - bi).abs();
        assert!(diff <= tol, "index {i}: got {ai}, expected {bi}, diff {diff} > tol {tol}");
    }
}

#[test]
fn quadratic_baseline_recovers_background() {
    let (x, y, background) = peak_on_background();
    let roi = rois(&[[0.0, 60.0], [140.0, 200.0]]);
    let fit = baseline(&x, &y, &roi, &BaselineMethod::Poly { order: 2 }).unwrap();

    assert_vec_close(&fit.baseline, &background, 1e-6);
    assert!((fit.corrected[100] - 10.0).abs() < 1e-6);
}

#[test]
fn spline_baseline_flattens_roi_samples() {
    let (x, y, _) = peak_on_background();
    let roi = rois(&[[0.0, 60.0], [140.0, 200.0]]);
    let fit = baseline(&x, &y, &roi, &BaselineMethod::Spline { smoothing: 0.001 }).unwrap();

    for i in (1..60).chain(141..200) {
        assert!(fit.corrected[i].abs() < 0.05, "x = {i}: {}", fit.corrected[i]);
    }
    assert!((fit.corrected[100] - 10.0).abs() < 0.2, "{}", fit.corrected[100]);
    for (c, (yi, b)) in fit.corrected.iter().zip(y.iter().zip(&fit.baseline)) {
        assert!((c - (yi - b)).abs() < 1e-12);
    }
}

#[test]
fn als_baseline_stays_under_the_peak() {
    let x: Vec<f64> = (0..=200).map(f64::from).collect();
    let y: Vec<f64> = x.iter().map(|&v| 1.0 + gaussian(v, 100.0, 5.0, 10.0)).collect();
    let fit = baseline(&x, &y, &[], &BaselineMethod::als()).unwrap();

    assert!(fit.corrected[100] > 9.0, "{}", fit.corrected[100]);
    assert!((fit.baseline[0] - 1.0).abs() < 0.2);
    assert!((fit.baseline[200] - 1.0).abs() < 0.2);
}

#[test]
fn roi_outside_the_spectrum_has_too_few_samples() {
    let (x, y, _) = peak_on_background();
    let roi = rois(&[[500.0, 600.0]]);
    assert_eq!(
        baseline(&x, &y, &roi, &BaselineMethod::Poly { order: 1 }),
        Err(SignalError::InsufficientSamples { found: 0, needed: 2 })
    );
}

#[test]
fn reversed_roi_is_rejected() {
    let (x, y, _) = peak_on_background();
    let roi = rois(&[[60.0, 0.0]]);
    assert!(matches!(
        baseline(&x, &y, &roi, &BaselineMethod::Poly { order: 1 }),
        Err(SignalError::InvalidRoi { .. })
    ));
}

#[test]
fn descending_positions_are_rejected() {
    let (mut x, y, _) = peak_on_background();
    x.reverse();
    let roi = rois(&[[0.0, 60.0], [140.0, 200.0]]);
    assert!(matches!(
        baseline(&x, &y, &roi, &BaselineMethod::Poly { order: 1 }),
        Err(SignalError::NotIncreasing(_))
    ));
}
