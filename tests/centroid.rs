use raman_glass::data::model::Spectrum;
use raman_glass::error::SignalError;
use raman_glass::signal::{centroid, centroids, centroids_shared, Smoothing};

fn assert_close(actual: f64, expected: f64, tol: f64) {
    let diff = (actual - expected).abs();
    assert!(diff <= tol, "got {actual}, expected {expected}, diff {diff} > tol {tol}");
}

fn peak(x: &[f64], mu: f64, sigma: f64) -> Vec<f64> {
    x.iter()
        .map(|&v| (-(v - mu).powi(2) / (2.0 * sigma * sigma)).exp())
        .collect()
}

#[test]
fn symmetric_peak_centroid_is_its_centre() {
    let x: Vec<f64> = (0..=100).map(f64::from).collect();
    let y = peak(&x, 50.0, 6.0);
    assert_close(centroid(&x, &y, None).unwrap(), 50.0, 1e-9);
}

#[test]
fn smoothing_keeps_a_symmetric_centroid() {
    let x: Vec<f64> = (0..=100).map(f64::from).collect();
    let y = peak(&x, 50.0, 6.0);

    let whittaker = Smoothing::default();
    assert_close(centroid(&x, &y, Some(&whittaker)).unwrap(), 50.0, 1e-6);

    let sg = Smoothing::SavitzkyGolay { window: 11, order: 3 };
    assert_close(centroid(&x, &y, Some(&sg)).unwrap(), 50.0, 1e-6);
}

#[test]
fn centroids_follow_each_axis() {
    let a: Vec<f64> = (0..=100).map(f64::from).collect();
    let b: Vec<f64> = (0..=100).map(|i| 1000.0 + 2.0 * f64::from(i)).collect();
    let spectra = vec![
        Spectrum::new(a.clone(), peak(&a, 50.0, 5.0)).unwrap(),
        Spectrum::new(b.clone(), peak(&b, 1100.0, 8.0)).unwrap(),
    ];
    let c = centroids(&spectra, None).unwrap();
    assert_close(c[0], 50.0, 1e-9);
    assert_close(c[1], 1100.0, 1e-9);
}

#[test]
fn shared_axis_centroids() {
    let x: Vec<f64> = (0..=200).map(f64::from).collect();
    let ys = vec![peak(&x, 100.0, 10.0), vec![1.0; x.len()]];
    let c = centroids_shared(&x, &ys, None).unwrap();
    assert_close(c[0], 100.0, 1e-9);
    assert_close(c[1], 100.0, 1e-9);
}

#[test]
fn one_degenerate_spectrum_fails_the_batch() {
    let x: Vec<f64> = (0..=10).map(f64::from).collect();
    let ys = vec![vec![1.0; 11], vec![0.0; 11]];
    assert_eq!(
        centroids_shared(&x, &ys, None),
        Err(SignalError::DegenerateIntensity(0.0))
    );
}
