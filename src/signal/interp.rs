use crate::error::{check_increasing, check_xy, Result};

// ---------------------------------------------------------------------------
// Resampling, ordering and integration helpers
// ---------------------------------------------------------------------------

/// Linearly interpolate `(xs, ys)` at `at`, extrapolating the end segments.
///
/// `xs` must be strictly increasing; a single sample yields a constant.
pub fn interpolate(xs: &[f64], ys: &[f64], at: f64) -> Result<f64> {
    check_xy(xs, ys)?;
    check_increasing(xs)?;
    Ok(interpolate_sorted(xs, ys, at))
}

/// Resample a spectrum onto `new_x` with linear interpolation.
pub fn resample(xs: &[f64], ys: &[f64], new_x: &[f64]) -> Result<Vec<f64>> {
    check_xy(xs, ys)?;
    check_increasing(xs)?;
    Ok(new_x.iter().map(|&v| interpolate_sorted(xs, ys, v)).collect())
}

/// Caller guarantees equal, non-empty lengths and increasing `xs`.
fn interpolate_sorted(xs: &[f64], ys: &[f64], at: f64) -> f64 {
    let n = xs.len();
    if n == 1 {
        return ys[0];
    }
    // index of the segment [xs[i], xs[i+1]] used for `at`
    let i = match xs.partition_point(|&v| v <= at) {
        0 => 0,
        p if p >= n => n - 2,
        p => p - 1,
    };
    let (x0, x1) = (xs[i], xs[i + 1]);
    let (y0, y1) = (ys[i], ys[i + 1]);
    y0 + (at - x0) * (y1 - y0) / (x1 - x0)
}

/// Return `(x, y)` sorted by ascending position, one sample per position.
///
/// Spectrometers often write descending Raman shifts; every transform in this
/// crate expects strictly ascending order. Repeated positions collapse into
/// one sample holding their mean intensity. Extra `x` or `y` values beyond the
/// shorter of the two are ignored.
pub fn sort_ascending(x: &[f64], y: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let n = x.len().min(y.len());
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| x[a].total_cmp(&x[b]));

    let mut xs: Vec<f64> = Vec::with_capacity(n);
    let mut ys: Vec<f64> = Vec::with_capacity(n);
    let mut count = 0usize;
    for i in order {
        if xs.last() == Some(&x[i]) {
            count += 1;
            if let Some(mean) = ys.last_mut() {
                *mean += (y[i] - *mean) / count as f64;
            }
        } else {
            xs.push(x[i]);
            ys.push(y[i]);
            count = 1;
        }
    }
    (xs, ys)
}

/// Trapezoidal integral of `y` over `x`.
pub fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xw, yw)| (xw[1] - xw[0]) * (yw[0] + yw[1]) / 2.0)
        .sum()
}

/// Trapezoidal integral restricted to samples with `lo < x < hi`.
pub fn trapezoid_between(x: &[f64], y: &[f64], lo: f64, hi: f64) -> f64 {
    let idx = crate::data::filter::range_indices(x, lo, hi);
    let xs: Vec<f64> = idx.iter().map(|&i| x[i]).collect();
    let ys: Vec<f64> = idx.iter().map(|&i| y[i]).collect();
    trapezoid(&xs, &ys)
}

/// Evenly spaced values `start, start + step, ...` strictly below `stop`.
pub fn arange(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || stop <= start {
        return Vec::new();
    }
    let n = ((stop - start) / step).ceil() as usize;
    (0..n).map(|i| start + i as f64 * step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SignalError;

    #[test]
    fn interpolates_and_extrapolates_linearly() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [0.0, 2.0, 3.0];
        assert_eq!(interpolate(&xs, &ys, 0.5), Ok(1.0));
        assert_eq!(interpolate(&xs, &ys, 1.0), Ok(2.0));
        assert_eq!(interpolate(&xs, &ys, 1.5), Ok(2.5));
        assert_eq!(interpolate(&xs, &ys, -1.0), Ok(-2.0));
        assert_eq!(interpolate(&xs, &ys, 4.0), Ok(5.0));
        assert_eq!(interpolate(&[7.0], &[3.0], 100.0), Ok(3.0));
    }

    #[test]
    fn interpolate_rejects_bad_input() {
        assert_eq!(interpolate(&[], &[], 1.0), Err(SignalError::Empty));
        assert_eq!(
            interpolate(&[0.0, 1.0, 2.0], &[1.0], 0.5),
            Err(SignalError::LengthMismatch { x: 3, y: 1 })
        );
        assert_eq!(interpolate(&[0.0, 0.0], &[1.0, 2.0], 0.5), Err(SignalError::NotIncreasing(1)));
    }

    #[test]
    fn resample_rejects_unsorted_axis() {
        assert!(resample(&[1.0, 0.0], &[1.0, 2.0], &[0.5]).is_err());
    }

    #[test]
    fn sorts_descending_spectrum() {
        let (x, y) = sort_ascending(&[3.0, 2.0, 1.0], &[30.0, 20.0, 10.0]);
        assert_eq!(x, vec![1.0, 2.0, 3.0]);
        assert_eq!(y, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn repeated_positions_are_averaged() {
        let (x, y) = sort_ascending(&[3.0, 2.0, 2.0, 2.0, 1.0], &[30.0, 19.0, 20.0, 24.0, 10.0]);
        assert_eq!(x, vec![1.0, 2.0, 3.0]);
        assert_eq!(y, vec![10.0, 21.0, 30.0]);
        assert!(resample(&x, &y, &[1.5]).is_ok());
    }

    #[test]
    fn trapezoid_of_line() {
        let x = arange(0.0, 10.5, 0.5);
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v).collect();
        assert!((trapezoid(&x, &y) - 100.0).abs() < 1e-12);
        // strict bounds exclude the end points 0 and 10
        let inner = trapezoid_between(&x, &y, 0.0, 10.0);
        assert!((inner - (9.5 * 9.5 - 0.25)).abs() < 1e-9);
    }

    #[test]
    fn arange_excludes_stop() {
        let v = arange(50.0, 55.0, 1.0);
        assert_eq!(v, vec![50.0, 51.0, 52.0, 53.0, 54.0]);
    }
}
