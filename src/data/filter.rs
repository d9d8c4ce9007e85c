use super::model::Roi;

// ---------------------------------------------------------------------------
// Index selection over a position axis
// ---------------------------------------------------------------------------

/// Return indices of samples lying strictly inside any of the regions.
///
/// A sample covered by several (overlapping) regions is returned once, and
/// indices come back in axis order.
pub fn roi_indices(x: &[f64], rois: &[Roi]) -> Vec<usize> {
    x.iter()
        .enumerate()
        .filter(|(_, &xi)| rois.iter().any(|r| r.contains(xi)))
        .map(|(i, _)| i)
        .collect()
}

/// Return indices of samples with `lo < x < hi`.
pub fn range_indices(x: &[f64], lo: f64, hi: f64) -> Vec<usize> {
    roi_indices(x, &[Roi::new(lo, hi)])
}

/// Gather `values` at `indices`.
pub fn take(values: &[f64], indices: &[usize]) -> Vec<f64> {
    indices.iter().map(|&i| values[i]).collect()
}
