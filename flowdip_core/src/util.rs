//! Small numeric helpers shared by the analysis stages.

/// Median of the finite values in `data`; `None` when there are none.
/// Even-length inputs average the two middle values.
pub fn median(data: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Minimum of `data`; `None` when empty.
pub fn minimum(data: &[f64]) -> Option<f64> {
    data.iter().copied().reduce(f64::min)
}
