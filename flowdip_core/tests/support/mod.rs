//! Synthetic flowmeter traces for integration tests.
#![allow(dead_code)]

/// `n` samples at `dt` spacing, `base` flow, with each `(start, len, flow)`
/// dip written over the base level.
pub fn trace_with_dips(n: usize, dt: f64, base: f64, dips: &[(usize, usize, f64)]) -> (Vec<f64>, Vec<f64>) {
    let times: Vec<f64> = (0..n).map(|i| i as f64 * dt).collect();
    let mut flows = vec![base; n];
    for &(start, len, flow) in dips {
        for f in flows.iter_mut().skip(start).take(len) {
            *f = flow;
        }
    }
    (times, flows)
}

pub fn close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}
