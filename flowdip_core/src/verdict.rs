//! Pass/fail evaluation of a folded series.

use crate::config::Tolerances;
use crate::util::minimum;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    /// Lowest flow in the folded series.
    pub minimum_dip: f64,
    pub allowable_dip: f64,
    pub max_dip_time_s: f64,
    pub allowable_dip_time_s: f64,
    pub dip_magnitude_ok: bool,
    pub dip_time_ok: bool,
    pub passed: bool,
}

/// Evaluate the tolerances. Returns `None` for an empty series.
pub fn evaluate(folded_flows: &[f64], max_dip_time_s: f64, tolerances: &Tolerances) -> Option<Verdict> {
    let minimum_dip = minimum(folded_flows)?;
    let allowable_dip = tolerances.allowable_dip();
    let dip_magnitude_ok = minimum_dip > allowable_dip;
    let dip_time_ok = max_dip_time_s < tolerances.allowable_dip_time_s;
    Some(Verdict {
        minimum_dip,
        allowable_dip,
        max_dip_time_s,
        allowable_dip_time_s: tolerances.allowable_dip_time_s,
        dip_magnitude_ok,
        dip_time_ok,
        passed: dip_magnitude_ok && dip_time_ok,
    })
}
