//! Tolerance configuration consumed by the analysis core.
//!
//! This is the runtime value shared (read-only) by every trace in a batch. It
//! is separate from the TOML-deserialized table in `flowdip_config`.

use crate::error::{AnalysisError, Result};

/// Samples at or below this fraction of expected flow mark a genuine dip when
/// flow recovers.
pub const DEEP_DIP_FRACTION: f64 = 0.8;
/// Samples above this fraction of expected flow are overshoot spikes.
pub const SPIKE_FRACTION: f64 = 1.2;
/// Half-width (seconds) of the exclusion zone around a spike when no period
/// could be estimated.
pub const FALLBACK_IGNORE_RADIUS_S: f64 = 5.0;

/// Fixed per-analysis tolerances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    /// Expected steady flow (mL/min).
    pub expected_flow: f64,
    /// In-range band is `expected * (1 ± range_fraction)`, exclusive.
    pub range_fraction: f64,
    /// Continuous in-range seconds required to call a plateau steady.
    pub threshold_time_s: f64,
    /// A dip must be strictly shorter than this to pass.
    pub allowable_dip_time_s: f64,
    /// Absolute dip allowance below expected flow (mL/min).
    pub max_dip_abs: f64,
    /// Fractional dip floor relative to expected flow.
    pub max_dip_frac: f64,
    /// Median-flow margin; only used by reporting.
    pub margin_frac: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            expected_flow: 9.0,
            range_fraction: 0.2,
            threshold_time_s: 10.0,
            allowable_dip_time_s: 0.8,
            max_dip_abs: 4.0,
            max_dip_frac: 0.6,
            margin_frac: 0.025,
        }
    }
}

impl Tolerances {
    /// Copy of these tolerances targeting a different expected flow.
    #[must_use]
    pub fn with_expected_flow(self, expected_flow: f64) -> Self {
        Self {
            expected_flow,
            ..self
        }
    }

    /// Lowest flow a trace may dip to and still pass:
    /// `min(expected - max_dip_abs, expected * max_dip_frac)`.
    pub fn allowable_dip(&self) -> f64 {
        (self.expected_flow - self.max_dip_abs).min(self.expected_flow * self.max_dip_frac)
    }

    pub fn validate(&self) -> Result<()> {
        let bad = |msg: &str| Err(eyre::Report::new(AnalysisError::Config(msg.to_string())));
        if !(self.expected_flow.is_finite() && self.expected_flow > 0.0) {
            return bad("expected_flow must be > 0");
        }
        if !(self.threshold_time_s.is_finite() && self.threshold_time_s > 0.0) {
            return bad("threshold_time_s must be > 0");
        }
        if !(self.range_fraction > 0.0 && self.range_fraction < 1.0) {
            return bad("range_fraction must be in (0.0, 1.0)");
        }
        if !(self.allowable_dip_time_s.is_finite() && self.allowable_dip_time_s > 0.0) {
            return bad("allowable_dip_time_s must be > 0");
        }
        if !(self.max_dip_abs.is_finite() && self.max_dip_abs >= 0.0) {
            return bad("max_dip_abs must be >= 0");
        }
        if !(self.max_dip_frac > 0.0 && self.max_dip_frac <= 1.0) {
            return bad("max_dip_frac must be in (0.0, 1.0]");
        }
        if !(self.margin_frac >= 0.0 && self.margin_frac < 1.0) {
            return bad("margin_frac must be in [0.0, 1.0)");
        }
        Ok(())
    }

    /// Whether `median` lies strictly within `margin_frac` of `expected`.
    pub fn within_margin(&self, expected: f64, median: f64) -> bool {
        (1.0 - self.margin_frac) * expected < median && median < (1.0 + self.margin_frac) * expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowable_dip_takes_the_stricter_limit() {
        let t = Tolerances::default();
        // min(9 - 4, 9 * 0.6) = min(5, 5.4)
        assert!((t.allowable_dip() - 5.0).abs() < 1e-12);
        let low = t.with_expected_flow(3.0);
        // min(-1, 1.8)
        assert!((low.allowable_dip() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_expected_flow_is_rejected() {
        let err = Tolerances::default()
            .with_expected_flow(0.0)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::Config(_))
        ));
    }
}
