//! Phase folding of the steady-state series.

use crate::config::FALLBACK_IGNORE_RADIUS_S;
use crate::period::PeriodStats;

/// Fraction of a period added before wrapping, which puts the dip trough near
/// the middle of the folded axis.
pub const PHASE_SHIFT_FRACTION: f64 = 0.75;

/// Phase-aligned `(time, flow)` points in window order (not sorted by phase).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FoldedSeries {
    pub times: Vec<f64>,
    pub flows: Vec<f64>,
}

impl FoldedSeries {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Drop points near spikes and fold the rest onto one period.
///
/// Points within half a period (or 5 s without a period) of any ignore time
/// are removed. With a period, time maps to `(t + 0.75 p) mod p`; without
/// one, time is kept as is.
pub fn fold(times: &[f64], flows: &[f64], stats: &PeriodStats) -> FoldedSeries {
    let radius = stats.period_s.map_or(FALLBACK_IGNORE_RADIUS_S, |p| p / 2.0);
    let mut out = FoldedSeries::default();
    for (&t, &f) in times.iter().zip(flows) {
        if stats.ignore_times_s.iter().any(|&x| (x - t).abs() < radius) {
            continue;
        }
        let folded = match stats.period_s {
            // Both operands are non-negative, so `%` stays in [0, p).
            Some(p) => (t + PHASE_SHIFT_FRACTION * p) % p,
            None => t,
        };
        out.times.push(folded);
        out.flows.push(f);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spike_neighbourhood_uses_fallback_radius_without_period() {
        let stats = PeriodStats {
            ignore_times_s: vec![10.0],
            ..PeriodStats::default()
        };
        let times = [4.0, 5.5, 14.9, 15.0];
        let flows = [1.0, 2.0, 3.0, 4.0];
        let out = fold(&times, &flows, &stats);
        assert_eq!(out.times, vec![4.0, 15.0]);
        assert_eq!(out.flows, vec![1.0, 4.0]);
    }

    #[test]
    fn folds_with_three_quarter_shift() {
        let stats = PeriodStats {
            period_s: Some(20.0),
            ..PeriodStats::default()
        };
        let out = fold(&[0.0, 5.0, 25.0], &[9.0, 9.0, 9.0], &stats);
        assert_eq!(out.times, vec![15.0, 0.0, 0.0]);
    }
}
