//! Dip-period estimation over the steady-state window.
//!
//! A dip onset is an in-range sample followed by an out-of-range one. The
//! estimator keeps the three most recent onsets and, from the third onset on,
//! records the span back to the onset two before it. That span covers one full
//! pair of dips, which smooths the alternating dip/recovery jitter of the pump.

use std::ops::Range;

use crate::range::RangeClassifier;
use crate::samples::RawTrace;
use crate::util::median;

/// Period statistics gathered while scanning the window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodStats {
    /// Median of `period_samples`, absent when none were collected.
    pub period_s: Option<f64>,
    /// Longest onset-to-recovery time of a genuine dip; 0 when none recovered.
    pub max_dip_time_s: f64,
    /// Spike times, relative to the window's lower bound.
    pub ignore_times_s: Vec<f64>,
    /// Raw onset-to-onset-but-one spans.
    pub period_samples: Vec<f64>,
}

/// Times of the three most recent dip onsets, oldest first.
#[derive(Debug, Clone, Copy, Default)]
struct OnsetHistory {
    prev: Option<f64>,
    curr: Option<f64>,
    newest: Option<f64>,
}

impl OnsetHistory {
    /// Shift in a new onset. Returns `newest - prev` once three onsets are held.
    fn push(&mut self, time_s: f64) -> Option<f64> {
        self.prev = self.curr;
        self.curr = self.newest;
        self.newest = Some(time_s);
        self.prev.map(|prev| time_s - prev)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PeriodEstimator {
    classifier: RangeClassifier,
}

impl PeriodEstimator {
    pub fn new(classifier: RangeClassifier) -> Self {
        Self { classifier }
    }

    /// Scan `indices` of `trace`. `origin_s` is the window's lower bound time,
    /// used to express ignore times relative to the window.
    ///
    /// The scan starts no earlier than index 1 so every sample has a predecessor.
    pub fn estimate(&self, trace: &RawTrace, indices: Range<usize>, origin_s: f64) -> PeriodStats {
        let times = trace.times();
        let flows = trace.flows();
        let c = &self.classifier;

        let mut onsets = OnsetHistory::default();
        let mut stats = PeriodStats::default();

        let end = indices.end.min(trace.len());
        for i in indices.start.max(1)..end {
            let before = flows[i - 1];
            let now = flows[i];

            if c.in_range(before) && !c.in_range(now)
                && let Some(span) = onsets.push(times[i])
            {
                stats.period_samples.push(span);
            }

            if c.in_range(now)
                && c.is_deep_dip(before)
                && let Some(onset) = onsets.newest
            {
                stats.max_dip_time_s = stats.max_dip_time_s.max(times[i] - onset);
            }

            if c.is_spike(now) {
                stats.ignore_times_s.push(times[i] - origin_s);
            }
        }

        stats.period_s = median(&stats.period_samples);
        stats
    }
}
