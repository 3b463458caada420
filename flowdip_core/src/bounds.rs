//! Steady-state window search.
//!
//! The upper bound is the start of the last plateau of at least
//! `threshold_time_s` of in-range flow. The lower bound starts from the first
//! such plateau and is then moved past the first dip that follows it, so the
//! window opens on a dip-recovery phase.

use crate::config::Tolerances;
use crate::period::{PeriodEstimator, PeriodStats};
use crate::range::RangeClassifier;
use crate::samples::RawTrace;

/// Bounds of the analyzed portion of a raw trace.
///
/// A bound that could not be located stays at index 0 / time 0.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteadyWindow {
    pub lower_index: usize,
    pub upper_index: usize,
    pub lower_bound_s: f64,
    pub upper_bound_s: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct BoundaryLocator {
    classifier: RangeClassifier,
    threshold_time_s: f64,
}

impl BoundaryLocator {
    pub fn new(tolerances: &Tolerances) -> Self {
        Self {
            classifier: RangeClassifier::from(tolerances),
            threshold_time_s: tolerances.threshold_time_s,
        }
    }

    /// Locate both bounds, then estimate period statistics over
    /// `[lower_index, upper_index)`.
    pub fn locate(&self, trace: &RawTrace) -> (SteadyWindow, PeriodStats) {
        let times = trace.times();

        let upper = self.final_plateau(trace);
        let upper_index = upper.unwrap_or(0);
        let upper_bound_s = upper.map_or(0.0, |i| times[i]);

        let lower = self
            .startup_plateau(trace)
            .map(|start| self.past_first_dip(trace, start, upper_index).unwrap_or(start));
        let lower_index = lower.unwrap_or(0);
        let lower_bound_s = lower.map_or(0.0, |i| times[i]);

        let window = SteadyWindow {
            lower_index,
            upper_index,
            lower_bound_s,
            upper_bound_s,
        };
        tracing::debug!(
            lower_index,
            upper_index,
            lower_bound_s,
            upper_bound_s,
            "steady window located"
        );

        let stats = PeriodEstimator::new(self.classifier).estimate(
            trace,
            lower_index..upper_index,
            lower_bound_s,
        );
        tracing::debug!(
            period_s = ?stats.period_s,
            max_dip_time_s = stats.max_dip_time_s,
            ignored = stats.ignore_times_s.len(),
            "period estimated"
        );
        (window, stats)
    }

    /// Earliest index of the last in-range run spanning `threshold_time_s`,
    /// scanning backward from the final sample.
    ///
    /// The returned index is the first one at least `threshold_time_s` before
    /// the anchor.
    pub fn final_plateau(&self, trace: &RawTrace) -> Option<usize> {
        let times = trace.times();
        let flows = trace.flows();
        let mut anchor = trace.len().checked_sub(1)?;
        loop {
            if self.classifier.in_range(flows[anchor]) {
                let mut j = anchor;
                while times[anchor] - times[j] < self.threshold_time_s {
                    if !self.classifier.in_range(flows[j]) {
                        anchor = j;
                        break;
                    }
                    // Run reaches the first sample without spanning the threshold.
                    j = j.checked_sub(1)?;
                }
                if times[anchor] - times[j] >= self.threshold_time_s {
                    return Some(j);
                }
            }
            anchor = anchor.checked_sub(1)?;
        }
    }

    /// Anchor index of the first in-range run spanning `threshold_time_s`.
    pub fn startup_plateau(&self, trace: &RawTrace) -> Option<usize> {
        let times = trace.times();
        let flows = trace.flows();
        let n = trace.len();
        let mut anchor = 0;
        while anchor < n {
            if self.classifier.in_range(flows[anchor]) {
                let mut j = anchor;
                while times[j] - times[anchor] < self.threshold_time_s {
                    if !self.classifier.in_range(flows[j]) {
                        anchor = j;
                        break;
                    }
                    if j + 1 == n {
                        return None;
                    }
                    j += 1;
                }
                if times[j] - times[anchor] >= self.threshold_time_s {
                    return Some(anchor);
                }
            }
            anchor += 1;
        }
        None
    }

    /// First in-range index after the dip that ends the startup plateau, or
    /// `None` if `upper_index` is reached first.
    fn past_first_dip(&self, trace: &RawTrace, start: usize, upper_index: usize) -> Option<usize> {
        let flows = trace.flows();
        let mut i = start;
        while i < upper_index && self.classifier.in_range(flows[i]) {
            i += 1;
        }
        while i < upper_index && !self.classifier.in_range(flows[i]) {
            i += 1;
        }
        (i != upper_index).then_some(i)
    }
}
