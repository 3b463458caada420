//! Raw flowmeter samples.

use crate::error::{AnalysisError, Result};

/// Ordered `(time_s, flow)` samples of one run, immutable once built.
///
/// Times are strictly increasing and every value is finite. A trace with fewer
/// than two samples is accepted here and reported as degenerate by the analysis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTrace {
    times: Vec<f64>,
    flows: Vec<f64>,
}

impl RawTrace {
    pub fn new(times: Vec<f64>, flows: Vec<f64>) -> Result<Self> {
        if times.len() != flows.len() {
            return Err(eyre::Report::new(AnalysisError::LengthMismatch {
                times: times.len(),
                flows: flows.len(),
            }));
        }
        if let Some(index) = times
            .iter()
            .zip(&flows)
            .position(|(t, f)| !t.is_finite() || !f.is_finite())
        {
            return Err(eyre::Report::new(AnalysisError::NonFinite { index }));
        }
        if let Some(w) = times.windows(2).position(|w| w[1] <= w[0]) {
            return Err(eyre::Report::new(AnalysisError::NonMonotonicTime {
                index: w + 1,
            }));
        }
        Ok(Self { times, flows })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    #[inline]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    #[inline]
    pub fn flows(&self) -> &[f64] {
        &self.flows
    }

    /// Average inter-sample interval proxy: last time divided by sample count.
    pub fn sample_resolution(&self) -> Option<f64> {
        let last = *self.times.last()?;
        Some(last / self.times.len() as f64)
    }

    /// Points with time strictly between the bounds, rebased to `lower_bound_s`.
    pub fn window(&self, lower_bound_s: f64, upper_bound_s: f64) -> (Vec<f64>, Vec<f64>) {
        self.times
            .iter()
            .zip(&self.flows)
            .filter(|&(&t, _)| lower_bound_s < t && t < upper_bound_s)
            .map(|(&t, &f)| (t - lower_bound_s, f))
            .unzip()
    }
}
