//! In-range classification against the expected flow band.

use crate::config::{DEEP_DIP_FRACTION, SPIKE_FRACTION, Tolerances};

/// True iff `(1 - range_fraction) * expected < value < (1 + range_fraction) * expected`.
#[inline]
pub fn in_range(expected: f64, value: f64, range_fraction: f64) -> bool {
    (1.0 - range_fraction) * expected < value && value < (1.0 + range_fraction) * expected
}

/// Stateless flow classifier bound to one expected flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeClassifier {
    expected: f64,
    range_fraction: f64,
}

impl RangeClassifier {
    pub fn new(expected: f64, range_fraction: f64) -> Self {
        Self {
            expected,
            range_fraction,
        }
    }

    #[inline]
    pub fn in_range(&self, value: f64) -> bool {
        in_range(self.expected, value, self.range_fraction)
    }

    /// At or below 80% of expected flow.
    #[inline]
    pub fn is_deep_dip(&self, value: f64) -> bool {
        value <= DEEP_DIP_FRACTION * self.expected
    }

    /// Above 120% of expected flow.
    #[inline]
    pub fn is_spike(&self, value: f64) -> bool {
        value > SPIKE_FRACTION * self.expected
    }
}

impl From<&Tolerances> for RangeClassifier {
    fn from(t: &Tolerances) -> Self {
        Self::new(t.expected_flow, t.range_fraction)
    }
}
