//! One analyzed run: raw samples plus every derived series and the verdict.

use crate::bounds::{BoundaryLocator, SteadyWindow};
use crate::config::Tolerances;
use crate::error::{Degenerate, Result};
use crate::fold::{FoldedSeries, fold};
use crate::period::PeriodStats;
use crate::samples::RawTrace;
use crate::util::median;
use crate::verdict::{Verdict, evaluate};

/// Outcome of analyzing one trace.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceStatus {
    Analyzed(Verdict),
    /// Well-formed input without usable steady-state data.
    Unanalyzable(Degenerate),
}

/// Derived once at construction and never mutated. Accessors hand out copies.
#[derive(Debug, Clone)]
pub struct Trace {
    name: String,
    label: Option<String>,
    tolerances: Tolerances,
    raw: RawTrace,
    window: SteadyWindow,
    steady_times: Vec<f64>,
    steady_flows: Vec<f64>,
    stats: PeriodStats,
    folded: FoldedSeries,
    raw_median: Option<f64>,
    median_flow: Option<f64>,
    status: TraceStatus,
}

impl Trace {
    /// Run the full pipeline: bounds and period, windowing, folding, verdict.
    ///
    /// Errors only on invalid tolerances. Degenerate traces yield
    /// `TraceStatus::Unanalyzable`.
    pub fn analyze(name: impl Into<String>, raw: RawTrace, tolerances: &Tolerances) -> Result<Self> {
        tolerances.validate()?;
        let name = name.into();
        let raw_median = median(raw.flows());

        if raw.len() < 2 {
            let len = raw.len();
            tracing::warn!(run = %name, len, "trace too short to analyze");
            return Ok(Self {
                name,
                label: None,
                tolerances: *tolerances,
                raw,
                window: SteadyWindow::default(),
                steady_times: Vec::new(),
                steady_flows: Vec::new(),
                stats: PeriodStats::default(),
                folded: FoldedSeries::default(),
                raw_median,
                median_flow: None,
                status: TraceStatus::Unanalyzable(Degenerate::TooShort { len }),
            });
        }

        let (window, stats) = BoundaryLocator::new(tolerances).locate(&raw);
        let (steady_times, steady_flows) = raw.window(window.lower_bound_s, window.upper_bound_s);
        let folded = fold(&steady_times, &steady_flows, &stats);

        let status = if steady_times.is_empty() {
            TraceStatus::Unanalyzable(Degenerate::EmptyWindow {
                lower_bound_s: window.lower_bound_s,
                upper_bound_s: window.upper_bound_s,
            })
        } else {
            evaluate(&folded.flows, stats.max_dip_time_s, tolerances).map_or(
                TraceStatus::Unanalyzable(Degenerate::AllSamplesIgnored),
                TraceStatus::Analyzed,
            )
        };

        match &status {
            TraceStatus::Analyzed(v) => tracing::info!(
                run = %name,
                passed = v.passed,
                minimum_dip = v.minimum_dip,
                max_dip_time_s = v.max_dip_time_s,
                period_s = ?stats.period_s,
                "trace analyzed"
            ),
            TraceStatus::Unanalyzable(reason) => {
                tracing::warn!(run = %name, %reason, "trace unanalyzable");
            }
        }

        Ok(Self {
            name,
            label: None,
            tolerances: *tolerances,
            raw,
            window,
            steady_times,
            steady_flows,
            stats,
            median_flow: median(&folded.flows),
            folded,
            raw_median,
            status,
        })
    }

    /// Build from separate time and flow series against `tolerances`.
    pub fn from_series(
        name: impl Into<String>,
        times: Vec<f64>,
        flows: Vec<f64>,
        tolerances: &Tolerances,
    ) -> Result<Self> {
        let raw = RawTrace::new(times, flows)?;
        Self::analyze(name, raw, tolerances)
    }

    #[must_use]
    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    pub fn name(&self) -> String {
        self.name.clone()
    }

    pub fn label(&self) -> Option<String> {
        self.label.clone()
    }

    pub fn expected_flow(&self) -> f64 {
        self.tolerances.expected_flow
    }

    pub fn tolerances(&self) -> Tolerances {
        self.tolerances
    }

    /// Folded (time, flow) series for overlay plots.
    pub fn graph_data(&self) -> (Vec<f64>, Vec<f64>) {
        (self.folded.times.clone(), self.folded.flows.clone())
    }

    pub fn folded(&self) -> FoldedSeries {
        self.folded.clone()
    }

    pub fn raw_data(&self) -> (Vec<f64>, Vec<f64>) {
        (self.raw.times().to_vec(), self.raw.flows().to_vec())
    }

    /// Points strictly inside the steady window, time rebased to its lower bound.
    pub fn steady_state_data(&self) -> (Vec<f64>, Vec<f64>) {
        (self.steady_times.clone(), self.steady_flows.clone())
    }

    pub fn window(&self) -> SteadyWindow {
        self.window
    }

    pub fn period_stats(&self) -> PeriodStats {
        self.stats.clone()
    }

    pub fn period(&self) -> Option<f64> {
        self.stats.period_s
    }

    pub fn sample_resolution(&self) -> Option<f64> {
        self.raw.sample_resolution()
    }

    /// Median of the folded flows.
    pub fn median_flow(&self) -> Option<f64> {
        self.median_flow
    }

    /// Median of every raw flow sample.
    pub fn raw_median(&self) -> Option<f64> {
        self.raw_median
    }

    pub fn minimum_dip(&self) -> Option<f64> {
        self.verdict().map(|v| v.minimum_dip)
    }

    pub fn allowable_dip(&self) -> f64 {
        self.tolerances.allowable_dip()
    }

    pub fn max_dip_time(&self) -> f64 {
        self.stats.max_dip_time_s
    }

    pub fn status(&self) -> TraceStatus {
        self.status.clone()
    }

    pub fn verdict(&self) -> Option<Verdict> {
        match &self.status {
            TraceStatus::Analyzed(v) => Some(*v),
            TraceStatus::Unanalyzable(_) => None,
        }
    }

    /// False for unanalyzable traces.
    pub fn passed(&self) -> bool {
        self.verdict().is_some_and(|v| v.passed)
    }

    pub fn dip_magnitude_ok(&self) -> Option<bool> {
        self.verdict().map(|v| v.dip_magnitude_ok)
    }

    pub fn dip_time_ok(&self) -> Option<bool> {
        self.verdict().map(|v| v.dip_time_ok)
    }
}
