#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Flow-dip analysis core (I/O-free).
//!
//! Decides whether a flowmeter trace shows unacceptable periodic dips. The
//! pipeline runs once per trace, at construction:
//!
//! raw trace → steady window + period stats → windowed series → folded series → verdict
//!
//! ## Architecture
//!
//! - **Classification**: in-range band around the expected flow (`range` module)
//! - **Bounds**: steady-state window search with plateau backtracking (`bounds`)
//! - **Period**: dip onset tracking, dip duration, spike collection (`period`)
//! - **Folding**: spike exclusion and phase folding (`fold`)
//! - **Verdict**: dip magnitude and duration against tolerances (`verdict`)
//! - **Trace**: orchestration and read-only accessors (`trace`)
//! - **Batch**: independent traces analyzed on worker threads (`batch`)
//!
//! Degenerate traces (too short, empty window, everything near a spike) are not
//! errors: they produce `TraceStatus::Unanalyzable` with the reason.

pub mod batch;
pub mod bounds;
pub mod config;
pub mod conversions;
pub mod error;
pub mod fold;
pub mod period;
pub mod range;
pub mod samples;
pub mod trace;
pub mod util;
pub mod verdict;

pub use batch::{RunInput, analyze_batch};
pub use bounds::{BoundaryLocator, SteadyWindow};
pub use config::Tolerances;
pub use error::{AnalysisError, Degenerate, Result};
pub use fold::{FoldedSeries, fold};
pub use period::{PeriodEstimator, PeriodStats};
pub use range::{RangeClassifier, in_range};
pub use samples::RawTrace;
pub use trace::{Trace, TraceStatus};
pub use verdict::{Verdict, evaluate};
