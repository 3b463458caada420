use thiserror::Error;

/// Hard failures: the inputs break the analysis contract and no `Trace` is built.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("time and flow series differ in length ({times} times, {flows} flows)")]
    LengthMismatch { times: usize, flows: usize },
    #[error("non-finite sample at index {index}")]
    NonFinite { index: usize },
    #[error("sample times must be strictly increasing (index {index})")]
    NonMonotonicTime { index: usize },
}

/// Soft failures: the trace is well formed but has no usable steady-state data.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Degenerate {
    #[error("trace has {len} samples, at least 2 are required")]
    TooShort { len: usize },
    #[error("empty steady-state window ({lower_bound_s:.3}s .. {upper_bound_s:.3}s)")]
    EmptyWindow {
        lower_bound_s: f64,
        upper_bound_s: f64,
    },
    #[error("every steady-state sample lies near a flow spike")]
    AllSamplesIgnored,
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
