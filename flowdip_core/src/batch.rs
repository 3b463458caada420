//! Concurrent analysis of many independent runs.
//!
//! Jobs are fed to scoped worker threads over a crossbeam channel; results are
//! collected back into input order. Tolerances are shared by reference and
//! never mutated, and each job owns its samples, so a failing run only fills
//! its own slot with an error.
use crossbeam_channel as xch;

use crate::config::Tolerances;
use crate::error::Result;
use crate::samples::RawTrace;
use crate::trace::Trace;

/// One run as delivered by the ingestion side.
#[derive(Debug, Clone, PartialEq)]
pub struct RunInput {
    pub run: String,
    pub label: Option<String>,
    pub times: Vec<f64>,
    pub flows: Vec<f64>,
    pub expected_flow: f64,
}

/// Worker count for `requested` (0 = available parallelism), capped by `jobs`.
pub fn effective_workers(requested: usize, jobs: usize) -> usize {
    let wanted = if requested == 0 {
        std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
    } else {
        requested
    };
    wanted.min(jobs).max(1)
}

/// Analyze one run against `tolerances` with its own expected flow.
pub fn analyze_run(input: RunInput, tolerances: &Tolerances) -> Result<Trace> {
    let tolerances = tolerances.with_expected_flow(input.expected_flow);
    let raw = RawTrace::new(input.times, input.flows)?;
    Ok(Trace::analyze(input.run, raw, &tolerances)?.with_label(input.label))
}

/// Analyze `inputs` on up to `workers` threads. Output order matches input order.
pub fn analyze_batch(inputs: Vec<RunInput>, tolerances: &Tolerances, workers: usize) -> Vec<Result<Trace>> {
    let jobs = inputs.len();
    if jobs == 0 {
        return Vec::new();
    }
    let workers = effective_workers(workers, jobs);
    tracing::debug!(jobs, workers, "batch analysis start");

    let (job_tx, job_rx) = xch::unbounded::<(usize, RunInput)>();
    let (out_tx, out_rx) = xch::unbounded::<(usize, Result<Trace>)>();
    for job in inputs.into_iter().enumerate() {
        // Receiver is alive for the whole function; send cannot fail.
        let _ = job_tx.send(job);
    }
    drop(job_tx);

    std::thread::scope(|s| {
        for worker in 0..workers {
            let job_rx = job_rx.clone();
            let out_tx = out_tx.clone();
            s.spawn(move || {
                for (index, input) in job_rx.iter() {
                    let run = input.run.clone();
                    let result = analyze_run(input, tolerances);
                    if let Err(e) = &result {
                        tracing::warn!(worker, index, %run, error = %e, "run failed");
                    }
                    if out_tx.send((index, result)).is_err() {
                        break;
                    }
                }
                tracing::trace!(worker, "batch worker exiting");
            });
        }
    });
    drop(out_tx);

    let mut slots: Vec<Option<Result<Trace>>> = (0..jobs).map(|_| None).collect();
    for (index, result) in out_rx.iter() {
        slots[index] = Some(result);
    }
    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| slot.unwrap_or_else(|| Err(eyre::eyre!("batch job {index} produced no result"))))
        .collect()
}
