//! `analyze` command: collect trace files, run the batch, export derived series.

use eyre::WrapErr;
use flowdip_config::{Config, load_trace_file};
use flowdip_core::{RunInput, Tolerances, Trace, analyze_batch};
use std::path::{Path, PathBuf};

use crate::cli::AnalyzeArgs;
use crate::report;

/// Run name used for files given on the command line without `--run`.
pub const DEFAULT_RUN: &str = "1";

/// One trace file queued for analysis.
#[derive(Debug, Clone)]
pub struct Job {
    pub file: PathBuf,
    pub input: RunInput,
}

/// Config tolerances with command-line overrides applied, validated.
pub fn effective_tolerances(cfg: &Config, args: &AnalyzeArgs) -> eyre::Result<Tolerances> {
    let mut tol = Tolerances::from(&cfg.tolerances);
    if let Some(flow) = args.expected_flow {
        tol = tol.with_expected_flow(flow);
    }
    if let Some(secs) = args.threshold_time {
        tol.threshold_time_s = secs;
    }
    tol.validate()?;
    Ok(tol)
}

/// Files named on the command line; directories are scanned (sorted, non-recursive)
/// for files carrying `extension`.
pub fn expand_paths(paths: &[PathBuf], extension: &str) -> eyre::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            let entries =
                std::fs::read_dir(path).wrap_err_with(|| format!("scan trace directory {path:?}"))?;
            for entry in entries {
                let p = entry.wrap_err_with(|| format!("scan trace directory {path:?}"))?.path();
                if p.is_file() && p.extension().is_some_and(|e| e == extension) {
                    found.push(p);
                }
            }
            found.sort();
            out.extend(found);
        } else {
            out.push(path.clone());
        }
    }
    Ok(out)
}

/// Load every trace file into a batch job.
///
/// Command-line paths form a single run (named by `--run`); otherwise the
/// `[[runs]]` table of the config is used. Expected flow precedence is
/// `--expected-flow`, then the run's own value, then `tolerances.expected_flow`.
pub fn collect_jobs(cfg: &Config, args: &AnalyzeArgs) -> eyre::Result<Vec<Job>> {
    let default_flow = args.expected_flow.unwrap_or(cfg.tolerances.expected_flow);

    let mut planned: Vec<(String, f64, PathBuf)> = Vec::new();
    if args.paths.is_empty() {
        for run in &cfg.runs {
            let flow = args.expected_flow.or(run.expected_flow).unwrap_or(default_flow);
            for file in expand_paths(&run.files, &cfg.ingest.extension)? {
                planned.push((run.name.clone(), flow, file));
            }
        }
    } else {
        let name = args.run.clone().unwrap_or_else(|| DEFAULT_RUN.to_string());
        for file in expand_paths(&args.paths, &cfg.ingest.extension)? {
            planned.push((name.clone(), default_flow, file));
        }
    }

    if planned.is_empty() {
        eyre::bail!("no trace files to analyze");
    }

    planned
        .into_iter()
        .enumerate()
        .map(|(i, (run, expected_flow, file))| {
            let tf = load_trace_file(&file, cfg.ingest.delimiter)?;
            let label = tf.label.unwrap_or_else(|| format!("Series {}", i + 1));
            tracing::debug!(run = %run, file = ?file, samples = tf.times.len(), "loaded trace");
            Ok(Job {
                file,
                input: RunInput {
                    run,
                    label: Some(label),
                    times: tf.times,
                    flows: tf.flows,
                    expected_flow,
                },
            })
        })
        .collect()
}

fn file_stem_safe(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

fn write_series(path: &Path, times: &[f64], flows: &[f64]) -> eyre::Result<()> {
    let mut w = csv::Writer::from_path(path).wrap_err_with(|| format!("create {path:?}"))?;
    w.write_record(["time_s", "flow_ml_min"])?;
    for (t, f) in times.iter().zip(flows) {
        w.write_record([t.to_string(), f.to_string()])?;
    }
    w.flush().wrap_err_with(|| format!("write {path:?}"))?;
    Ok(())
}

/// Write `<run>_<index>_folded.csv` and `<run>_<index>_steady.csv` into `dir`.
pub fn export_series(dir: &Path, index: usize, trace: &Trace) -> eyre::Result<()> {
    let stem = format!("{}_{index}", file_stem_safe(&trace.name()));
    let folded = trace.folded();
    write_series(&dir.join(format!("{stem}_folded.csv")), &folded.times, &folded.flows)?;
    let (times, flows) = trace.steady_state_data();
    write_series(&dir.join(format!("{stem}_steady.csv")), &times, &flows)?;
    Ok(())
}

/// Run the `analyze` command and return the process exit code.
pub fn run(cfg: &Config, args: &AnalyzeArgs, json: bool) -> eyre::Result<i32> {
    let tolerances = effective_tolerances(cfg, args)?;
    let jobs = collect_jobs(cfg, args)?;
    let workers = args.workers.unwrap_or(cfg.batch.workers);

    let (files, inputs): (Vec<PathBuf>, Vec<RunInput>) =
        jobs.into_iter().map(|j| (j.file, j.input)).unzip();
    tracing::info!(traces = inputs.len(), workers, "analyzing traces");
    let results = analyze_batch(inputs, &tolerances, workers);

    if let Some(dir) = &args.export_dir {
        std::fs::create_dir_all(dir).wrap_err_with(|| format!("create export dir {dir:?}"))?;
        for (i, trace) in results.iter().enumerate() {
            if let Ok(trace) = trace {
                export_series(dir, i + 1, trace)?;
            }
        }
        tracing::info!(dir = ?dir, "exported derived series");
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    report::write_report(&mut out, &files, &results, &tolerances, json)?;
    Ok(report::exit_code(&results))
}
