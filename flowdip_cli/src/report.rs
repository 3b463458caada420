//! Console and JSONL reporting of analyzed traces and run groups.

use flowdip_core::util::median;
use flowdip_core::{Tolerances, Trace, TraceStatus};
use serde_json::{Value, json};
use std::io::Write;
use std::path::PathBuf;

/// Aggregate over the traces sharing one run name.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub name: String,
    pub traces: usize,
    pub passed_traces: usize,
    pub unanalyzable: usize,
    /// Sum of folded median flows over traces that have one.
    pub median_sum: f64,
    /// Sum of expected flows over the same traces.
    pub expected_sum: f64,
    pub median_within_margin: bool,
    pub sample_resolution_s: Option<f64>,
    pub passed: bool,
}

/// Group traces by run name in first-seen order.
pub fn summarize<'a, I>(traces: I, tolerances: &Tolerances) -> Vec<RunSummary>
where
    I: IntoIterator<Item = &'a Trace>,
{
    let mut groups: Vec<(String, Vec<&Trace>)> = Vec::new();
    for trace in traces {
        let name = trace.name();
        match groups.iter_mut().find(|(n, _)| *n == name) {
            Some((_, members)) => members.push(trace),
            None => groups.push((name, vec![trace])),
        }
    }

    groups
        .into_iter()
        .map(|(name, members)| {
            let mut median_sum = 0.0;
            let mut expected_sum = 0.0;
            for t in &members {
                if let Some(m) = t.median_flow() {
                    median_sum += m;
                    expected_sum += t.expected_flow();
                }
            }
            let resolutions: Vec<f64> = members.iter().filter_map(|t| t.sample_resolution()).collect();
            let passed_traces = members.iter().filter(|t| t.passed()).count();
            let unanalyzable = members.iter().filter(|t| t.verdict().is_none()).count();
            RunSummary {
                traces: members.len(),
                passed_traces,
                unanalyzable,
                median_sum,
                expected_sum,
                median_within_margin: expected_sum > 0.0
                    && tolerances.within_margin(expected_sum, median_sum),
                sample_resolution_s: median(&resolutions),
                passed: passed_traces == members.len(),
                name,
            }
        })
        .collect()
}

/// Exit code for a finished batch: 1 on hard errors, 3 if any trace failed,
/// 4 if any trace was unanalyzable, 0 otherwise.
pub fn exit_code(results: &[flowdip_core::Result<Trace>]) -> i32 {
    if results.iter().any(Result::is_err) {
        return 1;
    }
    let traces = || results.iter().filter_map(|r| r.as_ref().ok());
    if traces().any(|t| t.verdict().is_some_and(|v| !v.passed)) {
        3
    } else if traces().any(|t| t.verdict().is_none()) {
        4
    } else {
        0
    }
}

fn pass_fail(ok: bool) -> &'static str {
    if ok { "passed" } else { "failed" }
}

fn display_label(trace: &Trace) -> String {
    trace.label().unwrap_or_else(|| "unlabelled".to_string())
}

pub fn trace_json(file: &std::path::Path, trace: &Trace) -> Value {
    let (status, reason) = match trace.status() {
        TraceStatus::Analyzed(v) => (pass_fail(v.passed), None),
        TraceStatus::Unanalyzable(d) => ("unanalyzable", Some(d.to_string())),
    };
    let w = trace.window();
    json!({
        "kind": "trace",
        "run": trace.name(),
        "label": trace.label(),
        "file": file.display().to_string(),
        "expected_flow": trace.expected_flow(),
        "status": status,
        "reason": reason,
        "minimum_dip": trace.minimum_dip(),
        "allowable_dip": trace.allowable_dip(),
        "max_dip_time_s": trace.max_dip_time(),
        "allowable_dip_time_s": trace.tolerances().allowable_dip_time_s,
        "dip_magnitude_ok": trace.dip_magnitude_ok(),
        "dip_time_ok": trace.dip_time_ok(),
        "period_s": trace.period(),
        "median_flow": trace.median_flow(),
        "raw_median_flow": trace.raw_median(),
        "sample_resolution_s": trace.sample_resolution(),
        "window": { "lower_s": w.lower_bound_s, "upper_s": w.upper_bound_s },
    })
}

pub fn run_json(summary: &RunSummary) -> Value {
    json!({
        "kind": "run",
        "run": summary.name,
        "traces": summary.traces,
        "passed_traces": summary.passed_traces,
        "unanalyzable": summary.unanalyzable,
        "median_flow_sum": summary.median_sum,
        "expected_flow_sum": summary.expected_sum,
        "median_within_margin": summary.median_within_margin,
        "sample_resolution_s": summary.sample_resolution_s,
        "passed": summary.passed,
    })
}

fn write_trace_text<W: Write>(out: &mut W, file: &std::path::Path, trace: &Trace) -> std::io::Result<()> {
    write!(
        out,
        "Run {}, {} ({}) at {:.3} mL/min: ",
        trace.name(),
        display_label(trace),
        file.display(),
        trace.expected_flow()
    )?;
    match trace.status() {
        TraceStatus::Unanalyzable(reason) => writeln!(out, "UNANALYZABLE ({reason})"),
        TraceStatus::Analyzed(v) => {
            writeln!(out, "{}", if v.passed { "PASSED" } else { "FAILED" })?;
            writeln!(
                out,
                "  Dip magnitude {}: minimum dip {:.3} mL/min, allowable dip {:.3} mL/min",
                pass_fail(v.dip_magnitude_ok),
                v.minimum_dip,
                v.allowable_dip
            )?;
            writeln!(
                out,
                "  Dip time {}: maximum dip time {:.3} s, allowable dip time {:.3} s",
                pass_fail(v.dip_time_ok),
                v.max_dip_time_s,
                v.allowable_dip_time_s
            )
        }
    }
}

fn write_run_text<W: Write>(out: &mut W, s: &RunSummary, margin_frac: f64) -> std::io::Result<()> {
    writeln!(
        out,
        "Run {}: {} ({}/{} traces passed)",
        s.name,
        if s.passed { "PASSED" } else { "FAILED" },
        s.passed_traces,
        s.traces
    )?;
    if s.expected_sum > 0.0 {
        writeln!(
            out,
            "  Median flow {:.3} mL/min vs expected {:.3} mL/min: {} {:.1}% margin",
            s.median_sum,
            s.expected_sum,
            if s.median_within_margin { "within" } else { "outside" },
            margin_frac * 100.0
        )?;
    } else {
        writeln!(out, "  Median flow unavailable")?;
    }
    match s.sample_resolution_s {
        Some(r) => writeln!(out, "  Median sample resolution: {r:.3} s"),
        None => writeln!(out, "  Median sample resolution unavailable"),
    }
}

/// Print every trace (or its error) followed by one summary per run.
pub fn write_report<W: Write>(
    out: &mut W,
    files: &[PathBuf],
    results: &[flowdip_core::Result<Trace>],
    tolerances: &Tolerances,
    json: bool,
) -> eyre::Result<()> {
    for (file, result) in files.iter().zip(results) {
        match (result, json) {
            (Ok(trace), true) => writeln!(out, "{}", trace_json(file, trace))?,
            (Ok(trace), false) => write_trace_text(out, file, trace)?,
            (Err(e), true) => writeln!(
                out,
                "{}",
                json!({ "kind": "error", "file": file.display().to_string(), "message": e.to_string() })
            )?,
            (Err(e), false) => writeln!(out, "{}: ERROR {e}", file.display())?,
        }
    }

    let summaries = summarize(results.iter().filter_map(|r| r.as_ref().ok()), tolerances);
    for s in &summaries {
        if json {
            writeln!(out, "{}", run_json(s))?;
        } else {
            write_run_text(out, s, tolerances.margin_frac)?;
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tolerances() -> Tolerances {
        Tolerances {
            threshold_time_s: 5.0,
            ..Tolerances::default()
        }
    }

    // 30 s at 10 Hz with two 0.5 s dips; the first one opens the window.
    fn trace(run: &str, depth: f64) -> Trace {
        let times: Vec<f64> = (0..300).map(|i| f64::from(i) * 0.1).collect();
        let flows: Vec<f64> = (0..300)
            .map(|i| if (60..65).contains(&i) || (150..155).contains(&i) { depth } else { 9.0 })
            .collect();
        Trace::from_series(run, times, flows, &tolerances())
            .unwrap()
            .with_label(Some(format!("Series {run}")))
    }

    fn flat_zero(run: &str) -> Trace {
        let times: Vec<f64> = (0..50).map(|i| f64::from(i) * 0.1).collect();
        Trace::from_series(run, times, vec![0.0; 50], &tolerances()).unwrap()
    }

    #[test]
    fn runs_group_in_first_seen_order() {
        let traces = [trace("1", 7.0), trace("2", 3.0), trace("1", 7.0)];
        let s = summarize(traces.iter(), &tolerances());
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].name, "1");
        assert_eq!(s[0].traces, 2);
        assert!(s[0].passed);
        assert!((s[0].expected_sum - 18.0).abs() < 1e-12);
        assert!(s[0].median_within_margin);
        assert_eq!(s[0].sample_resolution_s.map(|r| (r * 1000.0).round()), Some(100.0));
        assert!(!s[1].passed);
    }

    #[test]
    fn exit_code_prefers_failures_over_unanalyzable() {
        let ok = vec![Ok(trace("1", 7.0))];
        assert_eq!(exit_code(&ok), 0);
        let unanalyzable = vec![Ok(trace("1", 7.0)), Ok(flat_zero("2"))];
        assert_eq!(exit_code(&unanalyzable), 4);
        let failed = vec![Ok(flat_zero("2")), Ok(trace("1", 3.0))];
        assert_eq!(exit_code(&failed), 3);
        let errored = vec![Ok(trace("1", 7.0)), Err(eyre::eyre!("boom"))];
        assert_eq!(exit_code(&errored), 1);
    }

    #[test]
    fn text_report_names_both_checks() {
        let files = vec![PathBuf::from("a.txt")];
        let results = vec![Ok(trace("1", 3.0))];
        let mut buf = Vec::new();
        write_report(&mut buf, &files, &results, &tolerances(), false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Run 1, Series 1 (a.txt) at 9.000 mL/min: FAILED"));
        assert!(text.contains("Dip magnitude failed: minimum dip 3.000 mL/min, allowable dip 5.000 mL/min"));
        assert!(text.contains("Dip time passed"));
        assert!(text.contains("Run 1: FAILED (0/1 traces passed)"));
    }

    #[test]
    fn unanalyzable_trace_reports_reason_in_json() {
        let js = trace_json(std::path::Path::new("z.txt"), &flat_zero("3"));
        assert_eq!(js["kind"], "trace");
        assert_eq!(js["status"], "unanalyzable");
        assert!(js["reason"].as_str().unwrap().contains("empty steady-state window"));
        assert!(js["minimum_dip"].is_null());
    }
}
