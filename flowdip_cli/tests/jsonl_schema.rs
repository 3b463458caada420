use assert_cmd::prelude::*;
use rstest::rstest;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join("flowdip.toml");
    fs::write(&path, "[tolerances]\nthreshold_time_s = 5.0\n").unwrap();
    path
}

fn write_trace(dir: &Path, name: &str, depth: f64) -> PathBuf {
    let path = dir.join(name);
    let mut f = fs::File::create(&path).unwrap();
    writeln!(f, "Series {name}").unwrap();
    for i in 0..300 {
        let flow = if (60..65).contains(&i) || (150..155).contains(&i) { depth } else { 9.0 };
        writeln!(f, "{:.1};{flow}", f64::from(i) * 0.1).unwrap();
    }
    path
}

fn json_lines(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8(stdout.to_vec())
        .unwrap()
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("every stdout line is JSON"))
        .collect()
}

/// Validate the JSONL schema for a mixed pass/fail batch.
#[rstest]
fn jsonl_trace_and_run_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_config(dir.path());
    let pass = write_trace(dir.path(), "a.txt", 7.0);
    let fail = write_trace(dir.path(), "b.txt", 3.0);

    let out = Command::cargo_bin("flowdip")
        .unwrap()
        .arg("--json")
        .arg("--log-level")
        .arg("error")
        .arg("--config")
        .arg(&cfg)
        .arg("analyze")
        .arg(&pass)
        .arg(&fail)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));

    let lines = json_lines(&out.stdout);
    assert_eq!(lines.len(), 3, "two traces and one run");

    let traces: Vec<&Value> = lines.iter().filter(|v| v["kind"] == "trace").collect();
    assert_eq!(traces.len(), 2);
    for t in &traces {
        for key in [
            "run",
            "label",
            "file",
            "expected_flow",
            "status",
            "minimum_dip",
            "allowable_dip",
            "max_dip_time_s",
            "allowable_dip_time_s",
            "dip_magnitude_ok",
            "dip_time_ok",
            "period_s",
            "median_flow",
            "sample_resolution_s",
            "window",
        ] {
            assert!(t.get(key).is_some(), "missing key {key}");
        }
    }
    assert_eq!(traces[0]["status"], "passed");
    assert_eq!(traces[0]["label"], "Series a.txt");
    assert_eq!(traces[1]["status"], "failed");
    assert_eq!(traces[1]["dip_magnitude_ok"], false);
    assert_eq!(traces[1]["dip_time_ok"], true);
    assert_eq!(traces[1]["minimum_dip"].as_f64(), Some(3.0));

    let run = lines.iter().find(|v| v["kind"] == "run").unwrap();
    assert_eq!(run["run"], "1");
    assert_eq!(run["traces"], 2);
    assert_eq!(run["passed_traces"], 1);
    assert_eq!(run["passed"], false);
    assert_eq!(run["median_within_margin"], true);
}

#[rstest]
fn jsonl_error_on_bad_tolerances() {
    let dir = tempdir().unwrap();
    let cfg = write_config(dir.path());
    let pass = write_trace(dir.path(), "a.txt", 7.0);

    let out = Command::cargo_bin("flowdip")
        .unwrap()
        .arg("--json")
        .arg("--log-level")
        .arg("error")
        .arg("--config")
        .arg(&cfg)
        .arg("analyze")
        .arg("--expected-flow=-1")
        .arg(&pass)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));

    let lines = json_lines(&out.stdout);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["kind"], "error");
    assert_eq!(lines[0]["reason"], "Config");
    assert!(lines[0]["message"].as_str().unwrap().contains("expected_flow"));
}
