#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and raw-trace file parsing for the flow-dip analyzer.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The trace loader reads flowmeter exports (`time;flow` lines with an
//!   optional single-field label line) into owned sample vectors.
use serde::Deserialize;
use serde::de::Deserializer;
use std::path::{Path, PathBuf};

/// Pass/fail tolerances as written in the `[tolerances]` table.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct TolerancesCfg {
    /// Expected flow in mL/min; used when a run does not give its own.
    pub expected_flow: f64,
    /// Half-width of the in-range band as a fraction of expected flow.
    pub range_fraction: f64,
    /// Seconds of continuous in-range flow that make a plateau "steady".
    #[serde(alias = "threshold_time")]
    pub threshold_time_s: f64,
    /// Longest acceptable dip, in seconds.
    #[serde(alias = "allowable_dip_time")]
    pub allowable_dip_time_s: f64,
    /// Largest acceptable absolute dip below expected flow (mL/min).
    pub max_dip_abs: f64,
    /// Lowest acceptable flow as a fraction of expected flow.
    pub max_dip_frac: f64,
    /// Median flow must lie within this fraction of expected flow (reporting only).
    pub margin_frac: f64,
}

impl Default for TolerancesCfg {
    fn default() -> Self {
        Self {
            expected_flow: 9.0,
            range_fraction: 0.2,
            threshold_time_s: 10.0,
            allowable_dip_time_s: 0.8,
            max_dip_abs: 4.0,
            max_dip_frac: 0.6,
            margin_frac: 0.025,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IngestCfg {
    /// Field separator of the flowmeter export. Must be a single ASCII character.
    #[serde(deserialize_with = "de_delimiter")]
    pub delimiter: u8,
    /// File extension picked up when a directory is scanned.
    pub extension: String,
}

impl Default for IngestCfg {
    fn default() -> Self {
        Self {
            delimiter: b';',
            extension: "txt".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(default)]
pub struct BatchCfg {
    /// Worker threads for batch analysis; 0 = available parallelism.
    pub workers: usize,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

/// One named run: a group of trace files analyzed against the same expected flow.
#[derive(Debug, Deserialize, Clone)]
pub struct RunCfg {
    pub name: String,
    /// Overrides `tolerances.expected_flow` for every file of this run.
    #[serde(default)]
    pub expected_flow: Option<f64>,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub tolerances: TolerancesCfg,
    #[serde(default)]
    pub ingest: IngestCfg,
    #[serde(default)]
    pub batch: BatchCfg,
    #[serde(default)]
    pub logging: Logging,
    /// Optional run table; files given on the command line take precedence.
    #[serde(default)]
    pub runs: Vec<RunCfg>,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse, and validate a config file. Relative run file paths are
/// resolved against the directory holding the config.
pub fn load_config_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let mut cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
    cfg.validate()?;
    if let Some(base) = path.parent() {
        for run in &mut cfg.runs {
            for file in &mut run.files {
                if file.is_relative() {
                    *file = base.join(&*file);
                }
            }
        }
    }
    Ok(cfg)
}

fn de_delimiter<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    match s.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(serde::de::Error::custom(format!(
            "delimiter must be a single ASCII character, got {s:?}"
        ))),
    }
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        let t = &self.tolerances;

        // Tolerances
        if !(t.expected_flow.is_finite() && t.expected_flow > 0.0) {
            eyre::bail!("tolerances.expected_flow must be > 0");
        }
        if !(t.range_fraction > 0.0 && t.range_fraction < 1.0) {
            eyre::bail!("tolerances.range_fraction must be in (0.0, 1.0)");
        }
        if !(t.threshold_time_s.is_finite() && t.threshold_time_s > 0.0) {
            eyre::bail!("tolerances.threshold_time_s must be > 0");
        }
        if !(t.allowable_dip_time_s.is_finite() && t.allowable_dip_time_s > 0.0) {
            eyre::bail!("tolerances.allowable_dip_time_s must be > 0");
        }
        if !(t.max_dip_abs.is_finite() && t.max_dip_abs >= 0.0) {
            eyre::bail!("tolerances.max_dip_abs must be >= 0");
        }
        if !(t.max_dip_frac > 0.0 && t.max_dip_frac <= 1.0) {
            eyre::bail!("tolerances.max_dip_frac must be in (0.0, 1.0]");
        }
        if !(t.margin_frac >= 0.0 && t.margin_frac < 1.0) {
            eyre::bail!("tolerances.margin_frac must be in [0.0, 1.0)");
        }

        // Ingest
        if self.ingest.extension.is_empty() {
            eyre::bail!("ingest.extension must not be empty");
        }
        if matches!(self.ingest.delimiter, b'\n' | b'\r' | b'.') {
            eyre::bail!("ingest.delimiter cannot be a newline or decimal point");
        }

        // Batch
        if self.batch.workers > 1024 {
            eyre::bail!("batch.workers is unreasonably large (>1024)");
        }

        // Logging
        if let Some(rotation) = self.logging.rotation.as_deref()
            && !matches!(rotation, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never, daily, hourly");
        }

        // Runs
        for (i, run) in self.runs.iter().enumerate() {
            if run.name.trim().is_empty() {
                eyre::bail!("runs[{i}].name must not be empty");
            }
            if run.files.is_empty() {
                eyre::bail!("runs[{i}] ({}) lists no files", run.name);
            }
            if let Some(flow) = run.expected_flow
                && !(flow.is_finite() && flow > 0.0)
            {
                eyre::bail!("runs[{i}].expected_flow must be > 0");
            }
        }

        Ok(())
    }
}

/// Samples and optional label read from one flowmeter export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceFile {
    pub label: Option<String>,
    pub times: Vec<f64>,
    pub flows: Vec<f64>,
}

/// Parse a flowmeter export.
///
/// Format:
/// ```text
/// 1mL Syringe
/// 0.000;9.02
/// 0.105;8.97
/// ```
/// The first single-field line is taken as the label; any later single-field
/// line is skipped. Extra fields after the flow value are ignored.
pub fn parse_trace<R: std::io::Read>(reader: R, delimiter: u8) -> eyre::Result<TraceFile> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(delimiter)
        .from_reader(reader);

    let mut out = TraceFile::default();
    for rec in rdr.records() {
        let rec = rec.map_err(|e| eyre::eyre!("read trace record: {}", e))?;
        let line = rec.position().map_or(0, csv::Position::line);
        match rec.len() {
            0 => {}
            1 => {
                let field = rec.get(0).unwrap_or_default();
                if out.label.is_none() && !field.is_empty() {
                    out.label = Some(field.to_string());
                }
            }
            _ => {
                let time = parse_field(rec.get(0), "time", line)?;
                let flow = parse_field(rec.get(1), "flow", line)?;
                out.times.push(time);
                out.flows.push(flow);
            }
        }
    }
    Ok(out)
}

fn parse_field(field: Option<&str>, what: &str, line: u64) -> eyre::Result<f64> {
    let raw = field.unwrap_or_default();
    raw.parse::<f64>()
        .map_err(|e| eyre::eyre!("invalid {} value {:?} on line {}: {}", what, raw, line, e))
}

pub fn load_trace_file(path: &Path, delimiter: u8) -> eyre::Result<TraceFile> {
    let file = std::fs::File::open(path)
        .map_err(|e| eyre::eyre!("open trace file {:?}: {}", path, e))?;
    parse_trace(std::io::BufReader::new(file), delimiter)
        .map_err(|e| eyre::eyre!("trace file {:?}: {}", path, e))
}
