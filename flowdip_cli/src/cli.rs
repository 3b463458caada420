//! CLI argument definitions and shared statics.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

/// Config path used when `--config` is not given; a missing default file means built-in defaults.
pub const DEFAULT_CONFIG: &str = "etc/flowdip.toml";

#[derive(Parser, Debug)]
#[command(
    name = "flowdip",
    version,
    about = "Check flowmeter traces for unacceptable periodic flow dips"
)]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Emit JSON lines (results on stdout, logs on stderr) instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides [logging].level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct AnalyzeArgs {
    /// Trace files or directories; when empty, the [[runs]] table of the config is used
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Run name shared by every file given on the command line (default: "1")
    #[arg(long, value_name = "NAME")]
    pub run: Option<String>,

    /// Expected flow in mL/min (takes precedence over config)
    #[arg(long, value_name = "ML_MIN")]
    pub expected_flow: Option<f64>,

    /// Seconds of in-range flow that define a steady plateau (takes precedence over config)
    #[arg(long, value_name = "SECONDS")]
    pub threshold_time: Option<f64>,

    /// Worker threads; 0 uses every available CPU (takes precedence over config)
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Write folded and steady-state series as CSV into this directory
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze trace files and report pass/fail per trace and per run
    Analyze(AnalyzeArgs),
    /// Validate the config file and print the effective tolerances
    CheckConfig,
}
