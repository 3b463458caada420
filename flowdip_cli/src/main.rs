#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod analyze;
mod cli;
mod error_fmt;
mod report;

use clap::Parser;
use flowdip_config::{Config, Logging, load_config_file};
use std::path::Path;

use crate::cli::{Cli, Commands, DEFAULT_CONFIG, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{format_error_json, humanize};

/// Exit code for command-level errors; analysis outcomes use 0, 3 and 4.
const EXIT_ERROR: i32 = 1;

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    let code = match real_main(cli) {
        Ok(code) => code,
        Err(e) => {
            if JSON_MODE.get().copied().unwrap_or(false) {
                println!("{}", format_error_json(&e));
            } else {
                eprintln!("{}", humanize(&e));
            }
            tracing::error!(error = %e, "flowdip failed");
            EXIT_ERROR
        }
    };
    std::process::exit(code);
}

fn real_main(cli: Cli) -> eyre::Result<i32> {
    color_eyre::install()?;

    let cfg = load_config(&cli.config)?;
    let level = cli
        .log_level
        .as_deref()
        .or(cfg.logging.level.as_deref())
        .unwrap_or("info");
    init_tracing(cli.json, level, &cfg.logging)?;

    match cli.cmd {
        Commands::Analyze(args) => analyze::run(&cfg, &args, cli.json),
        Commands::CheckConfig => {
            let t = &cfg.tolerances;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "kind": "config",
                        "ok": true,
                        "expected_flow": t.expected_flow,
                        "threshold_time_s": t.threshold_time_s,
                        "allowable_dip_time_s": t.allowable_dip_time_s,
                        "runs": cfg.runs.len(),
                    })
                );
            } else {
                println!(
                    "Config OK: expected flow {:.3} mL/min, threshold time {:.1} s, allowable dip time {:.2} s, {} run(s)",
                    t.expected_flow,
                    t.threshold_time_s,
                    t.allowable_dip_time_s,
                    cfg.runs.len()
                );
            }
            Ok(0)
        }
    }
}

/// Load and validate `path`. A missing default config falls back to built-in defaults.
fn load_config(path: &Path) -> eyre::Result<Config> {
    if path.exists() {
        return load_config_file(path);
    }
    if path == Path::new(DEFAULT_CONFIG) {
        return Ok(Config::default());
    }
    eyre::bail!("config file not found: {}", path.display())
}

fn init_tracing(json: bool, level: &str, logging: &Logging) -> eyre::Result<()> {
    use tracing_appender::rolling;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

    // RUST_LOG wins over --log-level and [logging].level for the console.
    let console_filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level).map_err(|e| eyre::eyre!("invalid log level {level:?}: {e}"))?,
    };

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    if json {
        layers.push(
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_filter(console_filter)
                .boxed(),
        );
    } else {
        layers.push(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(console_filter)
                .boxed(),
        );
    }

    if let Some(file) = logging.file.as_deref() {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .ok_or_else(|| eyre::eyre!("logging.file {file:?} has no file name"))?;
        let appender = match logging.rotation.as_deref() {
            Some("daily") => rolling::daily(dir, name),
            Some("hourly") => rolling::hourly(dir, name),
            _ => rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        let file_level = logging.level.as_deref().unwrap_or("info");
        let file_filter = EnvFilter::try_new(file_level)
            .map_err(|e| eyre::eyre!("invalid logging.level {file_level:?}: {e}"))?;
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(file_filter)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| eyre::eyre!("init tracing: {e}"))?;
    Ok(())
}
