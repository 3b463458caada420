//! Human-readable error descriptions and structured JSON error formatting.

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use flowdip_core::AnalysisError;

    // Typed matches first
    if let Some(ae) = err.downcast_ref::<AnalysisError>() {
        return match ae {
            AnalysisError::Config(msg) => format!(
                "What happened: Invalid tolerances ({msg}).\nLikely causes: A non-positive expected flow or threshold time from the config or command line.\nHow to fix: Edit [tolerances] in the config or the matching --flag, then rerun."
            ),
            AnalysisError::LengthMismatch { times, flows } => format!(
                "What happened: Time and flow columns differ in length ({times} vs {flows}).\nLikely causes: A truncated or hand-edited trace file.\nHow to fix: Re-export the trace from the flowmeter."
            ),
            AnalysisError::NonFinite { index } => format!(
                "What happened: Sample {index} is not a finite number.\nLikely causes: NaN or inf written by the flowmeter export.\nHow to fix: Remove the bad line or re-export the trace."
            ),
            AnalysisError::NonMonotonicTime { index } => format!(
                "What happened: Sample times stop increasing at sample {index}.\nLikely causes: Two exports concatenated into one file, or a clock reset during the run.\nHow to fix: Split the file so each run has increasing times."
            ),
        };
    }

    // String-based heuristics for errors coming from config or ingestion
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    let config_keys = ["tolerances.", "ingest.", "batch.", "logging.", "runs["];
    if config_keys.iter().any(|k| lower.contains(k))
        || lower.contains("parse config")
        || lower.contains("read config")
    {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file and try again, or validate it with `flowdip check-config`."
        );
    }

    if lower.contains("config file not found") {
        return format!(
            "What happened: {msg}.\nLikely causes: Wrong --config path.\nHow to fix: Point --config at an existing TOML file or omit it to use defaults."
        );
    }

    if lower.contains("no trace files") {
        return format!(
            "What happened: {msg}.\nLikely causes: No paths were passed and the config has no [[runs]].\nHow to fix: Run `flowdip analyze <FILE>...` or add [[runs]] to the config."
        );
    }

    if lower.contains("trace file") || lower.contains("trace directory") {
        return format!(
            "What happened: A trace file could not be read ({msg}).\nLikely causes: Wrong path, wrong delimiter, or a non-numeric line.\nHow to fix: Check the path and [ingest].delimiter in the config."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use flowdip_core::AnalysisError;
    use serde_json::json;

    let reason = match err.downcast_ref::<AnalysisError>() {
        Some(AnalysisError::Config(_)) => "Config",
        Some(AnalysisError::LengthMismatch { .. }) => "LengthMismatch",
        Some(AnalysisError::NonFinite { .. }) => "NonFinite",
        Some(AnalysisError::NonMonotonicTime { .. }) => "NonMonotonicTime",
        None => "Error",
    };
    json!({ "kind": "error", "reason": reason, "message": humanize(err) }).to_string()
}
