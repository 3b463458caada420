use flowdip_config::{load_config_file, load_toml};
use rstest::rstest;
use std::fs;
use tempfile::tempdir;

#[rstest]
#[case("expected_flow = 0.0", "expected_flow must be > 0")]
#[case("expected_flow = -3.0", "expected_flow must be > 0")]
#[case("threshold_time_s = 0.0", "threshold_time_s must be > 0")]
#[case("range_fraction = 1.5", "range_fraction must be in (0.0, 1.0)")]
#[case("allowable_dip_time_s = 0.0", "allowable_dip_time_s must be > 0")]
#[case("max_dip_frac = 0.0", "max_dip_frac must be in (0.0, 1.0]")]
#[case("max_dip_abs = -1.0", "max_dip_abs must be >= 0")]
fn rejects_bad_tolerances(#[case] line: &str, #[case] needle: &str) {
    let toml = format!("[tolerances]\n{line}\n");
    let cfg = load_toml(&toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject tolerance");
    assert!(
        format!("{err}").contains(needle),
        "unexpected message: {err}"
    );
}

#[test]
fn accepts_full_config() {
    let toml = r#"
[tolerances]
expected_flow = 3.0
range_fraction = 0.2
threshold_time = 5.0
allowable_dip_time_s = 0.8
max_dip_abs = 4.0
max_dip_frac = 0.6
margin_frac = 0.025

[ingest]
delimiter = ","
extension = "csv"

[batch]
workers = 2

[logging]
level = "debug"
rotation = "daily"

[[runs]]
name = "1"
expected_flow = 9.0
files = ["a.txt", "b.txt"]
"#;

    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.tolerances.threshold_time_s, 5.0);
    assert_eq!(cfg.ingest.delimiter, b',');
    assert_eq!(cfg.runs[0].files.len(), 2);
}

#[test]
fn rejects_multi_char_delimiter() {
    let err = load_toml("[ingest]\ndelimiter = \";;\"\n").expect_err("should not parse");
    assert!(format!("{err}").contains("single ASCII character"));
}

#[test]
fn rejects_unknown_rotation() {
    let cfg = load_toml("[logging]\nrotation = \"weekly\"\n").unwrap();
    let err = cfg.validate().unwrap_err();
    assert!(format!("{err}").contains("logging.rotation"));
}

#[test]
fn rejects_run_without_files() {
    let cfg = load_toml("[[runs]]\nname = \"2\"\nfiles = []\n").unwrap();
    let err = cfg.validate().unwrap_err();
    assert!(format!("{err}").contains("lists no files"));
}

#[test]
fn run_paths_resolve_against_config_dir() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("flowdip.toml");
    fs::write(&path, "[[runs]]\nname = \"1\"\nfiles = [\"a.txt\"]\n").unwrap();

    let cfg = load_config_file(&path).unwrap();
    assert_eq!(cfg.runs[0].files[0], dir.path().join("a.txt"));
}
