use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::{NamedTempFile, TempDir};

/// Write a workflow file rooted in `dir`, with extra TOML appended.
fn write_config(dir: &Path, extra: &str) -> NamedTempFile {
    write_config_with_run(dir, "", extra)
}

fn write_config_with_run(dir: &Path, run: &str, extra: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
usecase = "usecase-cli"
time_slot_days = 7

[production_period]
start = "2010-01-01"
end = "2010-01-31"

[[primary_sensors]]
name = "mhs-n18"
start = "2005-05-25"
end = "2016-03-04"

[[secondary_sensors]]
name = "amsub-n15"
start = "2000-01-01"
end = "2011-12-31"

[[hosts]]
name = "localhost"
cores = 2

[run]
log_dir = "{log}"
state_dir = "{state}"
{run}

{extra}
"#,
        log = dir.join("log").display(),
        state = dir.join("state").display(),
        run = run,
        extra = extra,
    )
    .unwrap();
    file.flush().unwrap();
    file
}

fn sensorplan(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sensorplan"))
        .env("SENSORPLAN_CONFIG", config)
        .env("RUST_LOG", "error") // Quiet logs during tests
        .args(args)
        .output()
        .expect("Failed to run sensorplan")
}

#[test]
fn test_plan_prints_job_count() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path(), "");

    let output = sensorplan(config.path(), &["plan", "matchup"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("window   [2010-01-01, 2010-01-31]"));
    assert!(stdout.contains("pair     mhs-n18+amsub-n15"));
    assert!(stdout.contains("jobs     5"));
}

#[test]
fn test_missing_config_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let output = sensorplan(&temp_dir.path().join("missing.toml"), &["plan", "ingestion"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_invalid_config_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path(), "[retry]\nmax_attempts = 0\n");
    let output = sensorplan(config.path(), &["plan", "ingestion"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_dry_run_writes_report_only() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path(), "");

    let output = sensorplan(config.path(), &["ingest", "--dry-run"]);
    assert!(output.status.success());

    let report = temp_dir.path().join("log").join("usecase-cli.report");
    let text = std::fs::read_to_string(report).unwrap();
    assert!(text.contains("5 total, 5 done, 0 failed, 0 pending"));
    assert!(!temp_dir.path().join("state").exists());
}

#[cfg(unix)]
#[test]
fn test_run_and_status_with_real_program() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(
        temp_dir.path(),
        r#"
[executor.matchup]
program = "/bin/sh"
args = ["-c", "echo matchup $SENSORPLAN_HOST", "matchup"]
"#,
    );

    let output = sensorplan(config.path(), &["matchup"]);
    assert!(output.status.success());
    assert!(temp_dir
        .path()
        .join("state")
        .join("usecase-cli.status.db")
        .exists());

    let output = sensorplan(config.path(), &["status", "matchup", "--json"]);
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["done"], 5);
    assert_eq!(report["usecase"], "usecase-cli");
}

#[cfg(unix)]
#[test]
fn test_failed_jobs_exit_with_status_2() {
    let temp_dir = TempDir::new().unwrap();
    let failing = r#"
[retry]
max_attempts = 1

[executor.ingestion]
program = "/bin/sh"
args = ["-c", "exit 1", "ingest"]
"#;
    let config = write_config(temp_dir.path(), failing);
    let output = sensorplan(config.path(), &["ingest"]);
    assert_eq!(output.status.code(), Some(2));

    let tolerant = write_config_with_run(temp_dir.path(), "tolerate_failures = true", failing);
    let output = sensorplan(tolerant.path(), &["ingest"]);
    assert!(output.status.success());
}
