use assert_cmd::Command;
use predicates::str::contains;
use std::path::PathBuf;
use tempfile::TempDir;

const TRACE: &str = r#"{"runName": "rnaseq", "event": "started"}
{"runName": "rnaseq", "event": "process_submitted", "trace": {"task_id": 1, "status": "SUBMITTED", "process": "STAR_ALIGN", "cpus": 8}}
{"runName": "rnaseq", "event": "process_completed", "trace": {"task_id": 1, "status": "COMPLETED", "process": "STAR_ALIGN", "cpus": 8, "%cpu": 200.0, "duration": 600000, "realtime": 600000}}
{"runName": "rnaseq", "event": "process_completed", "trace": {"task_id": 2, "status": "COMPLETED", "process": "FASTQC", "cpus": 2, "%cpu": 190.0, "memory": 2147483648, "rss": 1610612736, "duration": 600000, "realtime": 600000}}
"#;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn tracer_analyze() -> Command {
    let mut cmd = Command::cargo_bin("tracer-analyze").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn analyze_prints_run_summary() {
    let dir = TempDir::new().unwrap();
    let trace = write_file(&dir, "trace.ndjson", TRACE);

    tracer_analyze()
        .arg("analyze")
        .arg(&trace)
        .assert()
        .success()
        .stdout(contains("Run: rnaseq"))
        .stdout(contains("STAR_ALIGN"))
        .stdout(contains("set cpus to 2"));
}

#[test]
fn analyze_json_output() {
    let dir = TempDir::new().unwrap();
    let trace = write_file(&dir, "trace.ndjson", TRACE);

    let output = tracer_analyze()
        .args(["analyze", "--json"])
        .arg(&trace)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let run = &report["runs"][0];
    assert_eq!(run["run_name"], "rnaseq");
    assert_eq!(run["task_count"], 2);
    assert_eq!(run["problems"][0]["process"], "STAR_ALIGN");
    assert_eq!(run["problems"][0]["recommendation"]["action"], "set_cpus");
    assert_eq!(run["problems"][0]["recommendation"]["cpus"], 2);
}

#[test]
fn analyze_unknown_run_fails() {
    let dir = TempDir::new().unwrap();
    let trace = write_file(&dir, "trace.ndjson", TRACE);

    tracer_analyze()
        .args(["analyze", "--run", "chipseq"])
        .arg(&trace)
        .assert()
        .failure()
        .stderr(contains("No tasks found for run"));
}

#[test]
fn analyze_missing_file_fails() {
    let dir = TempDir::new().unwrap();

    tracer_analyze()
        .arg("analyze")
        .arg(dir.path().join("missing.ndjson"))
        .assert()
        .failure()
        .stderr(contains("failed to read trace file"));
}

#[test]
fn config_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let config = write_file(
        &dir,
        "analysis.toml",
        "interval_valid_cpu_allocation_percentage = [10.0, 300.0]\ntop_percent_ratio = 0.5\n",
    );

    tracer_analyze()
        .arg("config")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(contains("\"top_percent_ratio\": 0.5"))
        .stdout(contains("300.0"));
}

#[test]
fn lenient_band_reports_no_problems() {
    let dir = TempDir::new().unwrap();
    let trace = write_file(&dir, "trace.ndjson", TRACE);
    let config = write_file(
        &dir,
        "analysis.toml",
        "interval_valid_cpu_allocation_percentage = [10.0, 300.0]\n",
    );

    tracer_analyze()
        .arg("analyze")
        .arg(&trace)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(contains("all processes within target bands"));
}

#[test]
fn inverted_band_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = write_file(
        &dir,
        "analysis.toml",
        "interval_valid_ram_allocation_percentage = [100.0, 60.0]\n",
    );

    tracer_analyze()
        .arg("config")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(contains("must not exceed high bound"));
}

#[test]
fn log_file_receives_logs() {
    let dir = TempDir::new().unwrap();
    let trace = write_file(&dir, "trace.ndjson", TRACE);
    let log_file = dir.path().join("analysis.log");

    tracer_analyze()
        .arg("analyze")
        .arg(&trace)
        .arg("--log-file")
        .arg(&log_file)
        .assert()
        .success();

    let logs = std::fs::read_to_string(&log_file).unwrap();
    assert!(logs.contains("Loaded 2 tasks"));
}
