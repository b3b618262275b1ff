use std::fs;
use std::process::Command;

use anyhow::Result;
use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_pagesim");

/// A short run prints the summary and writes the trace log
#[test]
fn test_cli_small_run() -> Result<()> {
    let dir = TempDir::new()?;
    let log_path = dir.path().join("oss.log");

    let output = Command::new(BIN)
        .args(["-n", "3", "-s", "2", "-i", "1", "--frames", "8", "--seed", "11", "--quiet", "-f"])
        .arg(&log_path)
        .output()?;

    assert!(output.status.success(), "pagesim failed: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Simulation finished at"));
    assert!(stdout.contains("Processes launched: 3"));

    let trace = fs::read_to_string(&log_path)?;
    assert!(trace.contains("oss: P0 requesting"));
    assert!(trace.contains("Current memory layout at time"));
    Ok(())
}

/// The summary can be emitted as JSON
#[test]
fn test_cli_json_summary() -> Result<()> {
    let dir = TempDir::new()?;
    let config_path = dir.path().join("sim.json");
    fs::write(
        &config_path,
        r#"{
            "memory": { "frame_count": 4, "pages_per_process": 8 },
            "launch": { "max_total": 2, "max_simultaneous": 2 },
            "workload": { "requests_mean": 40, "requests_jitter": 5 }
        }"#,
    )?;

    let output = Command::new(BIN)
        .arg("--config")
        .arg(&config_path)
        .arg("-f")
        .arg(dir.path().join("trace.log"))
        .args(["--json", "--quiet"])
        .output()?;

    assert!(output.status.success(), "pagesim failed: {}", String::from_utf8_lossy(&output.stderr));

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(summary["processes_launched"], 2);
    assert_eq!(summary["hit_loop_limit"], false);
    assert!(summary["stats"]["faults"].as_u64().unwrap_or(0) > 0);
    Ok(())
}

/// Inconsistent options are refused before anything runs
#[test]
fn test_cli_rejects_invalid_config() -> Result<()> {
    let dir = TempDir::new()?;
    let output = Command::new(BIN)
        .args(["-s", "50", "--quiet", "-f"])
        .arg(dir.path().join("oss.log"))
        .output()?;

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("max_simultaneous"));
    Ok(())
}
