// End-to-end simulation runs with real process threads

use std::fs;
use std::io::BufWriter;

use anyhow::Result;
use tempfile::TempDir;

use pagesim::common::config::ConfigError;
use pagesim::simulation::{Coordinator, EventLog, SimulationError};

#[path = "../common/mod.rs"]
mod common;
use common::small_sim_config;

#[test]
fn test_all_processes_run_to_completion() -> Result<()> {
    let config = small_sim_config(6, 3, 4);
    let coordinator = Coordinator::new(config, EventLog::new(Vec::new()))?;
    let (summary, log) = coordinator.run()?;

    assert!(!summary.hit_loop_limit);
    assert!(!summary.interrupted);
    assert_eq!(summary.discarded_requests, 0);
    assert_eq!(summary.processes_launched, 6);
    assert_eq!(summary.processes.len(), 6);
    assert_eq!(summary.stats.processes_admitted, 6);
    assert_eq!(summary.stats.processes_terminated, 6);

    // Every access a process made was served exactly once
    let issued: u64 = summary.processes.iter().map(|process| process.stats.requests).sum();
    assert_eq!(issued, summary.stats.accesses);
    assert_eq!(summary.stats.hits + summary.stats.faults, summary.stats.accesses);
    assert_eq!(summary.stats.rejections, 0);
    for process in &summary.processes {
        assert!(process.failure.is_none(), "P{} failed: {:?}", process.pid, process.failure);
        assert!((50..=70).contains(&process.stats.requests));
    }

    // With 4 frames for up to 3 processes of 8 pages, eviction is certain
    assert!(summary.stats.evictions > 0);

    let text = String::from_utf8(log)?;
    assert!(text.contains("oss: Launched child P0"));
    assert!(text.contains("pagefault"));
    assert!(text.contains("Current memory layout at time"));
    Ok(())
}

#[test]
fn test_writebacks_only_with_writes() -> Result<()> {
    let mut config = small_sim_config(4, 2, 3);
    config.workload.write_ratio = 0.0;
    let (summary, _) = Coordinator::new(config, EventLog::new(Vec::new()))?.run()?;

    assert_eq!(summary.stats.writes, 0);
    assert_eq!(summary.stats.writebacks, 0);
    assert!(summary.stats.evictions > 0);
    Ok(())
}

#[test]
fn test_loop_limit_stops_run_and_releases_processes() -> Result<()> {
    let mut config = small_sim_config(4, 2, 4);
    config.launch.max_loops = 10;
    config.workload.requests_mean = 10_000;
    config.workload.requests_jitter = 0;
    let (summary, _) = Coordinator::new(config, EventLog::new(Vec::new()))?.run()?;

    assert!(summary.hit_loop_limit);
    assert_eq!(summary.loops, 10);
    // Processes still running were woken by the shutdown
    assert!(summary.processes.iter().all(|process| process.failure.is_some()));
    Ok(())
}

#[test]
fn test_trace_written_to_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("oss.log");
    let writer = BufWriter::new(fs::File::create(&path)?);

    let config = small_sim_config(4, 2, 4);
    let (_, writer) = Coordinator::new(config, EventLog::with_max_lines(writer, 500))?.run()?;
    drop(writer);

    let text = fs::read_to_string(&path)?;
    assert_eq!(text.lines().count(), 500);
    assert!(text.starts_with("oss: Launched child P0 at 0:0"));
    Ok(())
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = small_sim_config(2, 2, 4);
    config.memory.frame_count = 0;
    match Coordinator::new(config, EventLog::new(Vec::new())) {
        Err(SimulationError::Config(ConfigError::InvalidValue { field, .. })) => {
            assert_eq!(field, "frame_count")
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("zero frames accepted"),
    }
}
