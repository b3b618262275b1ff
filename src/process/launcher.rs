use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{error, info};
use parking_lot::Mutex;
use serde::Serialize;

use crate::channel::error::TransportError;
use crate::channel::local::LocalTransport;
use crate::common::clock::VirtualClock;
use crate::common::config::{LaunchConfig, MemoryConfig, SimConfig, WorkloadConfig};
use crate::common::types::ProcessId;
use crate::memory::manager::MemoryManager;
use crate::process::workload::{SharedStats, Workload, WorkloadStats};

struct RunningProcess {
    pid: ProcessId,
    launch_index: u64,
    stats: SharedStats,
    thread: JoinHandle<Result<(), TransportError>>,
}

/// Final account of one simulated process
#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport {
    pub pid: ProcessId,
    pub launch_index: u64,
    pub stats: WorkloadStats,
    /// Why the process stopped early, if it did
    pub failure: Option<String>,
}

/// Starts simulated processes subject to the launch limits
pub struct Launcher {
    launch: LaunchConfig,
    memory: MemoryConfig,
    workload: WorkloadConfig,
    created: u32,
    last_launch: Option<VirtualClock>,
    running: Vec<RunningProcess>,
}

impl Launcher {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            launch: config.launch.clone(),
            memory: config.memory.clone(),
            workload: config.workload.clone(),
            created: 0,
            last_launch: None,
            running: Vec::new(),
        }
    }

    /// Processes started so far
    pub fn created(&self) -> u32 {
        self.created
    }

    /// Every process the run will ever start has been started
    pub fn exhausted(&self) -> bool {
        self.created >= self.launch.max_total
    }

    /// Whether limits and the launch interval allow a new process now
    pub fn should_launch(&self, now: VirtualClock, live: usize) -> bool {
        if self.exhausted() || live >= self.launch.max_simultaneous as usize {
            return false;
        }
        match self.last_launch {
            None => true,
            Some(last) => {
                now.as_nanos().saturating_sub(last.as_nanos()) >= self.launch.launch_interval_ns
            }
        }
    }

    /// Start one process if allowed. Returns its slot.
    pub fn launch(
        &mut self,
        manager: &mut MemoryManager,
        transport: &mut LocalTransport,
    ) -> io::Result<Option<ProcessId>> {
        let now = manager.now();
        if !self.should_launch(now, manager.registry().live_count()) {
            return Ok(None);
        }
        let Ok(pid) = manager.admit_process() else {
            return Ok(None);
        };

        let launch_index = self.created as u64;
        let endpoint = transport.register(pid);
        let workload = Workload::new(&self.memory, &self.workload, launch_index);
        let stats: SharedStats = Arc::new(Mutex::new(WorkloadStats::default()));
        let thread_stats = Arc::clone(&stats);

        let spawned = thread::Builder::new()
            .name(format!("P{}", pid))
            .spawn(move || workload.run(endpoint, thread_stats));
        let thread = match spawned {
            Ok(thread) => thread,
            Err(err) => {
                // The endpoint never ran; release the slot it was given
                if let Err(violation) = manager.terminate_process(pid) {
                    error!("Releasing P{} after a failed spawn: {}", pid, violation);
                }
                return Err(err);
            }
        };

        self.created += 1;
        self.last_launch = Some(now);
        self.running.push(RunningProcess {
            pid,
            launch_index,
            stats,
            thread,
        });
        info!("Launched P{} (process #{}) at {}", pid, launch_index, now);
        Ok(Some(pid))
    }

    /// Wait for every started process and collect its report. Call only
    /// after the transport is dropped or every process has finished, or a
    /// process blocked on an acknowledgement will never return.
    pub fn join_all(&mut self) -> Vec<ProcessReport> {
        let mut reports: Vec<ProcessReport> = self
            .running
            .drain(..)
            .map(|process| {
                let failure = match process.thread.join() {
                    Ok(Ok(())) => None,
                    Ok(Err(err)) => Some(err.to_string()),
                    Err(_) => {
                        error!("P{} panicked", process.pid);
                        Some("panicked".to_string())
                    }
                };
                let stats = *process.stats.lock();
                ProcessReport {
                    pid: process.pid,
                    launch_index: process.launch_index,
                    stats,
                    failure,
                }
            })
            .collect();
        reports.sort_by_key(|report| report.launch_index);
        reports
    }
}
