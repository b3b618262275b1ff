use std::fmt;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use log::{error, info};
use serde::Serialize;

use crate::channel::local::LocalTransport;
use crate::common::clock::VirtualClock;
use crate::common::config::SimConfig;
use crate::memory::manager::MemoryManager;
use crate::memory::stats::MemoryStats;
use crate::process::launcher::{Launcher, ProcessReport};
use crate::simulation::dispatch::{reap, serve_one, Turn};
use crate::simulation::error::{Result, SimulationError};
use crate::simulation::event_log::EventLog;

/// Outcome of a finished run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub final_clock: VirtualClock,
    pub loops: u64,
    pub processes_launched: u32,
    pub stats: MemoryStats,
    pub processes: Vec<ProcessReport>,
    /// Accesses dropped because their sender had already been retired
    pub discarded_requests: u64,
    /// The run stopped at `max_loops` with work outstanding
    pub hit_loop_limit: bool,
    /// The run was stopped from outside before it finished
    pub interrupted: bool,
}

impl fmt::Display for SimulationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation finished at {} after {} loops", self.final_clock, self.loops)?;
        if self.hit_loop_limit {
            writeln!(f, "  (stopped at the loop limit)")?;
        }
        if self.interrupted {
            writeln!(f, "  (interrupted)")?;
        }
        writeln!(f, "  Processes launched: {}", self.processes_launched)?;
        writeln!(
            f,
            "  Accesses: {} ({} reads, {} writes)",
            self.stats.accesses, self.stats.reads, self.stats.writes
        )?;
        writeln!(
            f,
            "  Hits: {}  Page faults: {}  Hit ratio: {:.2}%",
            self.stats.hits,
            self.stats.faults,
            self.stats.hit_ratio() * 100.0
        )?;
        writeln!(
            f,
            "  Evictions: {}  Dirty writebacks: {}",
            self.stats.evictions, self.stats.writebacks
        )?;
        write!(
            f,
            "  Rejected requests: {}  Frames reclaimed: {}",
            self.stats.rejections, self.stats.reclaimed_frames
        )
    }
}

/// Drives the memory manager: one request per loop, plus terminations,
/// launches, snapshots and the idle clock tick.
pub struct Coordinator<W: Write> {
    config: SimConfig,
    manager: MemoryManager,
    transport: LocalTransport,
    launcher: Launcher,
    log: EventLog<W>,
    loops: u64,
    stop: Arc<AtomicBool>,
}

impl<W: Write> Coordinator<W> {
    pub fn new(config: SimConfig, log: EventLog<W>) -> Result<Self> {
        config.validate()?;
        let manager = MemoryManager::new(config.memory.clone())?;
        let launcher = Launcher::new(&config);

        Ok(Self {
            config,
            manager,
            transport: LocalTransport::new(),
            launcher,
            log,
            loops: 0,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Flag that ends the run at the next loop boundary once set. The
    /// shutdown then proceeds as for a finished run.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn manager(&self) -> &MemoryManager {
        &self.manager
    }

    /// Run to completion, then shut the transport down and collect every
    /// process. Returns the trace log writer with the summary.
    pub fn run(mut self) -> Result<(SimulationSummary, W)> {
        info!(
            "Starting simulation: {} frames, {} processes ({} at a time)",
            self.config.memory.frame_count,
            self.config.launch.max_total,
            self.config.launch.max_simultaneous
        );

        let outcome = self.run_loop();
        let interrupted = self.is_stopped() && !self.is_finished();
        let hit_loop_limit = !interrupted && !self.is_finished();
        if interrupted {
            info!("Interrupted at {} after {} loops", self.manager.now(), self.loops);
        }

        // Blocked processes wake up with a transport error once this drops
        let discarded_requests = self.transport.discarded();
        drop(self.transport);
        let processes = self.launcher.join_all();

        outcome?;

        self.log.snapshot(&self.manager.snapshot())?;
        self.log.flush()?;

        let summary = SimulationSummary {
            final_clock: self.manager.now(),
            loops: self.loops,
            processes_launched: self.launcher.created(),
            stats: *self.manager.stats(),
            processes,
            discarded_requests,
            hit_loop_limit,
            interrupted,
        };
        info!("Simulation finished at {} after {} loops", summary.final_clock, summary.loops);
        Ok((summary, self.log.into_inner()))
    }

    fn is_finished(&self) -> bool {
        self.launcher.exhausted() && self.manager.registry().live_count() == 0
    }

    fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn run_loop(&mut self) -> Result<()> {
        while self.loops < self.config.launch.max_loops
            && !self.is_finished()
            && !self.is_stopped()
        {
            for pid in reap(&mut self.manager, &mut self.transport)? {
                info!("P{} exited at {}", pid, self.manager.now());
            }

            self.launcher.launch(&mut self.manager, &mut self.transport)?;

            let turn = serve_one(&mut self.manager, &mut self.transport)?;
            let events = self.manager.drain_events();
            self.log.record_all(&events)?;

            if self.config.launch.verify_invariants {
                if let Err(violation) = self.manager.check_invariants() {
                    error!(
                        "Memory model invariant broken at {}: {}",
                        self.manager.now(),
                        violation
                    );
                    return Err(SimulationError::Invariant(violation));
                }
            }

            if self.loops % self.config.launch.snapshot_interval == 0 {
                self.log.snapshot(&self.manager.snapshot())?;
            }

            self.manager.advance_clock(0, self.config.launch.idle_tick_ns);
            self.loops += 1;

            if turn == Turn::Idle {
                thread::yield_now();
            }
        }
        Ok(())
    }
}
