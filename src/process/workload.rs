use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::channel::error::Result;
use crate::channel::local::ProcessEndpoint;
use crate::common::config::{MemoryConfig, WorkloadConfig};
use crate::common::types::VirtualAddress;

/// What one simulated process did, updated as it runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkloadStats {
    pub requests: u64,
    pub reads: u64,
    pub writes: u64,
    pub faults: u64,
    pub rejected: u64,
}

/// Shared handle to a process's running statistics
pub type SharedStats = Arc<Mutex<WorkloadStats>>;

/// Random access stream of one simulated process
pub struct Workload {
    rng: StdRng,
    page_size: u32,
    pages: u32,
    write_ratio: f64,
    budget: u32,
}

impl Workload {
    /// Build the stream for the `launch_index`-th process of a run. The same
    /// seed and index always produce the same stream.
    pub fn new(memory: &MemoryConfig, config: &WorkloadConfig, launch_index: u64) -> Self {
        let seed = config.seed ^ launch_index.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let mut rng = StdRng::seed_from_u64(seed);
        let low = config.requests_mean.saturating_sub(config.requests_jitter);
        let high = config.requests_mean.saturating_add(config.requests_jitter);
        let budget = rng.gen_range(low..=high);

        Self {
            rng,
            page_size: memory.page_size,
            pages: memory.pages_per_process,
            write_ratio: config.write_ratio,
            budget,
        }
    }

    /// Number of accesses this process issues before terminating
    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// Next `(address, is_write)` pair
    pub fn next_access(&mut self) -> (VirtualAddress, bool) {
        let page = self.rng.gen_range(0..self.pages);
        let offset = self.rng.gen_range(0..self.page_size);
        let is_write = self.rng.gen_bool(self.write_ratio);
        (page * self.page_size + offset, is_write)
    }

    /// Drive the endpoint until the budget is spent, then announce
    /// termination. Stops early if the coordinator goes away.
    pub fn run(mut self, endpoint: ProcessEndpoint, stats: SharedStats) -> Result<()> {
        for _ in 0..self.budget {
            let (address, is_write) = self.next_access();
            let ack = endpoint.access(address, is_write)?;

            let mut stats = stats.lock();
            stats.requests += 1;
            if is_write {
                stats.writes += 1;
            } else {
                stats.reads += 1;
            }
            if ack.fault_occurred {
                stats.faults += 1;
            }
            if !ack.accepted {
                stats.rejected += 1;
            }
        }
        endpoint.terminate()
    }
}
