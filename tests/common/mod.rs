#![allow(dead_code)]

use anyhow::Result;
use pagesim::common::config::{MemoryConfig, SimConfig};
use pagesim::common::types::{PageNumber, ProcessId, VirtualAddress};
use pagesim::memory::MemoryManager;

pub const PAGE_SIZE: u32 = 1024;
pub const HIT_COST_NS: u64 = 100;
pub const FAULT_COST_NS: u64 = 10_000;
pub const DISK_IO_NS: u64 = 1_000_000;

// Small memory with easily distinguishable costs
pub fn tiny_memory_config(frames: u32, pages: u32) -> MemoryConfig {
    MemoryConfig {
        page_size: PAGE_SIZE,
        pages_per_process: pages,
        frame_count: frames,
        max_processes: 4,
        hit_cost_ns: HIT_COST_NS,
        fault_cost_ns: FAULT_COST_NS,
        disk_io_ns: DISK_IO_NS,
    }
}

// Create a memory manager with one admitted process
pub fn create_test_manager(frames: u32, pages: u32) -> Result<(MemoryManager, ProcessId)> {
    let mut manager = MemoryManager::new(tiny_memory_config(frames, pages))?;
    let pid = manager.admit_process()?;
    Ok((manager, pid))
}

// First address of a page
pub fn address_of(page: PageNumber) -> VirtualAddress {
    page * PAGE_SIZE
}

// A short, fast simulation run
pub fn small_sim_config(processes: u32, simultaneous: u32, frames: u32) -> SimConfig {
    let mut config = SimConfig::default();
    config.memory = tiny_memory_config(frames, 8);
    config.memory.max_processes = simultaneous.max(1);
    config.launch.max_total = processes;
    config.launch.max_simultaneous = simultaneous;
    config.launch.launch_interval_ns = 1_000;
    config.launch.max_loops = 5_000_000;
    config.launch.snapshot_interval = 50;
    config.workload.requests_mean = 60;
    config.workload.requests_jitter = 10;
    config.workload.seed = 7;
    config
}
