use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::types::*;

/// Error type for configuration loading and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading config: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Malformed config file: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

fn require_positive(field: &'static str, value: u64) -> Result<()> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}

/// Parameters of the simulated memory hardware and its timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Page (and frame) size in bytes
    pub page_size: u32,

    /// Number of pages in each process's virtual address space
    pub pages_per_process: u32,

    /// Number of physical frames
    pub frame_count: u32,

    /// Number of process slots (page tables)
    pub max_processes: u32,

    /// Simulated time charged for a resident access
    pub hit_cost_ns: u64,

    /// Simulated time charged for loading a page on a fault
    pub fault_cost_ns: u64,

    /// Additional simulated time charged when a dirty victim is written back
    pub disk_io_ns: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            pages_per_process: DEFAULT_PAGES_PER_PROCESS,
            frame_count: DEFAULT_FRAME_COUNT,
            max_processes: DEFAULT_MAX_PROCESSES,
            hit_cost_ns: DEFAULT_HIT_COST_NS,
            fault_cost_ns: DEFAULT_FAULT_COST_NS,
            disk_io_ns: DEFAULT_DISK_IO_NS,
        }
    }
}

impl MemoryConfig {
    pub fn validate(&self) -> Result<()> {
        require_positive("page_size", self.page_size as u64)?;
        require_positive("pages_per_process", self.pages_per_process as u64)?;
        require_positive("frame_count", self.frame_count as u64)?;
        require_positive("max_processes", self.max_processes as u64)?;
        require_positive("hit_cost_ns", self.hit_cost_ns)?;
        require_positive("fault_cost_ns", self.fault_cost_ns)?;
        require_positive("disk_io_ns", self.disk_io_ns)?;

        // Every address of every page has to fit in a u32 request
        let address_space = self.page_size as u64 * self.pages_per_process as u64;
        if address_space > u32::MAX as u64 + 1 {
            return Err(ConfigError::InvalidValue {
                field: "pages_per_process",
                reason: format!(
                    "address space of {} bytes does not fit a 32-bit address",
                    address_space
                ),
            });
        }
        Ok(())
    }

    /// Size of one process's virtual address space in bytes
    pub fn address_space_size(&self) -> u64 {
        self.page_size as u64 * self.pages_per_process as u64
    }
}

/// How and when the launcher starts simulated processes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Total number of processes to create over the whole run
    pub max_total: u32,

    /// Processes allowed to be alive at the same time
    pub max_simultaneous: u32,

    /// Minimum simulated time between two launches
    pub launch_interval_ns: u64,

    /// Upper bound on coordinator loop iterations
    pub max_loops: u64,

    /// Write a memory map every this many loops
    pub snapshot_interval: u64,

    /// Simulated time charged for each coordinator loop iteration
    pub idle_tick_ns: u64,

    /// Verify the frame/page table invariant after every turn
    pub verify_invariants: bool,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            max_total: 100,
            max_simultaneous: 5,
            launch_interval_ns: 1_000_000,
            max_loops: 1_000_000,
            snapshot_interval: 100,
            idle_tick_ns: 1000,
            verify_invariants: true,
        }
    }
}

impl LaunchConfig {
    pub fn validate(&self, memory: &MemoryConfig) -> Result<()> {
        require_positive("max_total", self.max_total as u64)?;
        require_positive("max_simultaneous", self.max_simultaneous as u64)?;
        require_positive("max_loops", self.max_loops)?;
        require_positive("snapshot_interval", self.snapshot_interval)?;
        require_positive("idle_tick_ns", self.idle_tick_ns)?;

        if self.max_simultaneous > memory.max_processes {
            return Err(ConfigError::InvalidValue {
                field: "max_simultaneous",
                reason: format!(
                    "{} exceeds the {} available process slots",
                    self.max_simultaneous, memory.max_processes
                ),
            });
        }
        Ok(())
    }
}

/// Shape of the random access stream each simulated process issues
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    /// Probability that an access is a write, in [0, 1]
    pub write_ratio: f64,

    /// Average number of requests a process issues before terminating
    pub requests_mean: u32,

    /// Maximum deviation from `requests_mean`
    pub requests_jitter: u32,

    /// Base seed; each process derives its own stream from it
    pub seed: u64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            write_ratio: 0.3,
            requests_mean: 1000,
            requests_jitter: 100,
            seed: 0,
        }
    }
}

impl WorkloadConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.write_ratio) {
            return Err(ConfigError::InvalidValue {
                field: "write_ratio",
                reason: format!("{} is not a probability", self.write_ratio),
            });
        }
        require_positive("requests_mean", self.requests_mean as u64)?;
        if self.requests_jitter >= self.requests_mean {
            return Err(ConfigError::InvalidValue {
                field: "requests_jitter",
                reason: "must be smaller than requests_mean".to_string(),
            });
        }
        Ok(())
    }
}

/// Complete simulator configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub memory: MemoryConfig,
    pub launch: LaunchConfig,
    pub workload: WorkloadConfig,
}

impl SimConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: SimConfig = serde_json::from_str(&text)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.memory.validate()?;
        self.launch.validate(&self.memory)?;
        self.workload.validate()
    }
}
