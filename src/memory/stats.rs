use serde::{Deserialize, Serialize};

/// Running counters kept by the memory manager
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub accesses: u64,
    pub reads: u64,
    pub writes: u64,
    pub hits: u64,
    pub faults: u64,
    pub evictions: u64,
    pub writebacks: u64,
    pub rejections: u64,
    pub reclaimed_frames: u64,
    pub processes_admitted: u64,
    pub processes_terminated: u64,
}

impl MemoryStats {
    /// Fraction of accepted accesses served from a resident frame
    pub fn hit_ratio(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            self.hits as f64 / self.accesses as f64
        }
    }

    /// Page faults per accepted access
    pub fn fault_ratio(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            self.faults as f64 / self.accesses as f64
        }
    }
}
