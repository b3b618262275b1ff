/// Simulated process slot identifier
pub type ProcessId = u32;

/// Virtual page number within one process's address space
pub type PageNumber = u32;

/// Physical frame index
pub type FrameId = u32;

/// Virtual address issued by a simulated process
pub type VirtualAddress = u32;

/// Page size in bytes
pub const DEFAULT_PAGE_SIZE: u32 = 1024;

/// Number of virtual pages each process may touch
pub const DEFAULT_PAGES_PER_PROCESS: u32 = 32;

/// Physical frames shared by all processes
pub const DEFAULT_FRAME_COUNT: u32 = 256;

/// Process slots available to the launcher
pub const DEFAULT_MAX_PROCESSES: u32 = 18;

/// Cost of servicing a resident page
pub const DEFAULT_HIT_COST_NS: u64 = 100;

/// Cost of bringing a page in on a fault
pub const DEFAULT_FAULT_COST_NS: u64 = 14_000_000;

/// Extra cost of writing back a dirty victim
pub const DEFAULT_DISK_IO_NS: u64 = 14_000_000;

/// Nanoseconds per simulated second
pub const NANOS_PER_SECOND: u64 = 1_000_000_000;
