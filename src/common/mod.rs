pub mod clock;
pub mod config;
pub mod types;

pub use clock::VirtualClock;
pub use config::{ConfigError, LaunchConfig, MemoryConfig, SimConfig, WorkloadConfig};
