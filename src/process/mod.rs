pub mod launcher;
pub mod registry;
pub mod workload;

pub use launcher::{Launcher, ProcessReport};
pub use registry::ProcessRegistry;
pub use workload::{Workload, WorkloadStats};
