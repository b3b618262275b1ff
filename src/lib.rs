// Demand-paged virtual memory simulator

pub mod channel;
pub mod common;
pub mod memory;
pub mod process;
pub mod simulation;

// Re-export key items for convenient access
pub use channel::{Ack, LocalTransport, ProcessEndpoint, Request, TransportError};
pub use common::{MemoryConfig, SimConfig, VirtualClock};
pub use memory::{MemoryError, MemoryEvent, MemoryManager, ProtocolError};
pub use simulation::{Coordinator, EventLog, SimulationError, SimulationSummary};
