pub mod coordinator;
pub mod dispatch;
pub mod error;
pub mod event_log;

pub use coordinator::{Coordinator, SimulationSummary};
pub use dispatch::{dispatch, reap, serve_one, Turn};
pub use error::SimulationError;
pub use event_log::EventLog;
