//! Boundary between the memory manager and the simulated processes.
//!
//! The coordinator only sees the three traits below; `LocalTransport` is the
//! in-process implementation used by the simulator and the tests.

pub mod error;
pub mod local;
pub mod protocol;

pub use error::TransportError;
pub use local::{LocalTransport, ProcessEndpoint};
pub use protocol::{Ack, Request};

use crate::common::types::ProcessId;

/// Where access and termination requests arrive
pub trait RequestSource {
    /// Take the next pending request without blocking
    fn try_receive(&mut self) -> error::Result<Option<Request>>;
}

/// Where acknowledgements are delivered
pub trait RequestSink {
    /// Deliver `ack` to process `pid`
    fn send_ack(&mut self, pid: ProcessId, ack: Ack) -> error::Result<()>;

    /// Stop routing to `pid`; anything still in flight from it is discarded
    fn close_route(&mut self, _pid: ProcessId) {}
}

/// Notification that a simulated process has gone away
pub trait ProcessLifecycle {
    fn poll_terminated(&mut self) -> Option<ProcessId>;
}
