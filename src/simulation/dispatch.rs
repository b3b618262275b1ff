use log::{debug, warn};

use crate::channel::protocol::{Ack, Request};
use crate::channel::{ProcessLifecycle, RequestSink, RequestSource};
use crate::common::types::ProcessId;
use crate::memory::error::{InvariantViolation, MemoryError};
use crate::memory::manager::MemoryManager;

/// What a single coordinator turn did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    /// Nothing was pending
    Idle,
    /// An access was applied and acknowledged
    Served { pid: ProcessId, fault: bool },
    /// A malformed access was refused
    Rejected { pid: ProcessId },
    /// A termination request was applied; `frames` were freed
    Terminated { pid: ProcessId, frames: usize },
    /// The transport failed; nothing was applied
    TransportFailed,
}

/// Apply one request to the memory model and deliver its acknowledgement.
///
/// Only a broken frame/page table invariant is returned as an error. Failed
/// deliveries are logged and otherwise ignored.
pub fn dispatch<S>(
    manager: &mut MemoryManager,
    sink: &mut S,
    request: Request,
) -> Result<Turn, InvariantViolation>
where
    S: RequestSink + ?Sized,
{
    match request {
        Request::Access { pid, address, is_write } => {
            let (ack, turn) = match manager.handle_access(pid, address, is_write) {
                Ok(ack) => (ack, Turn::Served { pid, fault: ack.fault_occurred }),
                Err(MemoryError::Invariant(violation)) => return Err(violation),
                Err(err) => {
                    debug!("Refusing request from P{}: {}", pid, err);
                    (Ack::rejected(pid), Turn::Rejected { pid })
                }
            };
            if let Err(err) = sink.send_ack(pid, ack) {
                warn!("Failed to acknowledge P{}: {}", pid, err);
            }
            Ok(turn)
        }
        Request::Terminate { pid } => {
            let frames = manager.terminate_process(pid)?.map_or(0, |freed| freed.len());
            sink.close_route(pid);
            Ok(Turn::Terminated { pid, frames })
        }
    }
}

/// Reclaim every process the lifecycle reports as gone. Returns the pids
/// that were actually retired.
pub fn reap<T>(
    manager: &mut MemoryManager,
    transport: &mut T,
) -> Result<Vec<ProcessId>, InvariantViolation>
where
    T: ProcessLifecycle + RequestSink + ?Sized,
{
    let mut retired = Vec::new();
    while let Some(pid) = transport.poll_terminated() {
        let freed = manager.terminate_process(pid)?;
        transport.close_route(pid);
        if freed.is_some() {
            retired.push(pid);
        }
    }
    Ok(retired)
}

/// Poll for at most one request and dispatch it
pub fn serve_one<T>(
    manager: &mut MemoryManager,
    transport: &mut T,
) -> Result<Turn, InvariantViolation>
where
    T: RequestSource + RequestSink + ?Sized,
{
    match transport.try_receive() {
        Ok(Some(request)) => dispatch(manager, transport, request),
        Ok(None) => Ok(Turn::Idle),
        Err(err) => {
            warn!("Failed to receive request: {}", err);
            Ok(Turn::TransportFailed)
        }
    }
}
