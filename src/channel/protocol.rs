use serde::{Deserialize, Serialize};

use crate::common::types::{ProcessId, VirtualAddress};

/// Message from a simulated process to the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    /// Read or write one virtual address
    Access {
        pid: ProcessId,
        address: VirtualAddress,
        is_write: bool,
    },
    /// The process is done and its frames can be reclaimed
    Terminate { pid: ProcessId },
}

impl Request {
    pub fn pid(&self) -> ProcessId {
        match *self {
            Request::Access { pid, .. } | Request::Terminate { pid } => pid,
        }
    }
}

/// Reply to an access request, routed to the process that sent it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub pid: ProcessId,
    pub fault_occurred: bool,
    /// `false` when the request was refused as malformed
    pub accepted: bool,
}

impl Ack {
    pub fn hit(pid: ProcessId) -> Self {
        Self {
            pid,
            fault_occurred: false,
            accepted: true,
        }
    }

    pub fn fault(pid: ProcessId) -> Self {
        Self {
            pid,
            fault_occurred: true,
            accepted: true,
        }
    }

    pub fn rejected(pid: ProcessId) -> Self {
        Self {
            pid,
            fault_occurred: false,
            accepted: false,
        }
    }
}
