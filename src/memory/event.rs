use serde::{Deserialize, Serialize};

use crate::common::clock::VirtualClock;
use crate::common::types::{FrameId, PageNumber, ProcessId, VirtualAddress};
use crate::memory::error::ProtocolError;

/// Observable memory-model transition, stamped with the clock value at
/// which it happened. Formatting is left to the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryEvent {
    /// An access request was accepted for processing
    Requested {
        at: VirtualClock,
        pid: ProcessId,
        address: VirtualAddress,
        is_write: bool,
    },

    /// The page was resident
    Hit {
        at: VirtualClock,
        pid: ProcessId,
        address: VirtualAddress,
        frame: FrameId,
        is_write: bool,
    },

    /// The page was not resident
    PageFault {
        at: VirtualClock,
        pid: ProcessId,
        address: VirtualAddress,
        page: PageNumber,
    },

    /// A resident page was pushed out to make room
    Evicted {
        at: VirtualClock,
        frame: FrameId,
        victim_pid: ProcessId,
        victim_page: PageNumber,
        pid: ProcessId,
        page: PageNumber,
    },

    /// The victim was dirty and cost a disk write
    WrittenBack {
        at: VirtualClock,
        frame: FrameId,
    },

    /// The faulting page now occupies a frame
    Loaded {
        at: VirtualClock,
        pid: ProcessId,
        page: PageNumber,
        frame: FrameId,
        is_write: bool,
    },

    /// The access completed and is ready to be acknowledged
    Completed {
        at: VirtualClock,
        pid: ProcessId,
        address: VirtualAddress,
        is_write: bool,
        fault: bool,
    },

    /// A process slot was handed out
    Admitted { at: VirtualClock, pid: ProcessId },

    /// A terminated process's frames were returned
    Reclaimed {
        at: VirtualClock,
        pid: ProcessId,
        frames: Vec<FrameId>,
    },

    /// A malformed request was refused without touching state
    Rejected {
        at: VirtualClock,
        pid: ProcessId,
        address: VirtualAddress,
        reason: String,
    },
}

impl MemoryEvent {
    pub fn at(&self) -> VirtualClock {
        match self {
            MemoryEvent::Requested { at, .. }
            | MemoryEvent::Hit { at, .. }
            | MemoryEvent::PageFault { at, .. }
            | MemoryEvent::Evicted { at, .. }
            | MemoryEvent::WrittenBack { at, .. }
            | MemoryEvent::Loaded { at, .. }
            | MemoryEvent::Completed { at, .. }
            | MemoryEvent::Admitted { at, .. }
            | MemoryEvent::Reclaimed { at, .. }
            | MemoryEvent::Rejected { at, .. } => *at,
        }
    }

    pub(crate) fn rejected(
        at: VirtualClock,
        pid: ProcessId,
        address: VirtualAddress,
        error: &ProtocolError,
    ) -> Self {
        MemoryEvent::Rejected {
            at,
            pid,
            address,
            reason: error.to_string(),
        }
    }
}
