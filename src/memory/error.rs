use thiserror::Error;

use crate::common::types::{FrameId, PageNumber, ProcessId, VirtualAddress};

/// A request that cannot be applied. Nothing is mutated when one is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Process {0} is not a live process slot")]
    UnknownProcess(ProcessId),

    #[error("Address {address} of P{pid} is on page {page}, beyond its {limit} pages")]
    PageOutOfRange {
        pid: ProcessId,
        address: VirtualAddress,
        page: PageNumber,
        limit: u32,
    },
}

/// The frame table and the page tables disagree. Always a programming defect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("P{pid} page {page} maps frame {frame}, which is not occupied")]
    MapsFreeFrame {
        pid: ProcessId,
        page: PageNumber,
        frame: FrameId,
    },

    #[error("P{pid} page {page} maps frame {frame}, which holds P{owner} page {owner_page}")]
    OwnerMismatch {
        pid: ProcessId,
        page: PageNumber,
        frame: FrameId,
        owner: ProcessId,
        owner_page: PageNumber,
    },

    #[error("Frame {frame} holds P{owner} page {page} but no page table entry points at it")]
    OrphanFrame {
        frame: FrameId,
        owner: ProcessId,
        page: PageNumber,
    },

    #[error("Frame {frame} is held by P{owner}, which is not a live process")]
    DeadOwner { frame: FrameId, owner: ProcessId },

    #[error("No free frame and no occupied frame to evict")]
    NoEvictableFrame,

    #[error("P{pid} page {page} maps frame {frame}, beyond the frame table")]
    FrameOutOfRange {
        pid: ProcessId,
        page: PageNumber,
        frame: FrameId,
    },
}

/// Error type for memory manager operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("No free process slot")]
    NoFreeSlot,
}

/// Result type for memory manager operations
pub type Result<T> = std::result::Result<T, MemoryError>;
