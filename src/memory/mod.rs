pub mod error;
pub mod event;
pub mod frame_table;
pub mod manager;
pub mod page_table;
mod replacer;
pub mod stats;

pub use error::{InvariantViolation, MemoryError, ProtocolError};
pub use event::MemoryEvent;
pub use frame_table::{Frame, FrameTable};
pub use manager::{MemoryManager, MemorySnapshot};
pub use page_table::{PageTable, PageTableEntry};
pub use stats::MemoryStats;
