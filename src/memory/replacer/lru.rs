use crate::common::types::FrameId;
use crate::memory::frame_table::FrameTable;

/// Least Recently Used replacement by simulated reference time.
///
/// Recency lives in the frames themselves (`last_reference`), so the replacer
/// keeps no state of its own. Only occupied frames are candidates; callers
/// look for a free frame before asking for a victim.
#[derive(Debug, Default, Clone, Copy)]
pub struct LRUReplacer;

impl LRUReplacer {
    pub fn new() -> Self {
        Self
    }

    /// Victim selection: the occupied frame with the oldest reference.
    /// Equal timestamps go to the lowest frame index.
    pub fn victim(&self, frames: &FrameTable) -> Option<FrameId> {
        frames
            .iter()
            .filter(|(_, frame)| frame.occupied)
            .min_by_key(|&(frame_id, frame)| (frame.last_reference, frame_id))
            .map(|(frame_id, _)| frame_id)
    }
}
