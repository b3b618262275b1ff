use crate::common::clock::VirtualClock;
use crate::common::types::{FrameId, PageNumber, ProcessId};

/// One physical frame.
///
/// `owner`, `page_number`, `dirty` and `last_reference` are only meaningful
/// while `occupied` is set. A freed frame keeps its stale values until it is
/// reassigned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Frame {
    pub occupied: bool,
    pub owner: ProcessId,
    pub page_number: PageNumber,
    pub dirty: bool,
    pub last_reference: VirtualClock,
}

impl Frame {
    /// Load a page into this frame
    pub fn assign(
        &mut self,
        owner: ProcessId,
        page_number: PageNumber,
        dirty: bool,
        now: VirtualClock,
    ) {
        *self = Frame {
            occupied: true,
            owner,
            page_number,
            dirty,
            last_reference: now,
        };
    }

    /// Record an access to the resident page
    pub fn touch(&mut self, now: VirtualClock, is_write: bool) {
        self.last_reference = now;
        self.dirty |= is_write;
    }

    /// Mark the frame free
    pub fn release(&mut self) {
        self.occupied = false;
    }

    /// `(owner, page)` of the resident page, if any
    pub fn resident(&self) -> Option<(ProcessId, PageNumber)> {
        self.occupied.then_some((self.owner, self.page_number))
    }
}

/// Fixed-size table of all physical frames
#[derive(Debug, Clone)]
pub struct FrameTable {
    frames: Vec<Frame>,
}

impl FrameTable {
    pub fn new(frame_count: usize) -> Self {
        Self {
            frames: vec![Frame::default(); frame_count],
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, frame_id: FrameId) -> Option<&Frame> {
        self.frames.get(frame_id as usize)
    }

    pub(crate) fn get_mut(&mut self, frame_id: FrameId) -> Option<&mut Frame> {
        self.frames.get_mut(frame_id as usize)
    }

    /// Lowest-indexed unoccupied frame
    pub fn find_free(&self) -> Option<FrameId> {
        self.frames
            .iter()
            .position(|frame| !frame.occupied)
            .map(|index| index as FrameId)
    }

    pub fn occupied_count(&self) -> usize {
        self.frames.iter().filter(|frame| frame.occupied).count()
    }

    pub fn dirty_count(&self) -> usize {
        self.frames.iter().filter(|frame| frame.occupied && frame.dirty).count()
    }

    /// Frames paired with their index
    pub fn iter(&self) -> impl Iterator<Item = (FrameId, &Frame)> + '_ {
        self.frames
            .iter()
            .enumerate()
            .map(|(index, frame)| (index as FrameId, frame))
    }

    pub fn as_slice(&self) -> &[Frame] {
        &self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_table_is_free() {
        let table = FrameTable::new(4);
        assert_eq!(table.len(), 4);
        assert_eq!(table.occupied_count(), 0);
        assert_eq!(table.find_free(), Some(0));
    }

    #[test]
    fn test_find_free_skips_occupied() {
        let mut table = FrameTable::new(3);
        let now = VirtualClock::default();
        table.get_mut(0).unwrap().assign(1, 0, false, now);
        table.get_mut(1).unwrap().assign(1, 1, true, now);
        assert_eq!(table.find_free(), Some(2));
        assert_eq!(table.dirty_count(), 1);

        table.get_mut(2).unwrap().assign(2, 0, false, now);
        assert_eq!(table.find_free(), None);

        table.get_mut(1).unwrap().release();
        assert_eq!(table.find_free(), Some(1));
        assert_eq!(table.dirty_count(), 0);
    }

    #[test]
    fn test_touch_keeps_dirty_bit() {
        let mut frame = Frame::default();
        frame.assign(0, 3, false, VirtualClock::new(0, 10));
        frame.touch(VirtualClock::new(0, 20), true);
        frame.touch(VirtualClock::new(0, 30), false);
        assert!(frame.dirty);
        assert_eq!(frame.last_reference, VirtualClock::new(0, 30));
        assert_eq!(frame.resident(), Some((0, 3)));

        frame.release();
        assert_eq!(frame.resident(), None);
    }
}
