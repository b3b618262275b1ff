use crate::common::types::{FrameId, PageNumber};

/// Translation of one virtual page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageTableEntry {
    #[default]
    Unmapped,
    Frame(FrameId),
}

impl PageTableEntry {
    pub fn frame(self) -> Option<FrameId> {
        match self {
            PageTableEntry::Frame(frame_id) => Some(frame_id),
            PageTableEntry::Unmapped => None,
        }
    }
}

/// Single-level page table for one process slot
#[derive(Debug, Clone)]
pub struct PageTable {
    entries: Vec<PageTableEntry>,
}

impl PageTable {
    pub fn new(pages: usize) -> Self {
        Self {
            entries: vec![PageTableEntry::Unmapped; pages],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a page. Out-of-range pages read as unmapped.
    pub fn lookup(&self, page: PageNumber) -> PageTableEntry {
        self.entries
            .get(page as usize)
            .copied()
            .unwrap_or(PageTableEntry::Unmapped)
    }

    pub(crate) fn map(&mut self, page: PageNumber, frame_id: FrameId) {
        self.entries[page as usize] = PageTableEntry::Frame(frame_id);
    }

    /// Unmap a page, returning the frame it pointed at
    pub(crate) fn unmap(&mut self, page: PageNumber) -> Option<FrameId> {
        let entry = self.entries.get_mut(page as usize)?;
        std::mem::take(entry).frame()
    }

    /// Unmap every page, returning the frames that were mapped
    pub(crate) fn clear(&mut self) -> Vec<(PageNumber, FrameId)> {
        let mapped: Vec<_> = self.mapped().collect();
        self.entries.fill(PageTableEntry::Unmapped);
        mapped
    }

    /// `(page, frame)` for every resident page, in page order
    pub fn mapped(&self) -> impl Iterator<Item = (PageNumber, FrameId)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(page, entry)| {
                entry.frame().map(|frame_id| (page as PageNumber, frame_id))
            })
    }

    pub fn entries(&self) -> &[PageTableEntry] {
        &self.entries
    }
}
