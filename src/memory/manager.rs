use log::debug;
use serde::Serialize;

use crate::channel::protocol::Ack;
use crate::common::clock::VirtualClock;
use crate::common::config::{ConfigError, MemoryConfig};
use crate::common::types::{FrameId, PageNumber, ProcessId, VirtualAddress};
use crate::memory::error::{InvariantViolation, MemoryError, ProtocolError, Result};
use crate::memory::event::MemoryEvent;
use crate::memory::frame_table::{Frame, FrameTable};
use crate::memory::page_table::{PageTable, PageTableEntry};
use crate::memory::replacer::LRUReplacer;
use crate::memory::stats::MemoryStats;
use crate::process::registry::ProcessRegistry;

/// Point-in-time copy of the memory model, taken between turns
#[derive(Debug, Clone, Serialize)]
pub struct MemorySnapshot {
    pub at: VirtualClock,
    pub frames: Vec<FrameView>,
    pub page_tables: Vec<PageTableView>,
}

/// Frame row of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameView {
    pub frame: FrameId,
    pub occupied: bool,
    pub owner: Option<ProcessId>,
    pub page: Option<PageNumber>,
    pub dirty: bool,
    pub last_reference: Option<VirtualClock>,
}

/// Page table row of a snapshot: `None` for unmapped pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageTableView {
    pub pid: ProcessId,
    pub entries: Vec<Option<FrameId>>,
}

/// Owns the frame table, every page table and the process slots, and is the
/// only thing that mutates them.
pub struct MemoryManager {
    config: MemoryConfig,
    clock: VirtualClock,
    frames: FrameTable,
    page_tables: Vec<PageTable>,
    registry: ProcessRegistry,
    replacer: LRUReplacer,
    events: Vec<MemoryEvent>,
    stats: MemoryStats,
}

impl MemoryManager {
    pub fn new(config: MemoryConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;

        let slots = config.max_processes as usize;
        let page_tables = (0..slots)
            .map(|_| PageTable::new(config.pages_per_process as usize))
            .collect();

        Ok(Self {
            frames: FrameTable::new(config.frame_count as usize),
            page_tables,
            registry: ProcessRegistry::new(slots),
            clock: VirtualClock::default(),
            replacer: LRUReplacer::new(),
            events: Vec::new(),
            stats: MemoryStats::default(),
            config,
        })
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Current simulated time
    pub fn now(&self) -> VirtualClock {
        self.clock.now()
    }

    /// Charge simulated time for work outside an access (housekeeping ticks)
    pub fn advance_clock(&mut self, seconds: u64, nanoseconds: u64) {
        self.clock.advance(seconds, nanoseconds);
    }

    pub fn stats(&self) -> &MemoryStats {
        &self.stats
    }

    pub fn frame_table(&self) -> &FrameTable {
        &self.frames
    }

    pub fn page_table(&self, pid: ProcessId) -> Option<&PageTable> {
        self.page_tables.get(pid as usize)
    }

    pub fn registry(&self) -> &ProcessRegistry {
        &self.registry
    }

    pub fn is_live(&self, pid: ProcessId) -> bool {
        self.registry.is_live(pid)
    }

    /// Events recorded since the last drain, oldest first
    pub fn events(&self) -> &[MemoryEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<MemoryEvent> {
        std::mem::take(&mut self.events)
    }

    /// Split an address into page number and offset
    pub fn split_address(&self, address: VirtualAddress) -> (PageNumber, u32) {
        (address / self.config.page_size, address % self.config.page_size)
    }

    /// Hand out a process slot. Its page table is empty.
    pub fn admit_process(&mut self) -> Result<ProcessId> {
        let pid = self.registry.admit().ok_or(MemoryError::NoFreeSlot)?;
        self.stats.processes_admitted += 1;
        self.events.push(MemoryEvent::Admitted { at: self.clock.now(), pid });
        debug!("Admitted P{} at {}", pid, self.clock);
        Ok(pid)
    }

    /// Retire a process and free every frame it owns.
    ///
    /// Returns the freed frames, or `None` if the process was not live, in
    /// which case nothing changes. A page table entry pointing outside the
    /// frame table is an invariant violation.
    pub fn terminate_process(
        &mut self,
        pid: ProcessId,
    ) -> std::result::Result<Option<Vec<FrameId>>, InvariantViolation> {
        if !self.registry.on_terminated(pid) {
            return Ok(None);
        }

        let mapped = self.page_tables[pid as usize].clear();
        let mut freed = Vec::with_capacity(mapped.len());
        for (page, frame_id) in mapped {
            let frame = self
                .frames
                .get_mut(frame_id)
                .ok_or(InvariantViolation::FrameOutOfRange {
                    pid,
                    page,
                    frame: frame_id,
                })?;
            frame.release();
            freed.push(frame_id);
        }

        self.stats.processes_terminated += 1;
        self.stats.reclaimed_frames += freed.len() as u64;
        self.events.push(MemoryEvent::Reclaimed {
            at: self.clock.now(),
            pid,
            frames: freed.clone(),
        });
        debug!("Reclaimed {} frames from P{}", freed.len(), pid);
        Ok(Some(freed))
    }

    #[cfg(test)]
    pub(crate) fn page_table_mut(&mut self, pid: ProcessId) -> Option<&mut PageTable> {
        self.page_tables.get_mut(pid as usize)
    }

    /// Service one memory access.
    ///
    /// Malformed requests return a `ProtocolError` and leave the model
    /// untouched apart from the `Rejected` event and counter.
    pub fn handle_access(
        &mut self,
        pid: ProcessId,
        address: VirtualAddress,
        is_write: bool,
    ) -> Result<Ack> {
        let page = match self.validate_request(pid, address) {
            Ok(page) => page,
            Err(err) => {
                self.stats.rejections += 1;
                self.events.push(MemoryEvent::rejected(self.clock.now(), pid, address, &err));
                debug!("Rejected request from P{}: {}", pid, err);
                return Err(err.into());
            }
        };

        self.stats.accesses += 1;
        if is_write {
            self.stats.writes += 1;
        } else {
            self.stats.reads += 1;
        }
        self.events.push(MemoryEvent::Requested {
            at: self.clock.now(),
            pid,
            address,
            is_write,
        });

        let ack = match self.page_tables[pid as usize].lookup(page) {
            PageTableEntry::Frame(frame_id) => {
                self.service_hit(pid, address, frame_id, is_write)?
            }
            PageTableEntry::Unmapped => self.service_fault(pid, address, page, is_write)?,
        };

        self.events.push(MemoryEvent::Completed {
            at: self.clock.now(),
            pid,
            address,
            is_write,
            fault: ack.fault_occurred,
        });
        Ok(ack)
    }

    fn validate_request(
        &self,
        pid: ProcessId,
        address: VirtualAddress,
    ) -> std::result::Result<PageNumber, ProtocolError> {
        if !self.registry.is_live(pid) {
            return Err(ProtocolError::UnknownProcess(pid));
        }
        let (page, _offset) = self.split_address(address);
        if page >= self.config.pages_per_process {
            return Err(ProtocolError::PageOutOfRange {
                pid,
                address,
                page,
                limit: self.config.pages_per_process,
            });
        }
        Ok(page)
    }

    fn service_hit(
        &mut self,
        pid: ProcessId,
        address: VirtualAddress,
        frame_id: FrameId,
        is_write: bool,
    ) -> Result<Ack> {
        let now = self.clock.now();
        let frame = self
            .frames
            .get_mut(frame_id)
            .ok_or(InvariantViolation::FrameOutOfRange {
                pid,
                page: address / self.config.page_size,
                frame: frame_id,
            })?;
        frame.touch(now, is_write);

        self.stats.hits += 1;
        self.events.push(MemoryEvent::Hit {
            at: now,
            pid,
            address,
            frame: frame_id,
            is_write,
        });
        self.clock.advance_ns(self.config.hit_cost_ns);
        Ok(Ack::hit(pid))
    }

    fn service_fault(
        &mut self,
        pid: ProcessId,
        address: VirtualAddress,
        page: PageNumber,
        is_write: bool,
    ) -> Result<Ack> {
        self.stats.faults += 1;
        self.events.push(MemoryEvent::PageFault {
            at: self.clock.now(),
            pid,
            address,
            page,
        });

        // Free frames are always taken before any resident page is evicted
        let frame_id = match self.frames.find_free() {
            Some(frame_id) => frame_id,
            None => self.evict(pid, page)?,
        };

        let now = self.clock.now();
        self.frames
            .get_mut(frame_id)
            .ok_or(InvariantViolation::FrameOutOfRange {
                pid,
                page,
                frame: frame_id,
            })?
            .assign(pid, page, is_write, now);
        self.page_tables[pid as usize].map(page, frame_id);
        self.events.push(MemoryEvent::Loaded {
            at: now,
            pid,
            page,
            frame: frame_id,
            is_write,
        });

        self.clock.advance_ns(self.config.fault_cost_ns);
        Ok(Ack::fault(pid))
    }

    /// Push the least recently used page out and return its frame
    fn evict(&mut self, pid: ProcessId, page: PageNumber) -> Result<FrameId> {
        let frame_id = self
            .replacer
            .victim(&self.frames)
            .ok_or(InvariantViolation::NoEvictableFrame)?;
        let victim: Frame = *self
            .frames
            .get(frame_id)
            .ok_or(InvariantViolation::NoEvictableFrame)?;

        self.stats.evictions += 1;
        self.events.push(MemoryEvent::Evicted {
            at: self.clock.now(),
            frame: frame_id,
            victim_pid: victim.owner,
            victim_page: victim.page_number,
            pid,
            page,
        });

        if victim.dirty {
            self.stats.writebacks += 1;
            self.events.push(MemoryEvent::WrittenBack {
                at: self.clock.now(),
                frame: frame_id,
            });
            self.clock.advance_ns(self.config.disk_io_ns);
        }

        let unmapped = self
            .page_tables
            .get_mut(victim.owner as usize)
            .and_then(|table| table.unmap(victim.page_number));
        if unmapped != Some(frame_id) {
            return Err(InvariantViolation::OrphanFrame {
                frame: frame_id,
                owner: victim.owner,
                page: victim.page_number,
            }
            .into());
        }
        Ok(frame_id)
    }

    /// Verify that the frame table and the page tables are mutual inverses
    pub fn check_invariants(&self) -> std::result::Result<(), InvariantViolation> {
        for (index, table) in self.page_tables.iter().enumerate() {
            let pid = index as ProcessId;
            for (page, frame_id) in table.mapped() {
                let frame = self
                    .frames
                    .get(frame_id)
                    .ok_or(InvariantViolation::FrameOutOfRange {
                        pid,
                        page,
                        frame: frame_id,
                    })?;
                match frame.resident() {
                    None => {
                        return Err(InvariantViolation::MapsFreeFrame {
                            pid,
                            page,
                            frame: frame_id,
                        });
                    }
                    Some((owner, owner_page)) if owner != pid || owner_page != page => {
                        return Err(InvariantViolation::OwnerMismatch {
                            pid,
                            page,
                            frame: frame_id,
                            owner,
                            owner_page,
                        });
                    }
                    Some(_) => {}
                }
            }
        }

        for (frame_id, frame) in self.frames.iter() {
            let Some((owner, page)) = frame.resident() else {
                continue;
            };
            if !self.registry.is_live(owner) {
                return Err(InvariantViolation::DeadOwner {
                    frame: frame_id,
                    owner,
                });
            }
            if self.page_tables[owner as usize].lookup(page) != PageTableEntry::Frame(frame_id) {
                return Err(InvariantViolation::OrphanFrame {
                    frame: frame_id,
                    owner,
                    page,
                });
            }
        }
        Ok(())
    }

    /// Copy of the frame table and of the page tables of live processes
    pub fn snapshot(&self) -> MemorySnapshot {
        let frames = self
            .frames
            .iter()
            .map(|(frame_id, frame)| FrameView {
                frame: frame_id,
                occupied: frame.occupied,
                owner: frame.occupied.then_some(frame.owner),
                page: frame.occupied.then_some(frame.page_number),
                dirty: frame.occupied && frame.dirty,
                last_reference: frame.occupied.then_some(frame.last_reference),
            })
            .collect();

        let page_tables = self
            .registry
            .live_pids()
            .map(|pid| PageTableView {
                pid,
                entries: self.page_tables[pid as usize]
                    .entries()
                    .iter()
                    .map(|entry| entry.frame())
                    .collect(),
            })
            .collect();

        MemorySnapshot {
            at: self.clock.now(),
            frames,
            page_tables,
        }
    }
}
