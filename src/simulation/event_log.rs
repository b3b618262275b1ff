use std::fmt;
use std::io::{self, Write};

use crate::memory::event::MemoryEvent;
use crate::memory::manager::MemorySnapshot;

fn access_kind(is_write: bool) -> &'static str {
    if is_write { "write" } else { "read" }
}

/// Renders memory events and snapshots as the human-readable trace log
pub struct EventLog<W: Write> {
    out: W,
    lines: u64,
    max_lines: Option<u64>,
}

impl<W: Write> EventLog<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            lines: 0,
            max_lines: None,
        }
    }

    /// Stop writing after `max_lines`; the simulation itself is unaffected
    pub fn with_max_lines(out: W, max_lines: u64) -> Self {
        Self {
            out,
            lines: 0,
            max_lines: Some(max_lines),
        }
    }

    pub fn lines_written(&self) -> u64 {
        self.lines
    }

    pub fn is_capped(&self) -> bool {
        self.max_lines.is_some_and(|max| self.lines >= max)
    }

    fn line(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        if self.is_capped() {
            return Ok(());
        }
        self.out.write_fmt(args)?;
        self.out.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    pub fn record(&mut self, event: &MemoryEvent) -> io::Result<()> {
        match event {
            MemoryEvent::Requested { at, pid, address, is_write } => self.line(format_args!(
                "oss: P{} requesting {} of address {:05} at time {}",
                pid,
                access_kind(*is_write),
                address,
                at
            )),
            MemoryEvent::Hit { at, pid, address, frame, is_write } => self.line(format_args!(
                "oss: Address {:05} in frame {}, {} data to P{} at time {}",
                address,
                frame,
                if *is_write { "writing" } else { "giving" },
                pid,
                at
            )),
            MemoryEvent::PageFault { address, .. } => {
                self.line(format_args!("oss: Address {:05} is not in a frame, pagefault", address))
            }
            MemoryEvent::Evicted {
                frame,
                victim_pid,
                victim_page,
                pid,
                page,
                ..
            } => self.line(format_args!(
                "oss: Clearing frame {} (P{} page {}) and swapping in P{} page {}",
                frame, victim_pid, victim_page, pid, page
            )),
            MemoryEvent::WrittenBack { frame, .. } => self.line(format_args!(
                "oss: Dirty bit of frame {} set, adding additional time to the clock",
                frame
            )),
            MemoryEvent::Loaded { at, pid, page, frame, .. } => self.line(format_args!(
                "oss: Loaded P{} page {} into frame {} at time {}",
                pid, page, frame, at
            )),
            MemoryEvent::Completed {
                pid,
                address,
                is_write,
                fault: true,
                ..
            } => self.line(format_args!(
                "oss: Indicating to P{} that {} has happened to address {:05}",
                pid,
                access_kind(*is_write),
                address
            )),
            MemoryEvent::Completed { .. } => Ok(()),
            MemoryEvent::Admitted { at, pid } => {
                self.line(format_args!("oss: Launched child P{} at {}", pid, at))
            }
            MemoryEvent::Reclaimed { at, pid, frames } => self.line(format_args!(
                "oss: P{} terminated at {}, freeing frames {:?}",
                pid, at, frames
            )),
            MemoryEvent::Rejected { pid, address, reason, .. } => self.line(format_args!(
                "oss: Rejected request from P{} for address {:05}: {}",
                pid, address, reason
            )),
        }
    }

    pub fn record_all<'a>(
        &mut self,
        events: impl IntoIterator<Item = &'a MemoryEvent>,
    ) -> io::Result<()> {
        for event in events {
            self.record(event)?;
        }
        Ok(())
    }

    /// Write the memory map: one row per frame, then one page table row per
    /// live process (`-1` for unmapped pages)
    pub fn snapshot(&mut self, snapshot: &MemorySnapshot) -> io::Result<()> {
        self.line(format_args!(""))?;
        self.line(format_args!("Current memory layout at time {} is:", snapshot.at))?;
        self.line(format_args!("Occupied DirtyBit LastRefS LastRefNano"))?;
        for frame in &snapshot.frames {
            match frame.last_reference {
                Some(last) if frame.occupied => self.line(format_args!(
                    "Frame {}: Yes {} {} {}",
                    frame.frame,
                    frame.dirty as u8,
                    last.seconds(),
                    last.nanoseconds()
                ))?,
                _ => self.line(format_args!("Frame {}: No  0 0", frame.frame))?,
            }
        }
        for table in &snapshot.page_tables {
            let entries: Vec<String> = table
                .entries
                .iter()
                .map(|entry| entry.map_or_else(|| "-1".to_string(), |frame| frame.to_string()))
                .collect();
            self.line(format_args!("P{} page table: [ {} ]", table.pid, entries.join(" ")))?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
