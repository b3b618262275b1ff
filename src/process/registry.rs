use crate::common::types::ProcessId;

/// Liveness of the simulated-process slots.
///
/// The registry only tracks which slots are taken. Reclaiming the frames of a
/// terminated slot is done by the memory manager in the same call that
/// retires the slot, so a slot never becomes reusable while it still owns
/// frames.
#[derive(Debug, Clone)]
pub struct ProcessRegistry {
    live: Vec<bool>,
}

impl ProcessRegistry {
    pub fn new(slots: usize) -> Self {
        Self {
            live: vec![false; slots],
        }
    }

    /// Number of slots, live or not
    pub fn capacity(&self) -> usize {
        self.live.len()
    }

    /// Take the lowest free slot
    pub fn admit(&mut self) -> Option<ProcessId> {
        let slot = self.live.iter().position(|&live| !live)?;
        self.live[slot] = true;
        Some(slot as ProcessId)
    }

    /// Retire a slot. Returns `true` only for the call that actually retired
    /// it; unknown or already retired slots are a no-op.
    pub fn on_terminated(&mut self, pid: ProcessId) -> bool {
        match self.live.get_mut(pid as usize) {
            Some(live) if *live => {
                *live = false;
                true
            }
            _ => false,
        }
    }

    pub fn is_live(&self, pid: ProcessId) -> bool {
        self.live.get(pid as usize).copied().unwrap_or(false)
    }

    pub fn live_count(&self) -> usize {
        self.live.iter().filter(|&&live| live).count()
    }

    /// Live slots in ascending order
    pub fn live_pids(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.live
            .iter()
            .enumerate()
            .filter(|(_, live)| **live)
            .map(|(slot, _)| slot as ProcessId)
    }
}
