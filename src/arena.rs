//! Slot arena that owns every record of a tree.
//!
//! Records are addressed by [`RecordId`]s instead of pointers:
//! - vacant slots are kept on a free list and reused
//! - every release bumps the slot generation, so stale ids never resolve
//! - a slot whose generation is used up is retired instead of reused
//! - byte accounting backs the optional memory limit

use std::mem;

use crate::error::{Error, Result};
use crate::record::{Record, RecordId};
use crate::tracing_helpers::warn_log;

/// Bytes charged for one record slot.
pub const RECORD_BYTES: usize = mem::size_of::<Slot>();

/// Returns a block of `size` bytes, every byte zero.
///
/// The zero fill cannot fail; the allocation can, and is reported instead of aborting.
pub fn zeroed(size: usize) -> Result<Box<[u8]>> {
    let mut block = Vec::new();
    block
        .try_reserve_exact(size)
        .map_err(|_| Error::OutOfMemory { requested: size })?;
    block.resize(size, 0);
    Ok(block.into_boxed_slice())
}

struct Slot {
    generation: u32,
    record: Option<Record>,
}

impl Slot {
    /// Vacates the slot and moves it to its next generation.
    ///
    /// Returns false once the generation cannot advance; the slot must then never be
    /// handed out again, or an id from a previous lap would resolve.
    fn retire_generation(&mut self) -> bool {
        self.record = None;
        match self.generation.checked_add(1) {
            Some(next) if next < u32::MAX => {
                self.generation = next;
                true
            }
            _ => {
                self.generation = u32::MAX;
                false
            }
        }
    }
}

pub(crate) struct RecordArena {
    slots: Vec<Slot>,
    /// Indices of vacant slots.
    free: Vec<u32>,
    live: usize,
    value_bytes: usize,
    limit: Option<usize>,
}

impl RecordArena {
    pub(crate) fn new(capacity: usize, limit: Option<usize>) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            live: 0,
            value_bytes: 0,
            limit,
        }
    }

    #[inline]
    pub(crate) fn live(&self) -> usize {
        self.live
    }

    #[inline]
    pub(crate) fn value_bytes(&self) -> usize {
        self.value_bytes
    }

    #[inline]
    pub(crate) fn bytes_in_use(&self) -> usize {
        self.live * RECORD_BYTES + self.value_bytes
    }

    pub(crate) fn capacity_bytes(&self) -> usize {
        self.slots.capacity() * RECORD_BYTES + self.free.capacity() * 4 + self.value_bytes
    }

    /// Fails if `extra` more bytes would cross the memory limit.
    pub(crate) fn check_limit(&self, extra: usize) -> Result<()> {
        let Some(limit) = self.limit else {
            return Ok(());
        };
        let wanted = self.bytes_in_use().saturating_add(extra);
        if wanted > limit {
            warn_log!(wanted, limit, "memory limit refused allocation");
            return Err(Error::OutOfMemory { requested: extra });
        }
        Ok(())
    }

    /// Makes sure the next [`RecordArena::insert`] cannot fail.
    pub(crate) fn reserve_slot(&mut self) -> Result<()> {
        self.check_limit(RECORD_BYTES)?;
        if self.free.is_empty() {
            self.slots
                .try_reserve(1)
                .map_err(|_| Error::OutOfMemory {
                    requested: RECORD_BYTES,
                })?;
        }
        Ok(())
    }

    /// Stores `record` in a vacant slot.
    ///
    /// Callers reserve first with [`RecordArena::reserve_slot`].
    pub(crate) fn insert(&mut self, record: Record) -> RecordId {
        if let Record::Leaf(leaf) = &record {
            self.value_bytes += leaf.size();
        }
        self.live += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.record.is_none(), "free list names an occupied slot");
            slot.record = Some(record);
            return RecordId::new(index, slot.generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            record: Some(record),
        });
        RecordId::new(index, 0)
    }

    #[inline]
    pub(crate) fn get(&self, id: RecordId) -> Option<&Record> {
        let slot = self.slots.get(id.index())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.record.as_ref()
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.record.as_mut()
    }

    /// Vacates the slot `id` names and returns its record.
    pub(crate) fn remove(&mut self, id: RecordId) -> Option<Record> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation() {
            return None;
        }
        let record = slot.record.take()?;
        let reusable = slot.retire_generation();
        // Growing the free list may allocate; on failure the slot is simply not reused.
        if reusable && self.free.try_reserve(1).is_ok() {
            self.free.push(id.index() as u32);
        }

        self.live -= 1;
        if let Record::Leaf(leaf) = &record {
            self.value_bytes -= leaf.size();
        }
        Some(record)
    }

    /// Live records in slot order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (RecordId, &Record)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.record
                .as_ref()
                .map(|record| (RecordId::new(index as u32, slot.generation), record))
        })
    }

    /// Vacates every slot, invalidating all ids handed out so far.
    pub(crate) fn reset(&mut self) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            if slot.retire_generation() {
                self.free.push(index as u32);
            }
        }
        self.live = 0;
        self.value_bytes = 0;
    }

    /// Returns spare capacity to the allocator.
    ///
    /// Vacant slots are kept: their generations are what make old ids stale.
    pub(crate) fn shrink_to_fit(&mut self) {
        self.slots.shrink_to_fit();
        self.free.shrink_to_fit();
    }
}
