//! Slot storage: the contiguous buffer behind a map instance.
//!
//! A `SlotArray` owns a boxed slice of slots whose length is always a
//! capacity-ladder power of two. Allocation is fallible so the map can
//! report allocator refusal instead of aborting; a freshly allocated or
//! cleared array is all-`Empty`.

use crate::capacity;
use crate::map::MapError;
use core::mem;

/// One slot of the table.
#[derive(Clone)]
pub(crate) enum Slot<K, V> {
    /// Never occupied since the last (re)initialisation. Terminates probes.
    Empty,
    /// Previously live, since removed. Skipped by probes, reusable for
    /// insertion once the probe has proven the key absent.
    Tombstone,
    /// Holds an entry.
    Live { key: K, value: V },
}

pub(crate) struct SlotArray<K, V> {
    slots: Box<[Slot<K, V>]>,
}

impl<K, V> SlotArray<K, V> {
    /// Allocate an all-empty array sized for `class`.
    pub(crate) fn with_class(class: u8) -> Result<Self, MapError> {
        let len = capacity::length_of(class);
        let mut buf = Vec::new();
        buf.try_reserve_exact(len)
            .map_err(|_| MapError::AllocationFailed)?;
        buf.resize_with(len, || Slot::Empty);
        Ok(Self {
            slots: buf.into_boxed_slice(),
        })
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Index mask; length is a power of two.
    #[inline]
    pub(crate) fn mask(&self) -> usize {
        self.slots.len() - 1
    }

    #[inline]
    pub(crate) fn slot(&self, idx: usize) -> &Slot<K, V> {
        &self.slots[idx]
    }

    /// Swap a slot out, leaving `with` in its place.
    #[inline]
    pub(crate) fn replace(&mut self, idx: usize, with: Slot<K, V>) -> Slot<K, V> {
        mem::replace(&mut self.slots[idx], with)
    }

    /// Reset every slot to `Empty` without touching the allocation.
    pub(crate) fn fill_empty(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = Slot::Empty;
        }
    }

    /// Entry of a live slot. `idx` must come from a probe hit.
    #[inline]
    pub(crate) fn live_entry(&self, idx: usize) -> (&K, &V) {
        match &self.slots[idx] {
            Slot::Live { key, value } => (key, value),
            _ => unreachable!("probe hit on a non-live slot"),
        }
    }

    /// Like `live_entry`, with the value mutable.
    #[inline]
    pub(crate) fn live_entry_mut(&mut self, idx: usize) -> (&K, &mut V) {
        match &mut self.slots[idx] {
            Slot::Live { key, value } => (key, value),
            _ => unreachable!("probe hit on a non-live slot"),
        }
    }

    #[inline]
    pub(crate) fn live_value_mut(&mut self, idx: usize) -> &mut V {
        self.live_entry_mut(idx).1
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[Slot<K, V>] {
        &self.slots
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [Slot<K, V>] {
        &mut self.slots
    }
}

impl<K: Clone, V: Clone> Clone for SlotArray<K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
        }
    }
}
