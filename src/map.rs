//! ChurnMap: the map protocol and its rebuild controller.
//!
//! The map owns one slot array plus three counters: live entries,
//! tombstones, and the capacity class. Every operation that may add a
//! live entry passes through an adjust-before-insert gate that grows
//! the table when load crosses 7/8 and rebuilds it in place when live
//! and tombstone slots together exhaust the usable 7/8 — the rebuild
//! purges every tombstone, which is what keeps probe chains short
//! under removal-heavy workloads.
//!
//! Rebuilds allocate the replacement array before the old one is
//! touched, so an allocator refusal leaves the map exactly as it was.

use crate::capacity::{self, MAX_CLASS};
use crate::iter::{Iter, IterMut};
use crate::probe::{self, Probe};
use crate::slot::{Slot, SlotArray};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use fxhash::FxBuildHasher;

/// Why a map operation could not complete. In both cases the map is
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapError {
    /// The operation needed a capacity class past the top of the ladder.
    CapacityExhausted,
    /// The allocator refused the replacement slot array.
    AllocationFailed,
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::CapacityExhausted => f.write_str("capacity ladder exhausted"),
            MapError::AllocationFailed => f.write_str("slot array allocation failed"),
        }
    }
}

impl std::error::Error for MapError {}

/// View of the slot holding a key after [`ChurnMap::get_or_insert_with`].
pub struct EntryRef<'a, K, V> {
    /// True when the key was already present; the fill closure did not run.
    pub found_existing: bool,
    /// The value in the slot: the existing one, or the fill closure's.
    pub value: &'a mut V,
    key: &'a K,
}

impl<'a, K, V> EntryRef<'a, K, V> {
    /// The key as stored in the slot.
    pub fn key(&self) -> &K {
        self.key
    }
}

/// An open-addressing hash map that rebuilds itself under tombstone
/// pressure.
///
/// Keys need `Hash + Eq`; float keys are rejected at the type level
/// because std implements neither for `f32`/`f64`. The default hasher
/// is [`FxBuildHasher`]: 64-bit, non-cryptographic, and deterministic
/// within a process.
pub struct ChurnMap<K, V, S = FxBuildHasher> {
    slots: SlotArray<K, V>,
    live: usize,
    tombstones: usize,
    class: u8,
    hasher: S,
}

impl<K, V> ChurnMap<K, V>
where
    K: Hash + Eq,
{
    /// An empty map at the smallest capacity class (8 slots).
    ///
    /// Panics if even that allocation fails; every later growth path
    /// reports [`MapError::AllocationFailed`] instead.
    pub fn new() -> Self {
        Self::with_hasher(FxBuildHasher::default())
    }
}

impl<K, V> Default for ChurnMap<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ChurnMap<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            slots: SlotArray::with_class(0).expect("minimum slot array allocation"),
            live: 0,
            tombstones: 0,
            class: 0,
            hasher,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Current slot-array length.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Drop every entry; capacity and class are untouched.
    pub fn clear(&mut self) {
        self.slots.fill_empty();
        self.live = 0;
        self.tombstones = 0;
    }

    /// Drop every entry and return to the smallest capacity class.
    pub fn clear_and_release(&mut self) -> Result<(), MapError> {
        self.slots = SlotArray::with_class(0)?;
        self.class = 0;
        self.live = 0;
        self.tombstones = 0;
        Ok(())
    }

    /// Iterate live entries in arbitrary order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.slots.as_slice(), self.live)
    }

    /// Iterate live entries with mutable values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(self.slots.as_mut_slice(), self.live)
    }
}

impl<K, V, S> ChurnMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    #[inline]
    fn hash_of<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Insert or replace. The previous value of a present key is dropped.
    pub fn put(&mut self, key: K, value: V) -> Result<(), MapError> {
        self.adjust_before_insert()?;
        let hash = self.hash_of(&key);
        match probe::locate(&self.slots, hash as usize, |k| *k == key) {
            Probe::Hit(idx) => *self.slots.live_value_mut(idx) = value,
            Probe::Vacant(idx) => self.occupy(idx, key, value),
            Probe::Full => unreachable!("gate guarantees an empty slot"),
        }
        Ok(())
    }

    /// Insert only if absent. Returns whether an insertion happened; a
    /// present key is left untouched and `value` is dropped.
    pub fn put_no_clobber(&mut self, key: K, value: V) -> Result<bool, MapError> {
        self.adjust_before_insert()?;
        let hash = self.hash_of(&key);
        match probe::locate(&self.slots, hash as usize, |k| *k == key) {
            Probe::Hit(_) => Ok(false),
            Probe::Vacant(idx) => {
                self.occupy(idx, key, value);
                Ok(true)
            }
            Probe::Full => unreachable!("gate guarantees an empty slot"),
        }
    }

    /// Replace the value of a present key. Returns false (dropping
    /// `value`) when the key is absent.
    pub fn update<Q>(&mut self, key: &Q, value: V) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_of(key);
        match probe::locate(&self.slots, hash as usize, |k| k.borrow() == key) {
            Probe::Hit(idx) => {
                *self.slots.live_value_mut(idx) = value;
                true
            }
            _ => false,
        }
    }

    /// Insert or replace, returning the previous entry if there was one.
    pub fn fetch_put(&mut self, key: K, value: V) -> Result<Option<(K, V)>, MapError> {
        self.adjust_before_insert()?;
        let hash = self.hash_of(&key);
        match probe::locate(&self.slots, hash as usize, |k| *k == key) {
            Probe::Hit(idx) => match self.slots.replace(idx, Slot::Live { key, value }) {
                Slot::Live { key, value } => Ok(Some((key, value))),
                _ => unreachable!("probe hit on a non-live slot"),
            },
            Probe::Vacant(idx) => {
                self.occupy(idx, key, value);
                Ok(None)
            }
            Probe::Full => unreachable!("gate guarantees an empty slot"),
        }
    }

    /// Like [`put`](Self::put), but never resizes. Returns false — with
    /// the map untouched — when every slot is live with another key.
    pub fn put_assume_capacity(&mut self, key: K, value: V) -> bool {
        let hash = self.hash_of(&key);
        match probe::locate(&self.slots, hash as usize, |k| *k == key) {
            Probe::Hit(idx) => {
                *self.slots.live_value_mut(idx) = value;
                true
            }
            Probe::Vacant(idx) => {
                self.occupy(idx, key, value);
                true
            }
            Probe::Full => false,
        }
    }

    /// Look up `key`, inserting `fill()` when absent. The closure runs
    /// only on insertion; when the key was present it does not run and
    /// the passed `key` is dropped.
    pub fn get_or_insert_with<F>(&mut self, key: K, fill: F) -> Result<EntryRef<'_, K, V>, MapError>
    where
        F: FnOnce() -> V,
    {
        self.adjust_before_insert()?;
        let hash = self.hash_of(&key);
        match probe::locate(&self.slots, hash as usize, |k| *k == key) {
            Probe::Hit(idx) => {
                let (key, value) = self.slots.live_entry_mut(idx);
                Ok(EntryRef {
                    found_existing: true,
                    value,
                    key,
                })
            }
            Probe::Vacant(idx) => {
                self.occupy(idx, key, fill());
                let (key, value) = self.slots.live_entry_mut(idx);
                Ok(EntryRef {
                    found_existing: false,
                    value,
                    key,
                })
            }
            Probe::Full => unreachable!("gate guarantees an empty slot"),
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_of(key);
        match probe::locate(&self.slots, hash as usize, |k| k.borrow() == key) {
            Probe::Hit(idx) => Some(self.slots.live_entry(idx).1),
            _ => None,
        }
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_of(key);
        match probe::locate(&self.slots, hash as usize, |k| k.borrow() == key) {
            Probe::Hit(idx) => Some(self.slots.live_value_mut(idx)),
            _ => None,
        }
    }

    /// Look up `key`, returning the stored key alongside the value.
    pub fn get_entry<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_of(key);
        match probe::locate(&self.slots, hash as usize, |k| k.borrow() == key) {
            Probe::Hit(idx) => Some(self.slots.live_entry(idx)),
            _ => None,
        }
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_of(key);
        matches!(
            probe::locate(&self.slots, hash as usize, |k| k.borrow() == key),
            Probe::Hit(_)
        )
    }

    /// Delete `key`. The slot becomes a tombstone; nothing shifts.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.fetch_remove(key).is_some()
    }

    /// Delete `key`, returning the removed entry.
    pub fn fetch_remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_of(key);
        let idx = match probe::locate(&self.slots, hash as usize, |k| k.borrow() == key) {
            Probe::Hit(idx) => idx,
            _ => return None,
        };
        self.live -= 1;
        self.tombstones += 1;
        match self.slots.replace(idx, Slot::Tombstone) {
            Slot::Live { key, value } => Some((key, value)),
            _ => unreachable!("probe hit on a non-live slot"),
        }
    }

    /// Raise the capacity class until `target` entries fit with 25%
    /// headroom, so `target` subsequent distinct inserts rebuild
    /// nothing. Never shrinks.
    pub fn ensure_capacity(&mut self, target: usize) -> Result<(), MapError> {
        let wanted = capacity::class_for_count(target).ok_or(MapError::CapacityExhausted)?;
        if wanted > self.class {
            self.rebuild(wanted)?;
        }
        Ok(())
    }

    /// Shrink to the smallest class that keeps 25% headroom, but only
    /// when load has fallen below 40%; otherwise a silent no-op.
    pub fn reduce_memory(&mut self) -> Result<(), MapError> {
        if !capacity::underloaded(self.live, self.slots.len()) {
            return Ok(());
        }
        let wanted = capacity::class_for_count(self.live).ok_or(MapError::CapacityExhausted)?;
        if wanted < self.class {
            self.rebuild(wanted)?;
        }
        Ok(())
    }

    /// The adjust-before-insert gate: grow when one more live entry
    /// would cross 7/8 load; otherwise purge tombstones by rebuilding
    /// at `max(class - 1, smallest class fitting live)` once live and
    /// tombstone slots together exhaust the usable 7/8.
    fn adjust_before_insert(&mut self) -> Result<(), MapError> {
        let len = self.slots.len();
        if capacity::over_load(self.live, len) {
            if self.class >= MAX_CLASS {
                return Err(MapError::CapacityExhausted);
            }
            self.rebuild(self.class + 1)
        } else if capacity::saturated(self.live, self.tombstones, len) {
            let floor =
                capacity::class_for_count(self.live).ok_or(MapError::CapacityExhausted)?;
            self.rebuild(self.class.saturating_sub(1).max(floor))
        } else {
            Ok(())
        }
    }

    /// Allocate at `target`, re-seat every live entry, swap, drop the
    /// old array. On allocation failure the map is untouched.
    fn rebuild(&mut self, target: u8) -> Result<(), MapError> {
        let mut fresh = SlotArray::with_class(target)?;
        let mask = fresh.mask();
        for idx in 0..self.slots.len() {
            let Slot::Live { key, value } = self.slots.replace(idx, Slot::Empty) else {
                continue;
            };
            let home = self.hasher.hash_one(&key) as usize & mask;
            let at = probe::first_empty(&fresh, home)
                .expect("rebuild target must have room for every live entry");
            fresh.replace(at, Slot::Live { key, value });
        }
        self.slots = fresh;
        self.class = target;
        self.tombstones = 0;
        Ok(())
    }

    /// Write a live entry into a vacant slot, reclaiming a tombstone.
    fn occupy(&mut self, idx: usize, key: K, value: V) {
        if matches!(self.slots.slot(idx), Slot::Tombstone) {
            self.tombstones -= 1;
        }
        self.slots.replace(idx, Slot::Live { key, value });
        self.live += 1;
    }
}

impl<K, V, S> Clone for ChurnMap<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    /// Deep copy: an independently owned slot array with cloned entries.
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            live: self.live,
            tombstones: self.tombstones,
            class: self.class,
            hasher: self.hasher.clone(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChurnMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut ChurnMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
