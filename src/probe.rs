//! Linear probe engine.
//!
//! Probes step by one from the home index, wrapping at the array
//! length. Tombstones never terminate a walk; the first tombstone seen
//! is remembered and preferred as the insertion site, which reclaims
//! deleted slots as soon as a probe rediscovers them.

use crate::slot::{Slot, SlotArray};

pub(crate) enum Probe {
    /// A live slot whose key matched.
    Hit(usize),
    /// Insertion site for the (absent) key: the first tombstone on the
    /// chain if any, else the empty slot that terminated the walk.
    Vacant(usize),
    /// The walk visited every slot without a match or a reusable slot;
    /// every slot is live with some other key.
    Full,
}

/// Walk the probe chain for a key with home index `home`, using
/// `matches` for structural key equality.
pub(crate) fn locate<K, V>(
    slots: &SlotArray<K, V>,
    home: usize,
    mut matches: impl FnMut(&K) -> bool,
) -> Probe {
    let mask = slots.mask();
    let mut idx = home & mask;
    let mut first_tombstone = None;
    for _ in 0..slots.len() {
        match slots.slot(idx) {
            Slot::Empty => return Probe::Vacant(first_tombstone.unwrap_or(idx)),
            Slot::Tombstone => {
                if first_tombstone.is_none() {
                    first_tombstone = Some(idx);
                }
            }
            Slot::Live { key, .. } => {
                if matches(key) {
                    return Probe::Hit(idx);
                }
            }
        }
        idx = (idx + 1) & mask;
    }
    // Exhausted without an empty: the key is proven absent. A recorded
    // tombstone is still a legal insertion site.
    match first_tombstone {
        Some(idx) => Probe::Vacant(idx),
        None => Probe::Full,
    }
}

/// Rebuild-path probe: first empty slot from `home`. The target array
/// holds no tombstones, so the first non-live slot is it.
pub(crate) fn first_empty<K, V>(slots: &SlotArray<K, V>, home: usize) -> Option<usize> {
    let mask = slots.mask();
    let mut idx = home & mask;
    for _ in 0..slots.len() {
        if matches!(slots.slot(idx), Slot::Empty) {
            return Some(idx);
        }
        idx = (idx + 1) & mask;
    }
    None
}
