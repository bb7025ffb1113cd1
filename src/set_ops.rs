//! Set-algebra combinators over whole maps.
//!
//! All four build a new owned map by cloning one operand and replaying
//! the other into it, always iterating the smaller side: the cost is
//! one clone of the larger plus O(|smaller|) probes.

use crate::map::{ChurnMap, MapError};
use core::hash::{BuildHasher, Hash};

impl<K, V, S> ChurnMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    /// Entries of `self` and `other` combined.
    ///
    /// On keys present in both, the smaller operand's value wins,
    /// because the smaller side is replayed over a clone of the larger.
    /// Equal sizes treat `self` as the larger, so `other` wins.
    pub fn union(&self, other: &Self) -> Result<Self, MapError> {
        let (larger, smaller) = if other.len() > self.len() {
            (other, self)
        } else {
            (self, other)
        };
        let mut out = larger.clone();
        for (k, v) in smaller.iter() {
            out.put(k.clone(), v.clone())?;
        }
        Ok(out)
    }

    /// Entries whose keys appear in both maps, with the smaller
    /// operand's values.
    pub fn intersection(&self, other: &Self) -> Result<Self, MapError> {
        let (larger, smaller) = if other.len() > self.len() {
            (other, self)
        } else {
            (self, other)
        };
        let mut out = smaller.clone();
        for (k, _) in smaller.iter() {
            if !larger.contains_key(k) {
                out.remove(k);
            }
        }
        Ok(out)
    }

    /// Entries whose keys appear in exactly one of the two maps.
    pub fn symmetric_difference(&self, other: &Self) -> Result<Self, MapError> {
        let (larger, smaller) = if other.len() > self.len() {
            (other, self)
        } else {
            (self, other)
        };
        let mut out = larger.clone();
        for (k, v) in smaller.iter() {
            let found = out
                .get_or_insert_with(k.clone(), || v.clone())?
                .found_existing;
            if found {
                out.remove(k);
            }
        }
        Ok(out)
    }

    /// Entries of `self` whose keys `other` does not contain.
    pub fn relative_complement(&self, other: &Self) -> Result<Self, MapError> {
        let mut out = self.clone();
        for (k, _) in self.iter() {
            if other.contains_key(k) {
                out.remove(k);
            }
        }
        Ok(out)
    }
}
