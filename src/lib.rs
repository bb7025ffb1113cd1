//! churnmap: an open-addressing hash map that rebuilds itself under
//! tombstone pressure.
//!
//! Removals leave tombstones in place instead of shifting entries, and
//! classical open-addressing tables slow down as those tombstones pile
//! up on probe chains. [`ChurnMap`] rebuilds its slot array not only
//! when load crosses the ceiling but also when live and tombstone slots
//! together exhaust the usable part of the table, purging every
//! tombstone without growing. Mixed read/insert/remove workloads on a
//! stable working set therefore keep both probe lengths and capacity
//! bounded.
//!
//! Capacities come from a fixed ladder of powers of two (8 up to 2^43);
//! the set-algebra combinators (union, intersection, symmetric
//! difference, relative complement) are derived from the map protocol.
//!
//! ```
//! use churnmap::ChurnMap;
//!
//! let mut m: ChurnMap<String, u32> = ChurnMap::new();
//! m.put("a".to_string(), 1)?;
//! m.put("b".to_string(), 2)?;
//! assert_eq!(m.get("a"), Some(&1));
//! assert!(m.remove("a"));
//! assert_eq!(m.len(), 1);
//! # Ok::<(), churnmap::MapError>(())
//! ```

mod capacity;
mod iter;
mod map;
mod probe;
mod set_ops;
mod slot;

pub use iter::{Iter, IterMut};
pub use map::{ChurnMap, EntryRef, MapError};
