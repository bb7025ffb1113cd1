// ChurnMap property tests (consolidated).
//
// Property 1: under a random operation sequence, lookups agree with a
//  std::collections::HashMap model at every step (the latest surviving
//  put for each key wins).
// Property 2: len() always equals the model's entry count.
// Property 3: iteration visits each live entry exactly once and covers
//  exactly the model's key set.
// Property 4: churning a stable live set never grows capacity; the
//  tombstone-saturation rebuild purges instead.
// Property 5: a clone answers like the original, and mutations on
//  either side stay invisible to the other.
use churnmap::ChurnMap;
use proptest::prelude::*;
use std::collections::{HashMap, HashSet, VecDeque};

proptest! {
    #[test]
    fn prop_matches_hashmap_model(
        ops in proptest::collection::vec((0u8..=6u8, 0u16..48u16, any::<u32>()), 1..300)
    ) {
        let mut m: ChurnMap<u16, u32> = ChurnMap::new();
        let mut model: HashMap<u16, u32> = HashMap::new();

        for (op, key, value) in ops {
            match op {
                // Insert or replace.
                0 => {
                    m.put(key, value).unwrap();
                    model.insert(key, value);
                }
                // Insert only if absent.
                1 => {
                    let inserted = m.put_no_clobber(key, value).unwrap();
                    prop_assert_eq!(inserted, !model.contains_key(&key));
                    model.entry(key).or_insert(value);
                }
                // Replace only if present.
                2 => {
                    let updated = m.update(&key, value);
                    prop_assert_eq!(updated, model.contains_key(&key));
                    if let Some(v) = model.get_mut(&key) {
                        *v = value;
                    }
                }
                // Replace, returning the previous entry.
                3 => {
                    let prev = m.fetch_put(key, value).unwrap();
                    let model_prev = model.insert(key, value);
                    prop_assert_eq!(prev, model_prev.map(|v| (key, v)));
                }
                // Remove.
                4 => {
                    let removed = m.remove(&key);
                    prop_assert_eq!(removed, model.remove(&key).is_some());
                }
                // Remove, returning the entry.
                5 => {
                    let fetched = m.fetch_remove(&key);
                    let model_fetched = model.remove(&key);
                    prop_assert_eq!(fetched, model_fetched.map(|v| (key, v)));
                }
                // Lookup-or-insert with a lazy fill.
                6 => {
                    let was_present = model.contains_key(&key);
                    let entry = m.get_or_insert_with(key, || value).unwrap();
                    prop_assert_eq!(entry.found_existing, was_present);
                    model.entry(key).or_insert(value);
                    prop_assert_eq!(*entry.value, model[&key]);
                }
                _ => unreachable!(),
            }

            prop_assert_eq!(m.len(), model.len());
            prop_assert_eq!(m.get(&key).copied(), model.get(&key).copied());
            prop_assert_eq!(m.contains_key(&key), model.contains_key(&key));
        }

        // Final sweep: every surviving entry agrees.
        for (k, v) in &model {
            prop_assert_eq!(m.get(k), Some(v));
        }
    }

    #[test]
    fn prop_iteration_visits_each_live_entry_once(
        inserts in proptest::collection::hash_set(0u16..512u16, 0..150),
        removals in proptest::collection::hash_set(0u16..512u16, 0..150)
    ) {
        let mut m: ChurnMap<u16, u32> = ChurnMap::new();
        for &k in &inserts {
            m.put(k, u32::from(k) * 3).unwrap();
        }
        for k in &removals {
            let removed = m.remove(k);
            prop_assert_eq!(removed, inserts.contains(k));
        }

        let expected: HashSet<u16> = inserts.difference(&removals).copied().collect();
        let mut seen = HashSet::new();
        for (k, v) in m.iter() {
            prop_assert_eq!(*v, u32::from(*k) * 3);
            prop_assert!(seen.insert(*k), "entry yielded twice");
        }
        prop_assert_eq!(&seen, &expected);
        prop_assert_eq!(m.len(), expected.len());
    }

    #[test]
    fn prop_churn_never_grows_capacity(
        live_size in 1usize..150,
        rounds in 1usize..400
    ) {
        let mut m: ChurnMap<u64, u64> = ChurnMap::new();
        let mut queue = VecDeque::new();
        for k in 0..live_size as u64 {
            m.put(k, k).unwrap();
            queue.push_back(k);
        }
        let settled = m.capacity();

        let mut next = 1_000_000u64;
        for _ in 0..rounds {
            let gone = queue.pop_front().unwrap();
            prop_assert!(m.remove(&gone));
            m.put(next, next).unwrap();
            queue.push_back(next);
            next += 1;

            prop_assert_eq!(m.len(), live_size);
            prop_assert!(
                m.capacity() <= settled,
                "capacity grew under stable-size churn: {} > {}",
                m.capacity(),
                settled
            );
        }
    }

    #[test]
    fn prop_clone_is_deep_and_detached(
        pairs in proptest::collection::btree_map(0u16..256u16, any::<u32>(), 0..80),
        extra in 256u16..300u16
    ) {
        let mut original: ChurnMap<u16, u32> = ChurnMap::new();
        for (&k, &v) in &pairs {
            original.put(k, v).unwrap();
        }

        let mut copy = original.clone();
        prop_assert_eq!(copy.len(), original.len());
        for (&k, &v) in &pairs {
            prop_assert_eq!(copy.get(&k), Some(&v));
        }

        // Diverge: mutate the copy, drain the original.
        copy.put(extra, 1).unwrap();
        for (&k, _) in &pairs {
            prop_assert!(original.remove(&k));
        }
        prop_assert!(original.is_empty());
        prop_assert_eq!(copy.len(), pairs.len() + 1);
        for (&k, &v) in &pairs {
            prop_assert_eq!(copy.get(&k), Some(&v));
        }
        prop_assert_eq!(original.get(&extra), None);
    }
}
