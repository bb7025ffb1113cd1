//! Capacity ladder and rebuild-policy predicates.
//!
//! Slot-array lengths are drawn from a fixed ladder of powers of two;
//! the current length is `LADDER[class]` for a small class index. All
//! load decisions are integer-ratio comparisons against the maximum
//! load of 7/8.

pub(crate) const NUM_CLASSES: usize = 41;

/// Slot-array lengths, indexed by capacity class: 8 up to 2^43.
pub(crate) const LADDER: [usize; NUM_CLASSES] = {
    let mut table = [0usize; NUM_CLASSES];
    let mut class = 0;
    while class < NUM_CLASSES {
        table[class] = 8usize << class;
        class += 1;
    }
    table
};

pub(crate) const MAX_CLASS: u8 = (NUM_CLASSES - 1) as u8;

#[inline]
pub(crate) fn length_of(class: u8) -> usize {
    LADDER[usize::from(class)]
}

/// One more live entry would push past 7/8 occupancy.
#[inline]
pub(crate) fn over_load(live: usize, len: usize) -> bool {
    live * 8 > len * 7
}

/// Live and tombstone slots together have exhausted the usable 7/8 of
/// the table; empties are too scarce for probes to stay short.
#[inline]
pub(crate) fn saturated(live: usize, tombstones: usize, len: usize) -> bool {
    (live + tombstones) * 8 > len * 7
}

/// Load is below the 40% shrink threshold.
#[inline]
pub(crate) fn underloaded(live: usize, len: usize) -> bool {
    live * 5 < len * 2
}

/// Smallest class whose length leaves at least 25% headroom over
/// `count` live entries. `None` when no class on the ladder suffices.
pub(crate) fn class_for_count(count: usize) -> Option<u8> {
    let need = count.checked_add(count.div_ceil(4))?;
    LADDER
        .iter()
        .position(|&len| len >= need)
        .map(|class| class as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_endpoints() {
        assert_eq!(LADDER[0], 8);
        assert_eq!(LADDER[NUM_CLASSES - 1], 1usize << 43);
        assert_eq!(length_of(MAX_CLASS), 1usize << 43);
    }

    #[test]
    fn ladder_is_strictly_doubling() {
        for class in 1..NUM_CLASSES {
            assert_eq!(LADDER[class], LADDER[class - 1] * 2);
        }
    }

    #[test]
    fn class_for_count_keeps_headroom() {
        assert_eq!(class_for_count(0), Some(0));
        assert_eq!(class_for_count(1), Some(0));
        assert_eq!(class_for_count(6), Some(0)); // need 8, fits class 0
        assert_eq!(class_for_count(7), Some(1)); // need 9
        assert_eq!(class_for_count(12), Some(1)); // need 15
        assert_eq!(class_for_count(13), Some(2)); // need 17
        assert_eq!(class_for_count(100), Some(4)); // need 125, length 128
    }

    #[test]
    fn class_for_count_exhausts_past_the_ladder() {
        assert_eq!(class_for_count(usize::MAX), None);
        assert_eq!(class_for_count(1usize << 43), None); // need > 2^43
    }

    #[test]
    fn load_predicates_at_the_boundaries() {
        // 7/8 of 16 is 14: 14 live is fine, 15 is over.
        assert!(!over_load(14, 16));
        assert!(over_load(15, 16));
        // Saturation counts tombstones too.
        assert!(!saturated(10, 4, 16));
        assert!(saturated(10, 5, 16));
        // 40% of 32 is 12.8: 12 is underloaded, 13 is not.
        assert!(underloaded(12, 32));
        assert!(!underloaded(13, 32));
    }
}
