//! Size-class index.
//!
//! The class of a block of size `s` is `min(next_pow2(s), listnum_max)`.
//! The original keeps nine separate `static word_t *listN` globals plus a
//! tenth "more" bucket and a `switch` in `choose_class` to pick one; the
//! idiomatic replacement is a flat array indexed by class number: the
//! same fixed, small class set, the same O(1) selection, no tree and no
//! binary search, just without nine named globals.

use crate::heap::Heap;
use crate::offset::HeaderOffset;

/// Recognized classes: {16, 32, 64, 128, 256, 512, 1024, 2048, 4096, more}.
pub(crate) const NUM_CLASSES: usize = 10;
const CLASS_SIZES: [usize; NUM_CLASSES - 1] = [16, 32, 64, 128, 256, 512, 1024, 2048, 4096];

/// Rounds `size` up to the next power of two, clamped to `listnum_max`.
pub(crate) fn clp2(size: usize, listnum_max: usize) -> usize {
    if size == 0 {
        return 1.min(listnum_max);
    }
    let rounded = size.next_power_of_two();
    rounded.min(listnum_max)
}

/// Maps a size class (a `clp2` result) to its slot in the class-head table.
/// Any class above 4096 (including `listnum_max` itself when larger) falls
/// into the trailing "more" bucket, matching `choose_class`'s `default`.
pub(crate) fn class_index(size_class: usize) -> usize {
    CLASS_SIZES
        .iter()
        .position(|&c| c == size_class)
        .unwrap_or(NUM_CLASSES - 1)
}

impl Heap {
    pub(crate) fn class_head(&self, idx: usize) -> Option<HeaderOffset> {
        self.class_head[idx]
    }

    pub(crate) fn set_class_head(&mut self, idx: usize, value: Option<HeaderOffset>) {
        self.class_head[idx] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clp2_rounds_to_power_of_two() {
        assert_eq!(clp2(1, 8192), 1);
        assert_eq!(clp2(15, 8192), 16);
        assert_eq!(clp2(16, 8192), 16);
        assert_eq!(clp2(17, 8192), 32);
        assert_eq!(clp2(4096, 8192), 4096);
        assert_eq!(clp2(4097, 8192), 8192);
    }

    #[test]
    fn clp2_clamps_to_listnum_max() {
        assert_eq!(clp2(1_000_000, 8192), 8192);
    }

    #[test]
    fn class_index_matches_known_classes() {
        assert_eq!(class_index(16), 0);
        assert_eq!(class_index(32), 1);
        assert_eq!(class_index(4096), 8);
        assert_eq!(class_index(8192), NUM_CLASSES - 1);
    }
}
