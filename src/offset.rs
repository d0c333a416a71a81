//! Heap-relative offsets.
//!
//! The original allocator stores free-list links as 4-byte offsets from
//! `heap_start` rather than full pointers, so a link fits in one word even
//! on a 64-bit address space. `HeaderOffset` makes that encoding a type
//! instead of ad-hoc pointer subtraction.

use std::fmt;

/// Byte offset of a block header, measured from the heap base.
///
/// A `HeaderOffset` of 0 denotes the heap base itself (used as the "link to
/// self" sentinel on a single-element free list, matching the source).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HeaderOffset(pub(crate) u32);

impl HeaderOffset {
    pub(crate) const ZERO: HeaderOffset = HeaderOffset(0);

    pub(crate) fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for HeaderOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HeaderOffset({:#x})", self.0)
    }
}
