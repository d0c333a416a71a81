//! Split and merge operators.
//!
//! These restructure blocks in place; neither touches the free list on its
//! own. Callers remove/insert as appropriate (see `placement.rs`,
//! `heap.rs`) so the two concerns stay independently testable.

use crate::boundary_tag::PREVFREE;
use crate::heap::Heap;
use crate::offset::HeaderOffset;

impl Heap {
    /// Merges adjacent blocks `a` and `b` (`a` immediately followed by `b`)
    /// into one block at `a`'s address, retaining `a`'s flags. Updates
    /// `last` if `b` was the final block. Does not touch the free list.
    pub(crate) fn merge_blocks(&mut self, a: HeaderOffset, b: HeaderOffset) {
        let size = self.bt_size(a) + self.bt_size(b);
        let flags = self.bt_flags(a);
        self.bt_make(a, size, flags);
        let footer = self.bt_footer(a);
        self.bt_make(footer, size, flags);
        if self.last == Some(b) {
            self.last = Some(a);
        }
    }

    /// Splits free block `bt` (size `>= size`) into an `size`-byte prefix
    /// (keeping `bt`'s offset and flags) and a free suffix with `PREVFREE`
    /// set. Both halves are (re-)inserted into the free list; `bt` itself
    /// is removed first, matching the source's `fl_remove`-then-`fl_add`
    /// sequencing. Updates `last` if `bt` was the final block.
    pub(crate) fn split_block(&mut self, bt: HeaderOffset, size: usize) {
        self.fl_remove(bt);
        let old_size = self.bt_size(bt);
        let flags = self.bt_flags(bt);
        self.bt_make(bt, size, flags);

        let suffix = HeaderOffset(bt.0 + size as u32);
        self.bt_make(suffix, old_size - size, flags | PREVFREE);
        let suffix_footer = self.bt_footer(suffix);
        self.bt_make(suffix_footer, old_size - size, flags | PREVFREE);
        if self.last == Some(bt) {
            self.last = Some(suffix);
        }

        let prefix_footer = self.bt_footer(bt);
        self.bt_make(prefix_footer, size, flags);

        self.fl_add(bt);
        self.fl_add(suffix);
    }
}
