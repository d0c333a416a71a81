//! Free-list primitives.
//!
//! Free blocks are threaded into one circular doubly-linked list; forward
//! and back links live in the first two payload words and are stored as
//! heap-relative byte offsets (see [`crate::offset`]), not pointers, so a
//! link costs 4 bytes even on a 64-bit address space. `class_head[c]`
//! additionally marks the first block of size class `c` within that single
//! list, so insertion keeps same-class blocks clustered without a separate
//! per-class list header.

use crate::heap::Heap;
use crate::offset::HeaderOffset;

impl Heap {
    #[inline]
    fn fl_next_link(&self, off: HeaderOffset) -> HeaderOffset {
        HeaderOffset(off.0 + 4)
    }

    #[inline]
    fn fl_prev_link(&self, off: HeaderOffset) -> HeaderOffset {
        HeaderOffset(off.0 + 8)
    }

    /// Successor of `off` in the free list.
    pub(crate) fn fl_next(&self, off: HeaderOffset) -> HeaderOffset {
        HeaderOffset(unsafe { self.read_word(self.fl_next_link(off)) })
    }

    /// Predecessor of `off` in the free list.
    pub(crate) fn fl_prev(&self, off: HeaderOffset) -> HeaderOffset {
        HeaderOffset(unsafe { self.read_word(self.fl_prev_link(off)) })
    }

    fn fl_set_next(&self, off: HeaderOffset, next: HeaderOffset) {
        unsafe { self.write_word(self.fl_next_link(off), next.0) };
    }

    fn fl_set_prev(&self, off: HeaderOffset, prev: HeaderOffset) {
        unsafe { self.write_word(self.fl_prev_link(off), prev.0) };
    }

    /// Walks the circular free list once looking for `target`.
    pub(crate) fn fl_search(&self, target: HeaderOffset) -> bool {
        let Some(head) = self.free_list else {
            return false;
        };
        let mut cur = head;
        loop {
            if cur == target {
                return true;
            }
            cur = self.fl_next(cur);
            if cur == head {
                return false;
            }
        }
    }

    /// Inserts `bt` into the free list, clustered with its size class.
    pub(crate) fn fl_add(&mut self, bt: HeaderOffset) {
        let size = self.bt_size(bt);
        let listnum = crate::size_class::clp2(size, self.config.listnum_max);
        let idx = crate::size_class::class_index(listnum);

        let Some(head) = self.free_list else {
            self.fl_set_next(bt, bt);
            self.fl_set_prev(bt, bt);
            self.free_list = Some(bt);
            self.set_class_head(idx, Some(bt));
            return;
        };

        let next = match self.class_head(idx) {
            Some(existing) => existing,
            None => {
                let mut found = None;
                let mut class_size = listnum;
                while found.is_none() && class_size <= self.config.listnum_max {
                    let candidate_idx = crate::size_class::class_index(class_size);
                    if let Some(candidate) = self.class_head(candidate_idx) {
                        found = Some(candidate);
                    }
                    if class_size == self.config.listnum_max {
                        break;
                    }
                    class_size *= 2;
                }
                found.unwrap_or(head)
            }
        };

        let prev = self.fl_prev(next);
        self.fl_set_next(prev, bt);
        self.fl_set_next(bt, next);
        self.fl_set_prev(bt, prev);
        self.fl_set_prev(next, bt);
        self.set_class_head(idx, Some(bt));

        if listnum < self.start_class {
            self.start_class = listnum;
            self.free_list = Some(bt);
        }
    }

    /// Removes `bt` from the free list, fixing up its class head.
    pub(crate) fn fl_remove(&mut self, bt: HeaderOffset) {
        let size = self.bt_size(bt);
        let listnum = crate::size_class::clp2(size, self.config.listnum_max);
        let idx = crate::size_class::class_index(listnum);

        let Some(head) = self.free_list else {
            return;
        };

        if self.fl_next(bt) == bt {
            self.free_list = None;
            self.set_class_head(idx, None);
            return;
        }

        let prev = self.fl_prev(bt);
        let next = self.fl_next(bt);
        self.fl_set_prev(next, prev);
        self.fl_set_next(prev, next);
        if head == bt {
            self.free_list = Some(next);
        }
        if self.class_head(idx) == Some(bt) {
            let next_listnum = crate::size_class::clp2(self.bt_size(next), self.config.listnum_max);
            if next_listnum == listnum {
                self.set_class_head(idx, Some(next));
            } else {
                self.set_class_head(idx, None);
            }
        }
    }
}
