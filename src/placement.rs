//! Placement engine: first-fit lookup and heap growth via `sbrk`.
//!
//! The disabled best-fit variant in the original source is intentionally
//! not ported. First-fit is the strategy the source itself calls
//! normative (it measurably outperforms best-fit on the target workload),
//! so the only implementation here is the one on the hot path.

use log::{debug, trace};

use crate::boundary_tag::{PREVFREE, USED};
use crate::error::HeapError;
use crate::heap::Heap;
use crate::offset::HeaderOffset;

impl Heap {
    /// Rounds a user request up to a block size: header word + payload,
    /// aligned.
    pub(crate) fn blksz(&self, size: usize) -> usize {
        crate::align::align_up(size + 4, self.config.alignment)
    }

    fn morecore(&self, size: usize) -> Option<*mut u8> {
        let ptr = unsafe { libc::sbrk(size as libc::intptr_t) };
        if ptr == usize::MAX as *mut libc::c_void {
            None
        } else {
            Some(ptr as *mut u8)
        }
    }

    /// Extends the heap and carves out a used block of `reqsz` bytes.
    ///
    /// Requests are rounded up to `sbrk_min` to amortize growth overhead
    /// for small allocations; the leftover is inserted into the free list.
    /// Sets `PREVFREE` on the new block to match the free-status of the
    /// previous `last` block.
    pub(crate) fn alloc_with_sbrk(&mut self, reqsz: usize) -> Result<HeaderOffset, HeapError> {
        trace!("alloc_with_sbrk: reqsz={reqsz}");
        let growth = if reqsz < self.config.sbrk_min {
            self.config.sbrk_min
        } else {
            reqsz
        };

        let prev_was_free = self.last.map(|l| self.bt_free(l));

        let raw = self.morecore(growth).ok_or(HeapError::OutOfMemory)?;

        if self.heap_start.is_none() {
            self.heap_start = Some(raw);
        }
        let new_end = unsafe { raw.add(growth) };
        self.heap_end = Some(new_end);

        let res = self.offset_of_ptr(raw as *mut u32);
        self.bt_make(res, reqsz, USED);
        if let Some(was_free) = prev_was_free {
            if was_free {
                self.bt_set_prevfree(res);
            } else {
                self.bt_clr_prevfree(res);
            }
        }
        self.last = Some(res);

        if growth > reqsz {
            let rest = HeaderOffset(res.0 + reqsz as u32);
            let rest_size = growth - reqsz;
            self.bt_make(rest, rest_size, 0);
            let footer = self.bt_footer(rest);
            self.bt_make(footer, rest_size, 0);
            self.fl_add(rest);
            debug!("alloc_with_sbrk: grew heap by {growth}, {rest_size} bytes left free");
        } else {
            debug!("alloc_with_sbrk: grew heap by exactly {growth}");
        }

        Ok(res)
    }

    /// First-fit search, entering the free list at the starting size class
    /// and scanning forward. Splits the block if it overshoots `reqsz`.
    pub(crate) fn find_fit(&mut self, reqsz: usize) -> Option<HeaderOffset> {
        let Some(free_list_head) = self.free_list else {
            return None;
        };

        let start_class = crate::size_class::clp2(reqsz, self.config.listnum_max);
        let mut bt = None;
        let mut class_size = start_class;
        loop {
            let idx = crate::size_class::class_index(class_size);
            if let Some(candidate) = self.class_head(idx) {
                bt = Some(candidate);
                break;
            }
            if class_size == self.config.listnum_max {
                break;
            }
            class_size *= 2;
        }

        let mut cur = bt?;
        loop {
            let size = self.bt_size(cur);
            if size == reqsz {
                trace!("find_fit: exact fit at size {size}");
                self.fl_remove(cur);
                let flags = (self.bt_get_prevfree(cur) as u32) * PREVFREE | USED;
                self.bt_make(cur, reqsz, flags);
                return Some(cur);
            } else if size > reqsz {
                trace!("find_fit: splitting block of size {size} for request {reqsz}");
                self.split_block(cur, reqsz);
                self.fl_remove(cur);
                let flags = (self.bt_get_prevfree(cur) as u32) * PREVFREE | USED;
                self.bt_make(cur, reqsz, flags);
                return Some(cur);
            }
            cur = self.fl_next(cur);
            if cur == free_list_head {
                break;
            }
        }
        None
    }
}
