//! The allocator object.
//!
//! Every global the original keeps as a file-scope `static` (`heap_start`,
//! `heap_end`, `last`, `free_list`, the nine `listN` class heads, and the
//! latent, zero-initialized `start_class`) becomes a field of `Heap`.
//! Public operations are methods; a single process-wide instance is
//! exposed through `src/global.rs` for API compatibility with a
//! libc-style four-call interface.

use log::{debug, error, trace};

use crate::boundary_tag::PREVFREE;
use crate::config::Config;
use crate::error::HeapError;
use crate::offset::HeaderOffset;
use crate::size_class::NUM_CLASSES;

/// Verbosity levels for [`Heap::check`], matching the original's
/// `mm_checkheap(int verbose)`: `0` checks silently, `1` prints and
/// checks, `2` prints only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Silent,
    PrintAndCheck,
    PrintOnly,
}

/// Owns the entire allocator state: the `sbrk`-backed heap region, the
/// boundary-tag cursors, and the segregated free list.
///
/// Not `Send`/`Sync` (see `src/global.rs` for how the process-wide
/// instance is guarded for single-threaded use).
pub struct Heap {
    pub(crate) heap_start: Option<*mut u8>,
    pub(crate) heap_end: Option<*mut u8>,
    pub(crate) last: Option<HeaderOffset>,
    pub(crate) free_list: Option<HeaderOffset>,
    pub(crate) class_head: [Option<HeaderOffset>; NUM_CLASSES],
    pub(crate) start_class: usize,
    pub(crate) config: Config,
}

impl Heap {
    /// Requests the initial alignment padding from the host and resets all
    /// allocator state, mirroring `mm_init`.
    pub fn new(config: Config) -> Result<Heap, HeapError> {
        if !config.is_valid() {
            return Err(HeapError::InvalidConfig(config));
        }
        let padding = config.alignment - 4;
        let ptr = unsafe { libc::sbrk(padding as libc::intptr_t) };
        if ptr == usize::MAX as *mut libc::c_void {
            return Err(HeapError::OutOfMemory);
        }
        Ok(Heap {
            heap_start: None,
            heap_end: None,
            last: None,
            free_list: None,
            class_head: [None; NUM_CLASSES],
            start_class: 0,
            config,
        })
    }

    /// Allocates `size` bytes, returning an alignment-aligned pointer with
    /// at least `size` writable bytes, or `None` on `sbrk` failure.
    pub fn malloc(&mut self, size: usize) -> Option<*mut u8> {
        let reqsz = self.blksz(size);
        trace!("malloc: size={size} reqsz={reqsz}");
        let fit = match self.find_fit(reqsz) {
            Some(fit) => fit,
            None => match self.alloc_with_sbrk(reqsz) {
                Ok(fit) => fit,
                Err(_) => return None,
            },
        };
        if let Some(next) = self.bt_next(fit) {
            self.bt_clr_prevfree(next);
        }
        debug!("malloc: returning block at offset {:#x}", fit.as_usize());
        Some(self.bt_payload(fit))
    }

    /// Frees a block previously returned by `malloc`/`realloc`/`calloc`.
    /// A null `ptr` is a no-op. Coalesces with free neighbors: the
    /// successor is merged before the predecessor so that `last` updates
    /// stay consistent (merging with the successor may move `last`
    /// onto the freed block before the predecessor merge runs).
    pub fn free(&mut self, ptr: *mut u8) {
        if ptr.is_null() {
            return;
        }
        let mut bt = self.bt_fromptr(ptr);
        trace!("free: offset={:#x} size={}", bt.as_usize(), self.bt_size(bt));
        let prevfree = self.bt_get_prevfree(bt);
        self.bt_make(bt, self.bt_size(bt), prevfree as u32 * PREVFREE);
        let footer = self.bt_footer(bt);
        self.bt_make(footer, self.bt_size(bt), prevfree as u32 * PREVFREE);

        if let Some(next) = self.bt_next(bt) {
            if self.bt_free(next) {
                self.fl_remove(next);
                self.merge_blocks(bt, next);
            }
        }
        if self.bt_get_prevfree(bt) {
            if let Some(prev) = self.bt_prev(bt) {
                self.fl_remove(prev);
                self.merge_blocks(prev, bt);
                bt = prev;
            }
        }
        self.fl_add(bt);
        if let Some(next) = self.bt_next(bt) {
            self.bt_set_prevfree(next);
        }
        debug!("free: coalesced block now at offset {:#x}", bt.as_usize());
    }

    /// Resizes an allocation. `new_size == 0` frees and returns `None`;
    /// `old_ptr == None` allocates. Grows in place by merging a free
    /// successor when possible; otherwise falls back to `malloc` + copy +
    /// free, leaving the original allocation untouched on failure.
    pub fn realloc(&mut self, old_ptr: Option<*mut u8>, new_size: usize) -> Option<*mut u8> {
        if new_size == 0 {
            if let Some(ptr) = old_ptr {
                self.free(ptr);
            }
            return None;
        }
        let Some(old_ptr) = old_ptr else {
            return self.malloc(new_size);
        };

        let bt = self.bt_fromptr(old_ptr);
        let old_payload_cap = self.bt_size(bt) - 4;
        if old_payload_cap >= new_size {
            return Some(old_ptr);
        }

        let reqsz = self.blksz(new_size);
        if let Some(next) = self.bt_next(bt) {
            if self.bt_free(next) && self.bt_size(bt) + self.bt_size(next) - 4 >= reqsz {
                let addsize = reqsz - self.bt_size(bt);
                if self.bt_size(next) - addsize > 0 {
                    self.split_block(next, addsize);
                }
                self.fl_remove(next);
                self.merge_blocks(bt, next);
                if let Some(new_next) = self.bt_next(bt) {
                    self.bt_clr_prevfree(new_next);
                }
                debug!("realloc: grew in place at offset {:#x}", bt.as_usize());
                return Some(old_ptr);
            }
        }

        let new_ptr = self.malloc(new_size)?;
        let old_size = self.bt_size(bt) - 4;
        let copy_len = old_size.min(new_size);
        unsafe {
            std::ptr::copy_nonoverlapping(old_ptr, new_ptr, copy_len);
        }
        self.free(old_ptr);
        Some(new_ptr)
    }

    /// Zero-initialized allocation of `n * size` bytes. Returns `None` on
    /// overflow or allocation failure. Overflow detection is new relative
    /// to the original, which has none (spec-flagged defect fix).
    pub fn calloc(&mut self, n: usize, size: usize) -> Option<*mut u8> {
        let bytes = n.checked_mul(size)?;
        let ptr = self.malloc(bytes)?;
        unsafe {
            std::ptr::write_bytes(ptr, 0, bytes);
        }
        Some(ptr)
    }

    /// Verifies every invariant in the allocator's data model, optionally
    /// logging heap and free-list contents first. Never mutates state.
    pub fn check(&self, verbosity: Verbosity) -> Result<(), HeapError> {
        if verbosity != Verbosity::Silent {
            self.log_state();
        }
        if verbosity == Verbosity::PrintOnly {
            return Ok(());
        }

        let mut b = self.heap_start.map(|_| HeaderOffset::ZERO);
        while let Some(off) = b {
            let next = self.bt_next(off);
            if let Some(n) = next {
                if self.bt_free(off) && !self.bt_get_prevfree(n) {
                    return Err(HeapError::MissingPrevFreeFlag(n.as_usize()));
                }
                if self.bt_used(off) && self.bt_get_prevfree(n) {
                    return Err(HeapError::SpuriousPrevFreeFlag(n.as_usize()));
                }
            }
            b = next;
        }

        if let Some(head) = self.free_list {
            let mut cur = head;
            loop {
                if self.bt_used(cur) {
                    return Err(HeapError::UsedBlockOnFreeList(cur.as_usize()));
                }
                cur = self.fl_next(cur);
                if cur == head {
                    break;
                }
            }
        }

        let mut b = self.heap_start.map(|_| HeaderOffset::ZERO);
        while let Some(off) = b {
            if self.bt_free(off) && !self.fl_search(off) {
                return Err(HeapError::FreeBlockMissingFromList(off.as_usize()));
            }
            b = self.bt_next(off);
        }

        let mut b = self.heap_start.map(|_| HeaderOffset::ZERO);
        while let Some(off) = b {
            if self.bt_free(off) && self.bt_get_prevfree(off) {
                if let Some(prev) = self.bt_prev(off) {
                    return Err(HeapError::AdjacentFreeBlocks(prev.as_usize(), off.as_usize()));
                }
            }
            b = self.bt_next(off);
        }

        let heap_len = match (self.heap_start, self.heap_end) {
            (Some(s), Some(e)) => e as usize - s as usize,
            _ => 0,
        };
        let mut b = self.heap_start.map(|_| HeaderOffset::ZERO);
        while let Some(off) = b {
            if let Some(p) = self.bt_prev(off) {
                if p.as_usize() >= heap_len {
                    return Err(HeapError::LinkOutOfBounds(off.as_usize()));
                }
            }
            if let Some(n) = self.bt_next(off) {
                if n.as_usize() > heap_len {
                    return Err(HeapError::LinkOutOfBounds(off.as_usize()));
                }
            }
            b = self.bt_next(off);
        }

        if let Some(last) = self.last {
            if self.bt_next(last).is_some() {
                return Err(HeapError::LastBlockMismatch);
            }
        }

        Ok(())
    }

    fn log_state(&self) {
        if self.heap_start.is_none() {
            return;
        }
        let mut i = 0usize;
        let mut b = Some(HeaderOffset::ZERO);
        while let Some(off) = b {
            debug!(
                "block {i}: offset={:#x} size={} used={} prevfree={}",
                off.as_usize(),
                self.bt_size(off),
                self.bt_used(off),
                self.bt_get_prevfree(off)
            );
            i += 1;
            b = self.bt_next(off);
        }
        if let Some(head) = self.free_list {
            let mut i = 0usize;
            let mut cur = head;
            loop {
                debug!(
                    "free block {i}: offset={:#x} size={} next={:#x} prev={:#x}",
                    cur.as_usize(),
                    self.bt_size(cur),
                    self.fl_next(cur).as_usize(),
                    self.fl_prev(cur).as_usize()
                );
                i += 1;
                cur = self.fl_next(cur);
                if cur == head {
                    break;
                }
            }
        }
    }

    /// Logs and panics on an invariant violation, matching the original's
    /// `exit(EXIT_FAILURE)`: the heap is unrecoverable once corrupted.
    pub fn check_or_panic(&self, verbosity: Verbosity) {
        if let Err(e) = self.check(verbosity) {
            error!("heap invariant violation: {e}");
            panic!("heap invariant violation: {e}");
        }
    }
}
