//! Boundary-tag primitives.
//!
//! A block header is a single 32-bit word: the size occupies the bits
//! above `log2(alignment)`, and the low bits carry `USED`/`PREVFREE`. Free
//! blocks additionally carry an identical footer word at their tail,
//! letting a predecessor be located in O(1), but only when `PREVFREE` is
//! set on the *successor*, which is the load-bearing optimization that
//! lets allocated blocks skip the footer entirely.

use crate::heap::Heap;
use crate::offset::HeaderOffset;

pub(crate) const USED: u32 = 0b01;
pub(crate) const PREVFREE: u32 = 0b10;

impl Heap {
    /// Raw pointer to the header word at `off`.
    ///
    /// # Safety
    /// `off` must reference a live header within `[heap_start, heap_end)`.
    #[inline]
    pub(crate) unsafe fn header_ptr(&self, off: HeaderOffset) -> *mut u32 {
        unsafe { self.heap_start.expect("heap not initialized").add(off.as_usize()) as *mut u32 }
    }

    #[inline]
    pub(crate) fn offset_of_ptr(&self, ptr: *mut u32) -> HeaderOffset {
        let base = self.heap_start.expect("heap not initialized") as usize;
        HeaderOffset((ptr as usize - base) as u32)
    }

    #[inline]
    pub(crate) unsafe fn read_word(&self, off: HeaderOffset) -> u32 {
        unsafe { self.header_ptr(off).read() }
    }

    #[inline]
    pub(crate) unsafe fn write_word(&self, off: HeaderOffset, word: u32) {
        unsafe { self.header_ptr(off).write(word) }
    }

    /// `true` if the block at `off` is allocated.
    pub(crate) fn bt_used(&self, off: HeaderOffset) -> bool {
        unsafe { self.read_word(off) & USED != 0 }
    }

    /// `true` if the block at `off` is free.
    pub(crate) fn bt_free(&self, off: HeaderOffset) -> bool {
        !self.bt_used(off)
    }

    /// Total block size in bytes, low flag bits masked off.
    pub(crate) fn bt_size(&self, off: HeaderOffset) -> usize {
        let mask = !(self.config.alignment as u32 - 1);
        (unsafe { self.read_word(off) } & mask) as usize
    }

    /// The header's flag bits (`USED`/`PREVFREE`).
    pub(crate) fn bt_flags(&self, off: HeaderOffset) -> u32 {
        let mask = self.config.alignment as u32 - 1;
        unsafe { self.read_word(off) } & mask
    }

    /// Writes a fresh header word encoding `size` and `flags`.
    pub(crate) fn bt_make(&self, off: HeaderOffset, size: usize, flags: u32) {
        debug_assert_eq!(size % self.config.alignment, 0);
        unsafe { self.write_word(off, size as u32 | flags) };
    }

    /// Offset of the footer word (valid for free blocks only).
    pub(crate) fn bt_footer(&self, off: HeaderOffset) -> HeaderOffset {
        HeaderOffset(off.0 + self.bt_size(off) as u32 - 4)
    }

    /// Offset of a block's header, given a payload pointer.
    pub(crate) fn bt_fromptr(&self, ptr: *mut u8) -> HeaderOffset {
        self.offset_of_ptr(unsafe { (ptr as *mut u32).sub(1) })
    }

    /// Payload pointer for the block at `off`.
    pub(crate) fn bt_payload(&self, off: HeaderOffset) -> *mut u8 {
        unsafe { self.header_ptr(off).add(1) as *mut u8 }
    }

    pub(crate) fn bt_get_prevfree(&self, off: HeaderOffset) -> bool {
        self.bt_flags(off) & PREVFREE != 0
    }

    pub(crate) fn bt_set_prevfree(&self, off: HeaderOffset) {
        unsafe {
            let word = self.read_word(off);
            self.write_word(off, word | PREVFREE);
        }
    }

    pub(crate) fn bt_clr_prevfree(&self, off: HeaderOffset) {
        unsafe {
            let word = self.read_word(off);
            self.write_word(off, word & !PREVFREE);
        }
    }

    /// Offset of the next block, or `None` if `off` is the last block.
    pub(crate) fn bt_next(&self, off: HeaderOffset) -> Option<HeaderOffset> {
        let next = HeaderOffset(off.0 + self.bt_size(off) as u32);
        let next_ptr = unsafe { self.header_ptr(next) as *mut u8 };
        if next_ptr == self.heap_end.expect("heap not initialized") {
            None
        } else {
            Some(next)
        }
    }

    /// Offset of the previous block, valid only when `PREVFREE` is set on
    /// `off`; returns `None` at the heap start or when the predecessor is
    /// used (no footer to read).
    pub(crate) fn bt_prev(&self, off: HeaderOffset) -> Option<HeaderOffset> {
        if off == HeaderOffset::ZERO || !self.bt_get_prevfree(off) {
            return None;
        }
        let prev_footer = HeaderOffset(off.0 - 4);
        let prev_size = self.bt_size(prev_footer);
        Some(HeaderOffset(prev_footer.0 + 4 - prev_size as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn flags_roundtrip_in_memory() {
        // A header word packs cleanly regardless of which heap backs it;
        // exercise the bit math directly without needing a live sbrk heap.
        let mut word: u32 = 0;
        let size: u32 = 64;
        word = size | USED;
        assert_eq!(word & !(Config::default().alignment as u32 - 1), size);
        assert_ne!(word & USED, 0);
        assert_eq!(word & PREVFREE, 0);
        word |= PREVFREE;
        assert_ne!(word & PREVFREE, 0);
    }
}
