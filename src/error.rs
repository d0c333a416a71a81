//! Structured allocator errors.
//!
//! The original detects invariant violations inside `mm_checkheap` and
//! responds with `perror` + `exit(EXIT_FAILURE)`. A reimplementation
//! should surface a structured error instead (spec mandate); this enum is
//! that surface, one variant per distinct invariant the checker verifies.

/// Everything that can go wrong inside the allocator that is worth naming.
///
/// Out-of-memory is recoverable (callers get it back as a `None`/null
/// return, never as a propagated error). Every other variant indicates a
/// corrupted heap and is fatal: see [`crate::heap::Heap::check`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    #[error("heap extension failed (sbrk returned an error)")]
    OutOfMemory,

    #[error("invalid allocator configuration: {0:?}")]
    InvalidConfig(crate::config::Config),

    #[error("block at offset {0:#x} is free but PREVFREE is not set on its successor")]
    MissingPrevFreeFlag(usize),

    #[error("PREVFREE is set on block at offset {0:#x} but its predecessor is not free")]
    SpuriousPrevFreeFlag(usize),

    #[error("used block at offset {0:#x} found on the free list")]
    UsedBlockOnFreeList(usize),

    #[error("free block at offset {0:#x} is not present on the free list")]
    FreeBlockMissingFromList(usize),

    #[error("adjacent free blocks at offsets {0:#x} and {1:#x} were not coalesced")]
    AdjacentFreeBlocks(usize, usize),

    #[error("free-list link at block offset {0:#x} points outside the heap")]
    LinkOutOfBounds(usize),

    #[error("`last` does not reference the final block in the heap")]
    LastBlockMismatch,

    #[error("reentrant allocator entry detected")]
    Reentrant,

    #[error("allocator has not been initialized")]
    Uninitialized,
}
