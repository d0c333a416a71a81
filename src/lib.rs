//! # segalloc: a segregated free-list allocator with optimized boundary tags
//!
//! This crate implements the classical four-call allocator interface
//! (`malloc`/`free`/`realloc`/`calloc`) over a single, contiguous,
//! monotonically-growing heap obtained from `sbrk`. It is designed as a
//! drop-in replacement for a libc-style allocator in a single-threaded
//! driver harness, and can additionally be installed as a Rust
//! `#[global_allocator]`.
//!
//! ## How it works
//!
//! ```text
//!   HEAP MEMORY (grows upward via sbrk)
//!
//!   ┌────────┬──────────┬────────┬──────────────┬─────────────────────┐
//!   │ used   │   free   │ used   │     free     │     ... sbrk ...    │
//!   └────────┴──────────┴────────┴──────────────┴─────────────────────┘
//!
//!   Every block carries a boundary tag: a header word packing
//!   (size | USED | PREVFREE), and, for free blocks only, an identical
//!   footer word. PREVFREE lets an allocated block skip its footer
//!   entirely: the bit lives in the *successor's* header instead.
//!
//!   Free blocks are threaded into one circular doubly-linked list,
//!   ordered so that no smaller size class ever follows a larger one.
//!   class_head[c] marks the first block of size class c within that
//!   single list, giving O(1) good-fit entry without a per-class list.
//! ```
//!
//! ## Crate structure
//!
//! ```text
//!   segalloc
//!   ├── align        - block-size rounding
//!   ├── config        - tunable constants (alignment, sbrk_min, listnum_max)
//!   ├── error         - HeapError, the structured invariant-violation type
//!   ├── offset        - HeapOffset newtypes (heap-relative link encoding)
//!   ├── boundary_tag   - header/footer bit-packing, neighbor traversal
//!   ├── size_class     - clp2, class_head table indexing
//!   ├── free_list      - circular doubly-linked free list operations
//!   ├── split_merge    - block splitting and coalescing
//!   ├── placement     - find_fit, alloc_with_sbrk
//!   ├── heap          - the Heap allocator object and its public operations
//!   └── global        - process-wide singleton, GlobalAlloc, mm_* entry points
//! ```
//!
//! ## Quick start
//!
//! ```
//! use segalloc::config::Config;
//! use segalloc::heap::{Heap, Verbosity};
//!
//! let mut heap = Heap::new(Config::default()).expect("sbrk failed");
//! let p = heap.malloc(64).expect("allocation failed");
//! unsafe { (p as *mut u64).write(42) };
//! heap.check(Verbosity::Silent).expect("heap corrupted");
//! heap.free(p);
//! ```
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no locks, not `Sync`, not signal-safe.
//! - **No page reclamation**: memory is never returned to the host.
//! - **No defragmentation/compaction.**
//! - **Unix-only**: requires `libc::sbrk`.
//!
//! ## Safety
//!
//! This crate manages raw memory directly; most of its internals are
//! `unsafe`. The public [`heap::Heap`] methods are safe to call (they
//! uphold the data-model invariants documented on [`heap::Heap`] across
//! every call), but passing a pointer to `free`/`realloc` that was not
//! returned by this allocator, or was already freed, is undefined
//! behavior, exactly as with libc's `free`.

pub mod align;
pub mod boundary_tag;
pub mod config;
pub mod error;
pub mod free_list;
pub mod global;
pub mod heap;
pub mod offset;
pub mod placement;
pub mod size_class;
pub mod split_merge;

pub use config::Config;
pub use error::HeapError;
pub use global::{SegregatedAllocator, mm_calloc, mm_checkheap, mm_free, mm_init, mm_malloc, mm_realloc};
pub use heap::{Heap, Verbosity};
