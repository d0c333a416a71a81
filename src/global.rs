//! Process-wide singleton and the driver-facing entry points.
//!
//! The teacher crate re-exports its allocator type directly
//! (`pub use bump::{BumpAllocator, ...}`) and leaves instantiation to the
//! caller. This allocator additionally needs a *single, process-wide*
//! instance, because its external interface (spec §6) is the classical
//! four free functions a driver harness calls by symbol
//! (`mm_init`/`mm_malloc`/`mm_free`/`mm_realloc`/`mm_calloc`/
//! `mm_checkheap`), not a value the harness constructs itself.
//!
//! The allocator is documented single-threaded and non-reentrant (spec
//! §5); a `static` `UnsafeCell` plus an `AtomicBool` busy flag turns a
//! reentrant entry (e.g. an allocation triggered from within a panicking
//! drop during another allocation) into a clean panic instead of silent
//! heap corruption, at effectively no cost on the non-reentrant path.

use std::alloc::{GlobalAlloc, Layout};
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::Config;
use crate::error::HeapError;
use crate::heap::{Heap, Verbosity};

struct GlobalState {
    inner: UnsafeCell<Option<Heap>>,
    busy: AtomicBool,
}

// Safety: access is serialized by `busy`, which is only sound because the
// allocator is documented single-threaded (spec §5, non-goal: thread
// safety). This is not a general-purpose Sync guarantee; it exists solely
// to let one `static` host the process-wide instance.
unsafe impl Sync for GlobalState {}

impl GlobalState {
    const fn new() -> Self {
        GlobalState {
            inner: UnsafeCell::new(None),
            busy: AtomicBool::new(false),
        }
    }

    fn with_heap<R>(&self, f: impl FnOnce(&mut Heap) -> R) -> Result<R, HeapError> {
        if self.busy.swap(true, Ordering::Acquire) {
            return Err(HeapError::Reentrant);
        }
        let result = (|| {
            let heap = unsafe { &mut *self.inner.get() };
            let heap = heap.as_mut().ok_or(HeapError::Uninitialized)?;
            Ok(f(heap))
        })();
        self.busy.store(false, Ordering::Release);
        result
    }

    fn init(&self, config: Config) -> Result<(), HeapError> {
        if self.busy.swap(true, Ordering::Acquire) {
            return Err(HeapError::Reentrant);
        }
        let heap = Heap::new(config);
        let result = heap.map(|h| {
            unsafe { *self.inner.get() = Some(h) };
        });
        self.busy.store(false, Ordering::Release);
        result
    }
}

static STATE: GlobalState = GlobalState::new();

/// Initializes the process-wide allocator with the default [`Config`].
/// Returns `0` on success, `-1` on `sbrk` failure, matching the original's
/// `int mm_init(void)` contract.
pub fn mm_init() -> i32 {
    match STATE.init(Config::default()) {
        Ok(()) => 0,
        Err(_) => -1,
    }
}

/// Initializes the process-wide allocator with a caller-supplied
/// [`Config`]. Returns `0` on success, `-1` on `sbrk` failure.
pub fn mm_init_with_config(config: Config) -> i32 {
    match STATE.init(config) {
        Ok(()) => 0,
        Err(_) => -1,
    }
}

/// Allocates `size` bytes. Returns a null pointer on failure.
pub fn mm_malloc(size: usize) -> *mut u8 {
    STATE
        .with_heap(|heap| heap.malloc(size))
        .ok()
        .flatten()
        .unwrap_or(std::ptr::null_mut())
}

/// Frees a block previously returned by `mm_malloc`/`mm_realloc`/
/// `mm_calloc`. A null `ptr` is a no-op.
pub fn mm_free(ptr: *mut u8) {
    let _ = STATE.with_heap(|heap| heap.free(ptr));
}

/// Resizes an allocation; see [`Heap::realloc`] for full semantics.
pub fn mm_realloc(ptr: *mut u8, size: usize) -> *mut u8 {
    let old = if ptr.is_null() { None } else { Some(ptr) };
    STATE
        .with_heap(|heap| heap.realloc(old, size))
        .ok()
        .flatten()
        .unwrap_or(std::ptr::null_mut())
}

/// Zero-initialized allocation of `n * size` bytes.
pub fn mm_calloc(n: usize, size: usize) -> *mut u8 {
    STATE
        .with_heap(|heap| heap.calloc(n, size))
        .ok()
        .flatten()
        .unwrap_or(std::ptr::null_mut())
}

/// Verifies heap invariants. `verbose`: `0` silent, `1` print+verify,
/// `2` print only. Panics on the first invariant violation, matching the
/// original's `exit(EXIT_FAILURE)`.
pub fn mm_checkheap(verbose: i32) {
    let verbosity = match verbose {
        0 => Verbosity::Silent,
        1 => Verbosity::PrintAndCheck,
        _ => Verbosity::PrintOnly,
    };
    let _ = STATE.with_heap(|heap| heap.check_or_panic(verbosity));
}

/// A [`GlobalAlloc`] wrapper over the same process-wide [`Heap`], so the
/// crate can also be dropped in as `#[global_allocator]` for an ordinary
/// Rust binary rather than only driven through the raw `mm_*` entry
/// points. Requests whose alignment exceeds the heap's configured
/// alignment cannot be honored and fail fast.
pub struct SegregatedAllocator;

unsafe impl GlobalAlloc for SegregatedAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if STATE.with_heap(|h| h.config.alignment).unwrap_or(0) < layout.align() {
            return std::ptr::null_mut();
        }
        mm_malloc(layout.size())
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        mm_free(ptr);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if STATE.with_heap(|h| h.config.alignment).unwrap_or(0) < layout.align() {
            return std::ptr::null_mut();
        }
        mm_realloc(ptr, new_size)
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        if STATE.with_heap(|h| h.config.alignment).unwrap_or(0) < layout.align() {
            return std::ptr::null_mut();
        }
        mm_calloc(1, layout.size())
    }
}
