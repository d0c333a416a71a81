//! Property-based test: random sequences of malloc/free/realloc/calloc
//! must never leave the heap in a state `Heap::check` rejects, and every
//! live allocation's payload must stay intact until it is freed or
//! replaced. This is the property-based harness the design notes call
//! for ("random operation sequences, asserting checkheap after each").

use proptest::prelude::*;
use segalloc::config::Config;
use segalloc::heap::{Heap, Verbosity};

#[derive(Debug, Clone)]
enum Op {
    Malloc(usize),
    Free(usize),
    Realloc(usize, usize),
    Calloc(usize, usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1usize..512).prop_map(Op::Malloc),
        (0usize..64).prop_map(Op::Free),
        (0usize..64, 1usize..512).prop_map(|(i, s)| Op::Realloc(i, s)),
        (1usize..16, 1usize..32).prop_map(|(n, s)| Op::Calloc(n, s)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_operation_sequences_preserve_invariants(ops in proptest::collection::vec(op_strategy(), 1..200)) {
        let mut heap = Heap::new(Config::default()).expect("sbrk failed");
        // (pointer, tag byte, length) for every live allocation, so we can
        // confirm stability of untouched data after later operations.
        let mut live: Vec<(*mut u8, u8, usize)> = Vec::new();

        for (step, op) in ops.into_iter().enumerate() {
            let tag = (step % 251) as u8;
            match op {
                Op::Malloc(size) => {
                    if let Some(p) = heap.malloc(size) {
                        unsafe { std::ptr::write_bytes(p, tag, size) };
                        live.push((p, tag, size));
                    }
                }
                Op::Free(idx) => {
                    if !live.is_empty() {
                        let (p, _, _) = live.remove(idx % live.len());
                        heap.free(p);
                    }
                }
                Op::Realloc(idx, new_size) => {
                    if !live.is_empty() {
                        let i = idx % live.len();
                        let (p, old_tag, old_len) = live[i];
                        if let Some(r) = heap.realloc(Some(p), new_size) {
                            let preserved = old_len.min(new_size);
                            let bytes = unsafe { std::slice::from_raw_parts(r, preserved) };
                            prop_assert!(bytes.iter().all(|&b| b == old_tag));
                            if new_size > preserved {
                                unsafe {
                                    std::ptr::write_bytes(r.add(preserved), tag, new_size - preserved);
                                }
                            }
                            live[i] = (r, old_tag, new_size);
                        }
                    }
                }
                Op::Calloc(n, size) => {
                    if let Some(bytes) = n.checked_mul(size) {
                        if let Some(p) = heap.calloc(n, size) {
                            let data = unsafe { std::slice::from_raw_parts(p, bytes) };
                            prop_assert!(data.iter().all(|&b| b == 0));
                            unsafe { std::ptr::write_bytes(p, tag, bytes) };
                            live.push((p, tag, bytes));
                        }
                    }
                }
            }
            heap.check(Verbosity::Silent)
                .map_err(|e| TestCaseError::fail(format!("invariant violated at step {step}: {e}")))?;
        }

        // Every surviving allocation's content must still match its tag.
        for (p, tag, len) in &live {
            let bytes = unsafe { std::slice::from_raw_parts(*p, *len) };
            prop_assert!(bytes.iter().all(|&b| b == *tag));
        }
    }
}
