use std::io::Read;

use libc::sbrk;
use segalloc::config::Config;
use segalloc::heap::{Heap, Verbosity};

/// Waits until the user presses ENTER.
/// Useful when you want to inspect memory state with tools like `pmap`, `htop`,
/// `gdb`, or just visually track how allocations change the program break.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

/// Prints the current program break using `sbrk(0)`.
/// The program break is the upper boundary of the heap managed via brk/sbrk.
unsafe fn print_program_break(label: &str) {
  println!(
    "[{}] PID = {}, program break (sbrk(0)) = {:?}",
    label,
    std::process::id(),
    unsafe { sbrk(0) },
  );
}

fn main() {
  env_logger::init();

  // The segregated allocator. Internally it tracks:
  // - heap_start / heap_end / last
  // - a circular free list threaded through freed blocks
  // - class_head pointers into that list for fast good-fit lookup
  let mut heap = Heap::new(Config::default()).expect("mm_init failed (sbrk)");

  unsafe {
    // Initial heap state
    print_program_break("start");
    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 1) Allocate space for a u32.
    // --------------------------------------------------------------------
    let first_block = heap.malloc(4).expect("malloc failed");
    println!("\n[1] malloc(4) -> {:?}", first_block);

    let first_ptr = first_block as *mut u32;
    first_ptr.write(0xDEADBEEF);
    println!("[1] Value written to first_block = 0x{:X}", first_ptr.read());

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 2) Allocate 12 bytes.
    // --------------------------------------------------------------------
    let second_block = heap.malloc(12).expect("malloc failed");
    println!("\n[2] malloc(12) -> {:?}", second_block);
    std::ptr::write_bytes(second_block, 0xAB, 12);
    println!("[2] Initialized second block with 0xAB");

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 3) Allocate a u64.
    // --------------------------------------------------------------------
    let third_block = heap.malloc(8).expect("malloc failed");
    println!("\n[3] malloc(8) -> {:?}", third_block);

    let third_ptr = third_block as *mut u64;
    third_ptr.write(0x1122334455667788);
    println!("[3] Value written = 0x{:X}", third_ptr.read());
    println!(
      "[3] Address = {:p}, addr % 16 = {}",
      third_block,
      third_block as usize % 16
    );

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 4) Allocate an array of 16 u16s (32 bytes).
    // --------------------------------------------------------------------
    let fourth_block = heap.malloc(32).expect("malloc failed");
    println!("\n[4] malloc(32) -> {:?}", fourth_block);

    let fourth_ptr = fourth_block as *mut u16;
    for i in 0..16 {
      fourth_ptr.add(i).write(i as u16);
    }
    println!("[4] Wrote 0..15 into the u16 array");

    heap.check(Verbosity::Silent).expect("heap corrupted");
    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 5) Free the first block. Unlike a bump allocator, this one
    //    coalesces it with neighbors and threads it onto the free list
    //    immediately, so a later small allocation can reuse it.
    // --------------------------------------------------------------------
    heap.free(first_block);
    println!("\n[5] Freed first_block at {:?}", first_block);
    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 6) Allocate a small block (2 bytes) to see if the allocator
    //    reuses the freed block.
    // --------------------------------------------------------------------
    let fifth_block = heap.malloc(2).expect("malloc failed");
    println!("\n[6] malloc(2) -> {:?}", fifth_block);
    println!(
      "[6] fifth_block == first_block? {}",
      if fifth_block == first_block {
        "Yes, it reused the freed block"
      } else {
        "No, it allocated somewhere else"
      }
    );

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 7) Allocate a large block to observe heap growth via sbrk.
    // --------------------------------------------------------------------
    print_program_break("before large alloc");

    let big_block = heap.malloc(64 * 1024).expect("malloc failed");
    println!("\n[7] malloc(64 KiB) -> {:?}", big_block);

    print_program_break("after large alloc");
    heap.check(Verbosity::Silent).expect("heap corrupted");
    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 8) End of demo. The allocator never returns pages to the host, so
    //    the OS reclaims everything when the process exits.
    // --------------------------------------------------------------------
    println!("\n[8] End of example. Process will exit and the OS will reclaim all memory.");
  }
}
