mod checker_tests;

use std::vec::Vec;

use super::*;

/// The size of the arena right after `init`: the padding, the prologue and
/// epilogue words, and the first chunk.
const INITIAL_ARENA_SIZE: usize = INITIAL_HEAP_SIZE + AllocatorConfig::DEFAULT_CHUNK_SIZE;

/// The payload offset of the first block of the heap, right after the
/// padding word and the prologue.
const FIRST_BLOCK: usize = 2 * DSIZE;

/// Creates an allocator over a fresh arena and initializes it.
fn init_allocator() -> Allocator {
    init_allocator_with_max_size(DEFAULT_MAX_ARENA_SIZE)
}

/// Creates an allocator over a fresh arena which can't grow beyond
/// `max_size` bytes, and initializes it.
fn init_allocator_with_max_size(max_size: usize) -> Allocator {
    let mut allocator = Allocator::new(VecArena::with_max_size(max_size));
    allocator.init().unwrap();
    allocator
}

fn ptr(offset: usize) -> HeapPtr {
    HeapPtr::from_offset(offset).unwrap()
}

/// Returns the `(offset, size, allocated)` of every block of the heap in
/// address order.
fn heap_layout(allocator: &Allocator) -> Vec<(usize, usize, bool)> {
    allocator
        .blocks()
        .map(|block| (block.ptr.offset(), block.size, block.allocated))
        .collect()
}

/// Returns the offsets of the blocks in the free list, in list order.
fn free_list_offsets(allocator: &Allocator) -> Vec<usize> {
    allocator
        .free_blocks()
        .map(|block| block.ptr.offset())
        .collect()
}

/// Asserts that the entire heap is a single free block of the given size.
fn assert_only_1_free_block(allocator: &Allocator, size: usize) {
    assert_eq!(heap_layout(allocator), vec![(FIRST_BLOCK, size, false)]);
    assert_eq!(free_list_offsets(allocator), vec![FIRST_BLOCK]);
    allocator.check_heap().unwrap();
}
