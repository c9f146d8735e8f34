use super::*;

/// Runs the checker, expecting it to find a violation, and returns the
/// violation and the offset where it was found.
#[track_caller]
fn find_violation(allocator: &Allocator) -> (Violation, usize) {
    match allocator.check_heap() {
        Err(Error::Consistency(err)) => (err.violation, err.offset),
        other => panic!("expected a consistency error, got {:?}", other),
    }
}

fn write_tags(allocator: &mut Allocator, offset: usize, size: usize, allocated: bool) {
    let tag = BoundaryTag::new(size, allocated).raw();
    allocator.arena.write_word(offset - WSIZE, tag);
    allocator.arena.write_word(offset + size - DSIZE, tag);
}

/// Allocates `N` blocks of 128 bytes each, starting at the first block.
fn alloc_blocks<const N: usize>(allocator: &mut Allocator) -> [HeapPtr; N] {
    [(); N].map(|_| allocator.alloc(100).unwrap())
}

#[test]
fn check_uninitialized_heap() {
    let allocator = Allocator::new(VecArena::new());
    assert_eq!(allocator.check_heap(), Err(Error::Uninitialized));
}

#[test]
fn check_reports_the_caller_location() {
    let mut allocator = init_allocator();
    let [a] = alloc_blocks(&mut allocator);
    allocator.arena.write_word(a.offset() + 112, BoundaryTag::new(112, true).raw());

    let (result, line) = (allocator.check_heap(), line!());

    let Err(Error::Consistency(err)) = result else {
        panic!("expected a consistency error");
    };
    assert_eq!(err.violation, Violation::TagMismatch);
    assert_eq!(err.offset, FIRST_BLOCK);
    assert_eq!(err.location.file(), file!());
    assert_eq!(err.location.line(), line);

    let message = format!("{}", Error::Consistency(err));
    assert!(message.starts_with(&format!("(check_heap at {}:{}:", file!(), line)));
    assert!(message.ends_with("Error: header does not match footer at offset 0x20"));
}

#[test]
fn check_does_not_modify_the_heap() {
    let mut allocator = init_allocator();
    let [a, _b] = alloc_blocks(&mut allocator);
    write_tags(&mut allocator, a.offset(), 128, false);
    let before = allocator.arena().bytes().to_vec();

    assert!(allocator.check_heap().is_err());
    assert_eq!(allocator.arena().bytes(), &before[..]);
}

#[test]
fn check_bad_prologue() {
    let mut allocator = init_allocator();
    allocator
        .arena
        .write_word(WSIZE, BoundaryTag::new(2 * DSIZE, true).raw());

    assert_eq!(find_violation(&allocator), (Violation::BadPrologue, DSIZE));
}

#[test]
fn check_free_prologue() {
    let mut allocator = init_allocator();
    let free_prologue = BoundaryTag::new(PROLOGUE_SIZE, false).raw();
    allocator.arena.write_word(WSIZE, free_prologue);
    allocator.arena.write_word(DSIZE, free_prologue);

    assert_eq!(find_violation(&allocator), (Violation::BadPrologue, DSIZE));
}

#[test]
fn check_bad_epilogue() {
    let mut allocator = init_allocator();
    let epilogue_header = allocator.arena().size() - WSIZE;
    allocator
        .arena
        .write_word(epilogue_header, BoundaryTag::new(0, false).raw());

    assert_eq!(
        find_violation(&allocator),
        (Violation::BadEpilogue, INITIAL_ARENA_SIZE)
    );
}

#[test]
fn check_tag_mismatch() {
    let mut allocator = init_allocator();
    let [a] = alloc_blocks(&mut allocator);
    // same size, but marked as free in the footer only.
    allocator
        .arena
        .write_word(a.offset() + 112, BoundaryTag::new(128, false).raw());

    assert_eq!(find_violation(&allocator), (Violation::TagMismatch, FIRST_BLOCK));
}

#[test]
fn check_block_too_small() {
    let mut allocator = init_allocator();
    let [a] = alloc_blocks(&mut allocator);
    write_tags(&mut allocator, a.offset(), DSIZE, true);

    assert_eq!(
        find_violation(&allocator),
        (Violation::BlockTooSmall, FIRST_BLOCK)
    );
}

#[test]
fn check_block_out_of_bounds() {
    let mut allocator = init_allocator();
    let [a] = alloc_blocks(&mut allocator);
    allocator
        .arena
        .write_word(a.offset() - WSIZE, BoundaryTag::new(1 << 40, true).raw());

    assert_eq!(find_violation(&allocator), (Violation::OutOfBounds, FIRST_BLOCK));
}

#[test]
fn check_adjacent_free_blocks() {
    let mut allocator = init_allocator();
    let [_a, b] = alloc_blocks(&mut allocator);
    // `b` is now free and followed by the free rest of the heap.
    write_tags(&mut allocator, b.offset(), 128, false);

    assert_eq!(
        find_violation(&allocator),
        (Violation::AdjacentFreeBlocks, FIRST_BLOCK + 256)
    );
}

#[test]
fn check_free_block_missing_from_free_list() {
    let mut allocator = init_allocator();
    let [a, _b] = alloc_blocks(&mut allocator);
    write_tags(&mut allocator, a.offset(), 128, false);

    assert_eq!(
        find_violation(&allocator),
        (Violation::FreeListLengthMismatch, FIRST_BLOCK)
    );
}

#[test]
fn check_allocated_block_in_free_list() {
    let mut allocator = init_allocator();
    let [a, _b] = alloc_blocks(&mut allocator);
    allocator.dealloc(Some(a));
    write_tags(&mut allocator, a.offset(), 128, true);

    assert_eq!(
        find_violation(&allocator),
        (Violation::AllocatedBlockInFreeList, FIRST_BLOCK)
    );
}

#[test]
fn check_broken_back_link() {
    let mut allocator = init_allocator();
    let [a, _b, c, _d] = alloc_blocks(&mut allocator);
    allocator.dealloc(Some(a));
    allocator.dealloc(Some(c));
    assert_eq!(
        free_list_offsets(&allocator),
        vec![c.offset(), a.offset(), FIRST_BLOCK + 512]
    );

    // the prev link of `a` should point to `c`.
    allocator.arena.write_word(a.offset(), 0);

    assert_eq!(
        find_violation(&allocator),
        (Violation::BrokenBackLink, a.offset())
    );
}

#[test]
fn check_free_list_link_out_of_bounds() {
    let mut allocator = init_allocator();
    let [a, _b] = alloc_blocks(&mut allocator);
    allocator.dealloc(Some(a));

    // the next link of `a`.
    allocator.arena.write_word(a.offset() + WSIZE, 1 << 40);

    assert_eq!(
        find_violation(&allocator),
        (Violation::FreeListLinkOutOfBounds, 1 << 40)
    );
}

#[test]
fn check_free_list_node_inside_allocated_block() {
    let mut allocator = init_allocator();
    let [a, _b, c, _d] = alloc_blocks(&mut allocator);
    allocator.dealloc(Some(c));
    let rest = FIRST_BLOCK + 512;
    assert_eq!(free_list_offsets(&allocator), vec![c.offset(), rest]);

    // replace `rest` in the list with a node inside the payload of `a`, which
    // looks like a free block and links back to `c`. The list length still
    // matches the number of free blocks.
    let inner = a.offset() + 32;
    allocator
        .arena
        .write_word(inner - WSIZE, BoundaryTag::new(32, false).raw());
    allocator.arena.write_word(inner, c.offset());
    allocator.arena.write_word(inner + WSIZE, 0);
    allocator.arena.write_word(c.offset() + WSIZE, inner);

    assert_eq!(
        find_violation(&allocator),
        (Violation::FreeListNodeNotABlock, inner)
    );
}

#[test]
fn check_free_list_cycle_terminates() {
    let mut allocator = init_allocator();
    let [a, _b, c, _d] = alloc_blocks(&mut allocator);
    allocator.dealloc(Some(a));
    allocator.dealloc(Some(c));

    // link `a`, the second block of the list, back to the head.
    allocator.arena.write_word(a.offset() + WSIZE, c.offset());

    assert_eq!(
        find_violation(&allocator),
        (Violation::BrokenBackLink, c.offset())
    );
}

#[test]
fn check_passes_on_a_busy_heap() {
    let mut allocator = init_allocator();

    let allocated: Vec<HeapPtr> = (1..=30).map(|i| allocator.alloc(i * 33).unwrap()).collect();
    for ptr in allocated.iter().step_by(2) {
        allocator.dealloc(Some(*ptr));
        allocator.check_heap().unwrap();
    }

    let stats = allocator.stats();
    assert_eq!(stats.allocated_blocks, 15);
    assert_eq!(stats.free_blocks, allocator.free_blocks().count());
    assert_eq!(
        stats.allocated_bytes + stats.free_bytes + INITIAL_HEAP_SIZE,
        stats.arena_size
    );
}
