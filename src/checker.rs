//! The heap consistency checker.
//!
//! The checker is a debugging facility. It walks the heap in address order and
//! then the free list, and reports the first violated invariant together with
//! the location it was called from. It only reads the arena through bounds
//! checked accessors, so a corrupted heap makes it fail, never panic.

use alloc::vec::Vec;
use core::{fmt, panic::Location};

use crate::{
    alignment::is_aligned, arena::Arena, error::Error, Allocator, DSIZE, MIN_BLOCK_SIZE,
    PROLOGUE_SIZE, WSIZE,
};

/// A violated heap invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// The prologue header is not an allocated block of the prologue size,
    /// or its footer doesn't match.
    BadPrologue,
    /// A block's payload is not double word aligned.
    Misaligned,
    /// A block is smaller than the minimum block size.
    BlockTooSmall,
    /// A block's header or footer lies outside the arena.
    OutOfBounds,
    /// A block's header and footer differ.
    TagMismatch,
    /// A free block directly follows another free block.
    AdjacentFreeBlocks,
    /// The block terminating the heap is not a zero sized allocated block at
    /// the end of the arena.
    BadEpilogue,
    /// A free list link points outside of the heap's blocks.
    FreeListLinkOutOfBounds,
    /// A block in the free list is marked as allocated.
    AllocatedBlockInFreeList,
    /// A free list link points inside the heap, but not at the start of a
    /// block.
    FreeListNodeNotABlock,
    /// A block's back link doesn't point to the block that links to it.
    BrokenBackLink,
    /// The free list doesn't contain exactly the free blocks of the heap.
    FreeListLengthMismatch,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            Self::BadPrologue => "bad prologue header",
            Self::Misaligned => "block is not double-word aligned",
            Self::BlockTooSmall => "block is smaller than the minimum block size",
            Self::OutOfBounds => "block lies outside of the arena",
            Self::TagMismatch => "header does not match footer",
            Self::AdjacentFreeBlocks => "two adjacent free blocks were not coalesced",
            Self::BadEpilogue => "bad epilogue header",
            Self::FreeListLinkOutOfBounds => "free list link points outside of the heap",
            Self::AllocatedBlockInFreeList => "allocated block in the free list",
            Self::FreeListNodeNotABlock => "free list node is not the start of a block",
            Self::BrokenBackLink => "free list back link does not match",
            Self::FreeListLengthMismatch => {
                "free list length does not match the number of free blocks"
            }
        };
        f.write_str(description)
    }
}

/// A violation found by the heap consistency checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapCheckError {
    /// The violated invariant.
    pub violation: Violation,
    /// The payload offset of the offending block.
    pub offset: usize,
    /// Where the checker was called from.
    pub location: &'static Location<'static>,
}

impl fmt::Display for HeapCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(check_heap at {}) Error: {} at offset {:#x}",
            self.location, self.violation, self.offset
        )
    }
}

impl<A: Arena> Allocator<A> {
    /// Checks the consistency of the heap.
    ///
    /// Fails with [`Error::Consistency`] describing the first violation found,
    /// and the source location this was called from. The violation is also
    /// logged. The heap is never modified.
    #[track_caller]
    pub fn check_heap(&self) -> Result<(), Error> {
        self.check_heap_at(Location::caller())
    }

    pub(crate) fn check_heap_at(&self, location: &'static Location<'static>) -> Result<(), Error> {
        let heap_start = self.heap_start.ok_or(Error::Uninitialized)?;

        match self.find_violation(heap_start.payload_offset()) {
            None => Ok(()),
            Some((violation, offset)) => {
                let err = HeapCheckError {
                    violation,
                    offset,
                    location,
                };
                log::error!("{}", err);
                Err(err.into())
            }
        }
    }

    /// Returns the first violation in the heap whose prologue payload is at
    /// the given offset, and the offset of the block where it was found.
    fn find_violation(&self, prologue_offset: usize) -> Option<(Violation, usize)> {
        let prologue = self.tag_at(prologue_offset - WSIZE);
        let prologue_footer = self.tag_at(prologue_offset);
        match (prologue, prologue_footer) {
            (Some(header), Some(footer))
                if header.size() == PROLOGUE_SIZE && header.is_allocated() && header == footer => {}
            _ => return Some((Violation::BadPrologue, prologue_offset)),
        }

        let first_block_offset = prologue_offset + PROLOGUE_SIZE;
        let mut offset = first_block_offset;
        let mut prev_free = false;
        // `(offset, allocated)` of every block, in address order.
        let mut blocks = Vec::new();

        loop {
            let Some(header) = self.tag_at(offset - WSIZE) else {
                return Some((Violation::OutOfBounds, offset));
            };
            if header.size() == 0 {
                break;
            }

            if !is_aligned(offset, DSIZE) {
                return Some((Violation::Misaligned, offset));
            }
            if header.size() < MIN_BLOCK_SIZE {
                return Some((Violation::BlockTooSmall, offset));
            }

            let footer = offset
                .checked_add(header.size() - DSIZE)
                .and_then(|footer_offset| self.tag_at(footer_offset));
            match footer {
                None => return Some((Violation::OutOfBounds, offset)),
                Some(footer) if footer != header => return Some((Violation::TagMismatch, offset)),
                Some(_) => {}
            }

            if !header.is_allocated() && prev_free {
                return Some((Violation::AdjacentFreeBlocks, offset));
            }
            prev_free = !header.is_allocated();
            blocks.push((offset, header.is_allocated()));

            offset += header.size();
        }

        // `offset` is now the payload offset of the terminating block, which must be the
        // epilogue header in the last word of the arena.
        let epilogue_is_last_word = offset == self.arena.size();
        let epilogue_is_allocated = self
            .tag_at(offset - WSIZE)
            .is_some_and(|epilogue| epilogue.is_allocated());
        if !epilogue_is_last_word || !epilogue_is_allocated {
            return Some((Violation::BadEpilogue, offset));
        }

        self.find_free_list_violation(first_block_offset, &blocks)
    }

    /// Walks the free list, checking that it links exactly the free ones of
    /// the given address ordered `(offset, allocated)` blocks.
    fn find_free_list_violation(
        &self,
        first_block_offset: usize,
        blocks: &[(usize, bool)],
    ) -> Option<(Violation, usize)> {
        let free_blocks = blocks.iter().filter(|(_, allocated)| !allocated).count();
        let heap_end = self.arena.size();
        let mut cur = self.free_list.head().map(|block| block.block().payload_offset());
        let mut expected_prev = 0;
        let mut count = 0;

        while let Some(offset) = cur {
            if offset < first_block_offset || offset >= heap_end || !is_aligned(offset, DSIZE) {
                return Some((Violation::FreeListLinkOutOfBounds, offset));
            }

            // a cycle in the list would make it longer than the number of free blocks.
            count += 1;
            if count > free_blocks {
                return Some((Violation::FreeListLengthMismatch, offset));
            }

            match blocks.binary_search_by_key(&offset, |&(block_offset, _)| block_offset) {
                Ok(index) if !blocks[index].1 => {}
                Ok(_) => return Some((Violation::AllocatedBlockInFreeList, offset)),
                Err(_) => return Some((Violation::FreeListNodeNotABlock, offset)),
            }

            let links = self
                .arena
                .try_read_word(offset)
                .zip(self.arena.try_read_word(offset + WSIZE));
            let Some((prev, next)) = links else {
                return Some((Violation::FreeListLinkOutOfBounds, offset));
            };
            if prev != expected_prev {
                return Some((Violation::BrokenBackLink, offset));
            }

            expected_prev = offset;
            cur = (next != 0).then_some(next);
        }

        if count != free_blocks {
            return Some((Violation::FreeListLengthMismatch, first_block_offset));
        }

        None
    }
}
