//! Read-only views of the heap, for diagnostics and tests.

use core::fmt;

use crate::{
    arena::Arena,
    blocks::{Block, FreeBlock},
    free_list, Allocator, HeapPtr, PROLOGUE_SIZE,
};

/// Information about a single block in the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    /// The payload of the block.
    pub ptr: HeapPtr,
    /// The size of the block, including its header and footer.
    pub size: usize,
    pub allocated: bool,
}

impl BlockInfo {
    fn of<A: Arena>(block: Block, arena: &A) -> Self {
        let header = block.header(arena);
        Self {
            ptr: HeapPtr::from_block(block),
            size: header.size(),
            allocated: header.is_allocated(),
        }
    }
}

/// An iterator over all the blocks of the heap in address order, excluding
/// the prologue and epilogue.
pub struct Blocks<'a, A: Arena> {
    arena: &'a A,
    cur: Option<Block>,
}

impl<'a, A: Arena> Iterator for Blocks<'a, A> {
    type Item = BlockInfo;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.cur?;
        if cur.size(self.arena) == 0 {
            // reached the epilogue
            self.cur = None;
            return None;
        }
        self.cur = Some(cur.next(self.arena));
        Some(BlockInfo::of(cur, self.arena))
    }
}

/// An iterator over the blocks of the free list, in list order.
pub struct FreeBlocks<'a, A: Arena> {
    arena: &'a A,
    inner: free_list::Iter<'a, A>,
}

impl<'a, A: Arena> Iterator for FreeBlocks<'a, A> {
    type Item = BlockInfo;

    fn next(&mut self) -> Option<Self::Item> {
        let block: FreeBlock = self.inner.next()?;
        Some(BlockInfo::of(block.block(), self.arena))
    }
}

/// Summary statistics of the heap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapStats {
    /// The size of the whole arena, including the sentinel blocks.
    pub arena_size: usize,
    pub allocated_blocks: usize,
    /// Total size of the allocated blocks, including their headers and footers.
    pub allocated_bytes: usize,
    pub free_blocks: usize,
    /// Total size of the free blocks, including their headers and footers.
    pub free_bytes: usize,
    pub largest_free_block: usize,
}

impl<A: Arena> Allocator<A> {
    /// Returns an iterator over all the blocks of the heap in address order.
    /// The iterator is empty if the heap was not initialized.
    pub fn blocks(&self) -> Blocks<'_, A> {
        Blocks {
            arena: &self.arena,
            cur: self
                .heap_start
                .map(|prologue| Block::from_payload_offset(prologue.payload_offset() + PROLOGUE_SIZE)),
        }
    }

    /// Returns an iterator over the free list, most recently freed first.
    pub fn free_blocks(&self) -> FreeBlocks<'_, A> {
        FreeBlocks {
            arena: &self.arena,
            inner: self.free_list.iter(&self.arena),
        }
    }

    /// Computes summary statistics of the heap.
    pub fn stats(&self) -> HeapStats {
        self.blocks().fold(
            HeapStats {
                arena_size: self.arena.size(),
                ..HeapStats::default()
            },
            |mut stats, block| {
                if block.allocated {
                    stats.allocated_blocks += 1;
                    stats.allocated_bytes += block.size;
                } else {
                    stats.free_blocks += 1;
                    stats.free_bytes += block.size;
                    stats.largest_free_block = stats.largest_free_block.max(block.size);
                }
                stats
            },
        )
    }

    /// Returns a printable dump of every block of the heap followed by the
    /// free list.
    pub fn dump(&self) -> HeapDump<'_, A> {
        HeapDump { allocator: self }
    }
}

/// A printable dump of the heap, returned from [`Allocator::dump`].
pub struct HeapDump<'a, A: Arena> {
    allocator: &'a Allocator<A>,
}

impl<'a, A: Arena> HeapDump<'a, A> {
    fn write_block(f: &mut fmt::Formatter<'_>, block: Block, arena: &A) -> fmt::Result {
        let header = block.header(arena);
        if header.size() == 0 {
            return writeln!(f, "{:#x}: end of heap", block.payload_offset());
        }

        let footer = block.footer(arena);
        let flag = |allocated: bool| if allocated { 'a' } else { 'f' };
        writeln!(
            f,
            "{:#x}: header: [{}:{}] footer: [{}:{}]",
            block.payload_offset(),
            header.size(),
            flag(header.is_allocated()),
            footer.size(),
            flag(footer.is_allocated()),
        )
    }
}

impl<'a, A: Arena> fmt::Display for HeapDump<'a, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let allocator = self.allocator;
        let arena = &allocator.arena;

        let Some(prologue) = allocator.heap_start else {
            return writeln!(f, "Heap: not initialized");
        };

        writeln!(f, "Heap ({:#x}):", prologue.payload_offset())?;
        let mut block = Block::from_payload_offset(prologue.payload_offset() + PROLOGUE_SIZE);
        loop {
            Self::write_block(f, block, arena)?;
            if block.size(arena) == 0 {
                break;
            }
            block = block.next(arena);
        }

        match allocator.free_list.head() {
            Some(head) => writeln!(f, "Free list ({:#x}):", head.block().payload_offset())?,
            None => writeln!(f, "Free list (empty):")?,
        }
        for free in allocator.free_list.iter(arena) {
            Self::write_block(f, free.block(), arena)?;
        }

        Ok(())
    }
}
