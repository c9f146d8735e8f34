use either::Either;

use crate::{arena::Arena, boundary_tag::BoundaryTag, DSIZE, WSIZE};

/// The link value stored in a free block's prev or next field when there is
/// no such block. Offset 0 is the alignment padding word, never a payload.
const NO_LINK: usize = 0;

/// A block in the heap, identified by the offset of its payload.
///
/// This is only a handle, every accessor reads or writes the arena it is
/// given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block(usize);

impl Block {
    /// Returns a handle to the block whose payload starts at the given offset.
    pub const fn from_payload_offset(offset: usize) -> Self {
        Self(offset)
    }

    /// The offset where the payload of this block starts.
    pub const fn payload_offset(self) -> usize {
        self.0
    }

    /// The offset of the header word of this block.
    pub const fn header_offset(self) -> usize {
        self.0 - WSIZE
    }

    /// The header tag of this block.
    pub fn header<A: Arena>(self, arena: &A) -> BoundaryTag {
        BoundaryTag::from_raw(arena.read_word(self.header_offset()))
    }

    /// The size of this block, including its header and footer.
    pub fn size<A: Arena>(self, arena: &A) -> usize {
        self.header(arena).size()
    }

    pub fn is_allocated<A: Arena>(self, arena: &A) -> bool {
        self.header(arena).is_allocated()
    }

    /// The offset of the footer word of this block, according to the size
    /// stored in its header.
    pub fn footer_offset<A: Arena>(self, arena: &A) -> usize {
        self.0 + self.size(arena) - DSIZE
    }

    /// The footer tag of this block.
    pub fn footer<A: Arena>(self, arena: &A) -> BoundaryTag {
        BoundaryTag::from_raw(arena.read_word(self.footer_offset(arena)))
    }

    /// Writes both the header and the footer of this block. The footer is
    /// written at the end of the block according to the new size.
    pub fn set_tags<A: Arena>(self, arena: &mut A, size: usize, allocated: bool) {
        let tag = BoundaryTag::new(size, allocated);
        arena.write_word(self.header_offset(), tag.raw());
        arena.write_word(self.0 + size - DSIZE, tag.raw());
    }

    /// Returns the block right after this block in memory.
    pub fn next<A: Arena>(self, arena: &A) -> Block {
        Block(self.0 + self.size(arena))
    }

    /// The footer tag of the block right before this block in memory.
    pub fn prev_footer<A: Arena>(self, arena: &A) -> BoundaryTag {
        BoundaryTag::from_raw(arena.read_word(self.0 - DSIZE))
    }

    /// Returns the block right before this block in memory, found through the
    /// footer of that block, or `None` if that footer reaches back before the
    /// start of the arena.
    pub fn prev<A: Arena>(self, arena: &A) -> Option<Block> {
        self.0.checked_sub(self.prev_footer(arena).size()).map(Block)
    }

    /// Views this block as either a used block or a free block, according to
    /// its header.
    pub fn classify<A: Arena>(self, arena: &A) -> Either<UsedBlock, FreeBlock> {
        if self.is_allocated(arena) {
            Either::Left(UsedBlock(self))
        } else {
            Either::Right(FreeBlock(self))
        }
    }
}

/// A block which is marked as allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsedBlock(Block);

impl UsedBlock {
    pub const fn block(self) -> Block {
        self.0
    }

    /// The amount of bytes that the user may store in this block.
    pub fn payload_size<A: Arena>(self, arena: &A) -> usize {
        self.0.size(arena) - DSIZE
    }

    /// Marks this block as free by rewriting its header and footer. The block
    /// is not linked into any free list.
    pub fn mark_as_free<A: Arena>(self, arena: &mut A) -> FreeBlock {
        let size = self.0.size(arena);
        self.0.set_tags(arena, size, false);
        FreeBlock(self.0)
    }
}

/// A block which is marked as free, and whose first two payload words are the
/// links of the explicit free list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeBlock(Block);

impl FreeBlock {
    /// Writes free tags of the given size for the block at the given offset.
    /// The links are left for the free list to fill in.
    pub fn create_new<A: Arena>(arena: &mut A, payload_offset: usize, size: usize) -> FreeBlock {
        let block = Block(payload_offset);
        block.set_tags(arena, size, false);
        FreeBlock(block)
    }

    pub const fn block(self) -> Block {
        self.0
    }

    pub fn size<A: Arena>(self, arena: &A) -> usize {
        self.0.size(arena)
    }

    /// Changes the size of this free block, rewriting both tags.
    pub fn set_size<A: Arena>(self, arena: &mut A, new_size: usize) {
        self.0.set_tags(arena, new_size, false);
    }

    /// Marks this block as allocated, keeping its size. The block must have
    /// already been unlinked from the free list.
    pub fn mark_as_used<A: Arena>(self, arena: &mut A) -> UsedBlock {
        let size = self.0.size(arena);
        self.0.set_tags(arena, size, true);
        UsedBlock(self.0)
    }

    /// Marks this block as allocated with a new size. The block must have
    /// already been unlinked from the free list.
    pub fn mark_as_used_with_size<A: Arena>(self, arena: &mut A, size: usize) -> UsedBlock {
        self.0.set_tags(arena, size, true);
        UsedBlock(self.0)
    }

    /// The previous block in the free list, if any.
    pub fn prev_free<A: Arena>(self, arena: &A) -> Option<FreeBlock> {
        Self::decode_link(arena.read_word(self.0 .0))
    }

    /// The next block in the free list, if any.
    pub fn next_free<A: Arena>(self, arena: &A) -> Option<FreeBlock> {
        Self::decode_link(arena.read_word(self.0 .0 + WSIZE))
    }

    pub fn set_prev_free<A: Arena>(self, arena: &mut A, prev: Option<FreeBlock>) {
        arena.write_word(self.0 .0, Self::encode_link(prev));
    }

    pub fn set_next_free<A: Arena>(self, arena: &mut A, next: Option<FreeBlock>) {
        arena.write_word(self.0 .0 + WSIZE, Self::encode_link(next));
    }

    fn decode_link(raw: usize) -> Option<FreeBlock> {
        if raw == NO_LINK {
            None
        } else {
            Some(FreeBlock(Block(raw)))
        }
    }

    fn encode_link(link: Option<FreeBlock>) -> usize {
        link.map_or(NO_LINK, |block| block.0 .0)
    }
}
