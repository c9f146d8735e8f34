#![no_std]

//! This is an explicit free list allocator with boundary tag coalescing. It
//! manages a single contiguous region of memory, an [`Arena`], which it grows
//! on demand, and services allocation, deallocation and reallocation requests
//! inside of it.
//!
//! Every block in the heap starts with a header word and ends with a footer
//! word, both holding the size of the block and whether it is allocated. The
//! footers allow finding the block before any block in constant time, so a
//! freed block is always merged with its free neighbours right away and no two
//! adjacent blocks are ever free. Free blocks additionally store the links of
//! a doubly linked free list in their payload, which is searched first-fit for
//! every allocation.
//!
//! The allocator never hands out raw addresses. A [`HeapPtr`] is the offset of
//! a payload inside the arena, and the payload bytes are accessed through
//! [`Allocator::payload`] and [`Allocator::payload_mut`].
//!
//! ## Usage
//!
//! ```
//! use boundary_tag_allocator::{Allocator, VecArena};
//!
//! let mut allocator = Allocator::new(VecArena::new());
//! allocator.init().unwrap();
//!
//! let ptr = allocator.alloc(100).unwrap();
//! allocator.payload_mut(ptr).unwrap()[..5].copy_from_slice(b"hello");
//!
//! let ptr = allocator.realloc(Some(ptr), 5000).unwrap();
//! assert_eq!(&allocator.payload(ptr).unwrap()[..5], b"hello");
//!
//! allocator.dealloc(Some(ptr));
//! allocator.check_heap().unwrap();
//! ```
//!
//! ## Features
//!
//! - **`spin`** (default): Provide a `SpinLockedAllocator` type which wraps an
//!   allocator in a spinlock so that it can be shared between threads.

#[cfg(test)]
#[macro_use]
extern crate std;

extern crate alloc;

mod alignment;
mod arena;
mod blocks;
mod boundary_tag;
mod checker;
mod config;
mod error;
mod free_list;
mod inspect;

#[cfg(test)]
mod tests;

use core::fmt;

use alignment::{checked_align_up, is_aligned};
pub use arena::{Arena, VecArena, DEFAULT_MAX_ARENA_SIZE};
use blocks::{Block, FreeBlock, UsedBlock};
use boundary_tag::BoundaryTag;
pub use checker::{HeapCheckError, Violation};
pub use config::AllocatorConfig;
pub use error::Error;
use free_list::FreeList;
pub use inspect::{BlockInfo, Blocks, FreeBlocks, HeapDump, HeapStats};

/// Word size in bytes. Headers, footers and free list links are each one word.
const WSIZE: usize = 8;

/// Double word size in bytes. Every block size and payload offset is a
/// multiple of it.
const DSIZE: usize = 2 * WSIZE;

/// The overhead of the header and footer of a block.
const OVERHEAD: usize = 2 * WSIZE;

/// The smallest block: header, footer, and the two free list links it needs
/// once it is freed.
const MIN_BLOCK_SIZE: usize = OVERHEAD + 2 * WSIZE;

/// The size of the prologue block, which only has a header and a footer.
const PROLOGUE_SIZE: usize = OVERHEAD;

/// The size of the initial heap: alignment padding, prologue header and
/// footer, and the epilogue header.
const INITIAL_HEAP_SIZE: usize = 4 * WSIZE;

/// A pointer to the payload of an allocated block, in the form of the offset
/// of the payload inside the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HeapPtr(usize);

impl HeapPtr {
    /// Creates a pointer from a payload offset. Returns `None` for offset 0,
    /// which never holds a payload.
    pub const fn from_offset(offset: usize) -> Option<Self> {
        if offset == 0 {
            None
        } else {
            Some(Self(offset))
        }
    }

    /// The offset of the payload inside the arena.
    pub const fn offset(self) -> usize {
        self.0
    }

    fn from_block(block: Block) -> Self {
        Self(block.payload_offset())
    }

    fn block(self) -> Block {
        Block::from_payload_offset(self.0)
    }
}

impl fmt::Display for HeapPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// An explicit free list memory allocator over an [`Arena`].
///
/// Every operation takes `&mut self`, so a single allocator can't be used
/// from multiple threads at once. See `SpinLockedAllocator` for a shareable
/// version.
#[derive(Debug)]
pub struct Allocator<A: Arena = VecArena> {
    arena: A,
    config: AllocatorConfig,
    free_list: FreeList,

    /// The prologue block, or `None` if the allocator was not initialized.
    heap_start: Option<Block>,
}

impl<A: Arena> Allocator<A> {
    /// Creates an uninitialized allocator over the given arena with the
    /// default config. Every allocation request fails until `init` is called.
    pub const fn new(arena: A) -> Self {
        Self {
            arena,
            config: AllocatorConfig::new(AllocatorConfig::DEFAULT_CHUNK_SIZE),
            free_list: FreeList::new(),
            heap_start: None,
        }
    }

    /// Creates an uninitialized allocator over the given arena with the given
    /// config.
    pub fn with_config(arena: A, config: AllocatorConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(arena)
        })
    }

    /// Checks if the heap was already initialized by calling `init`.
    pub fn was_initialized(&self) -> bool {
        self.heap_start.is_some()
    }

    /// The arena managed by this allocator.
    pub fn arena(&self) -> &A {
        &self.arena
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Creates the prologue and epilogue blocks and a first free block of
    /// `chunk_size` bytes between them.
    ///
    /// Fails with [`Error::OutOfMemory`] if the arena can't grow, in which case
    /// the arena is left as it was and `init` may be retried. Fails with
    /// [`Error::AlreadyInitialized`] if called twice.
    pub fn init(&mut self) -> Result<(), Error> {
        if self.was_initialized() {
            return Err(Error::AlreadyInitialized);
        }

        // the arena might already contain bytes which are not ours, make sure that
        // payloads will be aligned anyway.
        let cur_size = self.arena.size();
        let chunk_size = self.config.chunk_size;
        let heap_size = chunk_size
            .checked_add(INITIAL_HEAP_SIZE)
            .ok_or(Error::OutOfMemory {
                requested: chunk_size,
            })?;
        let out_of_memory = Error::OutOfMemory {
            requested: heap_size,
        };
        let padding = checked_align_up(cur_size, DSIZE).ok_or(out_of_memory.clone())? - cur_size;
        let requested = padding.checked_add(heap_size).ok_or(out_of_memory)?;

        // grow once for the sentinels and the first block, so that a failure leaves
        // nothing behind.
        let start = self
            .arena
            .grow(requested)
            .ok_or(Error::OutOfMemory { requested })?
            + padding;

        let prologue_tag = BoundaryTag::new(PROLOGUE_SIZE, true).raw();
        self.arena.write_word(start, 0);
        self.arena.write_word(start + WSIZE, prologue_tag);
        self.arena.write_word(start + 2 * WSIZE, prologue_tag);

        // the first block's header takes the place where the epilogue header would
        // be in an empty heap.
        let first_block =
            FreeBlock::create_new(&mut self.arena, start + INITIAL_HEAP_SIZE, chunk_size);
        self.arena.write_word(
            start + INITIAL_HEAP_SIZE + chunk_size - WSIZE,
            BoundaryTag::new(0, true).raw(),
        );

        self.free_list = FreeList::new();
        self.free_list.insert_front(&mut self.arena, first_block);

        // the prologue's payload is empty, it starts right after its header.
        self.heap_start = Some(Block::from_payload_offset(start + 2 * WSIZE));

        log::debug!("initialized heap at offset {:#x}", start);
        Ok(())
    }

    /// Allocates a block with a payload of at least `size` bytes.
    ///
    /// Returns `None` if `size` is 0, if the allocator was not initialized,
    /// or if the arena is out of memory.
    pub fn alloc(&mut self, size: usize) -> Option<HeapPtr> {
        self.try_alloc(size)
            .map_err(|err| Self::report("alloc", &err))
            .ok()
    }

    /// Allocates a block with a payload of at least `size` bytes.
    pub fn try_alloc(&mut self, size: usize) -> Result<HeapPtr, Error> {
        if !self.was_initialized() {
            return Err(Error::Uninitialized);
        }
        if size == 0 {
            return Err(Error::ZeroSize);
        }

        let adjusted_size =
            Self::adjusted_size(size).ok_or(Error::OutOfMemory { requested: size })?;

        let block = match self.free_list.find_fit(&self.arena, adjusted_size) {
            Some(block) => block,
            None => {
                // no fit, get more memory and place the block there.
                let extend_size = core::cmp::max(adjusted_size, self.config.chunk_size);
                self.extend_heap(extend_size)?
            }
        };

        let used = self.place(block, adjusted_size);
        let ptr = HeapPtr::from_block(used.block());

        log::trace!("allocated {} bytes at {}", size, ptr);
        Ok(ptr)
    }

    /// Frees the block pointed to by the given pointer. Freeing `None` does
    /// nothing.
    ///
    /// A pointer which is not a live allocated block, for example because it
    /// was already freed, is reported and otherwise ignored.
    pub fn dealloc(&mut self, ptr: Option<HeapPtr>) {
        if let Some(ptr) = ptr {
            if let Err(err) = self.try_dealloc(ptr) {
                Self::report("dealloc", &err);
            }
        }
    }

    /// Frees the block pointed to by the given pointer.
    ///
    /// Fails with [`Error::InvalidFree`] without changing anything if the
    /// pointer is not a live allocated block.
    pub fn try_dealloc(&mut self, ptr: HeapPtr) -> Result<(), Error> {
        if !self.was_initialized() {
            return Err(Error::Uninitialized);
        }

        let used = self.used_block(ptr).ok_or(Error::InvalidFree { ptr })?;
        let free = used.mark_as_free(&mut self.arena);
        self.coalesce(free);

        log::trace!("freed {}", ptr);
        Ok(())
    }

    /// Resizes the block pointed to by the given pointer so that its payload
    /// can hold at least `new_size` bytes, keeping its contents.
    ///
    /// A `new_size` of 0 frees the block and returns `None`, and a `None`
    /// pointer is the same as calling `alloc`. If the block has to be moved
    /// and the new allocation fails, `None` is returned and the original
    /// block is left untouched.
    pub fn realloc(&mut self, ptr: Option<HeapPtr>, new_size: usize) -> Option<HeapPtr> {
        self.try_realloc(ptr, new_size).unwrap_or_else(|err| {
            Self::report("realloc", &err);
            None
        })
    }

    /// Resizes the block pointed to by the given pointer so that its payload
    /// can hold at least `new_size` bytes, keeping its contents.
    pub fn try_realloc(
        &mut self,
        ptr: Option<HeapPtr>,
        new_size: usize,
    ) -> Result<Option<HeapPtr>, Error> {
        if new_size == 0 {
            if let Some(ptr) = ptr {
                self.try_dealloc(ptr)?;
            }
            return Ok(None);
        }

        let Some(ptr) = ptr else {
            return self.try_alloc(new_size).map(Some);
        };

        if !self.was_initialized() {
            return Err(Error::Uninitialized);
        }

        let used = self.used_block(ptr).ok_or(Error::InvalidPointer { ptr })?;
        let adjusted_size =
            Self::adjusted_size(new_size).ok_or(Error::OutOfMemory { requested: new_size })?;

        // first try to realloc in place, to avoid copying memory.
        if adjusted_size <= used.block().size(&self.arena) {
            self.shrink_in_place(used, adjusted_size);
            return Ok(Some(ptr));
        }
        if self.try_grow_in_place(used, adjusted_size) {
            return Ok(Some(ptr));
        }

        // if reallocation in place fails, allocate a new block and copy the data
        // there. if this fails the original block is left untouched.
        let old_payload_size = used.payload_size(&self.arena);
        let new_ptr = self.try_alloc(new_size)?;

        let copy_len = core::cmp::min(old_payload_size, new_size);
        self.arena
            .bytes_mut()
            .copy_within(ptr.offset()..ptr.offset() + copy_len, new_ptr.offset());
        self.try_dealloc(ptr)?;

        log::trace!("moved {} to {} ({} bytes)", ptr, new_ptr, new_size);
        Ok(Some(new_ptr))
    }

    /// The amount of bytes that can be stored in the payload of the given
    /// block, or `None` if it is not a live allocated block.
    pub fn usable_size(&self, ptr: HeapPtr) -> Option<usize> {
        Some(self.used_block(ptr)?.payload_size(&self.arena))
    }

    /// The payload of the given block, or `None` if it is not a live
    /// allocated block.
    pub fn payload(&self, ptr: HeapPtr) -> Option<&[u8]> {
        let payload_size = self.usable_size(ptr)?;
        self.arena
            .bytes()
            .get(ptr.offset()..ptr.offset() + payload_size)
    }

    /// The payload of the given block, mutably, or `None` if it is not a live
    /// allocated block.
    pub fn payload_mut(&mut self, ptr: HeapPtr) -> Option<&mut [u8]> {
        let payload_size = self.usable_size(ptr)?;
        self.arena
            .bytes_mut()
            .get_mut(ptr.offset()..ptr.offset() + payload_size)
    }

    /// Computes the size of the block needed for a payload of `size` bytes:
    /// the payload plus the header and footer, rounded up to the double word
    /// alignment, and no smaller than the minimum block size.
    ///
    /// Returns `None` if that size overflows.
    fn adjusted_size(size: usize) -> Option<usize> {
        let size = checked_align_up(size.checked_add(OVERHEAD)?, DSIZE)?;
        Some(core::cmp::max(size, MIN_BLOCK_SIZE))
    }

    /// Logs an error returned from one of the `try_` functions, for the
    /// wrappers which only return `Option`.
    fn report(operation: &str, err: &Error) {
        match err {
            Error::ZeroSize => log::trace!("{}: {}", operation, err),
            Error::OutOfMemory { .. } => log::debug!("{}: {}", operation, err),
            _ => log::warn!("{}: {}", operation, err),
        }
    }

    /// Returns the block of the given pointer, if the pointer looks like the
    /// payload of a live allocated block.
    ///
    /// Freeing a block reads and relinks its neighbours, so they are checked
    /// too: both must have matching tags inside the heap, and a free neighbour
    /// must have free list links inside the arena. Payload bytes shaped exactly
    /// like such a group of blocks can't be told apart from real blocks.
    fn used_block(&self, ptr: HeapPtr) -> Option<UsedBlock> {
        let heap_start = self.heap_start?;
        let first_block_offset = heap_start.payload_offset() + PROLOGUE_SIZE;
        let offset = ptr.offset();
        if offset < first_block_offset || !is_aligned(offset, DSIZE) {
            return None;
        }

        let header = self.tag_at(offset - WSIZE)?;
        let size = header.size();
        if size < MIN_BLOCK_SIZE {
            return None;
        }

        // the block must end before the epilogue header.
        let end = offset.checked_add(size)?;
        if end > self.arena.size() {
            return None;
        }

        if self.tag_at(end - DSIZE)? != header
            || !self.prev_block_is_well_formed(offset, heap_start)
            || !self.next_block_is_well_formed(end)
        {
            return None;
        }

        ptr.block().classify(&self.arena).left()
    }

    /// Checks the block right before the block at `offset`, found through its
    /// footer. It may be the prologue, but must not start before it.
    fn prev_block_is_well_formed(&self, offset: usize, heap_start: Block) -> bool {
        let Some(footer) = self.tag_at(offset - DSIZE) else {
            return false;
        };
        let Some(prev_offset) = offset.checked_sub(footer.size()) else {
            return false;
        };
        if footer.size() < PROLOGUE_SIZE || prev_offset < heap_start.payload_offset() {
            return false;
        }
        if self.tag_at(prev_offset - WSIZE) != Some(footer) {
            return false;
        }

        footer.is_allocated()
            || (footer.size() >= MIN_BLOCK_SIZE && self.free_links_in_bounds(prev_offset))
    }

    /// Checks the block whose payload starts at `offset`, right after another
    /// block. It is either the epilogue or a block with matching tags.
    fn next_block_is_well_formed(&self, offset: usize) -> bool {
        let Some(header) = self.tag_at(offset - WSIZE) else {
            return false;
        };
        if header.size() == 0 {
            return header.is_allocated() && offset == self.arena.size();
        }
        if header.size() < MIN_BLOCK_SIZE {
            return false;
        }

        let footer = offset
            .checked_add(header.size())
            .filter(|end| *end <= self.arena.size())
            .and_then(|end| self.tag_at(end - DSIZE));
        if footer != Some(header) {
            return false;
        }

        header.is_allocated() || self.free_links_in_bounds(offset)
    }

    /// Checks that both free list links of the free block at `offset` are
    /// either empty or point at a block whose links lie inside the heap, so
    /// that unlinking the block only writes inside the arena.
    fn free_links_in_bounds(&self, offset: usize) -> bool {
        let Some(first_block_offset) = self
            .heap_start
            .map(|prologue| prologue.payload_offset() + PROLOGUE_SIZE)
        else {
            return false;
        };
        let link_in_bounds = |link: usize| {
            link == 0
                || (link >= first_block_offset
                    && is_aligned(link, DSIZE)
                    && link
                        .checked_add(DSIZE)
                        .is_some_and(|end| end <= self.arena.size()))
        };

        match (
            self.arena.try_read_word(offset),
            self.arena.try_read_word(offset + WSIZE),
        ) {
            (Some(prev), Some(next)) => link_in_bounds(prev) && link_in_bounds(next),
            _ => false,
        }
    }

    /// Reads the tag at the given offset, or returns `None` if it is outside
    /// of the arena.
    fn tag_at(&self, offset: usize) -> Option<BoundaryTag> {
        self.arena.try_read_word(offset).map(BoundaryTag::from_raw)
    }

    /// Extends the heap with a new free block of at least `size` bytes and
    /// coalesces it with the last block if that block is free.
    ///
    /// Returns the resulting free block, which is already in the free list.
    fn extend_heap(&mut self, size: usize) -> Result<FreeBlock, Error> {
        let size = checked_align_up(size, DSIZE).ok_or(Error::OutOfMemory { requested: size })?;

        // the old epilogue header becomes the header of the new block, since the new
        // region starts right after it.
        let payload_offset = self
            .arena
            .grow(size)
            .ok_or(Error::OutOfMemory { requested: size })?;
        let block = FreeBlock::create_new(&mut self.arena, payload_offset, size);

        // write the new epilogue header
        let epilogue = block.block().next(&self.arena);
        self.arena
            .write_word(epilogue.header_offset(), BoundaryTag::new(0, true).raw());

        log::debug!(
            "extended heap by {} bytes, arena size is now {}",
            size,
            self.arena.size()
        );

        Ok(self.coalesce(block))
    }

    /// Merges the given free block, which must not be in the free list, with
    /// its free neighbours, and inserts the result at the front of the free
    /// list.
    ///
    /// Returns the merged block.
    fn coalesce(&mut self, block: FreeBlock) -> FreeBlock {
        let size = block.size(&self.arena);

        // a previous footer of size 0 would make the block its own previous block.
        let prev_footer = block.block().prev_footer(&self.arena);
        let prev_free = if prev_footer.size() == 0 {
            None
        } else {
            block
                .block()
                .prev(&self.arena)
                .and_then(|prev| prev.classify(&self.arena).right())
        };
        let next_free = block.block().next(&self.arena).classify(&self.arena).right();

        let merged = match (prev_free, next_free) {
            (None, None) => block,
            (None, Some(next_free)) => {
                let next_size = next_free.size(&self.arena);
                self.free_list.remove(&mut self.arena, next_free);
                block.set_size(&mut self.arena, size + next_size);
                block
            }
            (Some(prev_free), None) => {
                let prev_size = prev_free.size(&self.arena);
                self.free_list.remove(&mut self.arena, prev_free);
                prev_free.set_size(&mut self.arena, prev_size + size);
                prev_free
            }
            (Some(prev_free), Some(next_free)) => {
                let prev_size = prev_free.size(&self.arena);
                let next_size = next_free.size(&self.arena);
                self.free_list.remove(&mut self.arena, prev_free);
                self.free_list.remove(&mut self.arena, next_free);
                prev_free.set_size(&mut self.arena, prev_size + size + next_size);
                prev_free
            }
        };

        self.free_list.insert_front(&mut self.arena, merged);
        merged
    }

    /// Allocates `adjusted_size` bytes at the start of the given free block,
    /// splitting the rest off into a new free block if it is large enough to
    /// be one.
    fn place(&mut self, block: FreeBlock, adjusted_size: usize) -> UsedBlock {
        let cur_size = block.size(&self.arena);
        self.free_list.remove(&mut self.arena, block);

        let remainder = cur_size - adjusted_size;
        if remainder >= MIN_BLOCK_SIZE {
            let used = block.mark_as_used_with_size(&mut self.arena, adjusted_size);
            let remainder_block = FreeBlock::create_new(
                &mut self.arena,
                used.block().payload_offset() + adjusted_size,
                remainder,
            );
            self.coalesce(remainder_block);
            used
        } else {
            // not enough space left for a free block, allocate all of it.
            block.mark_as_used(&mut self.arena)
        }
    }

    /// Shrinks the given block in place to `adjusted_size` bytes. If the
    /// unused end of the block is large enough to be a block, it is freed.
    fn shrink_in_place(&mut self, used: UsedBlock, adjusted_size: usize) {
        let block = used.block();
        let cur_size = block.size(&self.arena);

        let space_left_at_end = cur_size - adjusted_size;
        if space_left_at_end < MIN_BLOCK_SIZE {
            // leave the unused end attached to the block.
            return;
        }

        block.set_tags(&mut self.arena, adjusted_size, true);
        let end_block = FreeBlock::create_new(
            &mut self.arena,
            block.payload_offset() + adjusted_size,
            space_left_at_end,
        );
        self.coalesce(end_block);
    }

    /// Tries to grow the given block in place to `adjusted_size` bytes by
    /// absorbing the block after it, which must be free.
    ///
    /// Returns whether or not the operation was successful.
    fn try_grow_in_place(&mut self, used: UsedBlock, adjusted_size: usize) -> bool {
        let block = used.block();
        let Some(next_free) = block.next(&self.arena).classify(&self.arena).right() else {
            return false;
        };

        // the block after the next block is surely used, since no 2 free blocks are
        // adjacent, so the next block alone must be enough.
        let combined_size = block.size(&self.arena) + next_free.size(&self.arena);
        if combined_size < adjusted_size {
            return false;
        }

        self.free_list.remove(&mut self.arena, next_free);

        let space_left_at_end = combined_size - adjusted_size;
        if space_left_at_end >= MIN_BLOCK_SIZE {
            block.set_tags(&mut self.arena, adjusted_size, true);
            let end_block = FreeBlock::create_new(
                &mut self.arena,
                block.payload_offset() + adjusted_size,
                space_left_at_end,
            );
            self.coalesce(end_block);
        } else {
            block.set_tags(&mut self.arena, combined_size, true);
        }

        true
    }
}

impl<A: Arena + Default> Default for Allocator<A> {
    fn default() -> Self {
        Self::new(A::default())
    }
}

/// A spin locked allocator which can be shared between threads.
#[cfg(feature = "spin")]
pub struct SpinLockedAllocator<A: Arena = VecArena>(spin::Mutex<Allocator<A>>);

#[cfg(feature = "spin")]
impl<A: Arena> SpinLockedAllocator<A> {
    /// Creates an uninitialized locked allocator over the given arena.
    ///
    /// To initialize this allocator, use the `init` method.
    pub const fn new(arena: A) -> Self {
        Self(spin::Mutex::new(Allocator::new(arena)))
    }

    /// Wraps an existing allocator in a spinlock.
    pub const fn from_allocator(allocator: Allocator<A>) -> Self {
        Self(spin::Mutex::new(allocator))
    }

    /// Locks the allocator, for accessing payloads or running multiple
    /// operations without other threads interleaving.
    pub fn lock(&self) -> spin::MutexGuard<'_, Allocator<A>> {
        self.0.lock()
    }

    /// Initializes the heap. See [`Allocator::init`].
    pub fn init(&self) -> Result<(), Error> {
        self.0.lock().init()
    }

    /// Checks if the heap was already initialized by calling init.
    pub fn was_initialized(&self) -> bool {
        self.0.lock().was_initialized()
    }

    pub fn alloc(&self, size: usize) -> Option<HeapPtr> {
        self.0.lock().alloc(size)
    }

    pub fn dealloc(&self, ptr: Option<HeapPtr>) {
        self.0.lock().dealloc(ptr)
    }

    pub fn realloc(&self, ptr: Option<HeapPtr>, new_size: usize) -> Option<HeapPtr> {
        self.0.lock().realloc(ptr, new_size)
    }

    /// Runs the heap consistency checker. See [`Allocator::check_heap`].
    #[track_caller]
    pub fn check_heap(&self) -> Result<(), Error> {
        let location = core::panic::Location::caller();
        self.0.lock().check_heap_at(location)
    }
}
