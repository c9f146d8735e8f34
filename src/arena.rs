//! The memory region managed by the allocator.
//!
//! The allocator never deals with raw addresses. Instead it views the whole
//! region as one indexable byte buffer and reads and writes fixed width words
//! at byte offsets inside of it.

use alloc::vec::Vec;

use crate::WSIZE;

/// The default maximum size of a [`VecArena`], 20 MiB.
pub const DEFAULT_MAX_ARENA_SIZE: usize = 20 * (1 << 20);

/// A provider of a single contiguous region of memory which can only grow.
pub trait Arena {
    /// Grows the region by `additional` bytes.
    ///
    /// Returns the offset where the newly added bytes start, which is the size
    /// of the region before growing, or `None` if the region can't grow.
    fn grow(&mut self, additional: usize) -> Option<usize>;

    /// The current size of the region in bytes.
    fn size(&self) -> usize;

    /// The bytes of the region.
    fn bytes(&self) -> &[u8];

    /// The bytes of the region, mutably.
    fn bytes_mut(&mut self) -> &mut [u8];

    /// Reads the word at the given offset.
    ///
    /// The word must lie entirely inside the region, otherwise this panics.
    fn read_word(&self, offset: usize) -> usize {
        let mut word = [0u8; WSIZE];
        word.copy_from_slice(&self.bytes()[offset..offset + WSIZE]);
        u64::from_le_bytes(word) as usize
    }

    /// Writes the word at the given offset.
    ///
    /// The word must lie entirely inside the region, otherwise this panics.
    fn write_word(&mut self, offset: usize, value: usize) {
        self.bytes_mut()[offset..offset + WSIZE].copy_from_slice(&(value as u64).to_le_bytes());
    }

    /// Reads the word at the given offset, or returns `None` if the word is
    /// not entirely inside the region.
    fn try_read_word(&self, offset: usize) -> Option<usize> {
        let end = offset.checked_add(WSIZE)?;
        let bytes = self.bytes().get(offset..end)?;
        let mut word = [0u8; WSIZE];
        word.copy_from_slice(bytes);
        Some(u64::from_le_bytes(word) as usize)
    }
}

/// An arena backed by a heap allocated vector, which refuses to grow beyond a
/// maximum size.
#[derive(Debug, Clone)]
pub struct VecArena {
    memory: Vec<u8>,
    max_size: usize,
}

impl VecArena {
    /// Creates an empty arena which can grow up to
    /// [`DEFAULT_MAX_ARENA_SIZE`] bytes.
    pub const fn new() -> Self {
        Self::with_max_size(DEFAULT_MAX_ARENA_SIZE)
    }

    /// Creates an empty arena which can grow up to `max_size` bytes.
    pub const fn with_max_size(max_size: usize) -> Self {
        Self {
            memory: Vec::new(),
            max_size,
        }
    }

    /// The size that this arena will never grow beyond.
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Default for VecArena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena for VecArena {
    fn grow(&mut self, additional: usize) -> Option<usize> {
        let old_size = self.memory.len();
        let new_size = old_size.checked_add(additional)?;
        if new_size > self.max_size {
            return None;
        }

        // new memory is zeroed, so stale link fields never look like offsets.
        self.memory.resize(new_size, 0);

        Some(old_size)
    }

    fn size(&self) -> usize {
        self.memory.len()
    }

    fn bytes(&self) -> &[u8] {
        &self.memory
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grow_returns_old_break() {
        let mut arena = VecArena::with_max_size(64);
        assert_eq!(arena.grow(32), Some(0));
        assert_eq!(arena.grow(16), Some(32));
        assert_eq!(arena.size(), 48);
    }

    #[test]
    fn grow_beyond_max_size_fails_without_side_effects() {
        let mut arena = VecArena::with_max_size(64);
        assert_eq!(arena.grow(48), Some(0));
        assert_eq!(arena.grow(17), None);
        assert_eq!(arena.size(), 48);
        assert_eq!(arena.grow(usize::MAX), None);
    }

    #[test]
    fn words_round_trip_and_bounds_are_checked() {
        let mut arena = VecArena::new();
        arena.grow(32).unwrap();

        arena.write_word(8, 0xdead_beef);
        assert_eq!(arena.read_word(8), 0xdead_beef);
        assert_eq!(arena.try_read_word(8), Some(0xdead_beef));

        assert_eq!(arena.try_read_word(24), Some(0));
        assert_eq!(arena.try_read_word(25), None);
        assert_eq!(arena.try_read_word(usize::MAX), None);
    }
}
