//! Allocator configuration parameters.

use crate::{alignment::is_aligned, error::Error, DSIZE, MIN_BLOCK_SIZE};

/// Configuration for the allocator.
///
/// Validated when the allocator is created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllocatorConfig {
    /// The minimum amount of bytes the arena is grown by whenever the heap
    /// runs out of free blocks, and the size of the first free block created
    /// by `init`.
    ///
    /// Default: 4096. Must be a multiple of 16 and at least 32.
    pub chunk_size: usize,
}

impl AllocatorConfig {
    /// Default heap extension size.
    pub const DEFAULT_CHUNK_SIZE: usize = 1 << 12;

    /// Creates a config with the given chunk size.
    pub const fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }

    /// Checks that the config can be used by an allocator.
    pub fn validate(&self) -> Result<(), Error> {
        if self.chunk_size < MIN_BLOCK_SIZE || !is_aligned(self.chunk_size, DSIZE) {
            return Err(Error::InvalidConfig {
                chunk_size: self.chunk_size,
            });
        }
        Ok(())
    }
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CHUNK_SIZE)
    }
}
