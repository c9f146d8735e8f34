use crate::DSIZE;

/// Mask of the low bits of a tag which are reserved for flags. Block sizes are
/// multiples of [`DSIZE`], so these bits of the size are always zero.
const FLAG_BITS: usize = DSIZE - 1;

const ALLOCATED_BIT: usize = 1;

/// A header or footer word of a block, packing the block size together with
/// its allocated flag.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryTag(usize);

impl BoundaryTag {
    /// Packs a size and an allocated flag into a tag.
    ///
    /// The size must be a multiple of [`DSIZE`], otherwise the low bits of the
    /// size would be mistaken for flags.
    pub const fn new(size: usize, allocated: bool) -> Self {
        debug_assert!(size & FLAG_BITS == 0);
        Self(size | allocated as usize)
    }

    /// Reinterprets a raw word read from the arena as a tag.
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// The raw word as stored in the arena.
    pub const fn raw(self) -> usize {
        self.0
    }

    /// The block size stored in the tag.
    pub const fn size(self) -> usize {
        self.0 & !FLAG_BITS
    }

    pub const fn is_allocated(self) -> bool {
        self.0 & ALLOCATED_BIT != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saves_size_and_flag_correctly() {
        let tag = BoundaryTag::new(48, true);
        assert_eq!(tag.size(), 48);
        assert!(tag.is_allocated());
        assert_eq!(tag.raw(), 49);
    }

    #[test]
    fn free_and_allocated_tags_of_same_size_differ() {
        let free = BoundaryTag::new(4096, false);
        let allocated = BoundaryTag::new(4096, true);
        assert_ne!(free, allocated);
        assert_eq!(free.size(), allocated.size());
        assert_eq!(free.raw(), 4096);
    }

    #[test]
    fn from_raw_ignores_unknown_flag_bits_in_size() {
        let tag = BoundaryTag::from_raw(64 | 0b110);
        assert_eq!(tag.size(), 64);
        assert!(!tag.is_allocated());
    }
}
