/// Align downwards. Returns the greatest x with alignment `align`
/// so that x <= n.
///
/// `align` must be a power of 2.
pub const fn align_down(n: usize, align: usize) -> usize {
    n & !(align - 1)
}

/// Align upwards. Returns the smallest x with alignment `align`
/// so that x >= n, or `None` if that overflows.
///
/// `align` must be a power of 2.
pub const fn checked_align_up(n: usize, align: usize) -> Option<usize> {
    match n.checked_add(align - 1) {
        Some(bumped) => Some(align_down(bumped, align)),
        None => None,
    }
}

/// Checks if the given value is aligned to the given alignment.
///
/// `align` must be a power of 2.
pub const fn is_aligned(n: usize, align: usize) -> bool {
    n & (align - 1) == 0
}
