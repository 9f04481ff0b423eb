//! Alignment arithmetic shared by every allocation path.
//!
//! All helpers assume a power-of-two alignment; [`normalize_alignment`] is the
//! single place where caller-supplied alignments are made valid.

/// Alignment used when the caller does not ask for one, or asks for an
/// invalid one.
pub const DEFAULT_ALIGNMENT: usize = 8;

/// Hard cap on any alignment request.
pub const MAX_ALIGNMENT: usize = 16;

/// Rounds `value` up to the next multiple of `alignment`.
///
/// # Examples
/// ```
/// use nebula_arena::align::align_up;
///
/// assert_eq!(align_up(7, 8), 8);
/// assert_eq!(align_up(8, 8), 8);
/// assert_eq!(align_up(9, 8), 16);
/// ```
#[inline]
#[must_use]
pub const fn align_up(value: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    (value + alignment - 1) & !(alignment - 1)
}

/// Checks if a value is aligned to the given alignment
///
/// # Examples
/// ```
/// use nebula_arena::align::is_aligned;
///
/// assert!(is_aligned(32, 16));
/// assert!(!is_aligned(33, 16));
/// ```
#[inline]
#[must_use]
pub const fn is_aligned(value: usize, alignment: usize) -> bool {
    debug_assert!(alignment.is_power_of_two());
    value & (alignment - 1) == 0
}

/// Bytes of padding needed to move `address` onto an `alignment` boundary.
#[inline]
#[must_use]
pub const fn padding_for(address: usize, alignment: usize) -> usize {
    align_up(address, alignment) - address
}

/// Turns a caller-supplied alignment into one the arena can honour.
///
/// Zero or non-power-of-two values fall back to `fallback`; anything above
/// `max` is clamped down to `max`. Never fails.
#[inline]
#[must_use]
pub const fn normalize_alignment(requested: usize, fallback: usize, max: usize) -> usize {
    let alignment = if requested.is_power_of_two() {
        requested
    } else {
        fallback
    };
    if alignment > max { max } else { alignment }
}
