//! Opaque handles returned by every allocation.

/// Handle to a span of arena memory.
///
/// A handle does not borrow the arena; it is resolved through
/// [`Arena::bytes`](crate::Arena::bytes), [`Arena::bytes_mut`](crate::Arena::bytes_mut)
/// or [`Arena::as_ptr`](crate::Arena::as_ptr), which return `None` once the
/// memory behind it has been reset, rolled back or destroyed. A rolled-back
/// handle stays dead even after later allocations reuse its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Allocation {
    pub(crate) block: usize,
    pub(crate) offset: usize,
    pub(crate) len: usize,
    /// Sequence number within the owning block
    pub(crate) serial: u64,
    pub(crate) epoch: u64,
}

impl Allocation {
    /// Requested size in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: the arena rejects zero-sized requests.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Index of the owning block, oldest block first.
    #[inline]
    pub fn block_index(&self) -> usize {
        self.block
    }

    /// Byte offset of the allocation inside its block.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Same start, new length and serial after an in-place resize.
    pub(crate) fn resized(self, len: usize, serial: u64) -> Self {
        Self {
            len,
            serial,
            ..self
        }
    }
}
