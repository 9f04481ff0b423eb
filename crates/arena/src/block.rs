//! A single contiguous storage span with a bump cursor.
//!
//! # Safety
//!
//! - `ptr` is valid for reads and writes of `capacity` bytes for the whole
//!   life of the block, and every one of those bytes is initialised
//!   (owned storage comes from `alloc_zeroed`, borrowed storage is a `&mut [u8]`)
//! - `cursor <= capacity` at all times
//! - `last`, when set, is the start offset of the newest live allocation and
//!   `last <= cursor`
//! - `rewinds` is strictly increasing in both `serial` and `cursor`
//! - owned storage is released exactly once, in `Drop`, with the layout it
//!   was acquired with

use std::alloc::{Layout, alloc_zeroed, dealloc};
use std::marker::PhantomData;
use std::ptr::{self, NonNull};
use std::slice;

use crate::align::padding_for;
use crate::error::{ArenaError, ArenaResult};

/// Placement of a successful bump inside a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Bump {
    /// Aligned start offset
    pub offset: usize,
    /// Bytes skipped to reach `offset`
    pub padding: usize,
    /// Per-block sequence number of this allocation
    pub serial: u64,
}

/// A rollback that cut the cursor back to `cursor`: every allocation issued
/// before `serial` that ends past `cursor` is dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rewind {
    serial: u64,
    cursor: usize,
}

pub(crate) struct Block<'buf> {
    ptr: NonNull<u8>,
    capacity: usize,
    cursor: usize,
    last: Option<usize>,
    /// Serial handed to the next allocation
    serial: u64,
    rewinds: Vec<Rewind>,
    /// `Some` when the block owns its storage.
    layout: Option<Layout>,
    _buffer: PhantomData<&'buf mut [u8]>,
}

impl Block<'static> {
    /// Acquires `capacity` zeroed bytes aligned to `align` from the global
    /// allocator.
    pub(crate) fn allocate(capacity: usize, align: usize) -> ArenaResult<Self> {
        let capacity = capacity.max(1);
        let layout = Layout::from_size_align(capacity, align)
            .map_err(|_| ArenaError::block_allocation_failed(capacity, align))?;

        // SAFETY: layout has a non-zero size (clamped above) and a
        // power-of-two alignment (checked by from_size_align).
        let raw = unsafe { alloc_zeroed(layout) };
        let ptr =
            NonNull::new(raw).ok_or_else(|| ArenaError::block_allocation_failed(capacity, align))?;

        Ok(Self {
            ptr,
            capacity,
            cursor: 0,
            last: None,
            serial: 0,
            rewinds: Vec::new(),
            layout: Some(layout),
            _buffer: PhantomData,
        })
    }
}

impl<'buf> Block<'buf> {
    /// Wraps caller-supplied storage. The block never frees it.
    pub(crate) fn from_buffer(buffer: &'buf mut [u8]) -> Self {
        let capacity = buffer.len();
        Self {
            ptr: NonNull::from(buffer).cast(),
            capacity,
            cursor: 0,
            last: None,
            serial: 0,
            rewinds: Vec::new(),
            layout: None,
            _buffer: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub(crate) fn last(&self) -> Option<usize> {
        self.last
    }

    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.capacity - self.cursor
    }

    #[inline]
    pub(crate) fn base_addr(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    pub(crate) fn is_owned(&self) -> bool {
        self.layout.is_some()
    }

    /// Padding the next allocation at `align` would consume.
    #[inline]
    pub(crate) fn padding_at_cursor(&self, align: usize) -> usize {
        padding_for(self.base_addr() + self.cursor, align)
    }

    /// Moves the cursor past `size` bytes at `align`, or returns `None` and
    /// leaves the block untouched when they do not fit.
    #[inline]
    pub(crate) fn try_bump(&mut self, size: usize, align: usize) -> Option<Bump> {
        let padding = self.padding_at_cursor(align);
        let offset = self.cursor.checked_add(padding)?;
        let end = offset.checked_add(size)?;
        if end > self.capacity {
            return None;
        }

        self.cursor = end;
        self.last = Some(offset);
        Some(Bump {
            offset,
            padding,
            serial: self.next_serial(),
        })
    }

    fn next_serial(&mut self) -> u64 {
        let serial = self.serial;
        self.serial += 1;
        serial
    }

    /// Grows or shrinks the newest allocation in place and returns the
    /// serial of the resized allocation.
    ///
    /// Succeeds only when `offset` is the newest allocation, it currently
    /// ends at the cursor, and `offset + new_len` fits the block.
    pub(crate) fn resize_last(
        &mut self,
        offset: usize,
        old_len: usize,
        new_len: usize,
    ) -> Option<u64> {
        if self.last != Some(offset) || offset + old_len != self.cursor {
            return None;
        }
        let end = offset.checked_add(new_len)?;
        if end > self.capacity {
            return None;
        }
        self.cursor = end;
        Some(self.next_serial())
    }

    /// Restores a cursor captured earlier, clamped to this block's capacity.
    ///
    /// Every allocation issued so far that ends past the restored cursor
    /// stops being live, even once later allocations cover that range again.
    pub(crate) fn rewind(&mut self, cursor: usize, last: Option<usize>) {
        self.cursor = cursor.min(self.capacity);
        self.last = last.filter(|&start| start <= self.cursor);

        // An older rewind to a cursor at least this far is subsumed.
        while self
            .rewinds
            .last()
            .is_some_and(|rewind| rewind.cursor >= self.cursor)
        {
            self.rewinds.pop();
        }
        // Same serial with a lower cursor already kills everything this would.
        if self
            .rewinds
            .last()
            .is_none_or(|rewind| rewind.serial < self.serial)
        {
            self.rewinds.push(Rewind {
                serial: self.serial,
                cursor: self.cursor,
            });
        }
    }

    pub(crate) fn reset(&mut self) {
        self.cursor = 0;
        self.last = None;
        self.rewinds.clear();
    }

    /// Zeroes everything the cursor has passed over.
    pub(crate) fn zero_used(&mut self) {
        // SAFETY: cursor <= capacity and ptr is valid for capacity bytes.
        unsafe { ptr::write_bytes(self.ptr.as_ptr(), 0, self.cursor) };
    }

    /// True when `offset..offset + len` lies below the cursor.
    #[inline]
    pub(crate) fn contains(&self, offset: usize, len: usize) -> bool {
        offset
            .checked_add(len)
            .is_some_and(|end| end <= self.cursor)
    }

    /// True when the allocation `serial` at `offset..offset + len` is below
    /// the cursor and no later rewind cut below its end.
    pub(crate) fn is_live(&self, offset: usize, len: usize, serial: u64) -> bool {
        let Some(end) = offset.checked_add(len) else {
            return false;
        };
        if end > self.cursor {
            return false;
        }
        // Rewinds issued after `serial` form a suffix of the stack; its first
        // entry has the lowest cursor.
        let first_later = self.rewinds.partition_point(|rewind| rewind.serial <= serial);
        self.rewinds
            .get(first_later)
            .is_none_or(|rewind| end <= rewind.cursor)
    }

    /// Pointer to `offset`, which must be `<= capacity`.
    #[inline]
    pub(crate) fn ptr_at(&self, offset: usize) -> NonNull<u8> {
        debug_assert!(offset <= self.capacity);
        // SAFETY: offset is within (or one past) the allocation.
        unsafe { self.ptr.add(offset) }
    }

    pub(crate) fn bytes(&self, offset: usize, len: usize) -> Option<&[u8]> {
        if !self.contains(offset, len) {
            return None;
        }
        // SAFETY: the range is inside the block (checked above) and all
        // block bytes are initialised; the borrow is tied to &self.
        Some(unsafe { slice::from_raw_parts(self.ptr_at(offset).as_ptr(), len) })
    }

    pub(crate) fn bytes_mut(&mut self, offset: usize, len: usize) -> Option<&mut [u8]> {
        if !self.contains(offset, len) {
            return None;
        }
        // SAFETY: as in `bytes`, and &mut self guarantees exclusive access.
        Some(unsafe { slice::from_raw_parts_mut(self.ptr_at(offset).as_ptr(), len) })
    }
}

impl Drop for Block<'_> {
    fn drop(&mut self) {
        if let Some(layout) = self.layout {
            // SAFETY: ptr came from alloc_zeroed with exactly this layout and
            // Drop runs once.
            unsafe { dealloc(self.ptr.as_ptr(), layout) };
        }
    }
}

// SAFETY: a block is the exclusive owner (or exclusive borrower) of its
// storage; moving it to another thread moves that exclusivity with it.
unsafe impl Send for Block<'_> {}

impl std::fmt::Debug for Block<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Block")
            .field("capacity", &self.capacity)
            .field("cursor", &self.cursor)
            .field("last", &self.last)
            .field("rewinds", &self.rewinds.len())
            .field("owned", &self.is_owned())
            .finish()
    }
}
