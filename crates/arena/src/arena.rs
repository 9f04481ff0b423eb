//! Region-based bump arena with a growable chain of blocks
//!
//! # Safety
//!
//! All unsafe code lives in [`Block`]; this module only moves cursors and
//! hands out [`Allocation`] handles. The one raw copy (`realloc`'s fallback
//! path) reads from a range below one block's cursor and writes to a range
//! freshly bumped past another cursor, so the two never overlap.
//!
//! ## Invariants
//!
//! - `blocks` is ordered oldest to newest; the last block is current
//! - only the current block is bumped; older blocks keep their cursors until
//!   `reset` or `destroy`
//! - `default_alignment` and `max_alignment` are powers of two and
//!   `default_alignment <= max_alignment`
//! - `epoch` changes on every `reset` and `destroy`, so handles taken before
//!   either stop resolving
//!
//! ## Not Thread-Safe
//!
//! - every mutation takes `&mut self`; there is no interior mutability
//! - `Arena` is `Send` but not `Sync`: shard one arena per thread or put it
//!   behind a lock

use std::ffi::CStr;
use std::mem;
use std::ptr::{self, NonNull};

use crate::align::{DEFAULT_ALIGNMENT, normalize_alignment};
use crate::block::{Block, Bump};
use crate::config::{ArenaConfig, DEFAULT_BLOCK_SIZE, Growth};
use crate::error::{ArenaError, ArenaResult};
use crate::handle::Allocation;
use crate::scope::{Checkpoint, TempScope};
use crate::stats::ArenaStats;

/// Region allocator: many allocations, one release.
#[derive(Debug)]
pub struct Arena<'buf> {
    blocks: Vec<Block<'buf>>,
    default_alignment: usize,
    max_alignment: usize,
    growth: Growth,
    zero_on_reset: bool,
    track_stats: bool,
    epoch: u64,
    stats: ArenaStats,
}

impl Arena<'static> {
    /// Creates a growable heap arena whose first block holds `capacity`
    /// bytes (0 selects [`DEFAULT_BLOCK_SIZE`]).
    ///
    /// If the first block cannot be acquired the arena is returned empty:
    /// [`is_valid`](Self::is_valid) is false and every allocation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use nebula_arena::Arena;
    ///
    /// let mut arena = Arena::new(1024);
    /// let numbers = arena.alloc(40).unwrap();
    /// arena.bytes_mut(&numbers).unwrap().fill(7);
    /// assert_eq!(arena.used(), 40);
    /// ```
    pub fn new(capacity: usize) -> Self {
        Self::with_alignment(capacity, DEFAULT_ALIGNMENT)
    }

    /// Like [`new`](Self::new) with a custom default alignment. Zero or
    /// non-power-of-two values select the built-in default, values above the
    /// cap are clamped.
    pub fn with_alignment(capacity: usize, alignment: usize) -> Self {
        let config = ArenaConfig::new(capacity).with_alignment(alignment);
        match Self::with_config(config.clone()) {
            Ok(arena) => arena,
            Err(_) => Self::empty(&config),
        }
    }

    /// Creates a growable heap arena, reporting failure instead of returning
    /// an empty arena.
    pub fn try_new(capacity: usize) -> ArenaResult<Self> {
        Self::with_config(ArenaConfig::new(capacity))
    }

    /// Creates a heap arena from a full configuration.
    pub fn with_config(config: ArenaConfig) -> ArenaResult<Self> {
        config.validate()?;

        let mut arena = Self::empty(&config);
        let capacity = config.block_capacity();
        let block = Block::allocate(capacity, arena.default_alignment)?;
        arena.push_block(block);

        tracing::debug!(
            capacity,
            alignment = arena.default_alignment,
            growth = ?arena.growth,
            "arena created"
        );
        Ok(arena)
    }
}

impl Default for Arena<'static> {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_SIZE)
    }
}

impl<'buf> Arena<'buf> {
    /// Builds a fixed arena over caller-supplied storage.
    ///
    /// The arena never grows: once `buffer` is exhausted allocations fail
    /// with [`ArenaError::OutOfMemory`]. Nothing is freed on drop.
    /// Statistics follow the same default as heap arenas.
    ///
    /// # Examples
    ///
    /// ```
    /// use nebula_arena::Arena;
    ///
    /// let mut storage = [0u8; 256];
    /// let mut arena = Arena::from_buffer(&mut storage).unwrap();
    /// assert!(arena.alloc(16).is_ok());
    /// assert!(arena.alloc(1024).is_err());
    /// ```
    pub fn from_buffer(buffer: &'buf mut [u8]) -> ArenaResult<Self> {
        if buffer.is_empty() {
            return Err(ArenaError::invalid_config("buffer must not be empty"));
        }

        let config = ArenaConfig::fixed(buffer.len());
        let mut arena = Self::empty(&config);
        arena.push_block(Block::from_buffer(buffer));
        Ok(arena)
    }

    /// Arena state without any block; `config` must already be valid.
    fn empty(config: &ArenaConfig) -> Self {
        Self {
            blocks: Vec::new(),
            default_alignment: config.effective_alignment(),
            max_alignment: config.max_alignment,
            growth: config.growth,
            zero_on_reset: config.zero_on_reset,
            track_stats: config.track_stats,
            epoch: 0,
            stats: ArenaStats::new(),
        }
    }

    fn push_block(&mut self, block: Block<'buf>) {
        if self.track_stats {
            self.stats.record_block(block.capacity());
        }
        self.blocks.push(block);
    }

    #[inline]
    fn handle(&self, block: usize, bump: Bump, len: usize) -> Allocation {
        Allocation {
            block,
            offset: bump.offset,
            len,
            serial: bump.serial,
            epoch: self.epoch,
        }
    }

    // ------------------------------------------------------------------
    // Allocation family
    // ------------------------------------------------------------------

    /// Allocates `size` bytes aligned to `alignment`.
    ///
    /// Invalid alignments fall back to the arena default; alignments above
    /// [`max_alignment`](Self::max_alignment) are clamped to it. When the
    /// current block is full a growable arena appends a block of
    /// `max(2 * current_capacity, 2 * size)` bytes.
    pub fn alloc_aligned(&mut self, size: usize, alignment: usize) -> ArenaResult<Allocation> {
        let result = self.bump(size, alignment);
        if result.is_err() && self.track_stats {
            self.stats.record_failure();
        }
        result
    }

    /// Allocates `size` bytes at the default alignment.
    pub fn alloc(&mut self, size: usize) -> ArenaResult<Allocation> {
        self.alloc_aligned(size, self.default_alignment)
    }

    /// Allocates `size` bytes, all zero.
    pub fn alloc_zeroed(&mut self, size: usize) -> ArenaResult<Allocation> {
        let allocation = self.alloc(size)?;
        if let Some(bytes) = self.bytes_mut(&allocation) {
            bytes.fill(0);
        }
        Ok(allocation)
    }

    /// Allocates a zeroed array of `count` elements of `size` bytes.
    ///
    /// `count * size` overflowing `usize` is a failure, never a short
    /// allocation.
    pub fn calloc(&mut self, count: usize, size: usize) -> ArenaResult<Allocation> {
        let Some(total) = count.checked_mul(size) else {
            if self.track_stats {
                self.stats.record_failure();
            }
            return Err(ArenaError::size_overflow("calloc"));
        };
        self.alloc_zeroed(total)
    }

    /// Copies `bytes` into a fresh allocation.
    pub fn alloc_slice_copy(&mut self, bytes: &[u8]) -> ArenaResult<Allocation> {
        let allocation = self.alloc(bytes.len())?;
        if let Some(target) = self.bytes_mut(&allocation) {
            target.copy_from_slice(bytes);
        }
        Ok(allocation)
    }

    /// Resizes `allocation` to `new_size` bytes.
    ///
    /// If `allocation` is the newest allocation of the current block and the
    /// block still has room, the cursor moves and the same memory is
    /// returned. Otherwise a new allocation receives the first
    /// `min(old, new)` bytes; the old bytes stay allocated until reset.
    pub fn realloc(&mut self, allocation: Allocation, new_size: usize) -> ArenaResult<Allocation> {
        if new_size == 0 {
            return Err(ArenaError::ZeroSize);
        }
        if !self.is_live(&allocation) {
            return Err(ArenaError::StaleHandle);
        }

        let current = self.blocks.len() - 1;
        let in_place = if allocation.block == current {
            self.blocks[current].resize_last(allocation.offset, allocation.len, new_size)
        } else {
            None
        };
        if let Some(serial) = in_place {
            tracing::trace!(
                offset = allocation.offset,
                old_size = allocation.len,
                new_size,
                "realloc in place"
            );
            if self.track_stats {
                self.stats.record_realloc(true);
            }
            return Ok(allocation.resized(new_size, serial));
        }

        let moved = self.alloc(new_size)?;
        let count = allocation.len.min(new_size);
        let source = self.blocks[allocation.block].ptr_at(allocation.offset);
        let target = self.blocks[moved.block].ptr_at(moved.offset);

        // SAFETY: the source range is below its block's cursor (is_live) and
        // the target range was just bumped past the current cursor, so both
        // are valid for `count` bytes and do not overlap.
        unsafe { ptr::copy_nonoverlapping(source.as_ptr(), target.as_ptr(), count) };

        tracing::trace!(
            from_block = allocation.block,
            to_block = moved.block,
            copied = count,
            "realloc by copy"
        );
        if self.track_stats {
            self.stats.record_realloc(false);
        }
        Ok(moved)
    }

    fn bump(&mut self, size: usize, alignment: usize) -> ArenaResult<Allocation> {
        if size == 0 {
            return Err(ArenaError::ZeroSize);
        }
        let align = normalize_alignment(alignment, self.default_alignment, self.max_alignment);

        let current = self.blocks.len().checked_sub(1).ok_or(ArenaError::NoBlock)?;
        if let Some(bump) = self.blocks[current].try_bump(size, align) {
            if self.track_stats {
                self.stats.record_allocation(size, bump.padding);
            }
            return Ok(self.handle(current, bump, size));
        }

        self.grow(size, align)
    }

    #[cold]
    fn grow(&mut self, size: usize, align: usize) -> ArenaResult<Allocation> {
        let current = self.blocks.last().ok_or(ArenaError::NoBlock)?;

        if self.growth == Growth::Fixed {
            let available = current
                .remaining()
                .saturating_sub(current.padding_at_cursor(align));
            return Err(ArenaError::out_of_memory(size, available));
        }

        let capacity = match (current.capacity().checked_mul(2), size.checked_mul(2)) {
            (Some(doubled), Some(twice_size)) => doubled.max(twice_size),
            _ => return Err(ArenaError::size_overflow("block growth")),
        };

        // Aligning the block itself to the request keeps the first bump
        // padding-free, so the cursor ends exactly at `size`.
        let mut block = Block::allocate(capacity, self.default_alignment.max(align))?;
        let bump = block
            .try_bump(size, align)
            .ok_or_else(|| ArenaError::out_of_memory(size, capacity))?;
        debug_assert_eq!(bump.padding, 0);

        self.push_block(block);
        let index = self.blocks.len() - 1;
        tracing::debug!(
            block = index,
            capacity,
            request = size,
            "arena grew a new block"
        );

        if self.track_stats {
            self.stats.record_allocation(size, bump.padding);
        }
        Ok(self.handle(index, bump, size))
    }

    // ------------------------------------------------------------------
    // Strings
    // ------------------------------------------------------------------

    /// Copies a C-style string and its terminator into the arena.
    ///
    /// The string ends at the first NUL byte of `text`, or at its end.
    /// Read it back with [`c_str`](Self::c_str).
    ///
    /// # Examples
    ///
    /// ```
    /// use nebula_arena::Arena;
    ///
    /// let mut arena = Arena::new(1024);
    /// let copy = arena.strdup("Hello, Arena!").unwrap();
    /// assert_eq!(arena.c_str(&copy).unwrap().to_str(), Ok("Hello, Arena!"));
    /// assert_eq!(copy.len(), 14);
    /// ```
    pub fn strdup(&mut self, text: impl AsRef<[u8]>) -> ArenaResult<Allocation> {
        let text = text.as_ref();
        self.copy_c_string(&text[..c_len(text)])
    }

    /// Copies at most `limit` bytes of a C-style string and always writes a
    /// terminator.
    pub fn strndup(&mut self, text: impl AsRef<[u8]>, limit: usize) -> ArenaResult<Allocation> {
        let text = text.as_ref();
        self.copy_c_string(&text[..c_len(text).min(limit)])
    }

    fn copy_c_string(&mut self, text: &[u8]) -> ArenaResult<Allocation> {
        let size = text
            .len()
            .checked_add(1)
            .ok_or_else(|| ArenaError::size_overflow("strdup"))?;
        let allocation = self.alloc(size)?;
        if let Some((terminator, body)) = self
            .bytes_mut(&allocation)
            .and_then(<[u8]>::split_last_mut)
        {
            body.copy_from_slice(text);
            *terminator = 0;
        }
        Ok(allocation)
    }

    /// Reads a NUL-terminated string written by [`strdup`](Self::strdup) or
    /// [`strndup`](Self::strndup).
    pub fn c_str(&self, allocation: &Allocation) -> Option<&CStr> {
        CStr::from_bytes_with_nul(self.bytes(allocation)?).ok()
    }

    // ------------------------------------------------------------------
    // Handles
    // ------------------------------------------------------------------

    /// True while `allocation` still refers to memory of this arena.
    pub fn is_live(&self, allocation: &Allocation) -> bool {
        self.live_block(allocation).is_some()
    }

    fn live_block(&self, allocation: &Allocation) -> Option<&Block<'buf>> {
        if allocation.epoch != self.epoch {
            return None;
        }
        self.blocks
            .get(allocation.block)
            .filter(|block| block.is_live(allocation.offset, allocation.len, allocation.serial))
    }

    /// Bytes behind a live handle.
    pub fn bytes(&self, allocation: &Allocation) -> Option<&[u8]> {
        self.live_block(allocation)?
            .bytes(allocation.offset, allocation.len)
    }

    /// Mutable bytes behind a live handle.
    pub fn bytes_mut(&mut self, allocation: &Allocation) -> Option<&mut [u8]> {
        if !self.is_live(allocation) {
            return None;
        }
        self.blocks
            .get_mut(allocation.block)?
            .bytes_mut(allocation.offset, allocation.len)
    }

    /// Start address of a live handle.
    ///
    /// The pointer stays valid until the arena is reset, destroyed or
    /// dropped; dereferencing it is the caller's responsibility.
    pub fn as_ptr(&self, allocation: &Allocation) -> Option<NonNull<u8>> {
        self.live_block(allocation)
            .map(|block| block.ptr_at(allocation.offset))
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Rewinds every block to empty, keeping all capacity for reuse.
    ///
    /// Every handle taken before the reset stops resolving.
    pub fn reset(&mut self) {
        for block in &mut self.blocks {
            if self.zero_on_reset {
                block.zero_used();
            }
            block.reset();
        }
        self.epoch = self.epoch.wrapping_add(1);

        if self.track_stats {
            self.stats.record_reset();
        }
        tracing::debug!(blocks = self.blocks.len(), "arena reset");
    }

    /// Releases every block. Safe to call repeatedly; afterwards the arena is
    /// empty and every allocation fails with [`ArenaError::NoBlock`].
    pub fn destroy(&mut self) {
        let blocks = mem::take(&mut self.blocks);
        if blocks.is_empty() {
            return;
        }

        self.epoch = self.epoch.wrapping_add(1);
        tracing::debug!(blocks = blocks.len(), "arena destroyed");
        drop(blocks);
    }

    // ------------------------------------------------------------------
    // Temporary scopes
    // ------------------------------------------------------------------

    /// Records the current block's cursor for a later [`end`](Self::end).
    pub fn begin(&self) -> Checkpoint {
        match self.blocks.last() {
            Some(block) => Checkpoint {
                block: Some(self.blocks.len() - 1),
                cursor: block.cursor(),
                last: block.last(),
                epoch: self.epoch,
            },
            None => Checkpoint::inert(self.epoch),
        }
    }

    /// Rolls the current block back to `checkpoint`.
    ///
    /// Checkpoints must be ended in reverse order of [`begin`](Self::begin).
    /// Handles allocated after `begin` in the rewound block stay dead even if
    /// later allocations reuse their range.
    /// Only the block that is current *now* is rewound: if the arena grew a
    /// block since `begin`, allocations left in the older block survive and
    /// the new block's cursor is set to the recorded offset.
    pub fn end(&mut self, checkpoint: Checkpoint) {
        let Some(recorded) = checkpoint.block else {
            return;
        };
        if checkpoint.epoch != self.epoch {
            tracing::debug!("ignoring checkpoint taken before the last reset");
            return;
        }
        let Some(current) = self.blocks.len().checked_sub(1) else {
            return;
        };

        let last = if current == recorded {
            checkpoint.last
        } else {
            tracing::warn!(
                began_on = recorded,
                ending_on = current,
                "checkpoint ended on a different block; earlier block is not rolled back"
            );
            None
        };
        self.blocks[current].rewind(checkpoint.cursor, last);

        if self.track_stats {
            self.stats.record_rollback();
        }
    }

    /// Opens a temporary scope that rolls back when dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use nebula_arena::Arena;
    ///
    /// let mut arena = Arena::new(1024);
    /// arena.alloc(100).unwrap();
    /// {
    ///     let mut scope = arena.scope();
    ///     scope.alloc(200).unwrap();
    /// }
    /// assert_eq!(arena.used(), 100);
    /// ```
    pub fn scope(&mut self) -> TempScope<'_, 'buf> {
        TempScope::new(self)
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// False once destroyed, or if the first block could not be acquired.
    pub fn is_valid(&self) -> bool {
        !self.blocks.is_empty()
    }

    /// Bytes consumed across all blocks, padding included.
    pub fn used(&self) -> usize {
        self.blocks.iter().map(Block::cursor).sum()
    }

    /// Bytes left in the current block only.
    ///
    /// A growable arena can still satisfy larger requests by appending a
    /// block, and alignment padding is not accounted for.
    pub fn remaining(&self) -> usize {
        self.blocks.last().map_or(0, Block::remaining)
    }

    /// Total capacity across all blocks.
    pub fn capacity(&self) -> usize {
        self.blocks.iter().map(Block::capacity).sum()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn default_alignment(&self) -> usize {
        self.default_alignment
    }

    pub fn max_alignment(&self) -> usize {
        self.max_alignment
    }

    pub fn growth(&self) -> Growth {
        self.growth
    }

    /// Returns reference to statistics
    pub fn stats(&self) -> &ArenaStats {
        &self.stats
    }
}

/// Length of a C string held in `bytes`: up to the first NUL, or all of it.
fn c_len(bytes: &[u8]) -> usize {
    bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::align::{MAX_ALIGNMENT, is_aligned};

    fn addr(arena: &Arena<'_>, allocation: &Allocation) -> usize {
        arena.as_ptr(allocation).unwrap().as_ptr() as usize
    }

    #[test]
    fn basic_allocation() {
        let mut arena = Arena::new(1024);
        assert!(arena.is_valid());
        assert_eq!(arena.used(), 0);
        assert_eq!(arena.remaining(), 1024);

        let nums = arena.alloc(40).unwrap();
        assert_eq!(arena.used(), 40);

        let bytes = arena.bytes_mut(&nums).unwrap();
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = (i * 2) as u8;
        }
        let bytes = arena.bytes(&nums).unwrap();
        assert!(bytes.iter().enumerate().all(|(i, &b)| b == (i * 2) as u8));
    }

    #[test]
    fn zero_capacity_selects_default_block() {
        let arena = Arena::new(0);
        assert_eq!(arena.remaining(), DEFAULT_BLOCK_SIZE);
    }

    #[test]
    fn zero_size_and_empty_arena_fail() {
        let mut arena = Arena::new(64);
        assert_eq!(arena.alloc(0), Err(ArenaError::ZeroSize));
        assert_eq!(arena.alloc_aligned(0, 8), Err(ArenaError::ZeroSize));
        assert_eq!(arena.alloc_zeroed(0), Err(ArenaError::ZeroSize));

        arena.destroy();
        assert_eq!(arena.alloc(10), Err(ArenaError::NoBlock));
        assert_eq!(arena.alloc_zeroed(10), Err(ArenaError::NoBlock));
        assert_eq!(arena.used(), 0);
        assert_eq!(arena.remaining(), 0);
    }

    #[test]
    fn invalid_alignment_uses_default() {
        let mut arena = Arena::new(1024);
        let a = arena.alloc_aligned(10, 0).unwrap();
        let b = arena.alloc_aligned(10, 3).unwrap();
        assert!(is_aligned(addr(&arena, &a), arena.default_alignment()));
        assert!(is_aligned(addr(&arena, &b), arena.default_alignment()));
    }

    #[test]
    fn large_alignment_is_capped() {
        let mut arena = Arena::new(1024);
        arena.alloc(1).unwrap();
        let ptr = arena.alloc_aligned(10, 1024).unwrap();
        assert!(is_aligned(addr(&arena, &ptr), MAX_ALIGNMENT));
        assert!(arena.used() <= 1 + MAX_ALIGNMENT + 10);
    }

    #[test]
    fn creation_alignment_is_normalized() {
        assert_eq!(Arena::with_alignment(64, 0).default_alignment(), 8);
        assert_eq!(Arena::with_alignment(64, 6).default_alignment(), 8);
        assert_eq!(Arena::with_alignment(64, 4).default_alignment(), 4);
        assert_eq!(Arena::with_alignment(64, 4096).default_alignment(), 16);
    }

    #[test]
    fn growth_appends_bigger_block() {
        let mut arena = Arena::new(64);
        let first = arena.alloc(48).unwrap();
        let second = arena.alloc(48).unwrap();

        assert_eq!(arena.block_count(), 2);
        assert_eq!(first.block_index(), 0);
        assert_eq!(second.block_index(), 1);
        assert_eq!(arena.capacity(), 64 + 128);
        assert_eq!(arena.used(), 96);
        assert_eq!(arena.remaining(), 128 - 48);
    }

    #[test]
    fn growth_covers_oversized_request() {
        let mut arena = Arena::new(64);
        arena.alloc(1000).unwrap();
        assert_eq!(arena.capacity(), 64 + 2000);
        assert_eq!(arena.remaining(), 1000);
    }

    #[test]
    fn growth_with_strict_alignment_needs_no_padding() {
        let mut arena = Arena::with_alignment(8, 1);
        arena.alloc(5).unwrap();
        let aligned = arena.alloc_aligned(8, 16).unwrap();
        assert_eq!(aligned.offset(), 0);
        assert!(is_aligned(addr(&arena, &aligned), 16));
        assert_eq!(arena.used(), 5 + 8);
    }

    #[test]
    fn fixed_heap_arena_does_not_grow() {
        let mut arena = Arena::with_config(ArenaConfig::fixed(100)).unwrap();
        assert!(arena.alloc(50).is_ok());
        assert!(arena.alloc(30).is_ok());

        let error = arena.alloc(30).unwrap_err();
        assert!(error.is_out_of_memory());
        assert_eq!(error, ArenaError::out_of_memory(30, 12));
        assert_eq!(arena.block_count(), 1);
    }

    #[test]
    fn alloc_zeroed_clears_reused_memory() {
        let mut arena = Arena::new(128);
        let dirty = arena.alloc(64).unwrap();
        arena.bytes_mut(&dirty).unwrap().fill(0xAA);
        arena.reset();

        let clean = arena.alloc_zeroed(64).unwrap();
        assert_eq!(clean.offset(), dirty.offset());
        assert!(arena.bytes(&clean).unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn calloc_overflow_fails() {
        let mut arena = Arena::new(128);
        assert_eq!(
            arena.calloc(usize::MAX, 2),
            Err(ArenaError::size_overflow("calloc"))
        );
        assert_eq!(arena.used(), 0);

        let ten = arena.calloc(10, 4).unwrap();
        assert_eq!(ten.len(), 40);
        assert!(arena.bytes(&ten).unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn realloc_last_allocation_grows_in_place() {
        let mut arena = Arena::with_config(ArenaConfig::new(1024).with_stats(true)).unwrap();
        let nums = arena.alloc_slice_copy(&[1, 2, 3, 4, 5]).unwrap();
        let before = addr(&arena, &nums);

        let grown = arena.realloc(nums, 10).unwrap();
        assert_eq!(addr(&arena, &grown), before);
        assert_eq!(grown.len(), 10);
        assert_eq!(&arena.bytes(&grown).unwrap()[..5], &[1, 2, 3, 4, 5]);
        assert_eq!(arena.used(), 10);
        assert_eq!(arena.stats().in_place_reallocs(), 1);
    }

    #[test]
    fn realloc_older_allocation_copies() {
        let mut arena = Arena::with_config(ArenaConfig::new(1024).with_stats(true)).unwrap();
        let old = arena.alloc_slice_copy(b"abcdefgh").unwrap();
        arena.alloc(8).unwrap();

        let moved = arena.realloc(old, 16).unwrap();
        assert_ne!(addr(&arena, &moved), addr(&arena, &old));
        assert_eq!(&arena.bytes(&moved).unwrap()[..8], b"abcdefgh");
        assert!(arena.is_live(&old));
        assert_eq!(arena.stats().copy_reallocs(), 1);
    }

    #[test]
    fn realloc_shrink_copy_keeps_prefix() {
        let mut arena = Arena::new(1024);
        let old = arena.alloc_slice_copy(b"abcdefgh").unwrap();
        arena.alloc(1).unwrap();

        let moved = arena.realloc(old, 3).unwrap();
        assert_eq!(arena.bytes(&moved).unwrap(), b"abc");
    }

    #[test]
    fn realloc_across_block_boundary() {
        let mut arena = Arena::new(32);
        let data = arena.alloc_slice_copy(&[9; 24]).unwrap();
        let moved = arena.realloc(data, 40).unwrap();

        assert_eq!(arena.block_count(), 2);
        assert_eq!(moved.block_index(), 1);
        assert_eq!(&arena.bytes(&moved).unwrap()[..24], &[9; 24]);
    }

    #[test]
    fn realloc_rejects_stale_and_zero() {
        let mut arena = Arena::new(64);
        let a = arena.alloc(8).unwrap();
        assert_eq!(arena.realloc(a, 0), Err(ArenaError::ZeroSize));

        arena.reset();
        assert_eq!(arena.realloc(a, 16), Err(ArenaError::StaleHandle));
    }

    #[test]
    fn strdup_and_strndup() {
        let mut arena = Arena::new(1024);

        let copy = arena.strdup("Hello, Arena!").unwrap();
        assert_eq!(arena.c_str(&copy).unwrap().to_bytes(), b"Hello, Arena!");

        let short = arena.strndup("Very long string", 10).unwrap();
        assert_eq!(arena.c_str(&short).unwrap().to_bytes(), b"Very long ");
        assert_eq!(short.len(), 11);

        let whole = arena.strndup("abc", 10).unwrap();
        assert_eq!(arena.c_str(&whole).unwrap().to_bytes(), b"abc");

        let empty = arena.strdup("").unwrap();
        assert_eq!(arena.bytes(&empty).unwrap(), &[0]);
    }

    #[test]
    fn strdup_stops_at_interior_nul() {
        let mut arena = Arena::new(64);
        let copy = arena.strdup(b"ab\0cd").unwrap();
        assert_eq!(arena.bytes(&copy).unwrap(), b"ab\0");
    }

    #[test]
    fn reset_keeps_blocks_and_invalidates_handles() {
        let mut arena = Arena::with_config(ArenaConfig::new(64).with_stats(true)).unwrap();
        let a = arena.alloc(48).unwrap();
        arena.alloc(48).unwrap();
        assert_eq!(arena.block_count(), 2);

        arena.reset();
        assert_eq!(arena.used(), 0);
        assert_eq!(arena.block_count(), 2);
        assert!(!arena.is_live(&a));
        assert!(arena.bytes(&a).is_none());
        assert_eq!(arena.stats().resets(), 1);

        arena.alloc(100).unwrap();
        assert_eq!(arena.block_count(), 2);
    }

    #[test]
    fn reset_zeroes_when_configured() {
        let mut arena = Arena::with_config(ArenaConfig::debug()).unwrap();
        let a = arena.alloc(16).unwrap();
        arena.bytes_mut(&a).unwrap().fill(0xFF);
        arena.reset();

        let b = arena.alloc(16).unwrap();
        assert_eq!(arena.bytes(&b).unwrap(), &[0; 16]);
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut arena = Arena::new(64);
        let a = arena.alloc(8).unwrap();

        arena.destroy();
        assert!(!arena.is_valid());
        assert!(!arena.is_live(&a));
        arena.destroy();
        assert!(!arena.is_valid());
        assert_eq!(arena.capacity(), 0);
    }

    #[test]
    fn checkpoint_rolls_back_current_block() {
        let mut arena = Arena::new(1024);
        arena.alloc(100).unwrap();
        let used_before = arena.used();

        let checkpoint = arena.begin();
        let temp = arena.alloc(200).unwrap();
        assert!(arena.used() > used_before);

        arena.end(checkpoint);
        assert_eq!(arena.used(), used_before);
        assert!(!arena.is_live(&temp));
        assert!(arena.alloc(50).is_ok());
    }

    #[test]
    fn checkpoint_restores_in_place_realloc() {
        let mut arena = Arena::new(1024);
        let a = arena.alloc(8).unwrap();
        let checkpoint = arena.begin();
        arena.alloc(8).unwrap();
        arena.end(checkpoint);

        let grown = arena.realloc(a, 32).unwrap();
        assert_eq!(grown.offset(), a.offset());
    }

    #[test]
    fn checkpoint_on_empty_arena_is_inert() {
        let mut arena = Arena::new(64);
        arena.destroy();
        let checkpoint = arena.begin();
        arena.end(checkpoint);
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn checkpoint_from_before_reset_is_ignored() {
        let mut arena = Arena::new(64);
        arena.alloc(32).unwrap();
        let checkpoint = arena.begin();
        arena.reset();
        arena.alloc(8).unwrap();

        arena.end(checkpoint);
        assert_eq!(arena.used(), 8);
    }

    #[test]
    fn checkpoint_across_growth_rewinds_only_new_block() {
        let mut arena = Arena::new(64);
        arena.alloc(32).unwrap();
        let checkpoint = arena.begin();

        arena.alloc(100).unwrap();
        assert_eq!(arena.block_count(), 2);

        arena.end(checkpoint);
        assert_eq!(arena.block_count(), 2);
        // Old block keeps its 32 bytes, the new block is set to the recorded 32.
        assert_eq!(arena.used(), 64);
    }

    #[test]
    fn realloc_of_rolled_back_handle_cannot_overwrite_newer_allocation() {
        let mut arena = Arena::new(1024);
        arena.alloc(8).unwrap();

        let checkpoint = arena.begin();
        let rolled_back = arena.alloc(16).unwrap();
        arena.end(checkpoint);

        let fresh = arena.alloc(16).unwrap();
        arena.bytes_mut(&fresh).unwrap().fill(0xAB);
        assert_eq!(fresh.offset(), rolled_back.offset());

        assert!(!arena.is_live(&rolled_back));
        assert!(arena.bytes(&rolled_back).is_none());
        assert!(arena.bytes_mut(&rolled_back).is_none());
        assert_eq!(arena.realloc(rolled_back, 32), Err(ArenaError::StaleHandle));
        assert_eq!(arena.bytes(&fresh).unwrap(), &[0xAB; 16]);
        assert_eq!(arena.used(), 24);
    }

    #[test]
    fn rolled_back_growth_does_not_revive_resized_handle() {
        let mut arena = Arena::new(1024);
        let kept = arena.alloc(8).unwrap();

        let checkpoint = arena.begin();
        let grown = arena.realloc(kept, 64).unwrap();
        arena.end(checkpoint);
        arena.alloc(64).unwrap();

        assert!(arena.is_live(&kept));
        assert!(!arena.is_live(&grown));
    }

    #[test]
    fn buffer_arena_stats_follow_heap_default() {
        let mut storage = [0u8; 64];
        let mut buffered = Arena::from_buffer(&mut storage).unwrap();
        let mut heap = Arena::new(64);
        buffered.alloc(8).unwrap();
        heap.alloc(8).unwrap();

        assert_eq!(buffered.stats().allocations(), heap.stats().allocations());
        assert_eq!(buffered.stats().blocks_created(), heap.stats().blocks_created());
        assert_eq!(
            buffered.stats().allocations(),
            u64::from(cfg!(debug_assertions))
        );
    }

    #[test]
    fn buffer_backed_arena() {
        let mut storage = [0u8; 256];
        let mut arena = Arena::from_buffer(&mut storage).unwrap();
        assert_eq!(arena.growth(), Growth::Fixed);
        assert_eq!(arena.used(), 0);
        assert_eq!(arena.capacity(), 256);

        let nums = arena.alloc(16).unwrap();
        arena.bytes_mut(&nums).unwrap().copy_from_slice(&[10; 16]);
        assert_eq!(arena.bytes(&nums).unwrap(), &[10; 16]);
        assert!(arena.alloc(1024).unwrap_err().is_out_of_memory());
        assert_eq!(arena.block_count(), 1);
    }

    #[test]
    fn empty_buffer_is_rejected() {
        let mut storage: [u8; 0] = [];
        assert!(matches!(
            Arena::from_buffer(&mut storage),
            Err(ArenaError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn invalid_max_alignment_is_rejected() {
        let config = ArenaConfig::new(64).with_max_alignment(12);
        assert!(Arena::with_config(config).is_err());
    }

    #[test]
    fn stats_count_failures() {
        let mut arena = Arena::with_config(ArenaConfig::fixed(16).with_stats(true)).unwrap();
        arena.alloc(8).unwrap();
        assert!(arena.alloc(64).is_err());
        assert!(arena.calloc(usize::MAX, usize::MAX).is_err());

        assert_eq!(arena.stats().allocations(), 1);
        assert_eq!(arena.stats().failures(), 2);
        assert_eq!(arena.stats().blocks_created(), 1);
    }

    #[test]
    fn arena_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Arena<'static>>();
    }
}
