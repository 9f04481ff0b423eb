//! Checkpoints and RAII helpers for temporary allocations
//!
//! A [`Checkpoint`] is a saved cursor position; [`TempScope`] rolls back to
//! one automatically when dropped.

use std::ops::{Deref, DerefMut};

use crate::arena::Arena;

/// Saved cursor of the current block, produced by [`Arena::begin`].
///
/// Checkpoints are plain values: ending one twice, or out of LIFO order,
/// is not detected. A checkpoint taken before a `reset` or `destroy` is
/// ignored by [`Arena::end`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    /// `None` when the arena had no blocks at `begin`
    pub(crate) block: Option<usize>,
    pub(crate) cursor: usize,
    pub(crate) last: Option<usize>,
    pub(crate) epoch: u64,
}

impl Checkpoint {
    /// Checkpoint of an arena without blocks; ending it changes nothing.
    pub(crate) fn inert(epoch: u64) -> Self {
        Self {
            block: None,
            cursor: 0,
            last: None,
            epoch,
        }
    }

    /// Index of the block that was current at `begin`.
    pub fn block_index(&self) -> Option<usize> {
        self.block
    }

    /// Cursor offset recorded at `begin`.
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

/// RAII guard that ends its checkpoint when dropped
///
/// The guard dereferences to the arena, so allocations made through it are
/// released together when it goes out of scope.
///
/// # Examples
///
/// ```
/// use nebula_arena::Arena;
///
/// let mut arena = Arena::new(1024);
/// let outer = arena.alloc(8).unwrap();
///
/// {
///     let mut scope = arena.scope();
///     let temp = scope.alloc(64).unwrap();
///     assert!(scope.is_live(&temp));
/// }
///
/// assert!(arena.is_live(&outer));
/// assert_eq!(arena.used(), 8);
/// ```
#[must_use = "TempScope does nothing unless held"]
pub struct TempScope<'a, 'buf> {
    arena: &'a mut Arena<'buf>,
    checkpoint: Checkpoint,
    active: bool,
}

impl<'a, 'buf> TempScope<'a, 'buf> {
    /// Starts a scope at the arena's current position.
    pub fn new(arena: &'a mut Arena<'buf>) -> Self {
        let checkpoint = arena.begin();
        Self {
            arena,
            checkpoint,
            active: true,
        }
    }

    /// Rolls back now instead of on drop.
    pub fn rollback(mut self) {
        self.end();
    }

    /// Keeps every allocation made inside the scope.
    pub fn keep(mut self) {
        self.active = false;
    }

    /// Returns the saved checkpoint
    pub fn checkpoint(&self) -> Checkpoint {
        self.checkpoint
    }

    fn end(&mut self) {
        if self.active {
            self.arena.end(self.checkpoint);
            self.active = false;
        }
    }
}

impl<'buf> Deref for TempScope<'_, 'buf> {
    type Target = Arena<'buf>;

    fn deref(&self) -> &Self::Target {
        self.arena
    }
}

impl DerefMut for TempScope<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.arena
    }
}

impl Drop for TempScope<'_, '_> {
    fn drop(&mut self) {
        self.end();
    }
}
