//! Error types for nebula-arena
//!
//! Uses thiserror for clean, idiomatic Rust error definitions.
//!
//! Every arena failure is reported through [`ArenaError`]; the allocator
//! itself never panics and never retries. An invalid alignment is not an
//! error at all: it is normalised to the arena default before use.

use thiserror::Error;

/// Arena allocation errors
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    /// A zero-byte allocation was requested.
    #[error("Zero-sized allocation requested")]
    ZeroSize,

    /// The arena owns no block: it was destroyed, or its first block could
    /// not be acquired.
    #[error("Arena has no backing block (destroyed or never initialized)")]
    NoBlock,

    /// The current block cannot fit the request and the arena may not grow.
    #[error("Arena out of memory: requested {requested} bytes, available {available}")]
    OutOfMemory { requested: usize, available: usize },

    /// The platform allocator refused to hand out a new block.
    #[error("Block allocation failed: {size} bytes with {align} byte alignment")]
    BlockAllocationFailed { size: usize, align: usize },

    /// Size arithmetic overflowed the address width.
    #[error("Size overflow during operation: {operation}")]
    SizeOverflow { operation: &'static str },

    /// The handle refers to memory that was reset, rolled back or destroyed.
    #[error("Allocation handle is stale")]
    StaleHandle,

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl ArenaError {
    /// Create out of memory error
    pub fn out_of_memory(requested: usize, available: usize) -> Self {
        Self::OutOfMemory {
            requested,
            available,
        }
    }

    /// Create block allocation failed error
    pub fn block_allocation_failed(size: usize, align: usize) -> Self {
        tracing::warn!(size, align, "arena block allocation failed");
        Self::BlockAllocationFailed { size, align }
    }

    /// Create size overflow error
    pub fn size_overflow(operation: &'static str) -> Self {
        Self::SizeOverflow { operation }
    }

    /// Create invalid config error
    pub fn invalid_config(reason: &str) -> Self {
        Self::InvalidConfig {
            reason: reason.to_string(),
        }
    }

    /// True for every variant that means "this request cannot be satisfied
    /// right now": the caller may retry smaller, after a reset, or give up.
    #[must_use]
    pub fn is_out_of_memory(&self) -> bool {
        matches!(
            self,
            Self::OutOfMemory { .. }
                | Self::BlockAllocationFailed { .. }
                | Self::SizeOverflow { .. }
                | Self::NoBlock
        )
    }

    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ZeroSize => "ARENA:ALLOC:ZERO",
            Self::NoBlock => "ARENA:STATE:EMPTY",
            Self::OutOfMemory { .. } => "ARENA:ALLOC:OOM",
            Self::BlockAllocationFailed { .. } => "ARENA:BLOCK:FAILED",
            Self::SizeOverflow { .. } => "ARENA:ALLOC:OVERFLOW",
            Self::StaleHandle => "ARENA:HANDLE:STALE",
            Self::InvalidConfig { .. } => "ARENA:CONFIG:INVALID",
        }
    }
}

/// Result type for arena operations
pub type ArenaResult<T> = Result<T, ArenaError>;
