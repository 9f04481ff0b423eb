//! # nebula-arena
//!
//! Region-based memory: many allocations, released together.
//!
//! An [`Arena`] hands out spans of memory by bumping a cursor through a
//! chain of blocks. Individual spans are never freed; the whole arena is
//! rewound with [`Arena::reset`], released with [`Arena::destroy`], or
//! partially rolled back to a [`Checkpoint`].
//!
//! ## Quick Start
//!
//! ```rust
//! use nebula_arena::prelude::*;
//!
//! let mut arena = Arena::new(1024);
//!
//! let data = arena.alloc(100)?;
//! arena.bytes_mut(&data).unwrap().fill(0x2A);
//!
//! let name = arena.strdup("workflow")?;
//! assert_eq!(arena.c_str(&name).unwrap().to_str(), Ok("workflow"));
//!
//! {
//!     let mut scratch = arena.scope();
//!     scratch.alloc(512)?;
//! } // scratch memory rolled back here
//!
//! arena.reset();
//! assert_eq!(arena.used(), 0);
//! # Ok::<(), ArenaError>(())
//! ```
//!
//! ## Handles
//!
//! Allocations are returned as [`Allocation`] handles rather than
//! references, so the arena stays mutably usable while they are held.
//! A handle resolves through [`Arena::bytes`] and friends and returns `None`
//! once its memory has been reset, rolled back or destroyed.
//!
//! ## Modes
//!
//! - growable (default): appends a block of `max(2 * current, 2 * size)`
//!   bytes when the current block is full
//! - fixed: [`ArenaConfig::fixed`] on the heap, or [`Arena::from_buffer`]
//!   over caller storage; exhaustion is an [`ArenaError::OutOfMemory`]

#![cfg_attr(docsrs, feature(doc_cfg))]
// Raw block storage is the whole point of the crate; unsafe is confined to `block`
// and the copy in `Arena::realloc`.
#![allow(unsafe_code)]

pub mod align;
pub mod arena;
mod block;
pub mod config;
pub mod error;
pub mod handle;
pub mod scope;
pub mod stats;

pub use align::{DEFAULT_ALIGNMENT, MAX_ALIGNMENT};
pub use arena::Arena;
pub use config::{ArenaConfig, DEFAULT_BLOCK_SIZE, Growth};
pub use error::{ArenaError, ArenaResult};
pub use handle::Allocation;
pub use scope::{Checkpoint, TempScope};
pub use stats::ArenaStats;

/// Common imports
pub mod prelude {
    pub use crate::{
        Allocation, Arena, ArenaConfig, ArenaError, ArenaResult, ArenaStats, Checkpoint, Growth,
        TempScope,
    };
}
