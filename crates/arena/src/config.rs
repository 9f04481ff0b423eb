//! Arena configuration builder

use crate::align::{DEFAULT_ALIGNMENT, MAX_ALIGNMENT, normalize_alignment};
use crate::error::{ArenaError, ArenaResult};

/// Size of the first block when a capacity of zero is requested.
pub const DEFAULT_BLOCK_SIZE: usize = 1024;

/// Whether an arena may append blocks once its current block is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Growth {
    /// Append a block of `max(2 * current, 2 * size)` bytes on exhaustion.
    #[default]
    Growable,
    /// Fail with `OutOfMemory` on exhaustion.
    Fixed,
}

/// Arena configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Capacity of the first block (0 selects [`DEFAULT_BLOCK_SIZE`])
    pub initial_capacity: usize,
    /// Alignment for requests that do not name a valid one
    pub default_alignment: usize,
    /// Upper bound for every alignment request
    pub max_alignment: usize,
    /// Growth policy
    pub growth: Growth,
    /// Zero consumed bytes on `reset`
    pub zero_on_reset: bool,
    /// Record counters in [`ArenaStats`](crate::ArenaStats)
    pub track_stats: bool,
}

impl ArenaConfig {
    /// Growable arena with the given first-block capacity.
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            initial_capacity,
            default_alignment: DEFAULT_ALIGNMENT,
            max_alignment: MAX_ALIGNMENT,
            growth: Growth::Growable,
            zero_on_reset: false,
            track_stats: cfg!(debug_assertions),
        }
    }

    /// Single heap block that never grows.
    pub fn fixed(capacity: usize) -> Self {
        Self::new(capacity).with_growth(Growth::Fixed)
    }

    /// Debug configuration - zeroes on reset and keeps full statistics
    pub fn debug() -> Self {
        Self::new(DEFAULT_BLOCK_SIZE)
            .with_zero_on_reset(true)
            .with_stats(true)
    }

    /// Sets first block capacity
    #[must_use = "builder methods must be chained or built"]
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Sets default alignment; invalid values fall back to
    /// [`DEFAULT_ALIGNMENT`] and large ones are clamped to `max_alignment`.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_alignment(mut self, alignment: usize) -> Self {
        self.default_alignment = alignment;
        self
    }

    /// Sets the alignment cap (must be a power of two)
    #[must_use = "builder methods must be chained or built"]
    pub fn with_max_alignment(mut self, alignment: usize) -> Self {
        self.max_alignment = alignment;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_growth(mut self, growth: Growth) -> Self {
        self.growth = growth;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_zero_on_reset(mut self, enabled: bool) -> Self {
        self.zero_on_reset = enabled;
        self
    }

    /// Enables/disables statistics tracking
    #[must_use = "builder methods must be chained or built"]
    pub fn with_stats(mut self, enabled: bool) -> Self {
        self.track_stats = enabled;
        self
    }

    /// Effective first-block capacity.
    pub fn block_capacity(&self) -> usize {
        if self.initial_capacity == 0 {
            DEFAULT_BLOCK_SIZE
        } else {
            self.initial_capacity
        }
    }

    /// Effective default alignment, after substitution and clamping.
    pub fn effective_alignment(&self) -> usize {
        normalize_alignment(self.default_alignment, DEFAULT_ALIGNMENT, self.max_alignment)
    }

    /// Validates the configuration
    pub fn validate(&self) -> ArenaResult<()> {
        if !self.max_alignment.is_power_of_two() {
            return Err(ArenaError::invalid_config(
                "Max alignment must be power of 2",
            ));
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_SIZE)
    }
}
