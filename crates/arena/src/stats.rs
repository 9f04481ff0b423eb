//! Statistics tracking for arenas

/// Counters kept by an [`Arena`](crate::Arena) when
/// [`ArenaConfig::track_stats`](crate::ArenaConfig::track_stats) is enabled.
///
/// The arena is single-threaded, so these are plain integers rather than
/// atomics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArenaStats {
    allocations: u64,
    bytes_requested: u64,
    bytes_padding: u64,
    blocks_created: u64,
    bytes_reserved: u64,
    in_place_reallocs: u64,
    copy_reallocs: u64,
    resets: u64,
    rollbacks: u64,
    failures: u64,
}

impl ArenaStats {
    /// Creates a new ArenaStats instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocations(&self) -> u64 {
        self.allocations
    }

    pub fn bytes_requested(&self) -> u64 {
        self.bytes_requested
    }

    /// Bytes skipped to satisfy alignment
    pub fn bytes_padding(&self) -> u64 {
        self.bytes_padding
    }

    pub fn blocks_created(&self) -> u64 {
        self.blocks_created
    }

    /// Total block capacity ever acquired
    pub fn bytes_reserved(&self) -> u64 {
        self.bytes_reserved
    }

    pub fn in_place_reallocs(&self) -> u64 {
        self.in_place_reallocs
    }

    pub fn copy_reallocs(&self) -> u64 {
        self.copy_reallocs
    }

    pub fn resets(&self) -> u64 {
        self.resets
    }

    pub fn rollbacks(&self) -> u64 {
        self.rollbacks
    }

    /// Allocation requests that returned an error
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Calculates average requested allocation size in bytes
    pub fn average_allocation_size(&self) -> f64 {
        if self.allocations == 0 {
            0.0
        } else {
            self.bytes_requested as f64 / self.allocations as f64
        }
    }

    /// Share of consumed bytes lost to alignment padding (0..1)
    pub fn padding_ratio(&self) -> f64 {
        let consumed = self.bytes_requested + self.bytes_padding;
        if consumed == 0 {
            0.0
        } else {
            self.bytes_padding as f64 / consumed as f64
        }
    }

    pub(crate) fn record_allocation(&mut self, bytes: usize, padding: usize) {
        self.allocations += 1;
        self.bytes_requested += bytes as u64;
        self.bytes_padding += padding as u64;
    }

    pub(crate) fn record_block(&mut self, capacity: usize) {
        self.blocks_created += 1;
        self.bytes_reserved += capacity as u64;
    }

    pub(crate) fn record_realloc(&mut self, in_place: bool) {
        if in_place {
            self.in_place_reallocs += 1;
        } else {
            self.copy_reallocs += 1;
        }
    }

    pub(crate) fn record_reset(&mut self) {
        self.resets += 1;
    }

    pub(crate) fn record_rollback(&mut self) {
        self.rollbacks += 1;
    }

    pub(crate) fn record_failure(&mut self) {
        self.failures += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratios_handle_empty_stats() {
        let stats = ArenaStats::new();
        assert_eq!(stats.average_allocation_size(), 0.0);
        assert_eq!(stats.padding_ratio(), 0.0);
    }

    #[test]
    fn records_accumulate() {
        let mut stats = ArenaStats::new();
        stats.record_allocation(10, 6);
        stats.record_allocation(30, 0);
        stats.record_block(1024);
        stats.record_realloc(true);
        stats.record_realloc(false);

        assert_eq!(stats.allocations(), 2);
        assert_eq!(stats.bytes_requested(), 40);
        assert_eq!(stats.bytes_padding(), 6);
        assert_eq!(stats.average_allocation_size(), 20.0);
        assert_eq!(stats.blocks_created(), 1);
        assert_eq!(stats.bytes_reserved(), 1024);
        assert_eq!(stats.in_place_reallocs(), 1);
        assert_eq!(stats.copy_reallocs(), 1);
    }
}
