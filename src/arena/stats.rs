//! Statistics tracking for arena allocators

use core::cell::Cell;

/// Statistics for arena allocators
///
/// Counters are `Cell`-based: the arenas are single-threaded by design and
/// carry no atomics. Recording is skipped entirely when the owning arena's
/// config disables tracking.
#[derive(Debug, Default)]
pub struct ArenaStats {
    bytes_reserved: Cell<usize>,
    bytes_used: Cell<usize>,
    bytes_wasted: Cell<usize>,
    allocations: Cell<u64>,
    flushes: Cell<u64>,
    blocks_acquired: Cell<usize>,
}

impl ArenaStats {
    /// Creates a new `ArenaStats` instance with zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Total backing bytes owned by the arena
    pub fn bytes_reserved(&self) -> usize {
        self.bytes_reserved.get()
    }

    /// Bytes handed out, including alignment padding
    pub fn bytes_used(&self) -> usize {
        self.bytes_used.get()
    }

    /// Bytes lost to alignment padding
    pub fn bytes_wasted(&self) -> usize {
        self.bytes_wasted.get()
    }

    /// Number of allocations served
    pub fn allocations(&self) -> u64 {
        self.allocations.get()
    }

    /// Number of flushes performed
    pub fn flushes(&self) -> u64 {
        self.flushes.get()
    }

    /// Backing buffers acquired: growth events for the buffer arena,
    /// regions for the region arena
    pub fn blocks_acquired(&self) -> usize {
        self.blocks_acquired.get()
    }

    /// Utilization ratio in 0..1 (used over reserved)
    pub fn utilization_ratio(&self) -> f64 {
        let reserved = self.bytes_reserved() as f64;
        if reserved == 0.0 {
            0.0
        } else {
            self.bytes_used() as f64 / reserved
        }
    }

    pub(crate) fn record_allocation(&self, bytes: usize, padding: usize) {
        self.bytes_used.set(self.bytes_used.get() + bytes + padding);
        self.bytes_wasted.set(self.bytes_wasted.get() + padding);
        self.allocations.set(self.allocations.get() + 1);
    }

    pub(crate) fn record_block(&self, bytes: usize) {
        self.bytes_reserved.set(self.bytes_reserved.get() + bytes);
        self.blocks_acquired.set(self.blocks_acquired.get() + 1);
    }

    pub(crate) fn record_flush(&self) {
        self.bytes_used.set(0);
        self.bytes_wasted.set(0);
        self.allocations.set(0);
        self.flushes.set(self.flushes.get() + 1);
    }

    /// Creates a snapshot of current statistics
    pub fn snapshot(&self) -> ArenaStatsSnapshot {
        ArenaStatsSnapshot {
            bytes_reserved: self.bytes_reserved(),
            bytes_used: self.bytes_used(),
            bytes_wasted: self.bytes_wasted(),
            allocations: self.allocations(),
            flushes: self.flushes(),
            blocks_acquired: self.blocks_acquired(),
            utilization_ratio: self.utilization_ratio(),
        }
    }
}

/// Immutable snapshot of arena statistics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaStatsSnapshot {
    /// Total backing bytes owned
    pub bytes_reserved: usize,
    /// Bytes handed out, including padding
    pub bytes_used: usize,
    /// Bytes lost to alignment padding
    pub bytes_wasted: usize,
    /// Allocations served since the last flush
    pub allocations: u64,
    /// Flushes performed over the arena lifetime
    pub flushes: u64,
    /// Backing buffers acquired over the arena lifetime
    pub blocks_acquired: usize,
    /// Used over reserved, in 0..1
    pub utilization_ratio: f64,
}

impl core::fmt::Display for ArenaStatsSnapshot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "Arena statistics:")?;
        writeln!(f, "  Reserved: {} bytes", self.bytes_reserved)?;
        writeln!(f, "  Used: {} bytes", self.bytes_used)?;
        writeln!(f, "  Wasted (padding): {} bytes", self.bytes_wasted)?;
        writeln!(f, "  Utilization: {:.1}%", self.utilization_ratio * 100.0)?;
        writeln!(f, "  Allocations: {}", self.allocations)?;
        writeln!(f, "  Flushes: {}", self.flushes)?;
        writeln!(f, "  Blocks acquired: {}", self.blocks_acquired)?;
        Ok(())
    }
}
