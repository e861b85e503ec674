//! Linear arena allocators for batch-style allocation workloads
//!
//! This crate provides bump-pointer arenas for workloads that allocate many
//! objects during a unit of work and reclaim them all at once instead of
//! freeing individually:
//!
//! - [`BufferArena`]: a single growable buffer that reallocates on
//!   overflow. Growth may relocate memory, so allocations are addressed by
//!   opaque [`Offset`] handles that survive relocation.
//! - [`RegionArena`]: an ordered chain of fixed-capacity regions. Overflow
//!   appends a region instead of moving data, so pointers and typed
//!   references stay valid until flush or drop.
//!
//! Both variants share the [`ArenaAllocate`] interface, draw backing memory
//! through the pluggable [`BackingAllocator`] collaborator (the system heap
//! by default), and are single-threaded by design: no internal
//! synchronization, no atomic counters. Share an arena across threads only
//! behind external mutual exclusion.
//!
//! # Example
//!
//! ```
//! use linear_arena::{ArenaConfig, RegionArena};
//!
//! let mut arena = RegionArena::with_capacity(1024)?;
//!
//! let point = arena.alloc_value((3i32, 4i32))?;
//! let name = arena.alloc_str("origin")?;
//! assert_eq!(*point, (3, 4));
//! assert_eq!(name, "origin");
//!
//! // Bulk reclaim: counters rewind, backing memory is retained
//! arena.flush();
//! assert_eq!(arena.total(), 0);
//! # Ok::<(), linear_arena::AllocError>(())
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod allocator;
pub mod arena;
pub mod error;
pub mod utils;

pub use allocator::{BackingAllocator, MemoryUsage, SystemAllocator};
pub use arena::{
    ArenaAllocate, ArenaConfig, ArenaStats, ArenaStatsSnapshot, BufferArena, Offset, RegionArena,
};
pub use error::{AllocError, AllocResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
