//! Reallocating buffer arena
//!
//! A single contiguous buffer carved by a bump cursor. On overflow the
//! buffer is reallocated, strictly faster than the immediate need, through
//! the backing collaborator. Reallocation may relocate the buffer, so
//! allocations are addressed by opaque [`Offset`] handles; raw pointers are
//! resolved on demand against the current base and are only stable until
//! the next allocation.
//!
//! # Safety
//!
//! - Cell-based cursor state, single-threaded by design (no Send/Sync)
//! - `0 <= allocated <= capacity` at every step
//! - Growth reserves the worst-case padding (`align - 1`) before carving,
//!   so the padding recomputed against the relocated base always fits
//! - A failed reallocation leaves the old buffer valid, so growth failure
//!   surfaces as an error with the arena unchanged

use core::alloc::Layout;
use core::cell::Cell;
use core::ptr::{self, NonNull};

use tracing::{debug, trace};

use super::{ArenaAllocate, ArenaConfig, ArenaStats};
use crate::allocator::{BackingAllocator, MemoryUsage, SystemAllocator};
use crate::error::{AllocError, AllocResult};
use crate::utils::{CheckedArithmetic, padding_needed};

/// Opaque handle to an allocation in a [`BufferArena`]
///
/// Offsets stay valid across buffer growth (relocation moves the bytes, not
/// their logical positions) and become meaningless after a flush.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Offset(usize);

impl Offset {
    /// Byte offset from the start of the buffer
    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

/// Reallocating buffer arena
///
/// One growable buffer, one cursor. Pointer addresses are invalidated by
/// growth; logical offsets are not. See [`RegionArena`](super::RegionArena)
/// for the variant with stable addresses.
#[derive(Debug)]
pub struct BufferArena<B: BackingAllocator = SystemAllocator> {
    base: Cell<NonNull<u8>>,
    capacity: Cell<usize>,
    allocated: Cell<usize>,
    config: ArenaConfig,
    stats: ArenaStats,
    backing: B,
}

fn buffer_layout(size: usize) -> AllocResult<Layout> {
    Layout::from_size_align(size, 1).map_err(|_| AllocError::size_overflow("buffer layout"))
}

impl BufferArena<SystemAllocator> {
    /// Creates an arena with the given initial capacity on the system heap
    ///
    /// # Errors
    /// - [`AllocError::InvalidSize`] for a zero capacity
    /// - [`AllocError::OutOfMemory`] if the backing allocation fails; no
    ///   partially constructed arena is leaked
    pub fn with_capacity(capacity: usize) -> AllocResult<Self> {
        Self::with_config(ArenaConfig::default().with_initial_size(capacity))
    }

    /// Creates an arena with the given configuration on the system heap
    pub fn with_config(config: ArenaConfig) -> AllocResult<Self> {
        Self::with_config_in(config, SystemAllocator::new())
    }
}

impl<B: BackingAllocator> BufferArena<B> {
    /// Creates an arena with the given configuration and backing allocator
    pub fn with_config_in(config: ArenaConfig, backing: B) -> AllocResult<Self> {
        let size = config.initial_size;
        if size == 0 {
            return Err(AllocError::invalid_size(
                0,
                "buffer arena capacity must be nonzero",
            ));
        }

        let layout = buffer_layout(size)?;
        // SAFETY: layout has nonzero size (checked above). On error nothing
        // has been constructed, so nothing leaks.
        let base = unsafe { backing.allocate(layout)? };

        let arena = Self {
            base: Cell::new(base),
            capacity: Cell::new(size),
            allocated: Cell::new(0),
            config,
            stats: ArenaStats::new(),
            backing,
        };
        if arena.config.track_stats {
            arena.stats.record_block(size);
        }
        debug!(capacity = size, "buffer arena created");
        Ok(arena)
    }

    /// Allocates `size` bytes and returns the allocation's offset
    ///
    /// A zero-byte request is valid: it resolves to the current cursor and
    /// consumes no capacity.
    ///
    /// # Errors
    /// [`AllocError::OutOfMemory`] if growth fails. This is recoverable by
    /// policy: a failed backing reallocation leaves the old buffer valid,
    /// so the arena stays in its pre-call state.
    #[must_use = "allocated memory must be used"]
    pub fn alloc(&self, size: usize) -> AllocResult<Offset> {
        if size == 0 {
            return Ok(Offset(self.allocated.get()));
        }

        let required = self.allocated.get().try_add(size, "buffer offset")?;
        if required > self.capacity.get() {
            self.grow(required, size)?;
        }

        let offset = self.allocated.get();
        self.allocated.set(offset + size);
        if self.config.track_stats {
            self.stats.record_allocation(size, 0);
        }
        Ok(Offset(offset))
    }

    /// Allocates `size` bytes aligned to `align` (a power of two)
    ///
    /// Alignment padding counts toward the capacity check and the cursor,
    /// and the padding is recomputed after any growth because relocation
    /// changes the base address.
    #[must_use = "allocated memory must be used"]
    pub fn alloc_aligned(&self, size: usize, align: usize) -> AllocResult<Offset> {
        if !align.is_power_of_two() {
            return Err(AllocError::invalid_alignment(align));
        }

        // Zero-byte requests resolve to the bare cursor; nothing is ever
        // written through them, so no padding is applied or consumed.
        if size == 0 {
            return Ok(Offset(self.allocated.get()));
        }

        // Reserve for the worst case so the carve below always fits, even
        // when growth relocates the buffer and changes the padding.
        let worst = self
            .allocated
            .get()
            .try_add(size, "aligned offset")?
            .try_add(align - 1, "alignment padding")?;
        if worst > self.capacity.get() {
            self.grow(worst, size)?;
        }

        let shift = self.cursor_padding(align);
        let offset = self.allocated.get() + shift;
        self.allocated.set(offset + size);
        if self.config.track_stats {
            self.stats.record_allocation(size, shift);
        }
        Ok(Offset(offset))
    }

    /// Resolves an offset to a pointer into the current buffer
    ///
    /// The pointer is valid until the next allocation (which may relocate
    /// the buffer), flush, or drop. The offset itself survives growth.
    pub fn ptr_at(&self, offset: Offset) -> NonNull<u8> {
        debug_assert!(
            offset.get() <= self.allocated.get(),
            "offset beyond the allocation cursor"
        );
        // SAFETY: offset <= allocated <= capacity, so the result is within
        // the buffer or one past its end.
        unsafe { NonNull::new_unchecked(self.base.get().as_ptr().add(offset.get())) }
    }

    /// Padding from the current write cursor to the next `align` boundary
    fn cursor_padding(&self, align: usize) -> usize {
        let cursor = self.base.get().as_ptr() as usize + self.allocated.get();
        padding_needed(cursor, align)
    }

    /// Reallocates the buffer to at least `min_capacity`, growing by
    /// `request * 2` past the current capacity when that is larger
    fn grow(&self, min_capacity: usize, request: usize) -> AllocResult<()> {
        let old_capacity = self.capacity.get();
        let target = old_capacity.try_add(request.try_mul(2, "growth step")?, "grown capacity")?;
        let new_capacity = target.max(min_capacity);

        let old_layout = buffer_layout(old_capacity)?;
        let new_layout = buffer_layout(new_capacity)?;
        // SAFETY: base was allocated by this backing allocator with
        // old_layout. On failure the old buffer is untouched and the arena
        // state is unchanged.
        let new_base = unsafe {
            self.backing
                .reallocate(self.base.get(), old_layout, new_layout)?
        };

        self.base.set(new_base);
        self.capacity.set(new_capacity);
        if self.config.track_stats {
            self.stats.record_block(new_capacity - old_capacity);
        }
        trace!(old_capacity, new_capacity, "buffer arena grown");
        Ok(())
    }

    /// Resets the cursor to zero, retaining the buffer
    ///
    /// All previously returned offsets and pointers become logically
    /// invalid. Bytes are not cleared unless `zero_on_flush` is configured.
    pub fn flush(&mut self) {
        if self.config.zero_on_flush {
            // SAFETY: Zeroing the used prefix of our own buffer. &mut self
            // guarantees no outstanding borrows.
            unsafe {
                ptr::write_bytes(self.base.get().as_ptr(), 0, self.allocated.get());
            }
        }
        self.allocated.set(0);
        if self.config.track_stats {
            self.stats.record_flush();
        }
        trace!("buffer arena flushed");
    }

    /// Bytes handed out since the last flush, including padding
    #[inline]
    pub fn used(&self) -> usize {
        self.allocated.get()
    }

    /// Current buffer capacity in bytes
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Returns reference to statistics
    pub fn stats(&self) -> &ArenaStats {
        &self.stats
    }
}

impl<B: BackingAllocator> Drop for BufferArena<B> {
    fn drop(&mut self) {
        // SAFETY: base was allocated with this exact size and align 1, and
        // Drop runs exactly once.
        unsafe {
            let layout = Layout::from_size_align_unchecked(self.capacity.get(), 1);
            self.backing.deallocate(self.base.get(), layout);
        }
    }
}

impl<B: BackingAllocator> ArenaAllocate for BufferArena<B> {
    unsafe fn alloc_bytes(&self, size: usize, align: usize) -> AllocResult<NonNull<u8>> {
        let offset = self.alloc_aligned(size, align)?;
        Ok(self.ptr_at(offset))
    }

    fn used(&self) -> usize {
        self.used()
    }

    fn capacity(&self) -> usize {
        self.capacity()
    }

    fn flush(&mut self) {
        self.flush();
    }
}

impl<B: BackingAllocator> MemoryUsage for BufferArena<B> {
    fn used_memory(&self) -> usize {
        self.used()
    }

    fn available_memory(&self) -> Option<usize> {
        Some(self.capacity() - self.used())
    }
}
