//! Backing allocator traits
//!
//! The arenas never talk to the host heap directly. They go through
//! [`BackingAllocator`], a small unsafe trait covering the three operations
//! an arena consumes: acquire a buffer, release a buffer, and (for the
//! reallocating variant) resize a buffer in place or by moving it.
//! Substituting a custom collaborator changes no allocator logic.
//!
//! # Safety
//!
//! Implementors must uphold the usual allocator contracts:
//! - Returned pointers are valid for reads and writes of `layout.size()`
//!   bytes and aligned to `layout.align()`
//! - `deallocate`/`reallocate` are only called with pointers previously
//!   returned by the same allocator, with the original layout
//! - After `deallocate` or a successful `reallocate`, the old pointer is
//!   invalid

use core::alloc::Layout;
use core::ptr::NonNull;

use crate::error::AllocResult;

/// Pluggable source of backing memory for arenas
///
/// The default implementation of [`reallocate`](Self::reallocate) moves the
/// allocation: it acquires a new buffer, copies the old contents, and
/// releases the old buffer. Implementors with a native resize path (such as
/// the system heap) should override it.
pub unsafe trait BackingAllocator {
    /// Allocates a buffer with the given layout
    ///
    /// # Safety
    /// - `layout` must have nonzero size
    /// - The returned pointer is uninitialized and must be initialized
    ///   before reads
    ///
    /// # Errors
    /// Returns an error when the backing memory is exhausted.
    unsafe fn allocate(&self, layout: Layout) -> AllocResult<NonNull<u8>>;

    /// Releases a buffer previously returned by this allocator
    ///
    /// # Safety
    /// - `ptr` must have been allocated by this allocator with `layout`
    /// - `ptr` must not be used after this call
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Resizes a buffer, possibly moving it
    ///
    /// On success the old pointer is invalid and the first
    /// `min(old_layout.size(), new_layout.size())` bytes of the new buffer
    /// hold the old contents. On failure the old buffer is untouched and
    /// remains valid, which is what lets arena growth fail without leaving
    /// the arena in a torn state.
    ///
    /// # Safety
    /// - `ptr` must have been allocated by this allocator with `old_layout`
    /// - Both layouts must have nonzero size
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> AllocResult<NonNull<u8>> {
        // SAFETY: Allocating the replacement buffer.
        // - new_layout is valid per the caller contract
        // - On error we return before touching the old buffer
        let new_ptr = unsafe { self.allocate(new_layout)? };

        let copy_size = core::cmp::min(old_layout.size(), new_layout.size());
        // SAFETY: Copying old contents into the replacement buffer.
        // - ptr is valid for reads of old_layout.size() bytes (caller contract)
        // - new_ptr is valid for writes of new_layout.size() bytes (just allocated)
        // - copy_size does not exceed either allocation
        // - The regions are disjoint (new allocation)
        unsafe {
            core::ptr::copy_nonoverlapping(ptr.as_ptr(), new_ptr.as_ptr(), copy_size);
        }

        // SAFETY: Releasing the old buffer after its contents were copied.
        // - ptr was allocated by this allocator with old_layout (caller contract)
        unsafe { self.deallocate(ptr, old_layout) };

        Ok(new_ptr)
    }
}

// SAFETY: Forwarding every call to the underlying T preserves its contracts;
// no new unsafe operations are introduced.
unsafe impl<T: BackingAllocator + ?Sized> BackingAllocator for &T {
    unsafe fn allocate(&self, layout: Layout) -> AllocResult<NonNull<u8>> {
        // SAFETY: Same contract as T::allocate.
        unsafe { (**self).allocate(layout) }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: Same contract as T::deallocate.
        unsafe { (**self).deallocate(ptr, layout) }
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> AllocResult<NonNull<u8>> {
        // SAFETY: Same contract as T::reallocate.
        unsafe { (**self).reallocate(ptr, old_layout, new_layout) }
    }
}

/// Memory usage tracking trait
///
/// Implemented by arenas that know how much backing memory they own and how
/// much of it has been handed out.
pub trait MemoryUsage {
    /// Currently used memory in bytes
    fn used_memory(&self) -> usize;

    /// Available memory in bytes, if known
    fn available_memory(&self) -> Option<usize>;

    /// Total memory capacity in bytes, if known
    fn total_memory(&self) -> Option<usize> {
        self.available_memory()
            .map(|available| self.used_memory() + available)
    }

    /// Memory usage as a percentage (0.0 to 100.0), if it can be computed
    fn memory_usage_percent(&self) -> Option<f32> {
        self.total_memory().map(|total| {
            if total == 0 {
                0.0
            } else {
                (self.used_memory() as f32 / total as f32) * 100.0
            }
        })
    }
}

impl<T: MemoryUsage + ?Sized> MemoryUsage for &T {
    fn used_memory(&self) -> usize {
        (**self).used_memory()
    }

    fn available_memory(&self) -> Option<usize> {
        (**self).available_memory()
    }

    fn total_memory(&self) -> Option<usize> {
        (**self).total_memory()
    }

    fn memory_usage_percent(&self) -> Option<f32> {
        (**self).memory_usage_percent()
    }
}
