//! Arena (bump) memory resource
//!
//! An arena hands out storage by advancing a cursor through one owned
//! buffer. Individual `deallocate` calls are accepted and ignored; the
//! entire region is released at once when the arena is dropped or reset.
//! This makes allocation a pointer bump and suits phase-oriented workloads
//! where many allocations share one lifetime.

use core::alloc::Layout;
use core::cell::Cell;
use core::ptr::NonNull;
use std::alloc;

use super::MemoryResource;
use crate::error::{AllocError, AllocResult};
use crate::utils::align_up;

/// Buffers are allocated at this alignment; larger alignments are honored
/// by aligning the cursor within the buffer.
const BASE_ALIGN: usize = 16;

/// Bump resource over a single owned buffer
///
/// # Thread safety
/// Single-threaded by design: the cursor is a [`Cell`], so the arena is
/// `!Sync`. Wrap it in [`SharedResource`](super::SharedResource) to share
/// across threads.
pub struct ArenaResource {
    base: NonNull<u8>,
    capacity: usize,
    cursor: Cell<usize>,
    /// Live allocation balance, kept for diagnostics and leak checks.
    live: Cell<usize>,
}

impl ArenaResource {
    /// Creates an arena with the given capacity in bytes
    ///
    /// # Errors
    /// Returns an allocation failure if the backing buffer cannot be
    /// reserved, or an invalid-layout error for a zero capacity.
    pub fn new(capacity: usize) -> AllocResult<Self> {
        if capacity == 0 {
            return Err(AllocError::invalid_layout("arena capacity must be non-zero"));
        }

        let layout = Layout::from_size_align(capacity, BASE_ALIGN)
            .map_err(|_| AllocError::invalid_layout("arena capacity too large"))?;

        // SAFETY: layout has non-zero size (checked above).
        let ptr = unsafe { alloc::alloc(layout) };
        let base =
            NonNull::new(ptr).ok_or_else(|| AllocError::out_of_memory_with_layout(layout))?;

        #[cfg(feature = "logging")]
        tracing::debug!(capacity, "arena resource created");

        Ok(Self {
            base,
            capacity,
            cursor: Cell::new(0),
            live: Cell::new(0),
        })
    }

    /// Total capacity of the arena in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes consumed so far, including alignment padding
    pub fn used(&self) -> usize {
        self.cursor.get()
    }

    /// Bytes still available from the cursor to the end of the buffer
    pub fn remaining(&self) -> usize {
        self.capacity - self.cursor.get()
    }

    /// Number of allocations that have not been deallocated
    pub fn live_allocations(&self) -> usize {
        self.live.get()
    }

    /// Checks if a pointer was handed out by this arena
    pub fn contains(&self, ptr: *const u8) -> bool {
        let addr = ptr as usize;
        let start = self.base.as_ptr() as usize;
        addr >= start && addr < start + self.capacity
    }

    /// Rewinds the cursor, invalidating every allocation at once
    ///
    /// Takes `&mut self`: exclusive access proves no allocator still holds
    /// a reference to this arena, so no outstanding allocation can be used
    /// afterwards.
    pub fn reset(&mut self) {
        self.cursor.set(0);
        self.live.set(0);
    }
}

unsafe impl MemoryResource for ArenaResource {
    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        if layout.size() == 0 {
            return Ok(super::dangling_slice(layout));
        }

        // Align the absolute address, not the offset: the buffer base is
        // only BASE_ALIGN-aligned.
        let start = self.base.as_ptr() as usize;
        let aligned = align_up(start + self.cursor.get(), layout.align());
        let offset = aligned - start;

        let end = match offset.checked_add(layout.size()) {
            Some(end) if end <= self.capacity => end,
            _ => {
                return Err(AllocError::arena_exhausted(layout.size(), self.remaining()));
            }
        };

        self.cursor.set(end);
        self.live.set(self.live.get() + 1);

        // SAFETY: offset < capacity, so the sum stays inside the buffer
        // allocation; base is non-null, hence so is the sum.
        let ptr = unsafe { NonNull::new_unchecked(self.base.as_ptr().add(offset)) };
        Ok(NonNull::slice_from_raw_parts(ptr, layout.size()))
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() == 0 {
            return;
        }

        debug_assert!(self.contains(ptr.as_ptr()), "pointer not from this arena");
        // Storage is reclaimed wholesale on drop/reset; only the balance
        // moves here.
        self.live.set(self.live.get().saturating_sub(1));
    }
}

impl Drop for ArenaResource {
    fn drop(&mut self) {
        // SAFETY: the same size/align pair was validated in new(); base was
        // allocated with this exact layout and is released exactly once.
        unsafe {
            let layout = Layout::from_size_align_unchecked(self.capacity, BASE_ALIGN);
            alloc::dealloc(self.base.as_ptr(), layout);
        }
    }
}

// SAFETY: the arena owns its buffer exclusively; moving it to another
// thread moves the whole allocation state with it.
unsafe impl Send for ArenaResource {}

impl core::fmt::Debug for ArenaResource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ArenaResource")
            .field("capacity", &self.capacity)
            .field("used", &self.used())
            .field("live", &self.live.get())
            .finish()
    }
}
