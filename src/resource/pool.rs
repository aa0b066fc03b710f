//! Fixed-block pool memory resource
//!
//! The pool carves one owned buffer into equally-sized blocks and recycles
//! them through an intrusive free list: while a block is free, its first
//! bytes store the pointer to the next free block. Allocation and
//! deallocation are O(1) pops and pushes.
//!
//! ## Invariants
//!
//! - every block is aligned to `block_align`
//! - the free list contains only blocks inside the buffer, each at most once
//! - `free_count` matches the length of the free list

use core::alloc::Layout;
use core::cell::Cell;
use core::ptr::{self, NonNull};
use std::alloc;

use super::MemoryResource;
use crate::error::{AllocError, AllocResult};
use crate::utils::align_up;

/// Node in the free list, stored inside each free block
#[repr(C)]
struct FreeBlock {
    next: *mut FreeBlock,
}

/// Pool resource serving fixed-size blocks
///
/// Requests larger than a block, or more aligned than a block, are rejected
/// rather than silently rounded up: the pool serves exactly one shape.
///
/// # Thread safety
/// Single-threaded by design: the free-list head is a [`Cell`], so the pool
/// is `!Sync`. Wrap it in [`SharedResource`](super::SharedResource) to
/// share across threads.
pub struct PoolResource {
    base: NonNull<u8>,
    block_size: usize,
    block_align: usize,
    block_count: usize,
    free_head: Cell<*mut FreeBlock>,
    free_count: Cell<usize>,
}

impl PoolResource {
    /// Creates a pool of `block_count` blocks of `block_size` bytes each
    ///
    /// `block_size` is rounded up to a multiple of `block_align` so every
    /// block starts aligned.
    ///
    /// # Errors
    /// Returns an invalid-layout error if `block_size` cannot hold a free
    /// list pointer, `block_align` is not a power of two, or `block_count`
    /// is zero; an allocation failure if the buffer cannot be reserved.
    pub fn new(block_size: usize, block_align: usize, block_count: usize) -> AllocResult<Self> {
        if block_size < core::mem::size_of::<*mut u8>() {
            return Err(AllocError::invalid_layout(
                "block size too small to hold a free-list pointer",
            ));
        }
        if !block_align.is_power_of_two() {
            return Err(AllocError::invalid_layout(
                "block alignment must be a power of two",
            ));
        }
        if block_align < core::mem::align_of::<*mut u8>() {
            return Err(AllocError::invalid_layout(
                "block alignment below pointer alignment",
            ));
        }
        if block_count == 0 {
            return Err(AllocError::invalid_layout("pool needs at least one block"));
        }

        let stride = align_up(block_size, block_align);
        let total = stride
            .checked_mul(block_count)
            .ok_or(AllocError::SizeOverflow {
                count: block_count,
                elem_size: stride,
            })?;

        let layout = Layout::from_size_align(total, block_align)
            .map_err(|_| AllocError::invalid_layout("pool buffer layout invalid"))?;

        // SAFETY: total is non-zero (stride >= pointer size, count >= 1).
        let ptr = unsafe { alloc::alloc(layout) };
        let base =
            NonNull::new(ptr).ok_or_else(|| AllocError::out_of_memory_with_layout(layout))?;

        let pool = Self {
            base,
            block_size: stride,
            block_align,
            block_count,
            free_head: Cell::new(ptr::null_mut()),
            free_count: Cell::new(0),
        };
        pool.initialize_free_list();

        #[cfg(feature = "logging")]
        tracing::debug!(
            block_size = stride,
            block_align,
            block_count,
            "pool resource created"
        );

        Ok(pool)
    }

    /// Creates a pool whose blocks fit values of type `T`
    pub fn for_type<T>(block_count: usize) -> AllocResult<Self> {
        Self::for_layout(Layout::new::<T>(), block_count)
    }

    /// Creates a pool whose blocks fit the given layout
    pub fn for_layout(layout: Layout, block_count: usize) -> AllocResult<Self> {
        let min_size = core::mem::size_of::<*mut u8>();
        let min_align = core::mem::align_of::<*mut u8>();
        Self::new(
            layout.size().max(min_size),
            layout.align().max(min_align),
            block_count,
        )
    }

    /// Size of each block in bytes (after alignment rounding)
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Alignment of each block
    pub fn block_align(&self) -> usize {
        self.block_align
    }

    /// Total number of blocks
    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Number of blocks currently free
    pub fn free_blocks(&self) -> usize {
        self.free_count.get()
    }

    /// Number of blocks currently handed out
    pub fn allocated_blocks(&self) -> usize {
        self.block_count - self.free_count.get()
    }

    /// Checks if a pointer belongs to this pool's buffer
    pub fn contains(&self, ptr: *const u8) -> bool {
        let addr = ptr as usize;
        let start = self.base.as_ptr() as usize;
        addr >= start && addr < start + self.block_size * self.block_count
    }

    /// Links every block into the free list, last block first, so blocks
    /// are handed out in address order.
    fn initialize_free_list(&self) {
        let mut head: *mut FreeBlock = ptr::null_mut();
        for i in (0..self.block_count).rev() {
            // SAFETY: i * block_size is within the buffer for all i.
            let block = unsafe { self.base.as_ptr().add(i * self.block_size) }.cast::<FreeBlock>();
            // SAFETY: block is in-bounds, aligned to block_align (>= pointer
            // alignment) and unaliased during initialization.
            unsafe { (*block).next = head };
            head = block;
        }
        self.free_head.set(head);
        self.free_count.set(self.block_count);
    }
}

unsafe impl MemoryResource for PoolResource {
    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        if layout.size() == 0 {
            return Ok(super::dangling_slice(layout));
        }

        if layout.align() > self.block_align {
            return Err(AllocError::alignment_unsupported(
                layout.align(),
                self.block_align,
            ));
        }
        if layout.size() > self.block_size {
            return Err(AllocError::out_of_memory_with_layout(layout));
        }

        let head = self.free_head.get();
        let Some(block) = NonNull::new(head) else {
            return Err(AllocError::pool_exhausted(self.block_count, self.block_size));
        };

        // SAFETY: a non-null free-list head is always a valid free block.
        self.free_head.set(unsafe { (*block.as_ptr()).next });
        self.free_count.set(self.free_count.get() - 1);

        Ok(NonNull::slice_from_raw_parts(block.cast(), layout.size()))
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() == 0 {
            return;
        }

        debug_assert!(self.contains(ptr.as_ptr()), "pointer not from this pool");
        debug_assert!(
            ((ptr.as_ptr() as usize) - (self.base.as_ptr() as usize)) % self.block_size == 0,
            "pointer does not start a block"
        );

        let block = ptr.as_ptr().cast::<FreeBlock>();
        // SAFETY: ptr starts a block of this pool (caller contract plus the
        // debug checks above); the block is no longer in use, so its first
        // bytes may carry the list link again.
        unsafe { (*block).next = self.free_head.get() };
        self.free_head.set(block);
        self.free_count.set(self.free_count.get() + 1);
    }
}

impl Drop for PoolResource {
    fn drop(&mut self) {
        // SAFETY: the same size/align pair was validated in new(); base was
        // allocated with this exact layout and is released exactly once.
        unsafe {
            let layout = Layout::from_size_align_unchecked(
                self.block_size * self.block_count,
                self.block_align,
            );
            alloc::dealloc(self.base.as_ptr(), layout);
        }
    }
}

// SAFETY: the pool owns its buffer exclusively; moving it to another thread
// moves the whole free-list state with it.
unsafe impl Send for PoolResource {}

impl core::fmt::Debug for PoolResource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PoolResource")
            .field("block_size", &self.block_size)
            .field("block_align", &self.block_align)
            .field("block_count", &self.block_count)
            .field("free", &self.free_count.get())
            .finish()
    }
}
