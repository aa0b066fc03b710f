//! System heap resource
//!
//! Wraps the platform allocator behind the [`MemoryResource`] interface so
//! the process-wide heap is an injected capability like any other resource,
//! not a hidden global call. The default static allocator and any
//! polymorphic allocator built from [`system()`] draw from here; tests
//! substitute an instrumented resource instead of touching process state.

use core::alloc::{GlobalAlloc, Layout};
use core::ptr::NonNull;
use std::alloc::System;

use super::MemoryResource;
use crate::error::{AllocError, AllocResult};

/// The process-wide system heap as a memory resource
///
/// Zero-size and stateless; every instance forwards to the same platform
/// allocator. Note that [`resource_eq`](super::resource_eq) still compares
/// by address, and addresses of ad-hoc zero-size values are unspecified.
/// Use [`system()`] when identity matters: it always names the same
/// instance.
///
/// # Thread safety
/// Inherently thread-safe; the platform allocator serializes internally.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResource;

impl SystemResource {
    /// Creates a new handle to the system heap
    #[inline]
    pub const fn new() -> Self {
        SystemResource
    }
}

unsafe impl MemoryResource for SystemResource {
    #[inline]
    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        if layout.size() == 0 {
            return Ok(super::dangling_slice(layout));
        }

        // SAFETY: layout has non-zero size (checked above) and a valid
        // alignment by Layout's own invariant.
        let ptr = unsafe { System.alloc(layout) };

        match NonNull::new(ptr) {
            Some(ptr) => Ok(NonNull::slice_from_raw_parts(ptr, layout.size())),
            None => Err(AllocError::out_of_memory_with_layout(layout)),
        }
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() == 0 {
            return; // dangling pointer from the zero-size path
        }

        // SAFETY: ptr came from System.alloc with this exact layout
        // (caller contract).
        unsafe { System.dealloc(ptr.as_ptr(), layout) };
    }
}

/// Well-known process-wide system resource instance
///
/// All default allocators reference this single instance, so polymorphic
/// allocators built from it compare equal to each other.
#[inline]
#[must_use]
pub fn system() -> &'static SystemResource {
    static SYSTEM: SystemResource = SystemResource::new();
    &SYSTEM
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::resource_eq;

    #[test]
    fn round_trip() {
        let resource = SystemResource::new();
        let layout = Layout::new::<u64>();

        let ptr = resource.allocate(layout).unwrap();
        assert_eq!(ptr.len(), layout.size());
        assert_eq!(ptr.cast::<u8>().as_ptr() as usize % layout.align(), 0);

        unsafe { resource.deallocate(ptr.cast(), layout) };
    }

    #[test]
    fn zero_size_allocation_is_dangling() {
        let resource = SystemResource::new();
        let layout = Layout::new::<()>();

        let ptr = resource.allocate(layout).unwrap();
        assert_eq!(ptr.len(), 0);
        unsafe { resource.deallocate(ptr.cast(), layout) };
    }

    #[test]
    fn process_wide_instance_is_stable() {
        assert!(resource_eq(system(), system()));
    }

    #[test]
    fn thread_safety_markers() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SystemResource>();
    }
}
