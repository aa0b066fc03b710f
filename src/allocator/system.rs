//! Default stateless allocator
//!
//! The allocator a container gets when none is named: a zero-size value
//! bound to the process-wide system resource. All instances are
//! interchangeable (`IS_ALWAYS_EQUAL`), so containers pay nothing for
//! carrying one and the propagation rules all take their cheap paths.

use core::marker::PhantomData;
use core::ptr::NonNull;

use super::traits::{array_layout, Allocator};
use crate::resource::{system, MemoryResource};
use crate::error::AllocResult;

/// Stateless allocator backed by the system heap
///
/// The element type is a compile-time tag only; the struct stores nothing.
/// Every request forwards to the well-known [`system()`] resource, so the
/// global facility stays an injected capability rather than a hidden call;
/// tests that need instrumentation bind a
/// [`PolyAllocator`](super::PolyAllocator) to a
/// [`TrackedResource`](crate::resource::TrackedResource) instead.
pub struct SystemAllocator<T> {
    _elem: PhantomData<fn(T) -> T>,
}

impl<T> SystemAllocator<T> {
    /// Creates the (stateless) system allocator
    #[inline]
    pub const fn new() -> Self {
        Self { _elem: PhantomData }
    }
}

impl<T> Default for SystemAllocator<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for SystemAllocator<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> Copy for SystemAllocator<T> {}

impl<T> core::fmt::Debug for SystemAllocator<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SystemAllocator")
    }
}

impl<T> PartialEq for SystemAllocator<T> {
    #[inline]
    fn eq(&self, _other: &Self) -> bool {
        true // stateless: all instances are the same allocator
    }
}

impl<T> Eq for SystemAllocator<T> {}

unsafe impl<T> Allocator<T> for SystemAllocator<T> {
    const IS_ALWAYS_EQUAL: bool = true;

    fn allocate(&self, n: usize) -> AllocResult<NonNull<T>> {
        let layout = array_layout::<T>(n)?;
        if layout.size() == 0 {
            return Ok(NonNull::dangling());
        }
        let ptr = system().allocate(layout)?;
        Ok(ptr.cast())
    }

    unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) {
        // Layout::array cannot fail here: it succeeded for the same n at
        // allocation time (caller contract).
        let Ok(layout) = core::alloc::Layout::array::<T>(n) else {
            return;
        };
        if layout.size() == 0 {
            return;
        }
        // SAFETY: ptr came from system().allocate with this exact layout
        // (caller contract plus IS_ALWAYS_EQUAL).
        unsafe { system().deallocate(ptr.cast(), layout) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_zero_sized() {
        assert_eq!(core::mem::size_of::<SystemAllocator<u64>>(), 0);
    }

    #[test]
    fn all_instances_compare_equal() {
        let a = SystemAllocator::<u32>::new();
        let b = SystemAllocator::<u32>::new();
        assert_eq!(a, b);
        assert!(a.equals(&b));
        assert!(SystemAllocator::<u32>::IS_ALWAYS_EQUAL);
    }

    #[test]
    fn round_trip() {
        let alloc = SystemAllocator::<u64>::new();
        let ptr = alloc.allocate(4).unwrap();
        unsafe {
            for i in 0..4 {
                alloc.construct(NonNull::new_unchecked(ptr.as_ptr().add(i)), i as u64);
            }
            for i in (0..4).rev() {
                alloc.destroy(NonNull::new_unchecked(ptr.as_ptr().add(i)));
            }
            alloc.deallocate(ptr, 4);
        }
    }

    #[test]
    fn zero_count_allocation_is_dangling() {
        let alloc = SystemAllocator::<u64>::new();
        let ptr = alloc.allocate(0).unwrap();
        assert_eq!(ptr, NonNull::dangling());
        unsafe { alloc.deallocate(ptr, 0) };
    }

    #[test]
    fn zero_sized_elements_never_touch_the_heap() {
        let alloc = SystemAllocator::<()>::new();
        let ptr = alloc.allocate(1024).unwrap();
        unsafe { alloc.deallocate(ptr, 1024) };
    }
}
