//! Shared helpers for integration tests.
#![allow(dead_code)]

use core::ptr::NonNull;

use polyalloc::allocator::{Allocator, PolyAllocator};
use polyalloc::resource::MemoryResource;
use polyalloc::AllocResult;

/// Polymorphic allocator that opts in to every propagation rule.
///
/// Forwards all work to the wrapped handle; only the policy flags differ.
pub struct PropagatingAlloc<'r, T>(pub PolyAllocator<'r, T>);

pub fn propagating<T>(resource: &dyn MemoryResource) -> PropagatingAlloc<'_, T> {
    PropagatingAlloc(PolyAllocator::new(resource))
}

impl<'r, T> Clone for PropagatingAlloc<'r, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'r, T> Copy for PropagatingAlloc<'r, T> {}

unsafe impl<'r, T> Allocator<T> for PropagatingAlloc<'r, T> {
    const PROPAGATE_ON_COPY_ASSIGN: bool = true;
    const PROPAGATE_ON_MOVE_ASSIGN: bool = true;
    const PROPAGATE_ON_SWAP: bool = true;

    fn allocate(&self, n: usize) -> AllocResult<NonNull<T>> {
        self.0.allocate(n)
    }

    unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) {
        unsafe { self.0.deallocate(ptr, n) }
    }

    fn equals(&self, other: &Self) -> bool {
        self.0.equals(&other.0)
    }
}
