//! Runtime-selectable memory resources
//!
//! A [`MemoryResource`] is an abstract backing store: a capability with two
//! operations, `allocate(bytes, alignment)` and `deallocate(ptr, bytes,
//! alignment)`, expressed here through [`core::alloc::Layout`]. Polymorphic
//! allocators hold a non-owning reference to exactly one resource and
//! forward every request to it; the resource never learns the element type
//! behind a request.
//!
//! Provided resources:
//! - [`SystemResource`]: the process-wide heap, exposed as an injectable
//!   instance via [`system()`]
//! - [`ArenaResource`]: bump allocation over an owned buffer, released all
//!   at once
//! - [`PoolResource`]: fixed-size blocks recycled through a free list
//! - [`TrackedResource`]: instrumentation wrapper counting calls and bytes
//! - [`SharedResource`]: mutex-serialized wrapper for cross-thread sharing
//!
//! # Ownership and lifetime
//!
//! Each resource owns its backing storage. A resource must outlive every
//! allocator referencing it and every allocation drawn from it that has not
//! been returned; this is a caller-enforced invariant, not a tracked one.
//!
//! # Concurrency
//!
//! This layer imposes no locking discipline. `ArenaResource` and
//! `PoolResource` are single-threaded (`!Sync`) by design; wrap them in
//! [`SharedResource`] when a resource is shared across threads.

mod arena;
mod pool;
mod shared;
mod system;
mod tracked;

pub use arena::ArenaResource;
pub use pool::PoolResource;
pub use shared::SharedResource;
pub use system::{system, SystemResource};
pub use tracked::TrackedResource;

use core::alloc::Layout;
use core::ptr::NonNull;

use crate::error::AllocResult;

/// An abstract, possibly shared, backing store for memory
///
/// # Safety
///
/// Implementors must ensure that a successful `allocate` returns a pointer
/// that is valid for reads and writes of `layout.size()` bytes, aligned to
/// `layout.align()`, and disjoint from every other live allocation of this
/// resource, and that the memory stays valid until it is passed back to
/// `deallocate` or the resource is dropped.
pub unsafe trait MemoryResource {
    /// Allocates raw storage for the given layout
    ///
    /// The returned storage is uninitialized. Zero-size requests succeed
    /// with a dangling, well-aligned pointer and reserve nothing.
    ///
    /// # Errors
    /// - an allocation-failure error (`is_out_of_memory()`) if the resource
    ///   cannot reserve `layout.size()` bytes
    /// - [`AllocError::AlignmentUnsupported`](crate::AllocError) if the
    ///   resource fundamentally cannot honor `layout.align()`
    ///
    /// Failures are never retried or downsized here; they surface to the
    /// caller unchanged.
    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>>;

    /// Releases storage previously returned by `allocate` on this resource
    ///
    /// # Safety
    /// - `ptr` must have been returned by `allocate` on this same resource
    /// - `layout` must match the original request exactly
    /// - `ptr` must not be used after this call; double-free is undefined
    ///   behavior
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// Zero-size allocation result: dangling but aligned for the request
#[inline]
pub(crate) fn dangling_slice(layout: Layout) -> NonNull<[u8]> {
    // SAFETY: alignments are non-zero, so the address is non-null.
    let ptr = unsafe { NonNull::new_unchecked(layout.align() as *mut u8) };
    NonNull::slice_from_raw_parts(ptr, 0)
}

/// Compares two resources by identity
///
/// Two polymorphic allocators are interchangeable iff they reference the
/// same resource *instance*; structural equality of resource contents is
/// never consulted.
#[inline]
#[must_use]
pub fn resource_eq(a: &dyn MemoryResource, b: &dyn MemoryResource) -> bool {
    core::ptr::addr_eq(a, b)
}

/// Forwarding impl so `&R` can stand in where a resource value is expected
unsafe impl<R: MemoryResource + ?Sized> MemoryResource for &R {
    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        (**self).allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded verbatim; same contract as R::deallocate.
        unsafe { (**self).deallocate(ptr, layout) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_eq_is_identity_not_structure() {
        let a = ArenaResource::new(64).unwrap();
        let b = ArenaResource::new(64).unwrap();
        assert!(resource_eq(&a, &a));
        // Structurally identical, distinct instances.
        assert!(!resource_eq(&a, &b));
    }

    #[test]
    fn resource_eq_is_symmetric() {
        let a = ArenaResource::new(256).unwrap();
        let b = SystemResource::new();
        assert_eq!(
            resource_eq(&a, &b),
            resource_eq(&b as &dyn MemoryResource, &a)
        );
    }
}
