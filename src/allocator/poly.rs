//! The polymorphic allocator
//!
//! Adapts the static concept to a runtime-selectable backing resource. A
//! `PolyAllocator<'r, T>` is a value-level handle holding a non-owning
//! reference to exactly one [`MemoryResource`], bound at construction.
//! Containers instantiated with this handle type are compiled once and can
//! be pointed, at run time, at the system heap, an arena, or a pool.
//!
//! The cost of that flexibility is one indirection per request and losing
//! `IS_ALWAYS_EQUAL`: two handles may reference different resources, so
//! containers consult runtime equality (resource *identity*, never
//! resource contents) before transferring storage.

use core::marker::PhantomData;
use core::ptr::NonNull;

use super::traits::{array_layout, Allocator};
use crate::resource::{resource_eq, MemoryResource};
use crate::error::AllocResult;

/// Value-level handle forwarding every operation to a memory resource
///
/// Byte counts are translated from element counts with
/// `Layout::array::<T>(n)` and alignment with `align_of::<T>()`; the
/// resource never learns the element type. Resource failures surface to
/// the caller unchanged: no retry, no fallback resource.
///
/// The referenced resource must outlive the handle and every allocation
/// drawn through it; the `'r` lifetime enforces the first half, the second
/// is the usual deallocate-before-drop contract.
pub struct PolyAllocator<'r, T> {
    resource: &'r dyn MemoryResource,
    _elem: PhantomData<fn(T) -> T>,
}

impl<'r, T> PolyAllocator<'r, T> {
    /// Binds a new handle to `resource`
    #[inline]
    pub fn new(resource: &'r dyn MemoryResource) -> Self {
        Self {
            resource,
            _elem: PhantomData,
        }
    }

    /// The referenced resource
    #[inline]
    pub fn resource(&self) -> &'r dyn MemoryResource {
        self.resource
    }

    /// Produces a handle for a different element type on the same resource
    ///
    /// Rebinding preserves the referenced resource and only swaps the
    /// element tag; byte and alignment math is recomputed for `U` at the
    /// call sites.
    #[inline]
    #[must_use]
    pub fn rebind<U>(&self) -> PolyAllocator<'r, U> {
        PolyAllocator {
            resource: self.resource,
            _elem: PhantomData,
        }
    }
}

impl<'r, T> Clone for PolyAllocator<'r, T> {
    #[inline]
    fn clone(&self) -> Self {
        Self::new(self.resource)
    }
}

impl<'r, T> Copy for PolyAllocator<'r, T> {}

impl<'r, T> core::fmt::Debug for PolyAllocator<'r, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PolyAllocator")
            .field("resource", &(self.resource as *const dyn MemoryResource))
            .finish()
    }
}

/// Identity equality: equal iff both handles reference the same resource
/// instance.
impl<'r, T> PartialEq for PolyAllocator<'r, T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        resource_eq(self.resource, other.resource)
    }
}

impl<'r, T> Eq for PolyAllocator<'r, T> {}

unsafe impl<'r, T> Allocator<T> for PolyAllocator<'r, T> {
    // Two handles may reference different resources.
    const IS_ALWAYS_EQUAL: bool = false;

    fn allocate(&self, n: usize) -> AllocResult<NonNull<T>> {
        let layout = array_layout::<T>(n)?;
        if layout.size() == 0 {
            return Ok(NonNull::dangling());
        }
        let ptr = self.resource.allocate(layout)?;
        Ok(ptr.cast())
    }

    unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) {
        let Ok(layout) = core::alloc::Layout::array::<T>(n) else {
            return;
        };
        if layout.size() == 0 {
            return;
        }
        // SAFETY: ptr came from an equal handle, i.e. from this same
        // resource, with this exact layout (caller contract).
        unsafe { self.resource.deallocate(ptr.cast(), layout) };
    }

    #[inline]
    fn equals(&self, other: &Self) -> bool {
        resource_eq(self.resource, other.resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{system, ArenaResource};

    #[test]
    fn equality_is_resource_identity() {
        let arena_a = ArenaResource::new(256).unwrap();
        let arena_b = ArenaResource::new(256).unwrap();

        let a1 = PolyAllocator::<u64>::new(&arena_a);
        let a2 = PolyAllocator::<u64>::new(&arena_a);
        let b = PolyAllocator::<u64>::new(&arena_b);

        assert_eq!(a1, a2);
        assert_ne!(a1, b);
        assert!(a1.equals(&a2));
        assert!(!a1.equals(&b));
        // Reflexive and consistent.
        assert_eq!(a1, a1);
        assert!(a1.equals(&a2) && a2.equals(&a1));
    }

    #[test]
    fn rebind_preserves_resource_identity() {
        let arena = ArenaResource::new(256).unwrap();
        let ints = PolyAllocator::<u32>::new(&arena);
        let pairs = ints.rebind::<(u64, u64)>();

        assert!(resource_eq(ints.resource(), pairs.resource()));
    }

    #[test]
    fn rebound_handle_uses_new_element_shape() {
        let arena = ArenaResource::new(256).unwrap();
        let bytes = PolyAllocator::<u8>::new(&arena);
        let words = bytes.rebind::<u64>();

        let ptr = words.allocate(2).unwrap();
        assert_eq!(ptr.as_ptr() as usize % core::mem::align_of::<u64>(), 0);
        unsafe { words.deallocate(ptr, 2) };
    }

    #[test]
    fn forwards_to_system_resource() {
        let alloc = PolyAllocator::<u64>::new(system());
        let ptr = alloc.allocate(8).unwrap();
        unsafe { alloc.deallocate(ptr, 8) };
    }

    #[test]
    fn is_never_always_equal() {
        assert!(!<PolyAllocator<'_, u8> as Allocator<u8>>::IS_ALWAYS_EQUAL);
    }
}
