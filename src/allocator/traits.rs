//! The static allocator concept
//!
//! [`Allocator<T>`] is the compile-time contract every container binds to
//! as a type parameter: four operations (`allocate`, `deallocate`,
//! `construct`, `destroy`), an equality protocol, and the propagation
//! policy consumed on container copy/move/swap. A container written
//! against this trait is monomorphized per allocator type at zero runtime
//! cost; the same contract is satisfied by
//! [`PolyAllocator`](super::PolyAllocator) when the memory strategy must be
//! chosen at run time.
//!
//! The associated types of the classical formulation map directly onto the
//! language here: `value_type` is the generic parameter `T`, `size_type`
//! is `usize`, `difference_type` is `isize`.
//!
//! # Safety
//!
//! Implementors promise that a successful `allocate(n)` returns a pointer
//! valid for reads and writes of `n` contiguous `T`, aligned for `T`, and
//! exclusive until deallocated. `deallocate` is a caller contract, not a
//! runtime check: releasing a pointer or count that did not come from an
//! equal allocator is undefined behavior. This layer trades checking for
//! zero overhead inside every container operation.

use core::alloc::Layout;
use core::ptr::NonNull;

use crate::error::{AllocError, AllocResult};

/// Computes the byte layout for `n` contiguous elements of `T`
#[inline]
pub(crate) fn array_layout<T>(n: usize) -> AllocResult<Layout> {
    Layout::array::<T>(n).map_err(|_| AllocError::size_overflow(n, core::mem::size_of::<T>()))
}

/// Compile-time allocator contract bound by containers
///
/// The `Clone` supertrait is what lets an allocator value travel with its
/// container on copy construction; stateless allocators clone for free.
///
/// # Safety
///
/// See the module documentation. In addition, `equals` must be reflexive,
/// symmetric, and consistent across repeated calls, and memory obtained
/// from one allocator may be released through another only when the two
/// compare equal.
pub unsafe trait Allocator<T>: Clone {
    /// True iff any two instances of this allocator type are
    /// interchangeable for allocate/deallocate pairing.
    ///
    /// Stateless allocator types set this and need no runtime comparison.
    const IS_ALWAYS_EQUAL: bool = false;

    /// Whether copy-assignment of a container replaces the target's
    /// allocator with the source's.
    const PROPAGATE_ON_COPY_ASSIGN: bool = false;

    /// Whether move-assignment of a container takes the source's allocator
    /// along with its storage.
    const PROPAGATE_ON_MOVE_ASSIGN: bool = false;

    /// Whether swapping two containers also swaps their allocators.
    const PROPAGATE_ON_SWAP: bool = false;

    /// Reserves storage for exactly `n` contiguous elements of `T`
    ///
    /// The storage is uninitialized; no element constructors run. A zero
    /// `n` succeeds with a dangling, well-aligned pointer and reserves
    /// nothing.
    ///
    /// # Errors
    /// Fails with an allocation-failure error when storage cannot be
    /// reserved; the container must not construct elements on a failed
    /// result. The failure is surfaced unchanged, never retried or
    /// silently downsized.
    fn allocate(&self, n: usize) -> AllocResult<NonNull<T>>;

    /// Releases storage previously returned by `allocate(n)`
    ///
    /// # Safety
    /// - `ptr` must come from `allocate(n)` on an allocator equal to this
    ///   one, with this exact `n`
    /// - all elements must already be destroyed; no destructors run here
    /// - `ptr` must not be used afterwards
    unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize);

    /// Constructs one element in place
    ///
    /// Runs the element's initialization only; no allocation occurs.
    ///
    /// # Safety
    /// `ptr` must be valid for writes of one `T`, properly aligned, and
    /// must not contain a live element.
    #[inline]
    unsafe fn construct(&self, ptr: NonNull<T>, value: T) {
        // SAFETY: ptr is valid for writes and aligned (caller contract).
        unsafe { ptr.as_ptr().write(value) }
    }

    /// Destroys one element in place
    ///
    /// Runs the element's destructor only; the storage remains allocated.
    ///
    /// # Safety
    /// `ptr` must point at a live, initialized element that is not used
    /// again after this call.
    #[inline]
    unsafe fn destroy(&self, ptr: NonNull<T>) {
        // SAFETY: ptr points at a live element (caller contract).
        unsafe { ptr.as_ptr().drop_in_place() }
    }

    /// Runtime interchangeability test
    ///
    /// Two equal allocators may have their allocate/deallocate calls mixed
    /// freely. The default answers from the compile-time flag; stateful
    /// allocator types override this.
    #[inline]
    fn equals(&self, other: &Self) -> bool {
        let _ = other;
        Self::IS_ALWAYS_EQUAL
    }

    /// Selects the allocator a copy-constructed container starts with
    ///
    /// Default policy: copy the source's allocator value.
    #[inline]
    fn select_on_copy(&self) -> Self {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_layout_matches_type_shape() {
        let layout = array_layout::<u64>(4).unwrap();
        assert_eq!(layout.size(), 32);
        assert_eq!(layout.align(), core::mem::align_of::<u64>());
    }

    #[test]
    fn array_layout_overflow_is_reported() {
        let err = array_layout::<u64>(usize::MAX / 4).unwrap_err();
        assert!(matches!(err, AllocError::SizeOverflow { .. }));
    }
}
