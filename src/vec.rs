//! Allocator-aware vector
//!
//! `AllocVec` is the reference consumer of the allocator contract: a
//! minimal contiguous container that draws every byte and runs every
//! element constructor/destructor through its bound allocator, never
//! through a hidden global call. Its growth policy and iterator surface
//! are intentionally small; what it implements exactly is the
//! allocator-propagation table:
//!
//! | operation | rule |
//! |---|---|
//! | [`try_clone`](AllocVec::try_clone) | new container gets the allocator picked by `select_on_copy` |
//! | move construction (Rust move) | allocator value travels with the storage |
//! | [`try_clone_from`](AllocVec::try_clone_from) | target keeps its allocator unless `PROPAGATE_ON_COPY_ASSIGN`; when propagating, old storage is released through the old allocator before adopting the new one |
//! | [`move_assign_from`](AllocVec::move_assign_from) | equal allocators transfer storage pointers with zero element moves; unequal non-propagating allocators move elements into storage freshly allocated under the target's allocator, then release source storage through the source's allocator |
//! | [`swap_with`](AllocVec::swap_with) | equal or propagating allocators swap storage pointers only; unequal non-propagating allocators fall back to an element-wise exchange (documented, expensive) |
//!
//! Getting this table wrong deallocates through the wrong resource, which
//! is memory corruption, not a logic bug. Hence the explicit, fallible
//! methods instead of `Clone`/`PartialOrd`-style implicit machinery.

use core::fmt;
use core::mem::{self, ManuallyDrop};
use core::ops::{Deref, DerefMut};
use core::ptr::{self, NonNull};

use crate::allocator::{Allocator, SystemAllocator};
use crate::error::AllocResult;

/// Contiguous growable array bound to an allocator instance
///
/// The container holds exactly one allocator for its full lifetime; the
/// allocator outlives every allocation it has made that has not yet been
/// released. On any failed operation the container is left valid (and at
/// worst empty); failures surface as [`AllocError`](crate::AllocError)
/// values, never as panics.
pub struct AllocVec<T, A: Allocator<T> = SystemAllocator<T>> {
    ptr: NonNull<T>,
    cap: usize,
    len: usize,
    alloc: A,
}

impl<T> AllocVec<T, SystemAllocator<T>> {
    /// Creates an empty vector on the system allocator
    pub fn new() -> Self {
        Self::new_in(SystemAllocator::new())
    }
}

impl<T> Default for AllocVec<T, SystemAllocator<T>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A: Allocator<T>> AllocVec<T, A> {
    const IS_ZST: bool = mem::size_of::<T>() == 0;

    /// Creates an empty vector bound to `alloc`
    ///
    /// Does not allocate until the first element is pushed.
    pub fn new_in(alloc: A) -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
            len: 0,
            alloc,
        }
    }

    /// Creates an empty vector with room for `cap` elements
    pub fn with_capacity_in(cap: usize, alloc: A) -> AllocResult<Self> {
        let mut vec = Self::new_in(alloc);
        vec.reserve_exact(cap)?;
        Ok(vec)
    }

    /// The bound allocator instance
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Elements the current storage can hold without reallocating
    pub fn capacity(&self) -> usize {
        if Self::IS_ZST {
            usize::MAX
        } else {
            self.cap
        }
    }

    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first len elements are initialized.
        unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: the first len elements are initialized.
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Pointer to the start of storage; stable until the next reallocation
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Appends an element, growing storage through the allocator if needed
    pub fn push(&mut self, value: T) -> AllocResult<()> {
        if !Self::IS_ZST && self.len == self.cap {
            self.grow_amortized(self.len + 1)?;
        }
        // SAFETY: len < capacity now, so the slot is in bounds and free.
        unsafe {
            self.alloc
                .construct(NonNull::new_unchecked(self.ptr.as_ptr().add(self.len)), value);
        }
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the last element
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot at len was initialized; reading it moves the
        // element out and the slot is no longer considered live.
        Some(unsafe { ptr::read(self.ptr.as_ptr().add(self.len)) })
    }

    /// Destroys all elements in reverse order; storage is kept
    pub fn clear(&mut self) {
        // Reverse order mirrors construction order, like stack unwinding.
        while self.len > 0 {
            self.len -= 1;
            // SAFETY: the slot at len is initialized and destroyed once.
            unsafe {
                self.alloc
                    .destroy(NonNull::new_unchecked(self.ptr.as_ptr().add(self.len)));
            }
        }
    }

    /// Ensures capacity for at least `min_cap` elements, exactly
    pub fn reserve_exact(&mut self, min_cap: usize) -> AllocResult<()> {
        if Self::IS_ZST || min_cap <= self.cap {
            return Ok(());
        }
        let new_ptr = self.alloc.allocate(min_cap)?;
        if self.len > 0 {
            // SAFETY: both buffers are live and disjoint; this is a bitwise
            // move of the initialized prefix.
            unsafe { ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), self.len) };
        }
        if self.cap > 0 {
            // SAFETY: old storage came from this allocator with this cap;
            // its elements have been moved out.
            unsafe { self.alloc.deallocate(self.ptr, self.cap) };
        }
        self.ptr = new_ptr;
        self.cap = min_cap;
        Ok(())
    }

    fn grow_amortized(&mut self, needed: usize) -> AllocResult<()> {
        let target = needed.max(self.cap * 2).max(4);
        self.reserve_exact(target)
    }

    /// Copy construction: clones elements under a freshly selected
    /// allocator per the source allocator's select-on-copy policy
    pub fn try_clone(&self) -> AllocResult<Self>
    where
        T: Clone,
    {
        let mut clone = Self::with_capacity_in(self.len, self.alloc.select_on_copy())?;
        for item in self.as_slice() {
            // Capacity is reserved; push cannot fail here, but stay fallible.
            clone.push(item.clone())?;
        }
        Ok(clone)
    }

    /// Copy assignment, honoring `PROPAGATE_ON_COPY_ASSIGN`
    ///
    /// When the allocator type propagates and the two instances differ,
    /// all storage allocated under the old allocator is released through
    /// the old allocator before anything is allocated under the new one.
    /// On failure the target is left valid but empty.
    pub fn try_clone_from(&mut self, source: &Self) -> AllocResult<()>
    where
        T: Clone,
    {
        self.clear();
        if A::PROPAGATE_ON_COPY_ASSIGN && !self.alloc.equals(&source.alloc) {
            self.release_storage();
            self.alloc = source.alloc.clone();
        }
        self.reserve_exact(source.len)?;
        for item in source.as_slice() {
            self.push(item.clone())?;
        }
        Ok(())
    }

    /// Move assignment, honoring allocator equality and
    /// `PROPAGATE_ON_MOVE_ASSIGN`
    ///
    /// Equal allocators (or a propagating allocator type) transfer the
    /// storage pointer directly; no element is moved or copied. Unequal,
    /// non-propagating allocators move each element into storage freshly
    /// allocated under the target's existing allocator, then release the
    /// source's storage through the source's allocator. On failure the
    /// target is left valid but empty and the source is dropped intact.
    pub fn move_assign_from(&mut self, source: Self) -> AllocResult<()> {
        if A::PROPAGATE_ON_MOVE_ASSIGN || self.alloc.equals(&source.alloc) {
            self.clear();
            self.release_storage();
            let (ptr, cap, len, alloc) = source.into_raw_parts();
            self.ptr = ptr;
            self.cap = cap;
            self.len = len;
            if A::PROPAGATE_ON_MOVE_ASSIGN {
                self.alloc = alloc;
            }
            // Otherwise the allocators are equal: the adopted storage may
            // be released through the one already held.
            return Ok(());
        }

        self.clear();
        self.reserve_exact(source.len)?;
        let (src_ptr, src_cap, src_len, src_alloc) = source.into_raw_parts();
        if src_len > 0 {
            // SAFETY: target capacity was reserved above; this bitwise
            // move transfers ownership of every element.
            unsafe { ptr::copy_nonoverlapping(src_ptr.as_ptr(), self.ptr.as_ptr(), src_len) };
        }
        self.len = src_len;
        if !Self::IS_ZST && src_cap > 0 {
            // SAFETY: source storage came from src_alloc with src_cap; its
            // elements were moved out above.
            unsafe { src_alloc.deallocate(src_ptr, src_cap) };
        }
        Ok(())
    }

    /// Swap, honoring allocator equality and `PROPAGATE_ON_SWAP`
    ///
    /// Equal allocators (or a propagating allocator type) swap storage
    /// pointers only and cannot fail. With unequal, non-propagating
    /// allocators the swap degrades to a documented element-wise exchange:
    /// each side's elements are moved into storage freshly allocated under
    /// the *other* container's allocator. Both fresh buffers are acquired
    /// before either container is mutated, so on failure both containers
    /// are unchanged.
    pub fn swap_with(&mut self, other: &mut Self) -> AllocResult<()> {
        if A::PROPAGATE_ON_SWAP {
            mem::swap(self, other);
            return Ok(());
        }
        if self.alloc.equals(&other.alloc) {
            mem::swap(&mut self.ptr, &mut other.ptr);
            mem::swap(&mut self.cap, &mut other.cap);
            mem::swap(&mut self.len, &mut other.len);
            return Ok(());
        }

        // Element-wise fallback. Acquire both buffers first.
        let new_self_cap = other.len;
        let new_other_cap = self.len;
        let new_self_ptr = if Self::IS_ZST || new_self_cap == 0 {
            NonNull::dangling()
        } else {
            self.alloc.allocate(new_self_cap)?
        };
        let new_other_ptr = if Self::IS_ZST || new_other_cap == 0 {
            NonNull::dangling()
        } else {
            match other.alloc.allocate(new_other_cap) {
                Ok(ptr) => ptr,
                Err(err) => {
                    if !Self::IS_ZST && new_self_cap > 0 {
                        // SAFETY: just allocated above, still uninitialized.
                        unsafe { self.alloc.deallocate(new_self_ptr, new_self_cap) };
                    }
                    return Err(err);
                }
            }
        };

        // SAFETY: all four buffers are live; the bitwise copies move every
        // element exactly once, then each old buffer is released through
        // the allocator that produced it.
        unsafe {
            ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_other_ptr.as_ptr(), self.len);
            ptr::copy_nonoverlapping(other.ptr.as_ptr(), new_self_ptr.as_ptr(), other.len);
            if !Self::IS_ZST && self.cap > 0 {
                self.alloc.deallocate(self.ptr, self.cap);
            }
            if !Self::IS_ZST && other.cap > 0 {
                other.alloc.deallocate(other.ptr, other.cap);
            }
        }

        let self_len = self.len;
        self.ptr = new_self_ptr;
        self.cap = new_self_cap;
        self.len = other.len;
        other.ptr = new_other_ptr;
        other.cap = new_other_cap;
        other.len = self_len;
        Ok(())
    }

    /// Releases storage through the bound allocator; elements must already
    /// be destroyed.
    fn release_storage(&mut self) {
        debug_assert_eq!(self.len, 0);
        if !Self::IS_ZST && self.cap > 0 {
            // SAFETY: storage came from this allocator with this cap.
            unsafe { self.alloc.deallocate(self.ptr, self.cap) };
        }
        self.ptr = NonNull::dangling();
        self.cap = 0;
    }

    /// Disassembles the vector without dropping anything
    fn into_raw_parts(self) -> (NonNull<T>, usize, usize, A) {
        let this = ManuallyDrop::new(self);
        // SAFETY: this is never touched again; the allocator value is
        // moved out exactly once.
        let alloc = unsafe { ptr::read(&this.alloc) };
        (this.ptr, this.cap, this.len, alloc)
    }
}

impl<T, A: Allocator<T>> Drop for AllocVec<T, A> {
    fn drop(&mut self) {
        self.clear();
        self.release_storage();
    }
}

impl<T, A: Allocator<T>> Deref for AllocVec<T, A> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: Allocator<T>> DerefMut for AllocVec<T, A> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug, A: Allocator<T>> fmt::Debug for AllocVec<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T: PartialEq, A: Allocator<T>, B: Allocator<T>> PartialEq<AllocVec<T, B>> for AllocVec<T, A> {
    fn eq(&self, other: &AllocVec<T, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}
