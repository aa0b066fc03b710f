//! Instrumented resource wrapper
//!
//! Wraps any resource and counts calls and bytes without changing behavior.
//! Tests bind allocators to a `TrackedResource` instead of patching process
//! state, then assert that allocate/deallocate balances come out even.

use core::alloc::Layout;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicUsize, Ordering};

use super::{MemoryResource, SystemResource};
use crate::error::AllocResult;

/// Counting wrapper around a memory resource
///
/// Counters use relaxed atomics: they are observation-only and never
/// synchronize the underlying resource.
#[derive(Debug, Default)]
pub struct TrackedResource<R = SystemResource> {
    inner: R,
    allocations: AtomicUsize,
    deallocations: AtomicUsize,
    failed: AtomicUsize,
    live_bytes: AtomicUsize,
}

impl TrackedResource<SystemResource> {
    /// Creates a tracked view of the system heap
    pub fn system() -> Self {
        Self::new(SystemResource::new())
    }
}

impl<R: MemoryResource> TrackedResource<R> {
    /// Wraps `inner`, starting all counters at zero
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            allocations: AtomicUsize::new(0),
            deallocations: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            live_bytes: AtomicUsize::new(0),
        }
    }

    /// Successful allocate calls so far
    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::Relaxed)
    }

    /// Deallocate calls so far
    pub fn deallocations(&self) -> usize {
        self.deallocations.load(Ordering::Relaxed)
    }

    /// Allocate calls that returned an error
    pub fn failed_allocations(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }

    /// Bytes allocated but not yet deallocated
    pub fn live_bytes(&self) -> usize {
        self.live_bytes.load(Ordering::Relaxed)
    }

    /// True when every successful allocation has been deallocated
    pub fn is_balanced(&self) -> bool {
        self.allocations() == self.deallocations() && self.live_bytes() == 0
    }

    /// Access to the wrapped resource
    pub fn inner(&self) -> &R {
        &self.inner
    }
}

unsafe impl<R: MemoryResource> MemoryResource for TrackedResource<R> {
    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        match self.inner.allocate(layout) {
            Ok(ptr) => {
                self.allocations.fetch_add(1, Ordering::Relaxed);
                self.live_bytes.fetch_add(layout.size(), Ordering::Relaxed);
                Ok(ptr)
            }
            Err(err) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                Err(err)
            }
        }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.deallocations.fetch_add(1, Ordering::Relaxed);
        self.live_bytes.fetch_sub(layout.size(), Ordering::Relaxed);
        // SAFETY: forwarded verbatim; same contract as R::deallocate.
        unsafe { self.inner.deallocate(ptr, layout) };
    }
}
