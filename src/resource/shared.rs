//! Mutex-serialized resource wrapper
//!
//! The allocator layer performs no synchronization of its own; a resource
//! shared across threads must serialize its own state mutation. This
//! wrapper buys that serialization for any single-threaded resource by
//! taking a lock around each call, making e.g. an arena or pool usable
//! behind `Arc` from several threads.

use core::alloc::Layout;
use core::ptr::NonNull;

use parking_lot::Mutex;

use super::MemoryResource;
use crate::error::AllocResult;

/// Serializing wrapper that makes a `Send` resource shareable
///
/// `SharedResource<R>` is `Sync` whenever `R` is `Send`, which both
/// [`ArenaResource`](super::ArenaResource) and
/// [`PoolResource`](super::PoolResource) are.
#[derive(Debug)]
pub struct SharedResource<R> {
    inner: Mutex<R>,
}

impl<R: MemoryResource> SharedResource<R> {
    /// Wraps `inner` behind a mutex
    pub fn new(inner: R) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }

    /// Runs `f` with exclusive access to the wrapped resource
    ///
    /// For resource-specific queries (capacity, free blocks) that the
    /// `MemoryResource` interface does not carry.
    pub fn with<T>(&self, f: impl FnOnce(&R) -> T) -> T {
        f(&self.inner.lock())
    }

    /// Consumes the wrapper, returning the resource
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}

unsafe impl<R: MemoryResource> MemoryResource for SharedResource<R> {
    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        self.inner.lock().allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded under the lock; same contract as R::deallocate.
        unsafe { self.inner.lock().deallocate(ptr, layout) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::PoolResource;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn shared_pool_survives_concurrent_round_trips() {
        let pool = PoolResource::new(64, 8, 32).unwrap();
        let shared = Arc::new(SharedResource::new(pool));
        let layout = Layout::from_size_align(64, 8).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    for _ in 0..100 {
                        let ptr = shared.allocate(layout).unwrap();
                        unsafe { shared.deallocate(ptr.cast(), layout) };
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.with(PoolResource::free_blocks), 32);
    }
}
