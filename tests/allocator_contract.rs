//! Contract tests for the typed allocator layer: allocation round trips,
//! element construction order, zero-size handling, and balance against an
//! instrumented resource.

use core::ptr::NonNull;

use proptest::prelude::*;

use polyalloc::allocator::{Allocator, PolyAllocator, SystemAllocator};
use polyalloc::resource::TrackedResource;

#[test]
fn round_trip_small_and_large_counts() {
    let alloc = SystemAllocator::<u64>::new();
    for n in [1usize, 2, 7, 64, 4096] {
        let ptr = alloc.allocate(n).unwrap();
        unsafe {
            for i in 0..n {
                alloc.construct(NonNull::new_unchecked(ptr.as_ptr().add(i)), i as u64);
            }
            for i in 0..n {
                assert_eq!(*ptr.as_ptr().add(i), i as u64);
            }
            for i in (0..n).rev() {
                alloc.destroy(NonNull::new_unchecked(ptr.as_ptr().add(i)));
            }
            alloc.deallocate(ptr, n);
        }
    }
}

#[test]
fn zero_count_never_reaches_the_resource() {
    let tracked = TrackedResource::system();
    let alloc = PolyAllocator::<u64>::new(&tracked);

    let ptr = alloc.allocate(0).unwrap();
    assert_eq!(ptr, NonNull::dangling());
    unsafe { alloc.deallocate(ptr, 0) };

    assert_eq!(tracked.allocations(), 0);
    assert_eq!(tracked.deallocations(), 0);
}

#[test]
fn construct_destroy_balances_against_tracked_resource() {
    let tracked = TrackedResource::system();
    let alloc = PolyAllocator::<String>::new(&tracked);

    let ptr = alloc.allocate(4).unwrap();
    unsafe {
        for i in 0..4 {
            alloc.construct(
                NonNull::new_unchecked(ptr.as_ptr().add(i)),
                format!("item-{i}"),
            );
        }
        // construct/destroy run element lifecycles only; the resource saw
        // exactly one allocation.
        assert_eq!(tracked.allocations(), 1);

        for i in (0..4).rev() {
            alloc.destroy(NonNull::new_unchecked(ptr.as_ptr().add(i)));
        }
        alloc.deallocate(ptr, 4);
    }
    assert!(tracked.is_balanced());
}

#[test]
fn overflowing_count_is_an_error_not_a_panic() {
    let alloc = SystemAllocator::<u64>::new();
    assert!(alloc.allocate(usize::MAX / 2).is_err());
}

proptest! {
    #[test]
    fn any_count_round_trips_balanced(n in 0usize..=1024, fill in any::<u32>()) {
        let tracked = TrackedResource::system();
        let alloc = PolyAllocator::<u32>::new(&tracked);

        let ptr = alloc.allocate(n).unwrap();
        unsafe {
            for i in 0..n {
                alloc.construct(NonNull::new_unchecked(ptr.as_ptr().add(i)), fill);
            }
            for i in 0..n {
                prop_assert_eq!(*ptr.as_ptr().add(i), fill);
            }
            for i in (0..n).rev() {
                alloc.destroy(NonNull::new_unchecked(ptr.as_ptr().add(i)));
            }
            alloc.deallocate(ptr, n);
        }
        prop_assert!(tracked.is_balanced());
    }
}
