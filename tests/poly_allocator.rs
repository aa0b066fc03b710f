//! Scenario tests for the polymorphic allocator: handle equality, handle
//! interchangeability over one resource, and bounded-resource exhaustion
//! surfacing as a recoverable error.

use polyalloc::allocator::{Allocator, PolyAllocator};
use polyalloc::resource::{resource_eq, ArenaResource, PoolResource, TrackedResource};

#[test]
fn equal_handles_over_one_pool_are_interchangeable() {
    // 8 blocks of 16 bytes; each request below is one block.
    let pool = PoolResource::new(16, 8, 8).unwrap();
    let a = PolyAllocator::<u64>::new(&pool);
    let b = PolyAllocator::<u64>::new(&pool);
    assert!(a.equals(&b));

    let mut live = Vec::new();
    for i in 0..8 {
        let handle = if i % 2 == 0 { &a } else { &b };
        live.push(handle.allocate(2).unwrap());
    }
    assert_eq!(pool.free_blocks(), 0);

    // Ninth request fails with an allocation-failure error, not a crash.
    let err = a.allocate(2).unwrap_err();
    assert!(err.is_out_of_memory());

    // Equal handles: memory from one may be released through the other.
    for ptr in live {
        unsafe { b.deallocate(ptr, 2) };
    }
    assert_eq!(pool.free_blocks(), 8);

    // The pool recovered; allocation works again.
    let ptr = b.allocate(2).unwrap();
    unsafe { a.deallocate(ptr, 2) };
}

#[test]
fn handles_over_different_resources_are_unequal() {
    let arena = ArenaResource::new(512).unwrap();
    let pool = PoolResource::new(64, 8, 4).unwrap();

    let on_arena = PolyAllocator::<u8>::new(&arena);
    let on_pool = PolyAllocator::<u8>::new(&pool);

    assert!(!on_arena.equals(&on_pool));
    assert!(!resource_eq(on_arena.resource(), on_pool.resource()));
}

#[test]
fn requests_are_translated_to_element_layouts() {
    let tracked = TrackedResource::system();
    let alloc = PolyAllocator::<u64>::new(&tracked);

    let ptr = alloc.allocate(16).unwrap();
    assert_eq!(tracked.live_bytes(), 16 * core::mem::size_of::<u64>());
    assert_eq!(ptr.as_ptr() as usize % core::mem::align_of::<u64>(), 0);

    unsafe { alloc.deallocate(ptr, 16) };
    assert!(tracked.is_balanced());
}

#[test]
fn arena_backed_handle_exhausts_then_resets() {
    let mut arena = ArenaResource::new(64).unwrap();
    {
        let alloc = PolyAllocator::<u64>::new(&arena);
        let _a = alloc.allocate(8).unwrap();
        let err = alloc.allocate(1).unwrap_err();
        assert!(err.is_out_of_memory());
    }
    arena.reset();
    let alloc = PolyAllocator::<u64>::new(&arena);
    assert!(alloc.allocate(8).is_ok());
}
