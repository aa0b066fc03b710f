//! # polyalloc
//!
//! Allocator abstractions for containers: a compile-time allocator concept,
//! a runtime-polymorphic allocator over pluggable memory resources, and the
//! propagation rules that keep storage and allocator paired when containers
//! are copied, moved, or swapped.
//!
//! Three layers, bottom up:
//! - [`resource`]: byte-level [`MemoryResource`](resource::MemoryResource)
//!   implementations (system heap, bump arena, fixed-block pool, plus
//!   tracking and locking wrappers)
//! - [`allocator`]: the typed [`Allocator<T>`](allocator::Allocator)
//!   contract, the stateless [`SystemAllocator`](allocator::SystemAllocator)
//!   default, and the resource-backed
//!   [`PolyAllocator`](allocator::PolyAllocator)
//! - [`vec`]: [`AllocVec`](vec::AllocVec), an allocator-aware container
//!   implementing the full propagation table
//!
//! ## Quick Start
//!
//! ```rust
//! use polyalloc::prelude::*;
//!
//! # fn main() -> AllocResult<()> {
//! // Stateless default: storage comes from the system heap.
//! let mut numbers = AllocVec::new();
//! numbers.push(1u32)?;
//!
//! // Runtime-selected strategy: same container type, arena-backed.
//! let arena = ArenaResource::new(4096)?;
//! let mut scratch = AllocVec::new_in(PolyAllocator::<u32>::new(&arena));
//! scratch.push(2)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `logging` (default): structured failure logging via `tracing`

#![warn(clippy::all)]
#![warn(rust_2018_idioms)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
// Explicit lifetimes are clearer in unsafe/allocator code even when elidable
#![allow(clippy::elidable_lifetime_names)]
// Pointer alignment casts in the pool free list are intentional and checked
#![allow(clippy::cast_ptr_alignment)]

pub mod allocator;
pub mod error;
pub mod resource;
pub mod utils;
pub mod vec;

pub use crate::error::{AllocError, AllocResult};

pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::allocator::{Allocator, PolyAllocator, SystemAllocator};
    pub use crate::error::{AllocError, AllocResult};
    pub use crate::resource::{
        system, ArenaResource, MemoryResource, PoolResource, SharedResource, SystemResource,
        TrackedResource,
    };
    pub use crate::vec::AllocVec;
}
