//! Allocator abstractions bound by containers
//!
//! Two ways to parameterize a container over memory:
//! - [`Allocator<T>`]: the static, compile-time concept; one container
//!   type per allocator type, zero runtime cost. Default implementation:
//!   [`SystemAllocator`].
//! - [`PolyAllocator`]: one container type compiled once, pointed at a
//!   runtime-selected [`MemoryResource`](crate::resource::MemoryResource)
//!   through a stored reference.
//!
//! Containers are written generically against the same four-operation
//! contract and work identically under both regimes.

mod poly;
mod system;
mod traits;

pub use poly::PolyAllocator;
pub use system::SystemAllocator;
pub use traits::Allocator;

pub use crate::error::{AllocError, AllocResult};
