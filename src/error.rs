//! Error types for allocation failures
//!
//! Every fallible operation in this crate returns [`AllocResult`]. The
//! variants carry the numbers a caller needs to log or react: the size and
//! alignment that could not be satisfied, the capacity that ran out. No
//! variant allocates, so reporting a failure never triggers another one.

use core::alloc::Layout;

use thiserror::Error;

/// Result alias used throughout the crate
pub type AllocResult<T> = Result<T, AllocError>;

/// Allocation failures surfaced to callers
///
/// Exhaustion of a bounded resource (pool, arena) is classified as an
/// allocation failure alongside true out-of-memory, see
/// [`is_out_of_memory`](AllocError::is_out_of_memory). Misuse of an
/// allocator's shape constraints gets distinct variants so callers can tell
/// "resource is full" from "this resource can never satisfy that request".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[must_use]
#[non_exhaustive]
pub enum AllocError {
    /// The backing facility could not provide the requested memory
    #[error("out of memory: failed to allocate {size} bytes (align {align})")]
    OutOfMemory { size: usize, align: usize },

    /// A fixed-capacity pool has no free blocks
    #[error("pool exhausted: all {capacity} blocks of {block_size} bytes in use")]
    PoolExhausted { capacity: usize, block_size: usize },

    /// An arena does not have `requested` contiguous bytes left
    #[error("arena exhausted: requested {requested} bytes, {available} available")]
    ArenaExhausted { requested: usize, available: usize },

    /// The resource cannot produce the requested alignment
    #[error("unsupported alignment {align}: this resource guarantees at most {max_align}")]
    AlignmentUnsupported { align: usize, max_align: usize },

    /// `count * elem_size` does not fit in `usize`
    #[error("size overflow computing layout for {count} elements of {elem_size} bytes")]
    SizeOverflow { count: usize, elem_size: usize },

    /// A layout was rejected before reaching the backing facility
    #[error("invalid layout: {reason}")]
    InvalidLayout { reason: &'static str },
}

impl AllocError {
    /// Creates an out-of-memory error for a raw size/align pair
    pub fn out_of_memory(size: usize, align: usize) -> Self {
        #[cfg(feature = "logging")]
        tracing::error!(size, align, "allocation failed: out of memory");
        Self::OutOfMemory { size, align }
    }

    /// Creates an out-of-memory error from the failed layout
    pub fn out_of_memory_with_layout(layout: Layout) -> Self {
        Self::out_of_memory(layout.size(), layout.align())
    }

    /// Creates a pool-exhausted error
    pub fn pool_exhausted(capacity: usize, block_size: usize) -> Self {
        #[cfg(feature = "logging")]
        tracing::warn!(capacity, block_size, "pool exhausted");
        Self::PoolExhausted {
            capacity,
            block_size,
        }
    }

    /// Creates an arena-exhausted error
    pub fn arena_exhausted(requested: usize, available: usize) -> Self {
        #[cfg(feature = "logging")]
        tracing::warn!(requested, available, "arena exhausted");
        Self::ArenaExhausted {
            requested,
            available,
        }
    }

    /// Creates an unsupported-alignment error
    pub fn alignment_unsupported(align: usize, max_align: usize) -> Self {
        Self::AlignmentUnsupported { align, max_align }
    }

    /// Creates a size-overflow error
    pub fn size_overflow(count: usize, elem_size: usize) -> Self {
        Self::SizeOverflow { count, elem_size }
    }

    /// Creates an invalid-layout error
    pub fn invalid_layout(reason: &'static str) -> Self {
        Self::InvalidLayout { reason }
    }

    /// True when the request was well-formed but memory ran out
    ///
    /// Covers the general facility as well as bounded resources reporting
    /// exhaustion. Shape violations (alignment, overflow) are excluded:
    /// retrying those cannot succeed.
    pub fn is_out_of_memory(&self) -> bool {
        matches!(
            self,
            Self::OutOfMemory { .. } | Self::PoolExhausted { .. } | Self::ArenaExhausted { .. }
        )
    }

    /// True when the failure is an alignment constraint
    pub fn is_alignment_unsupported(&self) -> bool {
        matches!(self, Self::AlignmentUnsupported { .. })
    }

    /// Stable machine-readable code for logs and metrics
    pub fn code(&self) -> &'static str {
        match self {
            Self::OutOfMemory { .. } => "ALLOC:OOM",
            Self::PoolExhausted { .. } => "ALLOC:POOL_EXHAUSTED",
            Self::ArenaExhausted { .. } => "ALLOC:ARENA_EXHAUSTED",
            Self::AlignmentUnsupported { .. } => "ALLOC:BAD_ALIGN",
            Self::SizeOverflow { .. } => "ALLOC:SIZE_OVERFLOW",
            Self::InvalidLayout { .. } => "ALLOC:BAD_LAYOUT",
        }
    }
}
