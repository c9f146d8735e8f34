//! Allocator error types.

use core::fmt;

use crate::{checker::HeapCheckError, HeapPtr};

/// Errors that can occur during allocator operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The arena could not grow enough to satisfy a request.
    OutOfMemory {
        /// Number of bytes the arena was asked to grow by.
        requested: usize,
    },
    /// An allocation of zero bytes was requested.
    ZeroSize,
    /// A pointer was freed whose block is not a live allocated block, for
    /// example because it was already freed.
    InvalidFree {
        /// The rejected pointer.
        ptr: HeapPtr,
    },
    /// A pointer that does not refer to a live allocated block was passed to
    /// an operation other than free.
    InvalidPointer {
        /// The rejected pointer.
        ptr: HeapPtr,
    },
    /// The allocator was used before `init` was called.
    Uninitialized,
    /// `init` was called on an allocator that was already initialized.
    AlreadyInitialized,
    /// The allocator configuration was rejected.
    InvalidConfig {
        /// The rejected chunk size.
        chunk_size: usize,
    },
    /// The heap consistency checker found a violation.
    Consistency(HeapCheckError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory { requested } => {
                write!(f, "out of memory: the arena could not grow by {requested} bytes")
            }
            Self::ZeroSize => write!(f, "zero sized allocation"),
            Self::InvalidFree { ptr } => {
                write!(f, "invalid free of {ptr}: not a live allocated block")
            }
            Self::InvalidPointer { ptr } => {
                write!(f, "invalid pointer {ptr}: not a live allocated block")
            }
            Self::Uninitialized => write!(f, "the heap was not initialized"),
            Self::AlreadyInitialized => write!(f, "the heap was already initialized"),
            Self::InvalidConfig { chunk_size } => write!(
                f,
                "invalid chunk size {chunk_size}: must be a multiple of 16 and at least 32"
            ),
            Self::Consistency(err) => write!(f, "{err}"),
        }
    }
}

impl From<HeapCheckError> for Error {
    fn from(err: HeapCheckError) -> Self {
        Self::Consistency(err)
    }
}

#[cfg(test)]
impl std::error::Error for Error {}
