//! Queue error types.

use nexus_refs::RefError;
use thiserror::Error;

/// Errors reported by queue accessors and construction.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// Index outside `[0, len)`.
    #[error("index {index} out of range for queue of length {len}")]
    OutOfRange {
        /// Requested index, as the caller passed it.
        index: i64,
        /// Queue length at the time of the call.
        len: usize,
    },
    /// Slot allocation or buffer growth failed.
    #[error(transparent)]
    Ref(#[from] RefError),
}

impl QueueError {
    #[inline]
    pub(crate) fn out_of_range(index: usize, len: usize) -> Self {
        QueueError::OutOfRange {
            index: i64::try_from(index).unwrap_or(i64::MAX),
            len,
        }
    }
}
