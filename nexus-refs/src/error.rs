//! Error types for slot allocation.

use core::fmt;

use thiserror::Error;

/// Reason a slot could not be acquired.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RefError {
    /// Every identifier below `NIL` has been handed out at least once and the
    /// free list is empty.
    #[error("slot identifiers exhausted (max allocated {max})")]
    Exhausted {
        /// Highest identifier ever allocated.
        max: usize,
    },
    /// The backing table could not grow.
    #[error("memory allocation failed")]
    AllocationFailed,
}

/// A failed insertion. Carries the value back so the caller can retry or
/// dispose of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected<T> {
    /// The value that could not be stored.
    pub value: T,
    /// Why it was rejected.
    pub error: RefError,
}

impl<T> Rejected<T> {
    /// Pairs a value with the reason it was turned away.
    #[inline]
    pub const fn new(value: T, error: RefError) -> Self {
        Self { value, error }
    }

    /// Returns the value that could not be stored.
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Rewraps the carried value, keeping the error.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Rejected<U> {
        Rejected {
            value: f(self.value),
            error: self.error,
        }
    }
}

impl<T> fmt::Display for Rejected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "value rejected: {}", self.error)
    }
}

impl<T: fmt::Debug> std::error::Error for Rejected<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
