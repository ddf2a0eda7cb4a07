//! Core error types for CAUSA.
//!
//! Every variant is a precondition violation detected at the call that
//! introduced the bad value. Queries that find nothing return `None` or an
//! empty `Vec` instead of an error.

/// Core result type
pub type CauseResult<T> = Result<T, CauseError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CauseError {
    /// A required element or argument was absent
    #[error("Null argument: {argument} cannot be absent")]
    NullArgument {
        /// Name of the missing argument
        argument: &'static str,
    },

    /// Operation is not valid in the current state
    #[error("Invalid state: {reason}")]
    InvalidState {
        /// Why the state is invalid
        reason: String,
    },

    /// Insertion position outside `[0, len]`
    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// Requested position
        index: usize,
        /// Length at the time of the call
        len: usize,
    },
}

impl CauseError {
    /// Shorthand for [`CauseError::NullArgument`]
    #[must_use]
    pub const fn null(argument: &'static str) -> Self {
        Self::NullArgument { argument }
    }

    /// Shorthand for [`CauseError::InvalidState`]
    #[must_use]
    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }

    /// Returned whenever a chain would be created with no elements
    #[must_use]
    pub fn empty_chain() -> Self {
        Self::invalid_state("Cannot create an empty cause chain")
    }
}
