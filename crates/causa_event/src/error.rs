//! Dispatch errors.

/// Result type for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Errors raised by event managers and their configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// A subscriber rejected an event
    #[error("Subscriber {subscriber} failed on {event}: {message}")]
    Subscriber {
        /// Event type name
        event: &'static str,
        /// Subscriber name
        subscriber: String,
        /// Failure reported by the subscriber
        message: String,
    },

    /// Subscriber limit reached for an event type
    #[error("Too many subscribers for {event}: limit {limit}")]
    TooManySubscribers {
        /// Event type name
        event: &'static str,
        /// Configured limit
        limit: usize,
    },

    /// A global event manager is already installed
    #[error("Event manager already installed")]
    AlreadyInstalled,

    /// Invalid configuration
    #[error("Invalid bus configuration: {reason}")]
    Config {
        /// What is wrong
        reason: String,
    },
}

impl DispatchError {
    /// Shorthand for [`DispatchError::Config`]
    #[must_use]
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}
