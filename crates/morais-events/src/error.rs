//! Error types for dispatcher and listener failures.

use std::any::Any;

use thiserror::Error;

/// Errors returned by dispatcher operations and helpers.
#[derive(Debug, Error)]
pub enum EventError {
    /// A subscription was rejected while the dispatcher runs in strict mode.
    #[error("Invalid listener for event '{event}': {reason}")]
    InvalidListener {
        /// Event name passed to `on`/`once`.
        event: String,
        /// Why the registration was rejected.
        reason: String,
    },

    /// `wait_for_event` did not observe the event before its deadline.
    #[error("Timed out after {timeout_ms}ms waiting for event '{event}'")]
    Timeout {
        /// Event that was awaited.
        event: String,
        /// Deadline in milliseconds.
        timeout_ms: u64,
    },

    /// The pending wait was dropped by the dispatcher before the event fired.
    #[error("Wait for event '{event}' was cancelled")]
    Cancelled {
        /// Event that was awaited.
        event: String,
    },

    /// A helper that schedules timers was created outside a Tokio runtime.
    #[error("No Tokio runtime available")]
    NoRuntime,

    /// The shared dispatcher slot was already filled.
    #[error("Shared dispatcher already installed")]
    SharedAlreadyInstalled,
}

/// Result type for dispatcher operations.
pub type EventResult<T> = Result<T, EventError>;

/// Failure reported by a single listener invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenerError {
    /// The listener returned an error.
    #[error("{0}")]
    Failed(String),

    /// The listener could not decode the event payload.
    #[error("Invalid event payload: {0}")]
    Payload(String),

    /// The listener panicked.
    #[error("Listener panicked: {0}")]
    Panicked(String),

    /// An async listener was reached by `emit` with no runtime to spawn on.
    #[error("Async listener requires a Tokio runtime")]
    NoRuntime,
}

impl ListenerError {
    /// Create a [`ListenerError::Failed`] from any message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    pub(crate) fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_owned()
        };
        Self::Panicked(message)
    }
}

impl From<serde_json::Error> for ListenerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Payload(err.to_string())
    }
}

/// Result type returned by listeners.
pub type ListenerResult = Result<(), ListenerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_payload_str() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(
            ListenerError::from_panic(payload.as_ref()),
            ListenerError::Panicked("boom".to_owned())
        );
    }

    #[test]
    fn test_panic_payload_string() {
        let payload: Box<dyn Any + Send> = Box::new(String::from("kaboom"));
        assert_eq!(
            ListenerError::from_panic(payload.as_ref()),
            ListenerError::Panicked("kaboom".to_owned())
        );
    }

    #[test]
    fn test_panic_payload_other() {
        let payload: Box<dyn Any + Send> = Box::new(7_u32);
        assert!(matches!(
            ListenerError::from_panic(payload.as_ref()),
            ListenerError::Panicked(_)
        ));
    }

    #[test]
    fn test_serde_error_converts_to_payload() {
        let err = serde_json::from_str::<u32>("\"nope\"").unwrap_err();
        assert!(matches!(ListenerError::from(err), ListenerError::Payload(_)));
    }

    #[test]
    fn test_display() {
        let err = EventError::Timeout {
            event: "ready".to_owned(),
            timeout_ms: 50,
        };
        assert_eq!(
            err.to_string(),
            "Timed out after 50ms waiting for event 'ready'"
        );
        assert_eq!(ListenerError::msg("bad").to_string(), "bad");
    }
}
