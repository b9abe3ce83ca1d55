//! Error types shared by the navigation subsystems.

use std::any::Any;

use thiserror::Error;

/// Failure reported by a routed component's lifecycle hook.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ComponentError(pub String);

impl ComponentError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors that can occur while navigating.
#[derive(Debug, Error)]
pub enum RouterError {
    /// `activate` called twice.
    #[error("{0} has already been activated")]
    AlreadyActivated(&'static str),

    /// Operation requires an active instance.
    #[error("{0} has not been activated")]
    NotActivated(&'static str),

    /// `go(movement)` would leave the recorded history.
    #[error("history movement {movement} from index {from} is out of range (0..{len})")]
    HistoryOutOfRange { from: usize, movement: isize, len: usize },

    /// No navigation has been committed yet.
    #[error("no current navigation entry")]
    NoCurrentEntry,

    /// Reconciliation did not settle. Signals a circular viewport instruction
    /// dependency (e.g. guards redirecting to each other).
    #[error("viewport reconciliation did not settle within {0} iterations")]
    GuardExhausted(usize),

    /// An instruction named a component that was never registered.
    #[error("unknown component '{0}'")]
    UnknownComponent(String),

    /// A lifecycle hook did not settle in time.
    #[error("{hook} on viewport '{viewport}' timed out after {timeout_ms} ms")]
    GuardTimeout {
        viewport: String,
        hook: &'static str,
        timeout_ms: u64,
    },

    /// A lifecycle hook failed.
    #[error("{hook} on viewport '{viewport}' failed: {source}")]
    Hook {
        viewport: String,
        hook: &'static str,
        #[source]
        source: ComponentError,
    },

    /// The history store rejected an operation.
    #[error("history store error: {0}")]
    Store(String),

    /// The request was removed from the queue before it was processed.
    #[error("navigation was dropped before it was processed")]
    Dropped,

    /// The instruction could not be parsed.
    #[error("invalid instruction '{0}'")]
    InvalidInstruction(String),

    /// Processing a request panicked.
    #[error("navigation panicked: {0}")]
    Panicked(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RouterError {
    /// Wrap the payload caught from a panicking task.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(message) => *message,
            Err(payload) => payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown panic".to_string()),
        };
        Self::Panicked(message)
    }
}

/// Result type for navigation operations.
pub type RouterResult<T> = Result<T, RouterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RouterError::GuardExhausted(100);
        assert_eq!(
            err.to_string(),
            "viewport reconciliation did not settle within 100 iterations"
        );

        let err = RouterError::HistoryOutOfRange {
            from: 2,
            movement: 1,
            len: 3,
        };
        assert!(err.to_string().contains("out of range"));

        let err = RouterError::Hook {
            viewport: "main".into(),
            hook: "canEnter",
            source: ComponentError::new("boom"),
        };
        assert_eq!(err.to_string(), "canEnter on viewport 'main' failed: boom");
    }

    #[test]
    fn test_panic_payload_becomes_message() {
        let err = RouterError::from_panic(Box::new("static message"));
        assert!(matches!(&err, RouterError::Panicked(m) if m == "static message"));

        let err = RouterError::from_panic(Box::new(format!("formatted {}", 7)));
        assert_eq!(err.to_string(), "navigation panicked: formatted 7");

        let err = RouterError::from_panic(Box::new(42u8));
        assert!(matches!(&err, RouterError::Panicked(m) if m == "unknown panic"));
    }
}
