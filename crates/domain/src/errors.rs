//! Error types used throughout the client

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Main error type for REST client operations
///
/// Every variant is terminal for the operation that raised it: nothing in
/// the client retries or salvages partial results after one of these.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum RestError {
    /// The remote side answered with a non-empty `error` field.
    #[error("Remote call `{method}` failed: {message}")]
    RemoteCall { method: String, message: String, envelope: Value },

    /// Caller-supplied filter or order collides with a field the algorithm
    /// manages itself. Raised before any network call.
    #[error("Usage conflict: {0}")]
    UsageConflict(String),

    #[error("Cursor on `{method}` did not advance: boundary {current} after {previous}")]
    CursorStall { method: String, previous: i64, current: i64 },

    #[error("Cursor on `{method}` unavailable: page carries no positive `{field}` values")]
    CursorUnavailable { method: String, field: String },

    #[error("Paging `{method}` exceeded the iteration limit of {limit}")]
    IterationLimitExceeded { method: String, limit: usize },

    /// One chunk of a batch reported per-command errors.
    #[error("Batch chunk {chunk} failed for commands [{}]", .failed_keys.join(", "))]
    BatchChunkFailure { chunk: usize, failed_keys: Vec<String>, envelope: Value },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RestError {
    /// Raw envelope attached to remote and batch failures.
    pub fn envelope(&self) -> Option<&Value> {
        match self {
            Self::RemoteCall { envelope, .. } | Self::BatchChunkFailure { envelope, .. } => {
                Some(envelope)
            }
            _ => None,
        }
    }

    /// Whether the error was raised by a local precondition check.
    pub fn is_usage_conflict(&self) -> bool {
        matches!(self, Self::UsageConflict(_))
    }
}

/// Result type alias for REST client operations
pub type Result<T> = std::result::Result<T, RestError>;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn batch_failure_lists_failed_keys() {
        let err = RestError::BatchChunkFailure {
            chunk: 2,
            failed_keys: vec!["add_51".into(), "add_57".into()],
            envelope: json!({}),
        };
        assert_eq!(err.to_string(), "Batch chunk 2 failed for commands [add_51, add_57]");
    }

    #[test]
    fn envelope_is_exposed_for_remote_failures() {
        let envelope = json!({"error": "ACCESS_DENIED"});
        let err = RestError::RemoteCall {
            method: "crm.item.list".into(),
            message: "ACCESS_DENIED".into(),
            envelope: envelope.clone(),
        };
        assert_eq!(err.envelope(), Some(&envelope));
        assert!(RestError::UsageConflict("x".into()).envelope().is_none());
    }

    #[test]
    fn serializes_with_type_tag() {
        let err = RestError::IterationLimitExceeded { method: "tasks.task.list".into(), limit: 3 };
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["type"], "IterationLimitExceeded");
        assert_eq!(value["detail"]["limit"], 3);

        let back: RestError = serde_json::from_value(value).unwrap();
        assert_eq!(back, err);
    }
}
