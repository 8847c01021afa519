//! Protocol error types.

use thiserror::Error;

/// Result alias for protocol decoding.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while encoding or validating wire data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Body was not valid JSON or did not match the expected schema.
    #[error("invalid JSON: {0}")]
    Json(String),

    /// Channel frame did not have the `[join_ref, ref, topic, event, payload]`
    /// shape.
    #[error("malformed channel frame: {0}")]
    MalformedFrame(String),

    /// Event arrived with a payload for a different event kind.
    #[error("unexpected event {event:?}, expected {expected}")]
    UnexpectedEvent {
        /// Event name that was received.
        event: String,
        /// Event kind the caller asked for.
        expected: &'static str,
    },
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
