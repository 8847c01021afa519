//! Session and command errors.

use taxi_proto::ProtocolError;
use thiserror::Error;

/// Errors from misuse of the session API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// `Start` was sent twice.
    #[error("session already started")]
    AlreadyStarted,

    /// A command was issued before `Start`.
    #[error("session not started")]
    NotStarted,
}

/// Why a booking command did not produce a reply.
///
/// Carried inside [`crate::SessionEvent`] so it must stay cheap to clone.
/// Kept distinct from a declined booking, which is a successful reply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandFailure {
    /// Request never completed (connect, timeout, reset).
    #[error("transport failure: {0}")]
    Transport(String),

    /// Backend answered with a non-success status.
    #[error("backend returned status {code}: {body}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// Reply body did not match the expected schema.
    #[error("malformed reply: {0}")]
    Protocol(String),
}

impl From<ProtocolError> for CommandFailure {
    fn from(err: ProtocolError) -> Self {
        Self::Protocol(err.to_string())
    }
}
