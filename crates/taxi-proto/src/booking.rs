//! Booking request/response bodies.
//!
//! Both commands are `POST`s with a JSON body. The backend identifies bookings
//! with whatever its store hands out (integers in practice), so [`BookingId`]
//! keeps the original JSON representation and echoes it back unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Path segments of the booking collection, relative to the API base.
///
/// An existing booking is the collection followed by its id as one more
/// segment.
pub const BOOKINGS_SEGMENTS: [&str; 2] = ["api", "bookings"];

/// Backend-assigned booking identifier.
///
/// Opaque to the client. Serializes back to exactly the JSON it was decoded
/// from so the cancel body matches what the backend issued.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BookingId {
    /// Numeric identifier.
    Number(u64),
    /// String identifier.
    Text(String),
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for BookingId {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for BookingId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Body of `POST /api/bookings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    /// Free-text pickup address.
    pub pickup_address: String,
    /// Free-text dropoff address.
    pub dropoff_address: String,
    /// Rider identity.
    pub username: String,
}

/// Reply to a create command.
///
/// A reply without `id` is a booking the backend declined; `msg` explains why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBookingReply {
    /// Identifier of the accepted booking. `None` if the backend declined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BookingId>,
    /// Human-readable outcome.
    pub msg: String,
}

impl CreateBookingReply {
    /// Decode and validate a reply body.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }
}

/// Command verb carried in the booking resource body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingCommand {
    /// Cancel the booking.
    Cancel,
}

/// Body of `POST /api/bookings/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelBookingRequest {
    /// Always [`BookingCommand::Cancel`].
    pub action: BookingCommand,
    /// Rider identity.
    pub username: String,
    /// Booking being cancelled.
    pub id: BookingId,
}

impl CancelBookingRequest {
    /// Cancel body for `id` on behalf of `username`.
    pub fn new(username: impl Into<String>, id: BookingId) -> Self {
        Self { action: BookingCommand::Cancel, username: username.into(), id }
    }
}

/// Reply to a cancel command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelBookingReply {
    /// Human-readable outcome.
    pub msg: String,
}

impl CancelBookingReply {
    /// Decode and validate a reply body.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn create_request_uses_snake_case_fields() {
        let req = CreateBookingRequest {
            pickup_address: "A".into(),
            dropoff_address: "B".into(),
            username: "u1".into(),
        };

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({"pickup_address": "A", "dropoff_address": "B", "username": "u1"}));
    }

    #[test]
    fn cancel_request_echoes_numeric_id() {
        let req = CancelBookingRequest::new("u1", BookingId::Number(42));

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({"action": "cancel", "username": "u1", "id": 42}));
    }

    #[test]
    fn booking_id_displays_as_path_segment() {
        assert_eq!(BookingId::Number(7).to_string(), "7");
        assert_eq!(BookingId::from("b-9").to_string(), "b-9");
    }

    #[test]
    fn create_reply_without_id_is_declined() {
        let reply = CreateBookingReply::from_json(br#"{"msg":"No taxis available"}"#).unwrap();
        assert_eq!(reply.id, None);
        assert_eq!(reply.msg, "No taxis available");
    }

    #[test]
    fn create_reply_missing_msg_is_rejected() {
        let err = CreateBookingReply::from_json(br#"{"id":42}"#).unwrap_err();
        assert!(matches!(err, crate::ProtocolError::Json(_)));
    }

    #[test]
    fn create_reply_keeps_string_ids() {
        let reply = CreateBookingReply::from_json(br#"{"id":"abc","msg":"ok"}"#).unwrap();
        assert_eq!(reply.id, Some(BookingId::Text("abc".into())));
    }
}
