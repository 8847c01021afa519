//! Rider push events.
//!
//! Broadcasts on `customer:{username}` are decoded into [`PushEvent`]. Only
//! `booking_request` carries data the session acts on; `greetings` is
//! informational and anything else is kept for logging.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{channel::ChannelMessage, errors::Result};

/// Greeting broadcast sent after joining.
pub const GREETINGS: &str = "greetings";
/// Booking progress broadcast.
pub const BOOKING_REQUEST: &str = "booking_request";

/// Payload of a `booking_request` broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Human-readable notification.
    pub msg: String,
}

/// Typed push event.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    /// Opaque greeting payload.
    Greetings(Value),
    /// Booking progress notification.
    BookingRequest(BookingRequest),
    /// Any other broadcast.
    Other {
        /// Event name.
        event: String,
        /// Raw payload.
        payload: Value,
    },
}

impl PushEvent {
    /// Decode a broadcast frame.
    ///
    /// Fails only when a known event carries a payload of the wrong shape.
    pub fn from_message(message: &ChannelMessage) -> Result<Self> {
        match message.event.as_str() {
            GREETINGS => Ok(Self::Greetings(message.payload.clone())),
            BOOKING_REQUEST => {
                Ok(Self::BookingRequest(serde_json::from_value(message.payload.clone())?))
            },
            other => Ok(Self::Other { event: other.to_owned(), payload: message.payload.clone() }),
        }
    }

    /// Event name on the wire.
    pub fn event_name(&self) -> &str {
        match self {
            Self::Greetings(_) => GREETINGS,
            Self::BookingRequest(_) => BOOKING_REQUEST,
            Self::Other { event, .. } => event,
        }
    }
}
