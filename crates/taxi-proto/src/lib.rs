//! Taxi booking wire protocol
//!
//! Typed schemas for everything the rider client exchanges with the booking
//! backend. Nothing in this crate performs I/O; it only defines shapes and
//! validates them at the boundary so the session state machine never touches
//! unchecked JSON.
//!
//! # Channels
//!
//! - Request/response: JSON bodies posted to `/api/bookings` ([`booking`])
//! - Push: Phoenix channel frames over a WebSocket ([`channel`]), carrying
//!   rider-scoped events ([`push`])

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod booking;
pub mod channel;
pub mod errors;
pub mod push;

pub use booking::{
    BOOKINGS_SEGMENTS, BookingCommand, BookingId, CancelBookingReply, CancelBookingRequest,
    CreateBookingReply, CreateBookingRequest,
};
pub use channel::{ChannelMessage, JoinParams, Reply, ReplyStatus, customer_topic};
pub use errors::{ProtocolError, Result};
pub use push::{BookingRequest, PushEvent};
