//! Outgoing I/O requests.

use taxi_client::CommandRef;
use taxi_proto::{BookingId, CancelBookingRequest, CreateBookingRequest, JoinParams};

/// Work the [`crate::Driver`] performs on behalf of the session.
///
/// Booking commands must be answered with a [`taxi_client::CommandReply`]
/// carrying the same `command_ref`. Subscriptions report through
/// [`taxi_client::ChannelEvent`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `POST /api/bookings`.
    CreateBooking {
        /// Ref to echo in the reply.
        command_ref: CommandRef,
        /// Request body.
        request: CreateBookingRequest,
    },

    /// `POST /api/bookings/{id}`.
    CancelBooking {
        /// Ref to echo in the reply.
        command_ref: CommandRef,
        /// Booking to cancel.
        id: BookingId,
        /// Request body.
        request: CancelBookingRequest,
    },

    /// Join the rider topic.
    Subscribe {
        /// Rider topic.
        topic: String,
        /// Join parameters.
        params: JoinParams,
    },

    /// Leave the rider topic.
    Unsubscribe {
        /// Rider topic.
        topic: String,
    },
}
