//! Session events and actions.

use std::fmt;

use taxi_proto::{
    BookingId, CancelBookingReply, CancelBookingRequest, CreateBookingReply, CreateBookingRequest,
    JoinParams, PushEvent,
};

use crate::{
    error::CommandFailure,
    session::{BookingState, SubscriptionState},
};

/// Session-local sequence number identifying an issued command.
///
/// Replies carry the ref of the command they answer so the session can match
/// each one to the command it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommandRef(pub u64);

impl fmt::Display for CommandRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Events the caller feeds into the session.
///
/// The caller is responsible for:
/// - Forwarding user intents (edit, submit, cancel)
/// - Executing commands and feeding their replies back
/// - Forwarding push channel events
/// - Ending the session when its owning scope goes away
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Session mounted. Requests the push subscription.
    Start,

    /// Rider edited the pickup address.
    EditPickup {
        /// New draft value.
        address: String,
    },

    /// Rider edited the dropoff address.
    EditDropoff {
        /// New draft value.
        address: String,
    },

    /// Rider wants to book a ride with the current drafts.
    Submit,

    /// Rider wants to cancel the active booking.
    Cancel,

    /// Reply to a command issued by this session.
    Reply(CommandReply),

    /// Event from the push channel.
    Channel(ChannelEvent),

    /// Owning scope ended. Releases the subscription.
    End,
}

/// Completion of a command the session asked the caller to execute.
#[derive(Debug, Clone)]
pub enum CommandReply {
    /// Create command finished.
    Created {
        /// Ref from [`SessionAction::CreateBooking`].
        command_ref: CommandRef,
        /// Decoded reply or failure.
        result: Result<CreateBookingReply, CommandFailure>,
    },

    /// Cancel command finished.
    Cancelled {
        /// Ref from [`SessionAction::CancelBooking`].
        command_ref: CommandRef,
        /// Decoded reply or failure.
        result: Result<CancelBookingReply, CommandFailure>,
    },
}

impl CommandReply {
    /// Ref of the command this reply answers.
    pub fn command_ref(&self) -> CommandRef {
        match self {
            Self::Created { command_ref, .. } | Self::Cancelled { command_ref, .. } => *command_ref,
        }
    }
}

/// Push channel lifecycle and broadcasts.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// Topic join acknowledged.
    Joined,

    /// Topic join refused, the socket could not connect, or a joined
    /// connection was lost.
    JoinFailed {
        /// Failure description.
        reason: String,
    },

    /// Broadcast on the rider topic.
    Push(PushEvent),

    /// Channel closed for good.
    Closed,
}

/// Severity of a [`SessionAction::Log`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug information
    Debug,
    /// Informational message
    Info,
    /// Warning
    Warn,
    /// Error
    Error,
}

/// Observable session state for presenters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingSnapshot {
    /// Rider identity.
    pub username: String,
    /// `Idle` or `Active`.
    pub state: BookingState,
    /// Active booking, if any.
    pub booking_id: Option<BookingId>,
    /// Pickup draft.
    pub pickup_address: String,
    /// Dropoff draft.
    pub dropoff_address: String,
    /// Message from the latest command reply. Cleared when a command is
    /// issued.
    pub status_message: String,
    /// Message from the latest push event.
    pub notification_message: String,
    /// Push subscription state.
    pub subscription: SubscriptionState,
    /// A create command is awaiting its reply.
    pub submitting: bool,
    /// A cancel command is awaiting its reply.
    pub cancelling: bool,
}

/// Actions the session produces for the caller to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// Open the push subscription.
    Subscribe {
        /// Rider topic.
        topic: String,
        /// Join parameters.
        params: JoinParams,
    },

    /// Release the push subscription.
    Unsubscribe {
        /// Rider topic.
        topic: String,
    },

    /// Issue a create command.
    CreateBooking {
        /// Ref to echo in [`CommandReply::Created`].
        command_ref: CommandRef,
        /// Request body.
        request: CreateBookingRequest,
    },

    /// Issue a cancel command.
    CancelBooking {
        /// Ref to echo in [`CommandReply::Cancelled`].
        command_ref: CommandRef,
        /// Booking to cancel.
        id: BookingId,
        /// Request body.
        request: CancelBookingRequest,
    },

    /// Observable state changed.
    Changed(BookingSnapshot),

    /// Log message for debugging.
    Log {
        /// Severity.
        level: LogLevel,
        /// Log message.
        message: String,
    },
}
