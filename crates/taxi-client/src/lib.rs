//! Client
//!
//! Action-based booking session for the taxi rider client. Tracks the
//! lifecycle of a single booking and the rider's push subscription.
//!
//! # Architecture
//!
//! The session is Sans-IO. It receives events ([`SessionEvent`]), processes
//! them through pure state machine logic, and returns actions
//! ([`SessionAction`]) for the caller to execute. Command replies and push
//! events come back in as further events, in whatever order they arrive.
//!
//! # Components
//!
//! - [`BookingSession`]: Booking lifecycle state machine (`Idle` / `Active`)
//! - [`SessionEvent`]: Events fed into the session
//! - [`SessionAction`]: Actions produced by the session
//! - [`BookingSnapshot`]: Observable state for presenters
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::HttpBookingApi`]: create/cancel commands over HTTP
//! - [`transport::PushChannel`]: rider topic subscription over WebSocket

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod event;
mod session;

#[cfg(feature = "transport")]
pub mod transport;

pub use error::{CommandFailure, SessionError};
pub use event::{
    BookingSnapshot, ChannelEvent, CommandRef, CommandReply, LogLevel, SessionAction, SessionEvent,
};
pub use session::{
    Booking, BookingSession, BookingState, CANCEL_FAILED_MESSAGE, CREATE_FAILED_MESSAGE,
    RiderIdentity, SubscriptionState,
};
pub use taxi_proto::{BookingId, PushEvent};
