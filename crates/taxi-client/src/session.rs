//! Booking session state machine.
//!
//! The [`BookingSession`] owns the rider's booking and push subscription. A
//! booking is `Idle` until a create command is accepted, then `Active` until a
//! cancel completes. Push events only ever touch the notification message;
//! the booking id is authoritative through command replies alone.
//!
//! Commands may overlap. Every reply is applied in arrival order, so the last
//! response wins. A cancel only clears the booking it was issued for.

use std::collections::BTreeMap;

use taxi_proto::{
    BookingId, CancelBookingReply, CancelBookingRequest, CreateBookingReply, CreateBookingRequest,
    JoinParams, PushEvent, customer_topic,
};

use crate::{
    error::{CommandFailure, SessionError},
    event::{
        BookingSnapshot, ChannelEvent, CommandRef, CommandReply, LogLevel, SessionAction,
        SessionEvent,
    },
};

/// Status shown when a create command fails without a reply.
pub const CREATE_FAILED_MESSAGE: &str = "Error processing request";

/// Status shown when a cancel command fails without a reply.
pub const CANCEL_FAILED_MESSAGE: &str = "Error cancelling booking";

/// Rider identity.
///
/// Opaque username supplied when the session starts. Scopes the push topic and
/// is attached to every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiderIdentity {
    /// Username known to the backend.
    pub username: String,
}

impl RiderIdentity {
    /// Create a rider identity for `username`.
    pub fn new(username: impl Into<String>) -> Self {
        Self { username: username.into() }
    }

    /// Push topic scoped to this rider.
    pub fn topic(&self) -> String {
        customer_topic(&self.username)
    }
}

/// Booking lifecycle as seen by the rider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingState {
    /// No booking held.
    Idle,
    /// Backend accepted a booking and the session holds its id.
    Active,
}

/// Push subscription lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionState {
    /// Not requested yet.
    Unsubscribed,
    /// Subscribe requested, join not acknowledged.
    Joining,
    /// Receiving push events.
    Joined,
    /// Join refused. Booking state is unaffected.
    Failed {
        /// Failure description.
        reason: String,
    },
    /// Released or closed by the server.
    Closed,
}

/// The rider's booking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Booking {
    /// Backend-assigned id. `None` until a create succeeds.
    pub id: Option<BookingId>,
    /// Pickup draft.
    pub pickup_address: String,
    /// Dropoff draft.
    pub dropoff_address: String,
    /// Message from the latest command reply.
    pub status_message: String,
    /// Message from the latest push event.
    pub notification_message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    NotStarted,
    Running,
    Ended,
}

/// Command awaiting its reply.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    Create,
    Cancel {
        /// Booking the cancel was issued for.
        id: BookingId,
    },
}

/// Booking session for one rider.
///
/// Replies to issued commands are applied in arrival order. Replies to refs
/// the session never issued, or already answered, and anything arriving after
/// [`SessionEvent::End`] are dropped.
#[derive(Debug, Clone)]
pub struct BookingSession {
    /// Rider identity, fixed for the session.
    identity: RiderIdentity,

    /// Channel join token.
    join_token: String,

    /// Booking owned by this session.
    booking: Booking,

    /// Push subscription state.
    subscription: SubscriptionState,

    lifecycle: Lifecycle,

    /// Issued commands whose reply is still outstanding.
    pending: BTreeMap<CommandRef, Pending>,

    /// Next command ref to hand out.
    next_ref: u64,
}

impl BookingSession {
    /// Create a session for `identity` that joins its topic with `join_token`.
    pub fn new(identity: RiderIdentity, join_token: impl Into<String>) -> Self {
        Self {
            identity,
            join_token: join_token.into(),
            booking: Booking::default(),
            subscription: SubscriptionState::Unsubscribed,
            lifecycle: Lifecycle::NotStarted,
            pending: BTreeMap::new(),
            next_ref: 1,
        }
    }

    /// Seed the address drafts.
    #[must_use]
    pub fn with_drafts(mut self, pickup: impl Into<String>, dropoff: impl Into<String>) -> Self {
        self.booking.pickup_address = pickup.into();
        self.booking.dropoff_address = dropoff.into();
        self
    }

    /// Rider identity.
    pub fn identity(&self) -> &RiderIdentity {
        &self.identity
    }

    /// `Active` iff a booking id is held.
    pub fn state(&self) -> BookingState {
        if self.booking.id.is_some() { BookingState::Active } else { BookingState::Idle }
    }

    /// Current booking.
    pub fn booking(&self) -> &Booking {
        &self.booking
    }

    /// Push subscription state.
    pub fn subscription(&self) -> &SubscriptionState {
        &self.subscription
    }

    /// Whether [`SessionEvent::End`] has been processed.
    pub fn is_ended(&self) -> bool {
        self.lifecycle == Lifecycle::Ended
    }

    /// Observable state for presenters.
    pub fn snapshot(&self) -> BookingSnapshot {
        BookingSnapshot {
            username: self.identity.username.clone(),
            state: self.state(),
            booking_id: self.booking.id.clone(),
            pickup_address: self.booking.pickup_address.clone(),
            dropoff_address: self.booking.dropoff_address.clone(),
            status_message: self.booking.status_message.clone(),
            notification_message: self.booking.notification_message.clone(),
            subscription: self.subscription.clone(),
            submitting: self.is_submitting(),
            cancelling: self.pending.values().any(|p| matches!(p, Pending::Cancel { .. })),
        }
    }

    /// Process an event and return resulting actions.
    pub fn handle(&mut self, event: SessionEvent) -> Result<Vec<SessionAction>, SessionError> {
        if self.lifecycle == Lifecycle::Ended {
            return Ok(Vec::new());
        }

        match event {
            SessionEvent::Start => self.handle_start(),
            SessionEvent::EditPickup { address } => Ok(self.handle_edit(address, true)),
            SessionEvent::EditDropoff { address } => Ok(self.handle_edit(address, false)),
            SessionEvent::Submit => self.handle_submit(),
            SessionEvent::Cancel => self.handle_cancel(),
            SessionEvent::Reply(reply) => Ok(self.handle_reply(reply)),
            SessionEvent::Channel(event) => Ok(self.handle_channel(event)),
            SessionEvent::End => Ok(self.handle_end()),
        }
    }

    fn handle_start(&mut self) -> Result<Vec<SessionAction>, SessionError> {
        if self.lifecycle != Lifecycle::NotStarted {
            return Err(SessionError::AlreadyStarted);
        }

        self.lifecycle = Lifecycle::Running;
        self.subscription = SubscriptionState::Joining;

        let topic = self.identity.topic();
        Ok(vec![
            SessionAction::Log {
                level: LogLevel::Debug,
                message: format!("Subscribing to {topic}"),
            },
            SessionAction::Subscribe { topic, params: JoinParams::new(self.join_token.clone()) },
            self.changed(),
        ])
    }

    fn handle_edit(&mut self, address: String, pickup: bool) -> Vec<SessionAction> {
        // The submitted request must match what the rider sees until it
        // completes.
        if self.is_submitting() {
            return vec![SessionAction::Log {
                level: LogLevel::Debug,
                message: "Ignoring address edit while booking is being submitted".into(),
            }];
        }

        if pickup {
            self.booking.pickup_address = address;
        } else {
            self.booking.dropoff_address = address;
        }
        vec![self.changed()]
    }

    fn handle_submit(&mut self) -> Result<Vec<SessionAction>, SessionError> {
        self.ensure_running()?;

        self.booking.status_message.clear();
        let command_ref = self.issue(Pending::Create);

        let request = CreateBookingRequest {
            pickup_address: self.booking.pickup_address.clone(),
            dropoff_address: self.booking.dropoff_address.clone(),
            username: self.identity.username.clone(),
        };

        Ok(vec![SessionAction::CreateBooking { command_ref, request }, self.changed()])
    }

    fn handle_cancel(&mut self) -> Result<Vec<SessionAction>, SessionError> {
        self.ensure_running()?;

        let Some(id) = self.booking.id.clone() else {
            return Ok(Vec::new());
        };

        self.booking.status_message.clear();
        self.booking.notification_message.clear();
        let command_ref = self.issue(Pending::Cancel { id: id.clone() });

        let request = CancelBookingRequest::new(self.identity.username.clone(), id.clone());
        Ok(vec![SessionAction::CancelBooking { command_ref, id, request }, self.changed()])
    }

    fn handle_reply(&mut self, reply: CommandReply) -> Vec<SessionAction> {
        let command_ref = reply.command_ref();

        let mut actions = match (self.pending.remove(&command_ref), reply) {
            (Some(Pending::Create), CommandReply::Created { result, .. }) => {
                self.apply_created(result)
            },
            (Some(Pending::Cancel { id }), CommandReply::Cancelled { result, .. }) => {
                self.apply_cancelled(&id, result)
            },
            (entry, _) => {
                // Wrong reply kind for a live ref: keep waiting for the real one
                if let Some(pending) = entry {
                    self.pending.insert(command_ref, pending);
                }
                return vec![SessionAction::Log {
                    level: LogLevel::Debug,
                    message: format!("Dropping unexpected reply for command {command_ref}"),
                }];
            },
        };
        actions.push(self.changed());
        actions
    }

    fn apply_created(
        &mut self,
        result: Result<CreateBookingReply, CommandFailure>,
    ) -> Vec<SessionAction> {
        match result {
            Ok(CreateBookingReply { id: Some(id), msg }) => {
                let message = format!("Booking {id} accepted");
                self.booking.id = Some(id);
                self.booking.status_message = msg;
                vec![SessionAction::Log { level: LogLevel::Info, message }]
            },
            Ok(CreateBookingReply { id: None, msg }) => {
                let message = format!("Booking declined: {msg}");
                self.booking.status_message = msg;
                vec![SessionAction::Log { level: LogLevel::Info, message }]
            },
            Err(failure) => {
                self.booking.status_message = CREATE_FAILED_MESSAGE.to_owned();
                vec![SessionAction::Log {
                    level: LogLevel::Warn,
                    message: format!("Create booking failed: {failure}"),
                }]
            },
        }
    }

    fn apply_cancelled(
        &mut self,
        cancelled: &BookingId,
        result: Result<CancelBookingReply, CommandFailure>,
    ) -> Vec<SessionAction> {
        match result {
            Ok(CancelBookingReply { msg }) => {
                // A booking accepted after the cancel was issued stays active.
                let message = if self.booking.id.as_ref() == Some(cancelled) {
                    self.booking.id = None;
                    format!("Booking {cancelled} cancelled")
                } else {
                    format!("Booking {cancelled} cancelled, no longer the active booking")
                };
                self.booking.status_message = msg;
                self.booking.notification_message.clear();
                vec![SessionAction::Log { level: LogLevel::Info, message }]
            },
            Err(failure) => {
                self.booking.status_message = CANCEL_FAILED_MESSAGE.to_owned();
                vec![SessionAction::Log {
                    level: LogLevel::Warn,
                    message: format!("Cancel booking failed: {failure}"),
                }]
            },
        }
    }

    fn handle_channel(&mut self, event: ChannelEvent) -> Vec<SessionAction> {
        if self.lifecycle != Lifecycle::Running {
            return vec![SessionAction::Log {
                level: LogLevel::Debug,
                message: "Ignoring channel event before start".into(),
            }];
        }

        match event {
            ChannelEvent::Joined => {
                self.subscription = SubscriptionState::Joined;
                vec![
                    SessionAction::Log {
                        level: LogLevel::Info,
                        message: format!("Joined {}", self.identity.topic()),
                    },
                    self.changed(),
                ]
            },
            ChannelEvent::JoinFailed { reason } => {
                let message = format!("Unable to join {}: {reason}", self.identity.topic());
                self.subscription = SubscriptionState::Failed { reason };
                vec![SessionAction::Log { level: LogLevel::Error, message }, self.changed()]
            },
            ChannelEvent::Push(PushEvent::BookingRequest(request)) => {
                self.booking.notification_message = request.msg;
                vec![self.changed()]
            },
            ChannelEvent::Push(PushEvent::Greetings(payload)) => {
                vec![SessionAction::Log {
                    level: LogLevel::Info,
                    message: format!("Greetings: {payload}"),
                }]
            },
            ChannelEvent::Push(PushEvent::Other { event, .. }) => {
                vec![SessionAction::Log {
                    level: LogLevel::Debug,
                    message: format!("Unhandled push event {event}"),
                }]
            },
            ChannelEvent::Closed => {
                self.subscription = SubscriptionState::Closed;
                vec![
                    SessionAction::Log {
                        level: LogLevel::Warn,
                        message: format!("Channel {} closed", self.identity.topic()),
                    },
                    self.changed(),
                ]
            },
        }
    }

    fn handle_end(&mut self) -> Vec<SessionAction> {
        let was_subscribed = self.subscription != SubscriptionState::Unsubscribed;

        self.lifecycle = Lifecycle::Ended;
        self.pending.clear();
        self.subscription = SubscriptionState::Closed;

        if was_subscribed {
            vec![SessionAction::Unsubscribe { topic: self.identity.topic() }]
        } else {
            Vec::new()
        }
    }

    fn ensure_running(&self) -> Result<(), SessionError> {
        match self.lifecycle {
            Lifecycle::Running => Ok(()),
            Lifecycle::NotStarted | Lifecycle::Ended => Err(SessionError::NotStarted),
        }
    }

    fn is_submitting(&self) -> bool {
        self.pending.values().any(|p| *p == Pending::Create)
    }

    /// Allocate a command ref and record it as awaiting a reply.
    fn issue(&mut self, pending: Pending) -> CommandRef {
        let command_ref = CommandRef(self.next_ref);
        self.next_ref = self.next_ref.wrapping_add(1);
        self.pending.insert(command_ref, pending);
        command_ref
    }

    fn changed(&self) -> SessionAction {
        SessionAction::Changed(self.snapshot())
    }
}
