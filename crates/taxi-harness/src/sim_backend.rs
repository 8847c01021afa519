//! Scripted booking backend.
//!
//! Answers [`Command`]s the way the real HTTP API and push channel would,
//! recording every request so tests can assert on what went over the wire.
//! Unscripted creates are accepted with increasing ids; unscripted cancels
//! succeed.

use std::collections::VecDeque;

use taxi_app::Command;
use taxi_client::{ChannelEvent, CommandFailure, CommandReply};
use taxi_proto::{
    BookingId, CancelBookingReply, CancelBookingRequest, CreateBookingReply, CreateBookingRequest,
};

/// Message of an unscripted accepted create.
pub const DEFAULT_CREATE_MESSAGE: &str = "Booking confirmed";

/// Message of an unscripted cancel.
pub const DEFAULT_CANCEL_MESSAGE: &str = "Booking cancelled";

/// What a subscribe command produces.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JoinBehavior {
    /// Join acknowledged.
    #[default]
    Accept,
    /// Join refused with a reason.
    Refuse(String),
    /// No answer at all.
    Silent,
}

/// Outcome of executing one command.
#[derive(Debug, Clone)]
pub enum SimResponse {
    /// Completion of a booking command.
    Reply(CommandReply),
    /// Channel event caused by a subscription change.
    Channel(ChannelEvent),
    /// Nothing to report.
    None,
}

/// In-memory booking backend.
#[derive(Debug, Default)]
pub struct SimBackend {
    create_script: VecDeque<Result<CreateBookingReply, CommandFailure>>,
    cancel_script: VecDeque<Result<CancelBookingReply, CommandFailure>>,
    join: JoinBehavior,
    last_id: u64,
    created: Vec<CreateBookingRequest>,
    cancelled: Vec<CancelBookingRequest>,
    subscribed: Vec<String>,
    unsubscribed: Vec<String>,
}

impl SimBackend {
    /// Backend that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next create.
    pub fn script_create(&mut self, result: Result<CreateBookingReply, CommandFailure>) {
        self.create_script.push_back(result);
    }

    /// Queue the result of the next cancel.
    pub fn script_cancel(&mut self, result: Result<CancelBookingReply, CommandFailure>) {
        self.cancel_script.push_back(result);
    }

    /// Set how subscribe commands are answered.
    pub fn set_join(&mut self, join: JoinBehavior) {
        self.join = join;
    }

    /// Execute `command` and produce its response.
    pub fn execute(&mut self, command: Command) -> SimResponse {
        match command {
            Command::CreateBooking { command_ref, request } => {
                tracing::debug!(%command_ref, pickup = %request.pickup_address, "sim create");
                self.created.push(request);
                let result = self.create_script.pop_front().unwrap_or_else(|| {
                    self.last_id += 1;
                    Ok(CreateBookingReply {
                        id: Some(BookingId::Number(self.last_id)),
                        msg: DEFAULT_CREATE_MESSAGE.to_owned(),
                    })
                });
                SimResponse::Reply(CommandReply::Created { command_ref, result })
            },
            Command::CancelBooking { command_ref, id, request } => {
                tracing::debug!(%command_ref, %id, "sim cancel");
                self.cancelled.push(request);
                let result = self
                    .cancel_script
                    .pop_front()
                    .unwrap_or_else(|| Ok(CancelBookingReply { msg: DEFAULT_CANCEL_MESSAGE.to_owned() }));
                SimResponse::Reply(CommandReply::Cancelled { command_ref, result })
            },
            Command::Subscribe { topic, .. } => {
                self.subscribed.push(topic);
                match &self.join {
                    JoinBehavior::Accept => SimResponse::Channel(ChannelEvent::Joined),
                    JoinBehavior::Refuse(reason) => {
                        SimResponse::Channel(ChannelEvent::JoinFailed { reason: reason.clone() })
                    },
                    JoinBehavior::Silent => SimResponse::None,
                }
            },
            Command::Unsubscribe { topic } => {
                self.unsubscribed.push(topic);
                SimResponse::None
            },
        }
    }

    /// Create requests received, oldest first.
    pub fn created(&self) -> &[CreateBookingRequest] {
        &self.created
    }

    /// Cancel requests received, oldest first.
    pub fn cancelled(&self) -> &[CancelBookingRequest] {
        &self.cancelled
    }

    /// Topics subscribed.
    pub fn subscribed(&self) -> &[String] {
        &self.subscribed
    }

    /// Topics unsubscribed.
    pub fn unsubscribed(&self) -> &[String] {
        &self.unsubscribed
    }
}
