//! Session-to-Application translation layer.
//!
//! The [`Bridge`] wraps the Sans-IO [`taxi_client::BookingSession`] and adapts
//! it to the application lifecycle.
//!
//! # Responsibilities
//!
//! - Converts [`crate::AppAction`] intents into session events.
//! - Accumulates outgoing [`Command`]s to be executed by the driver in the next
//!   I/O cycle.
//! - Forwards session log actions to `tracing`.
//! - Converts session state changes and errors back into [`crate::AppEvent`]s
//!   to update the UI.

use taxi_client::{
    BookingSession, BookingSnapshot, ChannelEvent, CommandReply, LogLevel, SessionAction,
    SessionError, SessionEvent,
};

use crate::{AppAction, AppEvent, Command};

/// Bridge between App and session logic.
pub struct Bridge {
    session: BookingSession,
    outgoing: Vec<Command>,
}

impl Bridge {
    /// Wrap `session`.
    pub fn new(session: BookingSession) -> Self {
        Self { session, outgoing: Vec::new() }
    }

    /// Current session state.
    pub fn snapshot(&self) -> BookingSnapshot {
        self.session.snapshot()
    }

    /// Underlying session.
    pub fn session(&self) -> &BookingSession {
        &self.session
    }

    /// Mount the session. Queues the push subscription.
    pub fn start(&mut self) -> Vec<AppEvent> {
        let result = self.session.handle(SessionEvent::Start);
        self.handle_session_result(result)
    }

    /// Tear the session down. Queues the unsubscribe.
    pub fn end(&mut self) -> Vec<AppEvent> {
        let result = self.session.handle(SessionEvent::End);
        self.handle_session_result(result)
    }

    /// Process an App action and return resulting App events.
    pub fn process_app_action(&mut self, action: AppAction) -> Vec<AppEvent> {
        let event = match action {
            AppAction::EditPickup { address } => SessionEvent::EditPickup { address },
            AppAction::EditDropoff { address } => SessionEvent::EditDropoff { address },
            AppAction::Submit => SessionEvent::Submit,
            AppAction::Cancel => SessionEvent::Cancel,
            AppAction::Render | AppAction::Quit => return vec![],
        };
        let result = self.session.handle(event);
        self.handle_session_result(result)
    }

    /// Handle the completion of a booking command.
    pub fn handle_reply(&mut self, reply: CommandReply) -> Vec<AppEvent> {
        let result = self.session.handle(SessionEvent::Reply(reply));
        self.handle_session_result(result)
    }

    /// Handle a push channel event.
    pub fn handle_channel(&mut self, event: ChannelEvent) -> Vec<AppEvent> {
        let result = self.session.handle(SessionEvent::Channel(event));
        self.handle_session_result(result)
    }

    /// Take pending outgoing commands.
    pub fn take_outgoing(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.outgoing)
    }

    fn handle_session_result(
        &mut self,
        result: Result<Vec<SessionAction>, SessionError>,
    ) -> Vec<AppEvent> {
        match result {
            Ok(actions) => self.process_session_actions(actions),
            Err(e) => {
                tracing::warn!(error = %e, "session rejected event");
                vec![AppEvent::Error { message: e.to_string() }]
            },
        }
    }

    fn process_session_actions(&mut self, actions: Vec<SessionAction>) -> Vec<AppEvent> {
        let mut events = Vec::new();

        for action in actions {
            match action {
                SessionAction::Subscribe { topic, params } => {
                    self.outgoing.push(Command::Subscribe { topic, params });
                },
                SessionAction::Unsubscribe { topic } => {
                    self.outgoing.push(Command::Unsubscribe { topic });
                },
                SessionAction::CreateBooking { command_ref, request } => {
                    self.outgoing.push(Command::CreateBooking { command_ref, request });
                },
                SessionAction::CancelBooking { command_ref, id, request } => {
                    self.outgoing.push(Command::CancelBooking { command_ref, id, request });
                },
                SessionAction::Changed(snapshot) => {
                    events.push(AppEvent::SessionChanged(snapshot));
                },
                SessionAction::Log { level, message } => match level {
                    LogLevel::Debug => tracing::debug!("{message}"),
                    LogLevel::Info => tracing::info!("{message}"),
                    LogLevel::Warn => tracing::warn!("{message}"),
                    LogLevel::Error => tracing::error!("{message}"),
                },
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use taxi_client::{CommandFailure, RiderIdentity};
    use taxi_proto::CreateBookingReply;

    use super::*;

    fn started() -> Bridge {
        let session = BookingSession::new(RiderIdentity::new("u1"), "123").with_drafts("A", "B");
        let mut bridge = Bridge::new(session);
        bridge.start();
        bridge
    }

    #[test]
    fn start_queues_subscription() {
        let mut bridge = started();
        let outgoing = bridge.take_outgoing();

        assert!(matches!(
            outgoing.as_slice(),
            [Command::Subscribe { topic, .. }] if topic == "customer:u1"
        ));
    }

    #[test]
    fn submit_queues_create_command() {
        let mut bridge = started();
        let _ = bridge.take_outgoing();

        let events = bridge.process_app_action(AppAction::Submit);

        assert!(events.iter().any(|e| matches!(e, AppEvent::SessionChanged(s) if s.submitting)));
        assert!(matches!(bridge.take_outgoing().as_slice(), [Command::CreateBooking { .. }]));
    }

    #[test]
    fn submit_before_start_produces_error() {
        let session = BookingSession::new(RiderIdentity::new("u1"), "123");
        let mut bridge = Bridge::new(session);

        let events = bridge.process_app_action(AppAction::Submit);
        assert!(matches!(events.as_slice(), [AppEvent::Error { .. }]));
        assert!(bridge.take_outgoing().is_empty());
    }

    #[test]
    fn failed_reply_updates_status() {
        let mut bridge = started();
        bridge.process_app_action(AppAction::Submit);
        let Some(Command::CreateBooking { command_ref, .. }) =
            bridge.take_outgoing().into_iter().find(|c| matches!(c, Command::CreateBooking { .. }))
        else {
            panic!("create command");
        };

        let events = bridge.handle_reply(CommandReply::Created {
            command_ref,
            result: Err(CommandFailure::Transport("refused".into())),
        });

        assert!(events.iter().any(|e| matches!(
            e,
            AppEvent::SessionChanged(s) if s.status_message == taxi_client::CREATE_FAILED_MESSAGE
        )));
    }

    #[test]
    fn accepted_reply_activates_booking() {
        let mut bridge = started();
        bridge.process_app_action(AppAction::Submit);
        let command_ref = bridge
            .take_outgoing()
            .into_iter()
            .find_map(|c| match c {
                Command::CreateBooking { command_ref, .. } => Some(command_ref),
                _ => None,
            })
            .unwrap();

        bridge.handle_reply(CommandReply::Created {
            command_ref,
            result: Ok(CreateBookingReply { id: Some(taxi_proto::BookingId::Number(7)), msg: "ok".into() }),
        });

        assert!(bridge.snapshot().booking_id.is_some());
    }

    #[test]
    fn end_queues_unsubscribe() {
        let mut bridge = started();
        let _ = bridge.take_outgoing();

        bridge.end();
        assert_eq!(bridge.take_outgoing(), vec![Command::Unsubscribe {
            topic: "customer:u1".into()
        }]);
    }
}
