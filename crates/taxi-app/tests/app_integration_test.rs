//! Keyboard-to-session integration tests.
//!
//! # Test Strategy
//!
//! Each test does what a rider does in the terminal:
//! 1. Type into the address fields, tab to a button, press Enter
//! 2. Process through App → Bridge → BookingSession
//! 3. Answer the queued commands as the backend would
//! 4. Verify what the form shows
//!
//! # Oracle Pattern
//!
//! Tests end with oracle checks that verify:
//! - The presentation reflects the session state
//! - The commands sent carry what the rider typed
//! - The cancel action is offered iff a booking is active

use taxi_app::{App, AppAction, AppEvent, Bridge, Command, Focus, KeyInput, SubscriptionStatus};
use taxi_client::{
    BookingSession, ChannelEvent, CommandFailure, CommandReply, RiderIdentity,
    CANCEL_FAILED_MESSAGE,
};
use taxi_proto::{BookingId, BookingRequest, CancelBookingReply, CreateBookingReply, PushEvent};

/// Create a started App/Bridge pair with empty drafts.
fn started(username: &str) -> (App, Bridge) {
    let mut bridge = Bridge::new(BookingSession::new(RiderIdentity::new(username), "123"));
    let mut app = App::new(bridge.snapshot());
    for event in bridge.start() {
        app.handle(event);
    }
    let _ = bridge.take_outgoing();
    (app, bridge)
}

/// Press a key and route resulting intents through the Bridge.
/// Returns the commands that would be dispatched.
fn press(app: &mut App, bridge: &mut Bridge, key: KeyInput) -> Vec<Command> {
    let mut pending = app.handle(AppEvent::Key(key));
    while !pending.is_empty() {
        for action in std::mem::take(&mut pending) {
            match action {
                AppAction::Render | AppAction::Quit => {},
                intent => {
                    for event in bridge.process_app_action(intent) {
                        pending.extend(app.handle(event));
                    }
                },
            }
        }
    }
    bridge.take_outgoing()
}

fn type_text(app: &mut App, bridge: &mut Bridge, text: &str) {
    for c in text.chars() {
        press(app, bridge, KeyInput::Char(c));
    }
}

fn reply(app: &mut App, bridge: &mut Bridge, reply: CommandReply) {
    for event in bridge.handle_reply(reply) {
        app.handle(event);
    }
}

fn channel(app: &mut App, bridge: &mut Bridge, event: ChannelEvent) {
    for event in bridge.handle_channel(event) {
        app.handle(event);
    }
}

/// Fill both fields and press Enter on submit.
fn book(app: &mut App, bridge: &mut Bridge, pickup: &str, dropoff: &str) -> Vec<Command> {
    type_text(app, bridge, pickup);
    press(app, bridge, KeyInput::Tab);
    type_text(app, bridge, dropoff);
    press(app, bridge, KeyInput::Tab);
    assert_eq!(app.focus(), Focus::Submit);
    press(app, bridge, KeyInput::Enter)
}

fn accepted(commands: &[Command], id: u64, msg: &str) -> CommandReply {
    let Some(Command::CreateBooking { command_ref, .. }) = commands.first() else {
        panic!("expected create command, got {commands:?}");
    };
    CommandReply::Created {
        command_ref: *command_ref,
        result: Ok(CreateBookingReply { id: Some(BookingId::Number(id)), msg: msg.into() }),
    }
}

#[test]
fn typed_addresses_are_submitted() {
    let (mut app, mut bridge) = started("u1");

    let commands = book(&mut app, &mut bridge, "A", "B");

    // Oracle: the request carries what the rider typed
    match commands.as_slice() {
        [Command::CreateBooking { request, .. }] => {
            assert_eq!(request.pickup_address, "A");
            assert_eq!(request.dropoff_address, "B");
            assert_eq!(request.username, "u1");
        },
        other => panic!("expected one create command, got {other:?}"),
    }

    // Oracle: form shows the pending submit with no stale status
    let presentation = app.presentation();
    assert!(presentation.submitting);
    assert_eq!(presentation.status_message, None);
}

#[test]
fn full_booking_lifecycle() {
    let (mut app, mut bridge) = started("u1");
    channel(&mut app, &mut bridge, ChannelEvent::Joined);
    assert_eq!(app.presentation().subscription, SubscriptionStatus::Live);

    let commands = book(&mut app, &mut bridge, "A", "B");
    reply(&mut app, &mut bridge, accepted(&commands, 42, "Booking confirmed"));

    // Oracle: booking active, cancel offered
    let presentation = app.presentation();
    assert!(presentation.cancel_visible);
    assert_eq!(presentation.status_message.as_deref(), Some("Booking confirmed"));

    let push = PushEvent::BookingRequest(BookingRequest { msg: "Driver assigned".into() });
    channel(&mut app, &mut bridge, ChannelEvent::Push(push));
    assert_eq!(app.presentation().notification_message.as_deref(), Some("Driver assigned"));

    // Tab from submit now reaches cancel
    press(&mut app, &mut bridge, KeyInput::Tab);
    assert_eq!(app.focus(), Focus::Cancel);
    let commands = press(&mut app, &mut bridge, KeyInput::Enter);

    let Some(Command::CancelBooking { command_ref, id, request }) = commands.first() else {
        panic!("expected cancel command, got {commands:?}");
    };
    assert_eq!(id, &BookingId::Number(42));
    assert_eq!(request.id, BookingId::Number(42));

    reply(&mut app, &mut bridge, CommandReply::Cancelled {
        command_ref: *command_ref,
        result: Ok(CancelBookingReply { msg: "Booking cancelled".into() }),
    });

    // Oracle: back to idle, cancel hidden, focus moved off the hidden button
    let presentation = app.presentation();
    assert!(!presentation.cancel_visible);
    assert_eq!(presentation.booking_label, None);
    assert_eq!(presentation.status_message.as_deref(), Some("Booking cancelled"));
    assert_eq!(presentation.notification_message, None);
    assert_eq!(app.focus(), Focus::Submit);
}

#[test]
fn failed_cancel_keeps_cancel_offered() {
    let (mut app, mut bridge) = started("u1");
    let commands = book(&mut app, &mut bridge, "A", "B");
    reply(&mut app, &mut bridge, accepted(&commands, 5, "ok"));

    app.set_focus(Focus::Cancel);
    let commands = press(&mut app, &mut bridge, KeyInput::Enter);
    let Some(Command::CancelBooking { command_ref, .. }) = commands.first() else {
        panic!("expected cancel command");
    };
    reply(&mut app, &mut bridge, CommandReply::Cancelled {
        command_ref: *command_ref,
        result: Err(CommandFailure::Transport("timeout".into())),
    });

    let presentation = app.presentation();
    assert!(presentation.cancel_visible);
    assert_eq!(presentation.status_message.as_deref(), Some(CANCEL_FAILED_MESSAGE));
}

#[test]
fn typing_while_submitting_does_not_change_fields() {
    let (mut app, mut bridge) = started("u1");
    book(&mut app, &mut bridge, "A", "B");

    app.set_focus(Focus::Pickup);
    let commands = press(&mut app, &mut bridge, KeyInput::Char('x'));

    assert!(commands.is_empty());
    assert_eq!(app.presentation().pickup_address, "A");
}

#[test]
fn join_failure_shows_in_status_line() {
    let (mut app, mut bridge) = started("u1");

    channel(&mut app, &mut bridge, ChannelEvent::JoinFailed { reason: "unauthorized".into() });

    assert_eq!(
        app.presentation().subscription,
        SubscriptionStatus::Failed("unauthorized".into())
    );
}

#[test]
fn enter_on_idle_cancel_is_impossible() {
    let (mut app, mut bridge) = started("u1");

    app.set_focus(Focus::Cancel);
    assert_eq!(app.focus(), Focus::Pickup);

    // Cycling through every element never lands on cancel while idle
    for _ in 0..8 {
        press(&mut app, &mut bridge, KeyInput::Tab);
        assert_ne!(app.focus(), Focus::Cancel);
    }
}
