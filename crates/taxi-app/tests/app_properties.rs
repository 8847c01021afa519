//! Property-based tests for the App presenter.
//!
//! Tests verify that presenter invariants hold under arbitrary key sequences
//! and backend replies, with every intent routed through the real Bridge and
//! session.

use proptest::prelude::*;
use taxi_app::{App, AppAction, AppEvent, Bridge, Command, Focus, KeyInput};
use taxi_client::{BookingSession, BookingState, CommandReply, RiderIdentity};
use taxi_proto::{BookingId, CancelBookingReply, CreateBookingReply};

#[derive(Debug, Clone)]
enum Step {
    Key(KeyInput),
    /// Answer the oldest outstanding command, accepting it if `true`.
    Answer(bool),
}

fn key_strategy() -> impl Strategy<Value = KeyInput> {
    prop_oneof![
        4 => proptest::char::range('a', 'z').prop_map(KeyInput::Char),
        1 => Just(KeyInput::Backspace),
        2 => Just(KeyInput::Tab),
        1 => Just(KeyInput::BackTab),
        1 => Just(KeyInput::Up),
        1 => Just(KeyInput::Down),
        2 => Just(KeyInput::Enter),
    ]
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => key_strategy().prop_map(Step::Key),
        1 => any::<bool>().prop_map(Step::Answer),
    ]
}

fn answer(command: Command, accept: bool, next_id: &mut u64) -> Option<CommandReply> {
    match command {
        Command::CreateBooking { command_ref, .. } => {
            *next_id += 1;
            let id = accept.then_some(BookingId::Number(*next_id));
            Some(CommandReply::Created {
                command_ref,
                result: Ok(CreateBookingReply { id, msg: "reply".into() }),
            })
        },
        Command::CancelBooking { command_ref, .. } => Some(CommandReply::Cancelled {
            command_ref,
            result: Ok(CancelBookingReply { msg: "cancelled".into() }),
        }),
        Command::Subscribe { .. } | Command::Unsubscribe { .. } => None,
    }
}

/// Route App actions through the Bridge until quiescent.
fn run_actions(app: &mut App, bridge: &mut Bridge, actions: Vec<AppAction>) -> bool {
    let mut pending = actions;
    let mut quit = false;
    while !pending.is_empty() {
        for action in std::mem::take(&mut pending) {
            match action {
                AppAction::Render => {},
                AppAction::Quit => quit = true,
                intent => {
                    for event in bridge.process_app_action(intent) {
                        pending.extend(app.handle(event));
                    }
                },
            }
        }
    }
    quit
}

proptest! {
    #[test]
    fn prop_presenter_invariants_hold(steps in prop::collection::vec(step_strategy(), 0..80)) {
        let mut bridge = Bridge::new(
            BookingSession::new(RiderIdentity::new("u1"), "123").with_drafts("A", "B"),
        );
        let mut app = App::new(bridge.snapshot());
        for event in bridge.start() {
            app.handle(event);
        }
        let mut outstanding: Vec<Command> = bridge.take_outgoing();
        let mut next_id = 0;

        for step in steps {
            match step {
                Step::Key(key) => {
                    let actions = app.handle(AppEvent::Key(key));
                    prop_assert!(!run_actions(&mut app, &mut bridge, actions));
                },
                Step::Answer(accept) => {
                    if outstanding.is_empty() {
                        continue;
                    }
                    let command = outstanding.remove(0);
                    if let Some(reply) = answer(command, accept, &mut next_id) {
                        for event in bridge.handle_reply(reply) {
                            app.handle(event);
                        }
                    }
                },
            }
            outstanding.extend(bridge.take_outgoing());

            let presentation = app.presentation();
            let active = bridge.session().state() == BookingState::Active;

            // Cancel offered iff a booking is active
            prop_assert_eq!(presentation.cancel_visible, active);
            // Focus never rests on a hidden button
            prop_assert!(presentation.cancel_visible || presentation.focus != Focus::Cancel);
            // The form mirrors the session drafts
            prop_assert_eq!(&presentation.pickup_address, &bridge.session().booking().pickup_address);
            prop_assert_eq!(&presentation.dropoff_address, &bridge.session().booking().dropoff_address);
            prop_assert_eq!(presentation.booking_label.is_some(), active);
        }
    }

    #[test]
    fn prop_focus_cycle_returns_to_start(visible in any::<bool>(), start in 0usize..3) {
        let focus = [Focus::Pickup, Focus::Dropoff, Focus::Submit][start];
        let len = if visible { 4 } else { 3 };

        let mut cycled = focus;
        for _ in 0..len {
            cycled = cycled.next(visible);
        }
        prop_assert_eq!(cycled, focus);
    }
}
