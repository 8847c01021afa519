//! Fuzz target for BookingSession state machine
//!
//! Ensure reply matching and lifecycle rules hold under arbitrary
//! interleavings (HIGH priority)
//!
//! # Strategy
//!
//! - Intents: edits, submits and cancels in any order
//! - Replies: answers to any ref ever issued, including answered ones
//! - Reply shapes: accepted, declined, failed
//! - Channel: joins, refusals, pushes and closes at any point
//!
//! # Invariants
//!
//! - `Active` iff a booking id is held
//! - Pending flags mirror the unanswered commands
//! - Replies to answered or unknown refs, or of the wrong kind, never change
//!   the snapshot
//! - No actions after `End`, and at most one unsubscribe ever

#![no_main]

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use taxi_client::{
    BookingSession, BookingState, ChannelEvent, CommandFailure, CommandRef, CommandReply,
    RiderIdentity, SessionAction, SessionEvent,
};
use taxi_proto::{BookingId, BookingRequest, CancelBookingReply, CreateBookingReply, PushEvent};

#[derive(Debug, Clone, Arbitrary)]
enum SessionOp {
    Start,
    EditPickup(String),
    EditDropoff(String),
    Submit,
    Cancel,
    ReplyCreate { which: u8, outcome: CreateOutcome },
    ReplyCancel { which: u8, failed: bool },
    Channel(ChannelOp),
    End,
}

#[derive(Debug, Clone, Arbitrary)]
enum CreateOutcome {
    Accepted(u64),
    AcceptedText(String),
    Declined,
    Failed,
}

#[derive(Debug, Clone, Arbitrary)]
enum ChannelOp {
    Joined,
    JoinFailed,
    Push(String),
    Closed,
}

fuzz_target!(|ops: Vec<SessionOp>| {
    let mut session = BookingSession::new(RiderIdentity::new("fuzz"), "123");
    let mut issued: Vec<CommandRef> = Vec::new();
    // Unanswered refs, true for creates.
    let mut outstanding: BTreeMap<CommandRef, bool> = BTreeMap::new();
    let mut unsubscribes = 0;

    for op in ops {
        let ended = session.is_ended();
        let before = session.snapshot();
        let event = to_event(op, &issued);

        let stale = match &event {
            SessionEvent::Reply(reply) => {
                let create = matches!(reply, CommandReply::Created { .. });
                if outstanding.get(&reply.command_ref()) == Some(&create) {
                    outstanding.remove(&reply.command_ref());
                    false
                } else {
                    true
                }
            },
            _ => false,
        };

        let Ok(actions) = session.handle(event) else {
            continue;
        };

        if ended {
            assert!(actions.is_empty(), "actions after End: {actions:?}");
        }
        if stale {
            assert_eq!(session.snapshot(), before, "stale reply changed the session");
        }

        for action in &actions {
            match action {
                SessionAction::CreateBooking { command_ref, .. } => {
                    issued.push(*command_ref);
                    outstanding.insert(*command_ref, true);
                },
                SessionAction::CancelBooking { command_ref, .. } => {
                    issued.push(*command_ref);
                    outstanding.insert(*command_ref, false);
                },
                SessionAction::Unsubscribe { .. } => unsubscribes += 1,
                _ => {},
            }
        }

        if session.is_ended() {
            outstanding.clear();
        }

        let snapshot = session.snapshot();
        assert_eq!(snapshot.state == BookingState::Active, snapshot.booking_id.is_some());
        assert_eq!(snapshot.submitting, outstanding.values().any(|create| *create));
        assert_eq!(snapshot.cancelling, outstanding.values().any(|create| !*create));
        assert!(unsubscribes <= 1);
    }
});

fn pick(issued: &[CommandRef], which: u8) -> CommandRef {
    if issued.is_empty() {
        return CommandRef(u64::from(which));
    }
    issued[usize::from(which) % issued.len()]
}

fn to_event(op: SessionOp, issued: &[CommandRef]) -> SessionEvent {
    match op {
        SessionOp::Start => SessionEvent::Start,
        SessionOp::EditPickup(address) => SessionEvent::EditPickup { address },
        SessionOp::EditDropoff(address) => SessionEvent::EditDropoff { address },
        SessionOp::Submit => SessionEvent::Submit,
        SessionOp::Cancel => SessionEvent::Cancel,
        SessionOp::ReplyCreate { which, outcome } => {
            let result = match outcome {
                CreateOutcome::Accepted(id) => Ok(CreateBookingReply {
                    id: Some(BookingId::Number(id)),
                    msg: "ok".into(),
                }),
                CreateOutcome::AcceptedText(id) => {
                    Ok(CreateBookingReply { id: Some(BookingId::Text(id)), msg: "ok".into() })
                },
                CreateOutcome::Declined => {
                    Ok(CreateBookingReply { id: None, msg: "no taxis".into() })
                },
                CreateOutcome::Failed => Err(CommandFailure::Transport("down".into())),
            };
            SessionEvent::Reply(CommandReply::Created { command_ref: pick(issued, which), result })
        },
        SessionOp::ReplyCancel { which, failed } => {
            let result = if failed {
                Err(CommandFailure::Transport("down".into()))
            } else {
                Ok(CancelBookingReply { msg: "cancelled".into() })
            };
            SessionEvent::Reply(CommandReply::Cancelled { command_ref: pick(issued, which), result })
        },
        SessionOp::Channel(op) => SessionEvent::Channel(match op {
            ChannelOp::Joined => ChannelEvent::Joined,
            ChannelOp::JoinFailed => ChannelEvent::JoinFailed { reason: "refused".into() },
            ChannelOp::Push(msg) => ChannelEvent::Push(PushEvent::BookingRequest(BookingRequest {
                msg,
            })),
            ChannelOp::Closed => ChannelEvent::Closed,
        }),
        SessionOp::End => SessionEvent::End,
    }
}
