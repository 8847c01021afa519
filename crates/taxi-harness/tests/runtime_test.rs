//! End-to-end runtime tests under simulation.
//!
//! # Test Strategy
//!
//! Each test scripts what a rider does at the keyboard, plus what the backend
//! and push channel do, then runs the production [`Runtime`] loop over a
//! [`SimDriver`] until the script is exhausted.
//!
//! # Oracle Pattern
//!
//! Tests end with oracle checks on the commands the runtime dispatched, and
//! every render is checked against the standard invariants.

use taxi_app::{Command, KeyInput, Runtime};
use taxi_client::{BookingSession, ChannelEvent, CommandFailure, RiderIdentity};
use taxi_harness::{InvariantRegistry, JoinBehavior, SimBackend, SimDriver, SimStep};
use taxi_proto::{BookingId, BookingRequest, PushEvent};

fn session() -> BookingSession {
    BookingSession::new(RiderIdentity::new("u1"), "123")
}

fn driver(backend: SimBackend) -> SimDriver {
    SimDriver::with_backend(backend).with_invariants(InvariantRegistry::standard())
}

fn creates(commands: &[Command]) -> Vec<&Command> {
    commands.iter().filter(|c| matches!(c, Command::CreateBooking { .. })).collect()
}

fn cancelled_ids(commands: &[Command]) -> Vec<BookingId> {
    commands
        .iter()
        .filter_map(|c| match c {
            Command::CancelBooking { id, .. } => Some(id.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn book_notify_cancel_and_quit() {
    let driver = driver(SimBackend::new());
    let observer = driver.clone();

    driver.type_text("A");
    driver.press(KeyInput::Tab);
    driver.type_text("B");
    driver.press(KeyInput::Tab);
    driver.press(KeyInput::Enter);
    driver.inject_push(ChannelEvent::Push(PushEvent::BookingRequest(BookingRequest {
        msg: "Driver assigned".into(),
    })));
    driver.press(KeyInput::Tab);
    driver.press(KeyInput::Enter);

    Runtime::new(driver, session()).run().await.unwrap();

    let dispatched = observer.dispatched();

    // Oracle: subscribe first, unsubscribe last
    assert!(matches!(
        dispatched.first(),
        Some(Command::Subscribe { topic, params }) if topic == "customer:u1" && params.token == "123"
    ));
    assert_eq!(dispatched.last(), Some(&Command::Unsubscribe { topic: "customer:u1".into() }));

    // Oracle: the backend saw the typed addresses and the cancel of the booking it issued
    observer.with_backend_mut(|backend| {
        assert_eq!(backend.created().len(), 1);
        assert_eq!(backend.created()[0].pickup_address, "A");
        assert_eq!(backend.created()[0].dropoff_address, "B");
        assert_eq!(backend.cancelled().len(), 1);
        assert_eq!(backend.cancelled()[0].id, BookingId::Number(1));
        assert_eq!(backend.unsubscribed(), ["customer:u1".to_owned()]);
    });

    assert!(observer.is_stopped());
    assert!(observer.render_count() > 0);
}

#[tokio::test]
async fn out_of_order_replies_apply_in_arrival_order() {
    let driver = driver(SimBackend::new());
    let observer = driver.clone();

    driver.push_step(SimStep::HoldReplies);
    driver.press(KeyInput::Tab);
    driver.press(KeyInput::Tab);
    driver.press(KeyInput::Enter);
    driver.press(KeyInput::Enter);
    driver.push_step(SimStep::ReleaseReplies { reversed: true });
    driver.press(KeyInput::Tab);
    driver.press(KeyInput::Enter);

    let session = session().with_drafts("A", "B");
    Runtime::new(driver, session).run().await.unwrap();

    let dispatched = observer.dispatched();
    assert_eq!(creates(&dispatched).len(), 2);

    // Oracle: the first reply arrived last and won, so the cancel targets the
    // booking it accepted
    assert_eq!(cancelled_ids(&dispatched), vec![BookingId::Number(1)]);
}

#[tokio::test]
async fn cancel_is_unreachable_without_booking() {
    let mut backend = SimBackend::new();
    backend.script_create(Err(CommandFailure::Transport("refused".into())));
    let driver = driver(backend);
    let observer = driver.clone();

    driver.press(KeyInput::Tab);
    driver.press(KeyInput::Tab);
    driver.press(KeyInput::Enter);
    // Tab wraps to pickup: cancel stays hidden after a failed create
    driver.press(KeyInput::Tab);
    driver.press(KeyInput::Enter);

    Runtime::new(driver, session().with_drafts("A", "B")).run().await.unwrap();

    let dispatched = observer.dispatched();
    assert_eq!(creates(&dispatched).len(), 1);
    assert!(cancelled_ids(&dispatched).is_empty());
}

#[tokio::test]
async fn refused_join_does_not_block_booking() {
    let mut backend = SimBackend::new();
    backend.set_join(JoinBehavior::Refuse("unauthorized".into()));
    let driver = driver(backend);
    let observer = driver.clone();

    driver.press(KeyInput::Tab);
    driver.press(KeyInput::Tab);
    driver.press(KeyInput::Enter);

    Runtime::new(driver, session().with_drafts("A", "B")).run().await.unwrap();

    assert_eq!(creates(&observer.dispatched()).len(), 1);
}

#[tokio::test]
async fn esc_quits_and_unsubscribes_once() {
    let driver = driver(SimBackend::new());
    let observer = driver.clone();

    driver.press(KeyInput::Esc);
    driver.type_text("never typed");

    Runtime::new(driver, session()).run().await.unwrap();

    let unsubscribes = observer
        .dispatched()
        .iter()
        .filter(|c| matches!(c, Command::Unsubscribe { .. }))
        .count();
    assert_eq!(unsubscribes, 1);
    assert!(observer.has_pending());
    observer.with_backend_mut(|backend| assert!(backend.created().is_empty()));
}
