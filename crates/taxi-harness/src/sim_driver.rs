//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the terminal driver but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`taxi_app::Runtime`] orchestration code runs in both production and
//! simulation.
//!
//! Tests script a sequence of [`SimStep`]s. Each poll consumes one step; once
//! the script is exhausted the driver asks the app to quit, so a run always
//! terminates.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};

use taxi_app::{App, AppAction, AppEvent, Command, Driver, KeyInput};
use taxi_client::{ChannelEvent, CommandReply};

use crate::{
    invariants::{AppSnapshot, InvariantRegistry},
    sim_backend::{SimBackend, SimResponse},
};

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// One scripted input.
#[derive(Debug, Clone)]
pub enum SimStep {
    /// Feed an event to the App.
    Event(AppEvent),
    /// Deliver a push channel event.
    Push(ChannelEvent),
    /// Start holding command replies instead of delivering them.
    HoldReplies,
    /// Deliver held replies, optionally newest first.
    ReleaseReplies {
        /// Deliver in reverse completion order.
        reversed: bool,
    },
}

/// Shared state for event injection.
///
/// Lets tests inject and inspect from outside the runtime, which owns the
/// driver itself.
#[derive(Default)]
struct SharedState {
    steps: VecDeque<SimStep>,
    replies: VecDeque<CommandReply>,
    pushes: VecDeque<ChannelEvent>,
    held: Vec<CommandReply>,
    holding: bool,
    dispatched: Vec<Command>,
    backend: SimBackend,
    renders: usize,
    stopped: bool,
}

/// Simulation driver for deterministic testing.
///
/// Clones share state: keep one clone to inspect after handing the other to
/// [`taxi_app::Runtime`].
#[derive(Clone)]
pub struct SimDriver {
    state: Arc<Mutex<SharedState>>,
    invariants: Option<Arc<InvariantRegistry>>,
}

impl Default for SimDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SimDriver {
    /// Create a driver backed by an accept-everything [`SimBackend`].
    pub fn new() -> Self {
        Self::with_backend(SimBackend::new())
    }

    /// Create a driver answering commands from `backend`.
    pub fn with_backend(backend: SimBackend) -> Self {
        let state = SharedState { backend, ..SharedState::default() };
        Self { state: Arc::new(Mutex::new(state)), invariants: None }
    }

    /// Check `registry` on every render.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(Arc::new(registry));
        self
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        // A poisoned lock means a test already panicked.
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Append a step to the script.
    pub fn push_step(&self, step: SimStep) {
        self.lock().steps.push_back(step);
    }

    /// Script a key press.
    pub fn press(&self, key: KeyInput) {
        self.push_step(SimStep::Event(AppEvent::Key(key)));
    }

    /// Script typing `text` into the focused field.
    pub fn type_text(&self, text: &str) {
        for c in text.chars() {
            self.press(KeyInput::Char(c));
        }
    }

    /// Script a push channel event.
    pub fn inject_push(&self, event: ChannelEvent) {
        self.push_step(SimStep::Push(event));
    }

    /// Check if there are scripted steps left.
    pub fn has_pending(&self) -> bool {
        !self.lock().steps.is_empty()
    }

    /// All commands dispatched so far.
    pub fn dispatched(&self) -> Vec<Command> {
        self.lock().dispatched.clone()
    }

    /// Run `f` against the backend.
    pub fn with_backend_mut<R>(&self, f: impl FnOnce(&mut SimBackend) -> R) -> R {
        f(&mut self.lock().backend)
    }

    /// Number of renders performed.
    pub fn render_count(&self) -> usize {
        self.lock().renders
    }

    /// Whether [`Driver::stop`] was called.
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn poll_event(&mut self, app: &mut App) -> Result<Vec<AppAction>, Self::Error> {
        let mut state = self.lock();

        let Some(step) = state.steps.pop_front() else {
            drop(state);
            return Ok(app.quit());
        };

        match step {
            SimStep::Event(event) => {
                drop(state);
                Ok(app.handle(event))
            },
            SimStep::Push(event) => {
                state.pushes.push_back(event);
                Ok(vec![])
            },
            SimStep::HoldReplies => {
                state.holding = true;
                Ok(vec![])
            },
            SimStep::ReleaseReplies { reversed } => {
                state.holding = false;
                let mut held = std::mem::take(&mut state.held);
                if reversed {
                    held.reverse();
                }
                state.replies.extend(held);
                Ok(vec![])
            },
        }
    }

    async fn dispatch(&mut self, command: Command) -> Result<(), Self::Error> {
        let mut state = self.lock();
        state.dispatched.push(command.clone());

        let response = state.backend.execute(command);
        match response {
            SimResponse::Reply(reply) if state.holding => state.held.push(reply),
            SimResponse::Reply(reply) => state.replies.push_back(reply),
            SimResponse::Channel(event) => state.pushes.push_back(event),
            SimResponse::None => {},
        }
        Ok(())
    }

    async fn recv_reply(&mut self) -> Option<CommandReply> {
        self.lock().replies.pop_front()
    }

    async fn recv_push(&mut self) -> Option<ChannelEvent> {
        self.lock().pushes.pop_front()
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.lock().renders += 1;
        if let Some(registry) = &self.invariants {
            let renders = self.render_count();
            registry.assert_all(&AppSnapshot::from_app(app), &format!("at render {renders}"));
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.lock().stopped = true;
    }
}
