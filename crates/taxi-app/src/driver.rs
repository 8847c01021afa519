//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::future::Future;

use taxi_client::{ChannelEvent, CommandReply};

use crate::{App, AppAction, Command};

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in the terminal and in simulation.
///
/// # Implementations
///
/// - **TUI**: crossterm for terminal events, reqwest for booking commands,
///   tokio-tungstenite for the push channel
/// - **Simulation**: scripted backend and injected events
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Poll for the next input event and feed it to `app`.
    ///
    /// Returns the actions `app` produced, or an empty list if nothing
    /// happened before the driver's tick.
    fn poll_event(
        &mut self,
        app: &mut App,
    ) -> impl Future<Output = Result<Vec<AppAction>, Self::Error>> + Send;

    /// Start executing `command` without waiting for it to complete.
    ///
    /// Booking command completions surface through [`Driver::recv_reply`];
    /// subscription events through [`Driver::recv_push`].
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be started.
    fn dispatch(&mut self, command: Command) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Next completed booking command. `None` if nothing is ready.
    fn recv_reply(&mut self) -> impl Future<Output = Option<CommandReply>> + Send;

    /// Next push channel event. `None` if nothing is ready.
    fn recv_push(&mut self) -> impl Future<Output = Option<ChannelEvent>> + Send;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Release I/O resources.
    fn stop(&mut self);
}
