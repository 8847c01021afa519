//! Application input events.
//!
//! This module defines [`AppEvent`], the inputs that drive the [`crate::App`]
//! presenter.
//!
//! Events originate from two distinct sources:
//! - User interactions (keyboard, resize) and system ticks.
//! - Session notifications translated by the [`crate::Bridge`].

use taxi_client::BookingSnapshot;

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic tick.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Session state changed.
    SessionChanged(BookingSnapshot),

    /// Error occurred.
    Error {
        /// Error description.
        message: String,
    },
}
