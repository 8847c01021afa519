//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] presenter for the runtime to execute.

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Replace the pickup draft.
    EditPickup {
        /// Full new value of the field.
        address: String,
    },

    /// Replace the dropoff draft.
    EditDropoff {
        /// Full new value of the field.
        address: String,
    },

    /// Book a ride with the current drafts.
    Submit,

    /// Cancel the active booking.
    Cancel,
}
