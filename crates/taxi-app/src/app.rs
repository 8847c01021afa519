//! Booking form presenter.
//!
//! This module defines the [`App`] state machine, which manages the interactive
//! state of the booking form completely decoupled from I/O and protocol
//! mechanics.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Mirrors the latest session snapshot and maps it to a [`Presentation`].
//! - Owns keyboard focus and turns keystrokes into edit/submit/cancel intents.
//! - Stores terminal dimensions to handle resize events.
//!
//! Business rules (when a cancel is valid, which reply wins) stay in the
//! session. Drafts shown here are whatever the session last reported, so an
//! edit the session ignores never appears on screen.

use taxi_client::{BookingSnapshot, BookingState};

use crate::{AppAction, AppEvent, Focus, KeyInput, Presentation, SubscriptionStatus};

/// Booking form presenter.
#[derive(Debug, Clone)]
pub struct App {
    /// Latest session state.
    view: BookingSnapshot,
    /// Focused form element.
    focus: Focus,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
    /// Last local error. Cleared by the next session change.
    error: Option<String>,
}

impl App {
    /// Create a presenter showing `view`.
    pub fn new(view: BookingSnapshot) -> Self {
        Self { view, focus: Focus::default(), terminal_size: (80, 24), error: None }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick => vec![],
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                vec![AppAction::Render]
            },
            AppEvent::SessionChanged(view) => {
                self.view = view;
                self.error = None;
                if self.focus == Focus::Cancel && !self.cancel_visible() {
                    self.focus = Focus::Submit;
                }
                vec![AppAction::Render]
            },
            AppEvent::Error { message } => {
                self.error = Some(message);
                vec![AppAction::Render]
            },
        }
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        match key {
            KeyInput::Esc => self.quit(),
            KeyInput::Tab | KeyInput::Down => {
                self.focus = self.focus.next(self.cancel_visible());
                vec![AppAction::Render]
            },
            KeyInput::BackTab | KeyInput::Up => {
                self.focus = self.focus.prev(self.cancel_visible());
                vec![AppAction::Render]
            },
            KeyInput::Char(c) => {
                let Some(mut address) = self.focused_text().map(str::to_owned) else {
                    return vec![];
                };
                address.push(c);
                self.edit_focused(address)
            },
            KeyInput::Backspace => {
                let Some(mut address) = self.focused_text().map(str::to_owned) else {
                    return vec![];
                };
                if address.pop().is_none() {
                    return vec![];
                }
                self.edit_focused(address)
            },
            KeyInput::Enter => match self.focus {
                Focus::Pickup | Focus::Dropoff => {
                    self.focus = self.focus.next(self.cancel_visible());
                    vec![AppAction::Render]
                },
                Focus::Submit => self.submit(),
                Focus::Cancel => self.cancel(),
            },
        }
    }

    fn focused_text(&self) -> Option<&str> {
        match self.focus {
            Focus::Pickup => Some(&self.view.pickup_address),
            Focus::Dropoff => Some(&self.view.dropoff_address),
            Focus::Submit | Focus::Cancel => None,
        }
    }

    fn edit_focused(&self, address: String) -> Vec<AppAction> {
        match self.focus {
            Focus::Pickup => self.edit_pickup(address),
            Focus::Dropoff => self.edit_dropoff(address),
            Focus::Submit | Focus::Cancel => vec![],
        }
    }

    /// Replace the pickup draft.
    pub fn edit_pickup(&self, address: impl Into<String>) -> Vec<AppAction> {
        vec![AppAction::EditPickup { address: address.into() }, AppAction::Render]
    }

    /// Replace the dropoff draft.
    pub fn edit_dropoff(&self, address: impl Into<String>) -> Vec<AppAction> {
        vec![AppAction::EditDropoff { address: address.into() }, AppAction::Render]
    }

    /// Book a ride. Always offered.
    pub fn submit(&self) -> Vec<AppAction> {
        vec![AppAction::Submit, AppAction::Render]
    }

    /// Cancel the active booking. Nothing to do while idle.
    pub fn cancel(&self) -> Vec<AppAction> {
        if self.cancel_visible() { vec![AppAction::Cancel, AppAction::Render] } else { vec![] }
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    /// Move focus to `focus`. Ignored for a hidden cancel button.
    pub fn set_focus(&mut self, focus: Focus) {
        if focus != Focus::Cancel || self.cancel_visible() {
            self.focus = focus;
        }
    }

    /// Whether the cancel button is shown.
    pub fn cancel_visible(&self) -> bool {
        self.view.state == BookingState::Active
    }

    /// View model for rendering.
    pub fn presentation(&self) -> Presentation {
        let view = &self.view;
        Presentation {
            rider_label: format!("Customer: {}", view.username),
            pickup_address: view.pickup_address.clone(),
            dropoff_address: view.dropoff_address.clone(),
            focus: self.focus,
            submitting: view.submitting,
            cancel_visible: self.cancel_visible(),
            cancelling: view.cancelling,
            booking_label: view.booking_id.as_ref().map(|id| format!("Booking {id}")),
            status_message: non_empty(&view.status_message),
            notification_message: non_empty(&view.notification_message),
            subscription: SubscriptionStatus::from(&view.subscription),
            error: self.error.clone(),
        }
    }

    /// Latest session snapshot.
    pub fn view(&self) -> &BookingSnapshot {
        &self.view
    }

    /// Focused form element.
    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Last local error, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_owned())
}
