//! Invariant checking for deterministic simulation testing.
//!
//! Invariants are properties that must always hold during execution. Unlike
//! example-based tests that check specific scenarios, invariants verify
//! behavioral properties across all possible execution paths.
//!
//! The checks run against an [`AppSnapshot`] extracted from the presenter, so
//! they see exactly what the rider would see.

use taxi_app::{App, Focus, Presentation};
use taxi_client::{BookingSnapshot, BookingState};

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Invariant violation with context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Name of the violated invariant.
    pub invariant: &'static str,
    /// Description of what went wrong.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// Observable state of one rider's form.
#[derive(Debug, Clone)]
pub struct AppSnapshot {
    /// Session state the presenter last saw.
    pub view: BookingSnapshot,
    /// What the form renders.
    pub presentation: Presentation,
}

impl AppSnapshot {
    /// Capture the presenter state.
    pub fn from_app(app: &App) -> Self {
        Self { view: app.view().clone(), presentation: app.presentation() }
    }
}

/// An invariant that can be checked against presenter state.
pub trait Invariant: Send + Sync {
    /// Invariant name for error reporting.
    fn name(&self) -> &'static str;

    /// Check the invariant against the current state.
    fn check(&self, state: &AppSnapshot) -> InvariantResult;
}

/// Cancel is offered iff the session holds a booking id.
pub struct CancelIffActive;

impl Invariant for CancelIffActive {
    fn name(&self) -> &'static str {
        "cancel_iff_active"
    }

    fn check(&self, state: &AppSnapshot) -> InvariantResult {
        let active = state.view.state == BookingState::Active;
        let has_id = state.view.booking_id.is_some();
        let visible = state.presentation.cancel_visible;

        if active == has_id && visible == active {
            Ok(())
        } else {
            Err(Violation {
                invariant: self.name(),
                message: format!("state={active} id={has_id} cancel_visible={visible}"),
            })
        }
    }
}

/// Focus never rests on a hidden button.
pub struct FocusOnVisible;

impl Invariant for FocusOnVisible {
    fn name(&self) -> &'static str {
        "focus_on_visible"
    }

    fn check(&self, state: &AppSnapshot) -> InvariantResult {
        if state.presentation.focus == Focus::Cancel && !state.presentation.cancel_visible {
            return Err(Violation {
                invariant: self.name(),
                message: "focus on hidden cancel button".into(),
            });
        }
        Ok(())
    }
}

/// The booking label names exactly the booking the session holds.
pub struct BookingLabelMatchesId;

impl Invariant for BookingLabelMatchesId {
    fn name(&self) -> &'static str {
        "booking_label_matches_id"
    }

    fn check(&self, state: &AppSnapshot) -> InvariantResult {
        let expected = state.view.booking_id.as_ref().map(|id| format!("Booking {id}"));
        if state.presentation.booking_label == expected {
            Ok(())
        } else {
            Err(Violation {
                invariant: self.name(),
                message: format!(
                    "label {:?} for booking {:?}",
                    state.presentation.booking_label, state.view.booking_id
                ),
            })
        }
    }
}

/// Registry of invariants to check.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Registry with every presenter invariant.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(CancelIffActive);
        registry.add(FocusOnVisible);
        registry.add(BookingLabelMatchesId);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants, collecting every violation.
    pub fn check_all(&self, state: &AppSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Check all invariants, panicking with context on any violation.
    pub fn assert_all(&self, state: &AppSnapshot, context: &str) {
        if let Err(violations) = self.check_all(state) {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("Invariant violation {context}:\n  {}", messages.join("\n  "));
        }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use taxi_client::{BookingId, SubscriptionState};

    use super::*;

    fn view(state: BookingState, booking_id: Option<BookingId>) -> BookingSnapshot {
        BookingSnapshot {
            username: "u1".into(),
            state,
            booking_id,
            pickup_address: String::new(),
            dropoff_address: String::new(),
            status_message: String::new(),
            notification_message: String::new(),
            subscription: SubscriptionState::Joined,
            submitting: false,
            cancelling: false,
        }
    }

    #[test]
    fn standard_registry_holds_for_fresh_app() {
        let app = App::new(view(BookingState::Idle, None));
        let registry = InvariantRegistry::standard();

        assert_eq!(registry.len(), 3);
        assert!(registry.check_all(&AppSnapshot::from_app(&app)).is_ok());
    }

    #[test]
    fn overlapping_commands_with_status_hold() {
        let mut snapshot = view(BookingState::Active, Some(BookingId::Number(43)));
        snapshot.submitting = true;
        snapshot.cancelling = true;
        snapshot.status_message = "Booking cancelled".into();
        let app = App::new(snapshot);

        assert!(InvariantRegistry::standard().check_all(&AppSnapshot::from_app(&app)).is_ok());
    }

    #[test]
    fn detects_label_for_other_booking() {
        let app = App::new(view(BookingState::Active, Some(BookingId::Number(43))));
        let mut state = AppSnapshot::from_app(&app);
        state.presentation.booking_label = Some("Booking 42".into());

        assert!(BookingLabelMatchesId.check(&state).is_err());
    }

    #[test]
    fn detects_active_without_id() {
        let app = App::new(view(BookingState::Active, None));
        assert!(CancelIffActive.check(&AppSnapshot::from_app(&app)).is_err());
    }
}
