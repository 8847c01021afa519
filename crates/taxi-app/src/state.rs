//! Observable application state types.
//!
//! [`Presentation`] is the view model the UI draws from. It carries exactly
//! the fields a booking form needs and nothing from the transport layer.

use taxi_client::SubscriptionState;

/// Form element holding keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// Pickup address field.
    #[default]
    Pickup,
    /// Dropoff address field.
    Dropoff,
    /// Submit button.
    Submit,
    /// Cancel button. Only reachable while a booking is active.
    Cancel,
}

impl Focus {
    /// Next element in tab order.
    #[must_use]
    pub fn next(self, cancel_visible: bool) -> Self {
        match self {
            Self::Pickup => Self::Dropoff,
            Self::Dropoff => Self::Submit,
            Self::Submit if cancel_visible => Self::Cancel,
            Self::Submit | Self::Cancel => Self::Pickup,
        }
    }

    /// Previous element in tab order.
    #[must_use]
    pub fn prev(self, cancel_visible: bool) -> Self {
        match self {
            Self::Pickup if cancel_visible => Self::Cancel,
            Self::Pickup => Self::Submit,
            Self::Dropoff => Self::Pickup,
            Self::Submit => Self::Dropoff,
            Self::Cancel => Self::Submit,
        }
    }

    /// Whether this element is an editable address field.
    pub fn is_field(self) -> bool {
        matches!(self, Self::Pickup | Self::Dropoff)
    }
}

/// Push channel status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionStatus {
    /// Join requested or not yet requested.
    Connecting,
    /// Receiving notifications.
    Live,
    /// Join refused or socket unreachable.
    Failed(String),
    /// Channel closed.
    Offline,
}

impl From<&SubscriptionState> for SubscriptionStatus {
    fn from(state: &SubscriptionState) -> Self {
        match state {
            SubscriptionState::Unsubscribed | SubscriptionState::Joining => Self::Connecting,
            SubscriptionState::Joined => Self::Live,
            SubscriptionState::Failed { reason } => Self::Failed(reason.clone()),
            SubscriptionState::Closed => Self::Offline,
        }
    }
}

impl SubscriptionStatus {
    /// Short label for the status bar.
    pub fn label(&self) -> String {
        match self {
            Self::Connecting => "Connecting...".to_owned(),
            Self::Live => "Live updates".to_owned(),
            Self::Failed(reason) => format!("Updates unavailable: {reason}"),
            Self::Offline => "Offline".to_owned(),
        }
    }
}

/// Everything the booking form renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    /// Rider label, e.g. `Customer: alice`.
    pub rider_label: String,
    /// Pickup field contents.
    pub pickup_address: String,
    /// Dropoff field contents.
    pub dropoff_address: String,
    /// Focused element.
    pub focus: Focus,
    /// A create command is awaiting its reply. Submit stays available.
    pub submitting: bool,
    /// Cancel button shown. True iff a booking is active.
    pub cancel_visible: bool,
    /// A cancel command is awaiting its reply.
    pub cancelling: bool,
    /// Active booking label, e.g. `Booking 42`.
    pub booking_label: Option<String>,
    /// Latest command outcome. `None` when empty.
    pub status_message: Option<String>,
    /// Latest push notification. `None` when empty.
    pub notification_message: Option<String>,
    /// Push channel status.
    pub subscription: SubscriptionStatus,
    /// Last local error, if any.
    pub error: Option<String>,
}
