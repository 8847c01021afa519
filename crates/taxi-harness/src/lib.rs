//! Deterministic simulation harness for the taxi booking client.
//!
//! In-memory implementations of the [`taxi_app::Driver`] trait and the booking
//! backend, so the production [`taxi_app::Runtime`] can be exercised end to end
//! without sockets or a terminal.
//!
//! # Invariant Testing
//!
//! The `invariants` module checks presenter properties after every render.
//! Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the full set.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod sim_backend;
pub mod sim_driver;

pub use invariants::{
    AppSnapshot, BookingLabelMatchesId, CancelIffActive, FocusOnVisible, Invariant,
    InvariantRegistry, InvariantResult, Violation,
};
pub use sim_backend::{
    DEFAULT_CANCEL_MESSAGE, DEFAULT_CREATE_MESSAGE, JoinBehavior, SimBackend, SimResponse,
};
pub use sim_driver::{SimDriver, SimDriverError, SimStep};
