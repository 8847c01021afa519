//! Terminal UI for the taxi rider client
//!
//! A thin shell over [`taxi_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`taxi_app::Runtime`].
//!
//! This crate only handles terminal rendering and wiring the HTTP and
//! WebSocket transports into the driver.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod terminal;
pub mod ui;

pub use taxi_app::{App, AppAction, AppEvent, Bridge, Command, Driver, KeyInput, Runtime};
pub use terminal::{TerminalDriver, TerminalError};
