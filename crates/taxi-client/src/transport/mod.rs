//! HTTP and WebSocket transport for the session.
//!
//! Thin adapters that execute [`crate::SessionAction`] commands and
//! subscriptions. Protocol logic stays in the Sans-IO [`crate::BookingSession`];
//! these types only move bytes and validate reply shapes at the boundary.

mod channel;
mod http;

use std::time::Duration;

pub use channel::{PushChannel, Subscription};
pub use http::HttpBookingApi;
use thiserror::Error;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Configured URL could not be parsed.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl {
        /// Offending URL.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(String),
}

/// Endpoints and timings for the transport adapters.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Base URL of the booking API.
    pub api_base_url: String,
    /// WebSocket endpoint of the push channel.
    pub socket_url: String,
    /// Per-request timeout for booking commands.
    pub request_timeout: Duration,
    /// Interval between socket heartbeats.
    pub heartbeat_interval: Duration,
    /// First reconnect delay.
    pub reconnect_backoff_min: Duration,
    /// Reconnect delay cap.
    pub reconnect_backoff_max: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:4000".to_owned(),
            socket_url: "ws://localhost:4000/socket/websocket".to_owned(),
            request_timeout: Duration::from_secs(10),
            heartbeat_interval: Duration::from_secs(30),
            reconnect_backoff_min: Duration::from_secs(1),
            reconnect_backoff_max: Duration::from_secs(30),
        }
    }
}

fn parse_url(url: &str) -> Result<url::Url, TransportError> {
    url::Url::parse(url)
        .map_err(|e| TransportError::InvalidUrl { url: url.to_owned(), reason: e.to_string() })
}
