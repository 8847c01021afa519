//! Taxi rider TUI entry point.
//!
//! # Usage
//!
//! ```bash
//! # Book against a local backend
//! taxi-tui --username alice
//!
//! # Remote backend, verbose log
//! taxi-tui --username alice --api-url https://taxi.example.com \
//!     --socket-url wss://taxi.example.com/socket/websocket --log-level debug
//! ```

use std::{fs::File, sync::Mutex, time::Duration};

use clap::Parser;
use taxi_client::{BookingSession, RiderIdentity, transport::TransportConfig};
use taxi_tui::{Runtime, TerminalDriver};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Taxi rider terminal client
#[derive(Parser, Debug)]
#[command(name = "taxi-tui")]
#[command(about = "Book and cancel taxi rides from the terminal")]
#[command(version)]
struct Args {
    /// Rider username
    #[arg(short, long)]
    username: String,

    /// Base URL of the booking API
    #[arg(long, default_value = "http://localhost:4000")]
    api_url: String,

    /// WebSocket endpoint of the push channel
    #[arg(long, default_value = "ws://localhost:4000/socket/websocket")]
    socket_url: String,

    /// Token sent when joining the rider topic
    #[arg(long, default_value = "123")]
    token: String,

    /// Initial pickup address
    #[arg(long, default_value = "Tecnologico de Monterrey, campus Puebla, Mexico")]
    pickup: String,

    /// Initial dropoff address
    #[arg(long, default_value = "Triangulo Las Animas, Puebla, Mexico")]
    dropoff: String,

    /// Booking request timeout in seconds
    #[arg(long, default_value = "10")]
    request_timeout: u64,

    /// Log file. The terminal belongs to the UI.
    #[arg(long, default_value = "taxi-tui.log")]
    log_file: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let log_file = File::create(&args.log_file)?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(log_file)))
        .with(filter)
        .init();

    tracing::info!(username = %args.username, api = %args.api_url, "taxi-tui starting");

    let config = TransportConfig {
        api_base_url: args.api_url,
        socket_url: args.socket_url,
        request_timeout: Duration::from_secs(args.request_timeout),
        ..TransportConfig::default()
    };

    let session = BookingSession::new(RiderIdentity::new(args.username), args.token)
        .with_drafts(args.pickup, args.dropoff);
    let driver = TerminalDriver::new(config)?;

    Runtime::new(driver, session).run().await?;

    tracing::info!("taxi-tui stopped");
    Ok(())
}
