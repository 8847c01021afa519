//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. Booking commands go over HTTP
//! with reqwest, the rider topic over a Phoenix WebSocket.

use std::{
    future::Future,
    io::{self, Stdout, stdout},
};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use taxi_app::{App, AppAction, AppEvent, Command, Driver};
use taxi_client::{
    ChannelEvent, CommandReply,
    transport::{HttpBookingApi, PushChannel, Subscription, TransportConfig, TransportError},
};
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinSet};

use crate::{KeyInput, ui};

/// Idle wakeup so in-flight replies are drained without keyboard input.
const TICK: tokio::time::Duration = tokio::time::Duration::from_millis(100);

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Handles terminal I/O (crossterm), rendering (ratatui), booking commands
/// (reqwest) and the push channel (tokio-tungstenite). Each booking command
/// runs as its own task so a slow backend never blocks the keyboard.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    api: HttpBookingApi,
    channel: PushChannel,
    subscription: Option<Subscription>,
    requests: JoinSet<()>,
    replies_tx: mpsc::UnboundedSender<CommandReply>,
    replies_rx: mpsc::UnboundedReceiver<CommandReply>,
}

impl TerminalDriver {
    /// Create a new terminal driver.
    ///
    /// Validates both endpoints before touching the terminal.
    pub fn new(config: TransportConfig) -> Result<Self, TerminalError> {
        let api = HttpBookingApi::new(&config)?;
        let channel = PushChannel::new(config)?;

        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;
        let event_stream = EventStream::new();
        let (replies_tx, replies_rx) = mpsc::unbounded_channel();

        Ok(Self {
            terminal,
            event_stream,
            api,
            channel,
            subscription: None,
            requests: JoinSet::new(),
            replies_tx,
            replies_rx,
        })
    }

    /// Convert a crossterm key event to `KeyInput`.
    ///
    /// Ctrl+C quits like Esc, since raw mode swallows the signal.
    fn convert_key(event: KeyEvent) -> Option<KeyInput> {
        match event.code {
            KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(KeyInput::Esc)
            },
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Backspace => Some(KeyInput::Backspace),
            KeyCode::Tab => Some(KeyInput::Tab),
            KeyCode::BackTab => Some(KeyInput::BackTab),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Up => Some(KeyInput::Up),
            KeyCode::Down => Some(KeyInput::Down),
            _ => None,
        }
    }

    fn spawn_request<F>(&mut self, request: F)
    where
        F: Future<Output = CommandReply> + Send + 'static,
    {
        let replies = self.replies_tx.clone();
        self.requests.spawn(async move {
            // Receiver gone means the driver stopped
            let _ = replies.send(request.await);
        });
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    async fn poll_event(&mut self, app: &mut App) -> Result<Vec<AppAction>, Self::Error> {
        tokio::select! {
            biased;

            // Terminal events
            maybe_event = self.event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) if key_event.kind == KeyEventKind::Press => {
                        match Self::convert_key(key_event) {
                            Some(key_input) => Ok(app.handle(AppEvent::Key(key_input))),
                            None => Ok(vec![]),
                        }
                    },
                    Some(Ok(Event::Resize(cols, rows))) => {
                        Ok(app.handle(AppEvent::Resize(cols, rows)))
                    },
                    Some(Err(e)) => Err(TerminalError::Io(e)),
                    _ => Ok(vec![]),
                }
            }

            // Tick timeout
            () = tokio::time::sleep(TICK) => {
                Ok(app.handle(AppEvent::Tick))
            }
        }
    }

    async fn dispatch(&mut self, command: Command) -> Result<(), Self::Error> {
        match command {
            Command::CreateBooking { command_ref, request } => {
                let api = self.api.clone();
                self.spawn_request(async move {
                    CommandReply::Created { command_ref, result: api.create_booking(&request).await }
                });
            },
            Command::CancelBooking { command_ref, id, request } => {
                let api = self.api.clone();
                self.spawn_request(async move {
                    let result = api.cancel_booking(&id, &request).await;
                    CommandReply::Cancelled { command_ref, result }
                });
            },
            Command::Subscribe { topic, params } => {
                tracing::info!(%topic, url = %self.channel.url(), "subscribing");
                let subscription = self.channel.subscribe(topic, params);
                if let Some(previous) = self.subscription.replace(subscription) {
                    previous.leave().await;
                }
            },
            Command::Unsubscribe { topic } => match self.subscription.take() {
                Some(subscription) if subscription.topic() == topic => {
                    tracing::info!(%topic, "leaving");
                    subscription.leave().await;
                },
                other => self.subscription = other,
            },
        }
        Ok(())
    }

    async fn recv_reply(&mut self) -> Option<CommandReply> {
        while self.requests.try_join_next().is_some() {}
        self.replies_rx.try_recv().ok()
    }

    async fn recv_push(&mut self) -> Option<ChannelEvent> {
        self.subscription.as_mut().and_then(Subscription::try_recv)
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| {
            ui::render(frame, app);
        })?;
        Ok(())
    }

    fn stop(&mut self) {
        self.requests.abort_all();
        self.subscription = None;
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop();
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}
