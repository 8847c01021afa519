//! Rider push channel over a Phoenix WebSocket.
//!
//! [`PushChannel::subscribe`] spawns a task that owns the socket. The task
//! joins the topic, keeps the socket alive with heartbeats and reconnects with
//! exponential backoff when the connection drops. Callers only see
//! [`ChannelEvent`]s: every failed connect or lost connection is reported as
//! [`ChannelEvent::JoinFailed`] before the backoff, and each successful rejoin
//! as another [`ChannelEvent::Joined`].
//!
//! A refused join ends the task: the server has decided, retrying would not
//! change its mind.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use taxi_proto::{
    ChannelMessage, JoinParams, PushEvent, ReplyStatus,
    channel::{PHX_CLOSE, PHX_ERROR, PHX_REPLY},
};
use tokio::{
    net::TcpStream,
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use url::Url;

use super::{TransportConfig, TransportError, parse_url};
use crate::event::ChannelEvent;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Serializer version requested from the server.
const SERIALIZER_VSN: &str = "2.0.0";

/// How long `leave` waits for the task to send `phx_leave`.
const LEAVE_TIMEOUT: Duration = Duration::from_secs(2);

/// Factory for rider subscriptions.
#[derive(Debug, Clone)]
pub struct PushChannel {
    config: TransportConfig,
    url: Url,
}

impl PushChannel {
    /// Validate `config.socket_url` and remember the timings.
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let mut url = parse_url(&config.socket_url)?;
        if !url.query_pairs().any(|(k, _)| k == "vsn") {
            url.query_pairs_mut().append_pair("vsn", SERIALIZER_VSN);
        }
        Ok(Self { config, url })
    }

    /// WebSocket URL including the serializer version.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Join `topic` in the background.
    ///
    /// Must be called from within a tokio runtime. The returned handle yields
    /// events until the subscription is left or the join is refused.
    pub fn subscribe(&self, topic: impl Into<String>, params: JoinParams) -> Subscription {
        let topic = topic.into();
        let (events_tx, events_rx) = mpsc::channel(32);
        let (leave_tx, leave_rx) = oneshot::channel();

        let task = ChannelTask {
            url: self.url.clone(),
            topic: topic.clone(),
            params,
            config: self.config.clone(),
            events: events_tx,
            next_ref: 1,
        };
        let handle = tokio::spawn(task.run(leave_rx));

        Subscription { topic, events: events_rx, leave_tx: Some(leave_tx), task: handle }
    }
}

/// Handle to a live subscription.
///
/// Dropping the handle without calling [`Subscription::leave`] aborts the
/// socket task without a `phx_leave`.
pub struct Subscription {
    topic: String,
    events: mpsc::Receiver<ChannelEvent>,
    leave_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl Subscription {
    /// Subscribed topic.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Next channel event. `None` once the task has finished.
    pub async fn recv(&mut self) -> Option<ChannelEvent> {
        self.events.recv().await
    }

    /// Next channel event if one is ready.
    pub fn try_recv(&mut self) -> Option<ChannelEvent> {
        self.events.try_recv().ok()
    }

    /// Leave the topic and stop the socket task.
    ///
    /// Consumes the handle so a subscription is released at most once.
    pub async fn leave(mut self) {
        if let Some(leave) = self.leave_tx.take() {
            let _ = leave.send(());
        }
        if tokio::time::timeout(LEAVE_TIMEOUT, &mut self.task).await.is_err() {
            tracing::warn!(topic = %self.topic, "channel task did not stop in time");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Why a single connection ended.
enum ConnectionEnd {
    /// Caller left or dropped the handle.
    Left,
    /// Server refused the join.
    Refused,
    /// Socket dropped; reconnect.
    Dropped(String),
}

/// State owned by the background socket task.
struct ChannelTask {
    url: Url,
    topic: String,
    params: JoinParams,
    config: TransportConfig,
    events: mpsc::Sender<ChannelEvent>,
    next_ref: u64,
}

impl ChannelTask {
    async fn run(mut self, mut leave: oneshot::Receiver<()>) {
        let mut backoff = self.config.reconnect_backoff_min;

        loop {
            let connected = tokio::select! {
                _ = &mut leave => return,
                result = connect_async(self.url.as_str()) => result,
            };

            let end = match connected {
                Ok((ws, _)) => {
                    backoff = self.config.reconnect_backoff_min;
                    self.run_connection(ws, &mut leave).await
                },
                Err(e) => ConnectionEnd::Dropped(format!("connect failed: {e}")),
            };

            match end {
                ConnectionEnd::Left => {
                    let _ = self.events.send(ChannelEvent::Closed).await;
                    return;
                },
                ConnectionEnd::Refused => return,
                ConnectionEnd::Dropped(reason) => {
                    tracing::warn!(topic = %self.topic, %reason, ?backoff, "connection lost, reconnecting");
                    // Not joined until the next join reply, whether or not this attempt ever joined
                    if !self.emit(ChannelEvent::JoinFailed { reason }).await {
                        return;
                    }
                    tokio::select! {
                        _ = &mut leave => {
                            let _ = self.events.send(ChannelEvent::Closed).await;
                            return;
                        },
                        () = tokio::time::sleep(backoff) => {},
                    }
                    backoff = backoff.saturating_mul(2).min(self.config.reconnect_backoff_max);
                },
            }
        }
    }

    /// Join the topic and pump frames until the connection ends.
    async fn run_connection(
        &mut self,
        ws: WsStream,
        leave: &mut oneshot::Receiver<()>,
    ) -> ConnectionEnd {
        let (mut sink, mut stream) = ws.split();

        let join_ref = self.allocate_ref();
        let join = match ChannelMessage::join(self.topic.clone(), join_ref, &self.params)
            .and_then(|m| m.encode())
        {
            Ok(text) => text,
            Err(e) => return ConnectionEnd::Dropped(format!("encode join: {e}")),
        };
        if let Err(e) = sink.send(Message::text(join)).await {
            return ConnectionEnd::Dropped(format!("send join: {e}"));
        }

        let period = self.config.heartbeat_interval;
        let mut heartbeat = tokio::time::interval_at(tokio::time::Instant::now() + period, period);

        loop {
            tokio::select! {
                _ = &mut *leave => {
                    let msg_ref = self.allocate_ref();
                    if let Ok(text) = ChannelMessage::leave(self.topic.clone(), join_ref, msg_ref).encode() {
                        let _ = sink.send(Message::text(text)).await;
                    }
                    let _ = sink.close().await;
                    return ConnectionEnd::Left;
                },

                _ = heartbeat.tick() => {
                    let beat = ChannelMessage::heartbeat(self.allocate_ref());
                    let sent = match beat.encode() {
                        Ok(text) => sink.send(Message::text(text)).await.map_err(|e| e.to_string()),
                        Err(e) => Err(e.to_string()),
                    };
                    if let Err(reason) = sent {
                        return ConnectionEnd::Dropped(format!("heartbeat: {reason}"));
                    }
                },

                frame = stream.next() => {
                    let text = match frame {
                        None => return ConnectionEnd::Dropped("socket closed".into()),
                        Some(Err(e)) => return ConnectionEnd::Dropped(e.to_string()),
                        Some(Ok(Message::Close(_))) => {
                            return ConnectionEnd::Dropped("close frame".into());
                        },
                        Some(Ok(Message::Text(text))) => text,
                        Some(Ok(_)) => continue,
                    };

                    let message = match ChannelMessage::decode(text.as_str()) {
                        Ok(message) => message,
                        Err(e) => {
                            tracing::warn!(error = %e, "ignoring malformed frame");
                            continue;
                        },
                    };

                    if let Some(end) = self.dispatch(message, join_ref).await {
                        return end;
                    }
                },
            }
        }
    }

    /// Route one inbound frame. Returns `Some` when the connection should end.
    async fn dispatch(&mut self, message: ChannelMessage, join_ref: u64) -> Option<ConnectionEnd> {
        if message.is_reply_to(join_ref) {
            return match message.reply() {
                Ok(reply) if reply.status == ReplyStatus::Ok => {
                    tracing::info!(topic = %self.topic, "joined successfully");
                    if self.emit(ChannelEvent::Joined).await { None } else { Some(ConnectionEnd::Left) }
                },
                Ok(reply) => {
                    let reason = format!("{:?}: {}", reply.status, reply.response);
                    tracing::error!(topic = %self.topic, %reason, "unable to join");
                    let _ = self.emit(ChannelEvent::JoinFailed { reason }).await;
                    Some(ConnectionEnd::Refused)
                },
                Err(e) => {
                    let _ = self.emit(ChannelEvent::JoinFailed { reason: e.to_string() }).await;
                    Some(ConnectionEnd::Refused)
                },
            };
        }

        if message.topic != self.topic {
            return None;
        }

        match message.event.as_str() {
            PHX_REPLY => None,
            PHX_ERROR | PHX_CLOSE => Some(ConnectionEnd::Dropped(format!("server sent {}", message.event))),
            _ => match PushEvent::from_message(&message) {
                Ok(event) => {
                    tracing::debug!(event = event.event_name(), "received push");
                    if self.emit(ChannelEvent::Push(event)).await { None } else { Some(ConnectionEnd::Left) }
                },
                Err(e) => {
                    tracing::warn!(event = %message.event, error = %e, "ignoring malformed push");
                    None
                },
            },
        }
    }

    /// Forward an event. `false` if the subscription handle is gone.
    async fn emit(&self, event: ChannelEvent) -> bool {
        self.events.send(event).await.is_ok()
    }

    fn allocate_ref(&mut self) -> u64 {
        let r = self.next_ref;
        self.next_ref = self.next_ref.wrapping_add(1);
        r
    }
}
