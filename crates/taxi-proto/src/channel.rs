//! Phoenix channel frames.
//!
//! The push channel speaks the Phoenix v2 JSON serializer: every WebSocket text
//! message is a five element array
//!
//! ```text
//! [join_ref, ref, topic, event, payload]
//! ```
//!
//! `join_ref` ties a message to one join of a topic, `ref` correlates a push
//! with its `phx_reply`. Server-initiated broadcasts leave both refs `null`.
//!
//! # Invariants
//!
//! Encoding then decoding a [`ChannelMessage`] yields the same message. Unknown
//! event names are kept verbatim so callers can log them.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::errors::{ProtocolError, Result};

/// Join a topic.
pub const PHX_JOIN: &str = "phx_join";
/// Leave a topic.
pub const PHX_LEAVE: &str = "phx_leave";
/// Reply to a client push.
pub const PHX_REPLY: &str = "phx_reply";
/// Channel crashed on the server.
pub const PHX_ERROR: &str = "phx_error";
/// Channel closed by the server.
pub const PHX_CLOSE: &str = "phx_close";
/// Keepalive event.
pub const HEARTBEAT: &str = "heartbeat";
/// Topic used for socket-level heartbeats.
pub const PHOENIX_TOPIC: &str = "phoenix";

/// Push topic for a rider.
pub fn customer_topic(username: &str) -> String {
    format!("customer:{username}")
}

/// Parameters sent with `phx_join`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinParams {
    /// Channel token. The backend accepts a fixed placeholder.
    pub token: String,
}

impl JoinParams {
    /// Join parameters carrying `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

/// One Phoenix channel frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMessage {
    /// Ref of the join this message belongs to.
    pub join_ref: Option<String>,
    /// Correlation ref for replies.
    pub msg_ref: Option<String>,
    /// Topic, e.g. `customer:alice`.
    pub topic: String,
    /// Event name.
    pub event: String,
    /// Event payload.
    pub payload: Value,
}

impl ChannelMessage {
    /// `phx_join` for `topic`. The join ref doubles as the message ref.
    pub fn join(topic: impl Into<String>, join_ref: u64, params: &JoinParams) -> Result<Self> {
        Ok(Self {
            join_ref: Some(join_ref.to_string()),
            msg_ref: Some(join_ref.to_string()),
            topic: topic.into(),
            event: PHX_JOIN.to_owned(),
            payload: serde_json::to_value(params)?,
        })
    }

    /// `phx_leave` for a previously joined `topic`.
    pub fn leave(topic: impl Into<String>, join_ref: u64, msg_ref: u64) -> Self {
        Self {
            join_ref: Some(join_ref.to_string()),
            msg_ref: Some(msg_ref.to_string()),
            topic: topic.into(),
            event: PHX_LEAVE.to_owned(),
            payload: Value::Object(serde_json::Map::new()),
        }
    }

    /// Socket heartbeat.
    pub fn heartbeat(msg_ref: u64) -> Self {
        Self {
            join_ref: None,
            msg_ref: Some(msg_ref.to_string()),
            topic: PHOENIX_TOPIC.to_owned(),
            event: HEARTBEAT.to_owned(),
            payload: Value::Object(serde_json::Map::new()),
        }
    }

    /// Encode as a WebSocket text payload.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a WebSocket text payload.
    pub fn decode(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| ProtocolError::MalformedFrame(e.to_string()))
    }

    /// Whether this is a reply to the push carrying `msg_ref`.
    pub fn is_reply_to(&self, msg_ref: u64) -> bool {
        self.event == PHX_REPLY && self.msg_ref.as_deref() == Some(msg_ref.to_string().as_str())
    }

    /// Decode the payload of a `phx_reply`.
    pub fn reply(&self) -> Result<Reply> {
        if self.event != PHX_REPLY {
            return Err(ProtocolError::UnexpectedEvent {
                event: self.event.clone(),
                expected: PHX_REPLY,
            });
        }
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}

impl Serialize for ChannelMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        (&self.join_ref, &self.msg_ref, &self.topic, &self.event, &self.payload)
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ChannelMessage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let (join_ref, msg_ref, topic, event, payload) =
            <(Option<String>, Option<String>, String, String, Value)>::deserialize(deserializer)?;
        Ok(Self { join_ref, msg_ref, topic, event, payload })
    }
}

/// Outcome reported in a `phx_reply`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    /// Push accepted.
    Ok,
    /// Push rejected.
    Error,
    /// Server gave up waiting.
    Timeout,
}

/// Payload of a `phx_reply`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    /// Outcome.
    pub status: ReplyStatus,
    /// Server-provided detail.
    #[serde(default)]
    pub response: Value,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn join_encodes_as_v2_array() {
        let msg = ChannelMessage::join("customer:u1", 1, &JoinParams::new("123")).unwrap();
        let text = msg.encode().unwrap();

        assert_eq!(text, r#"["1","1","customer:u1","phx_join",{"token":"123"}]"#);
    }

    #[test]
    fn broadcast_has_null_refs() {
        let msg = ChannelMessage::decode(
            r#"[null,null,"customer:u1","booking_request",{"msg":"Driver assigned"}]"#,
        )
        .unwrap();

        assert_eq!(msg.join_ref, None);
        assert_eq!(msg.msg_ref, None);
        assert_eq!(msg.event, "booking_request");
        assert_eq!(msg.payload, json!({"msg": "Driver assigned"}));
    }

    #[test]
    fn reply_is_matched_by_ref() {
        let msg = ChannelMessage::decode(
            r#"["1","1","customer:u1","phx_reply",{"status":"ok","response":{}}]"#,
        )
        .unwrap();

        assert!(msg.is_reply_to(1));
        assert!(!msg.is_reply_to(2));
        assert_eq!(msg.reply().unwrap().status, ReplyStatus::Ok);
    }

    #[test]
    fn error_reply_decodes_reason() {
        let msg = ChannelMessage::decode(
            r#"["1","1","customer:u1","phx_reply",{"status":"error","response":{"reason":"unauthorized"}}]"#,
        )
        .unwrap();

        let reply = msg.reply().unwrap();
        assert_eq!(reply.status, ReplyStatus::Error);
        assert_eq!(reply.response, json!({"reason": "unauthorized"}));
    }

    #[test]
    fn reply_on_other_event_is_rejected() {
        let msg = ChannelMessage::heartbeat(3);
        assert!(matches!(msg.reply(), Err(ProtocolError::UnexpectedEvent { .. })));
    }

    #[test]
    fn short_array_is_malformed() {
        let err = ChannelMessage::decode(r#"["1","customer:u1","phx_join"]"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedFrame(_)));
    }

    #[test]
    fn heartbeat_targets_phoenix_topic() {
        let text = ChannelMessage::heartbeat(9).encode().unwrap();
        assert_eq!(text, r#"[null,"9","phoenix","heartbeat",{}]"#);
    }
}
