//! The wire message and topic-label mapping this server speaks.
//!
//! Kept deliberately separate from [`sub_registry`]: the registry core
//! never constructs a wire message itself, it only calls back into
//! [`ProtocolMessage`] methods supplied here.

use serde::{Deserialize, Serialize};
use sub_registry::{ActionSet, ProtocolMessage, Topic};

use crate::ws::WsError;

/// The action codes this server's JSON wire format carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionCode {
    /// A client subscribe request.
    Subscribe,
    /// A client unsubscribe request.
    Unsubscribe,
    /// An ack reply.
    Ack,
    /// A duplicate-subscribe reply.
    MultipleSubscriptions,
    /// An unsubscribe-of-unknown-name reply.
    NotSubscribed,
    /// An application data message fanned out to subscribers.
    Event,
    /// A malformed-request reply (parse or validation failure), not part of
    /// the registry's own protocol-reply vocabulary but needed so
    /// this wire format can report them at all.
    Error,
}

/// One JSON message exchanged over the socket: a request, an ack, a
/// protocol reply, or a fanned-out event, distinguished by `action`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    /// The wire label for the topic this message is about (see
    /// [`parse_topic`]).
    pub topic: String,
    /// The action this message carries.
    pub action: ActionCode,
    /// The subscription name this message is about, when applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// On a `MULTIPLE_SUBSCRIPTIONS`/`NOT_SUBSCRIBED` reply, the action of
    /// the request that provoked it (the client's `SUBSCRIBE`/`UNSUBSCRIBE`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_action: Option<ActionCode>,
    /// Subscription names for a bulk subscribe/unsubscribe request. When
    /// present, `name` is ignored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<String>>,
    /// Caller-supplied correlation id, echoed back on acks and replies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Application payload, present on `Event` messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl WireMessage {
    /// A subscribe request for `name` on `topic`.
    pub fn subscribe_request(topic: &str, name: &str, correlation_id: Option<String>) -> Self {
        Self {
            topic: topic.to_string(),
            action: ActionCode::Subscribe,
            name: Some(name.to_string()),
            original_action: None,
            names: None,
            correlation_id,
            data: None,
        }
    }

    /// An unsubscribe request for `name` on `topic`.
    pub fn unsubscribe_request(topic: &str, name: &str, correlation_id: Option<String>) -> Self {
        Self {
            topic: topic.to_string(),
            action: ActionCode::Unsubscribe,
            name: Some(name.to_string()),
            original_action: None,
            names: None,
            correlation_id,
            data: None,
        }
    }

    /// A reply reporting that `message` could not be processed, with no
    /// topic/registry context available (parse failures, unknown topics).
    pub fn error_reply(code: i32, text: &str, correlation_id: Option<String>) -> Self {
        Self {
            topic: String::new(),
            action: ActionCode::Error,
            name: None,
            original_action: None,
            names: None,
            correlation_id,
            data: Some(serde_json::json!({ "code": code, "message": text })),
        }
    }
}

impl ProtocolMessage for WireMessage {
    type Action = ActionCode;

    fn action(&self) -> ActionCode {
        self.action
    }

    fn ack(&self) -> Self {
        Self {
            action: ActionCode::Ack,
            ..self.clone()
        }
    }

    fn multiple_subscriptions(&self, action: ActionCode, name: &str) -> Self {
        Self {
            action,
            name: Some(name.to_string()),
            original_action: Some(self.action),
            data: None,
            ..self.clone()
        }
    }

    fn not_subscribed(&self, action: ActionCode, name: &str) -> Self {
        Self {
            action,
            name: Some(name.to_string()),
            original_action: Some(self.action),
            data: None,
            ..self.clone()
        }
    }
}

/// The canonical action codes bound on every registry this server
/// constructs.
pub fn default_actions() -> ActionSet<ActionCode> {
    ActionSet {
        subscribe: ActionCode::Subscribe,
        unsubscribe: ActionCode::Unsubscribe,
        multiple_subscriptions: ActionCode::MultipleSubscriptions,
        not_subscribed: ActionCode::NotSubscribed,
    }
}

/// Parses a wire topic label into the registry's internal [`Topic`].
pub fn parse_topic(label: &str) -> Result<Topic, WsError> {
    match label.to_ascii_uppercase().as_str() {
        "RECORD" => Ok(Topic::Record),
        "EVENT" => Ok(Topic::Event),
        "RPC" => Ok(Topic::Rpc),
        "PRESENCE" => Ok(Topic::Presence),
        "MONITORING" => Ok(Topic::Monitoring),
        "RECORD_LISTEN_PATTERNS" => Ok(Topic::RecordListenPatterns),
        "EVENT_LISTEN_PATTERNS" => Ok(Topic::EventListenPatterns),
        _ => Err(WsError::InvalidParams),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_topic_labels() {
        assert_eq!(parse_topic("event").unwrap(), Topic::Event);
        assert_eq!(parse_topic("RECORD_LISTEN_PATTERNS").unwrap(), Topic::RecordListenPatterns);
        assert!(parse_topic("bogus").is_err());
    }

    #[test]
    fn ack_preserves_topic_and_name() {
        let req = WireMessage::subscribe_request("event", "room/1", Some("k".to_string()));
        let ack = req.ack();
        assert_eq!(ack.action, ActionCode::Ack);
        assert_eq!(ack.topic, "event");
        assert_eq!(ack.correlation_id.as_deref(), Some("k"));
    }

    #[test]
    fn multiple_subscriptions_echoes_original_action() {
        let req = WireMessage::subscribe_request("event", "room/1", Some("k".to_string()));
        let reply = req.multiple_subscriptions(ActionCode::MultipleSubscriptions, "room/1");
        assert_eq!(reply.action, ActionCode::MultipleSubscriptions);
        assert_eq!(reply.original_action, Some(ActionCode::Subscribe));
        assert_eq!(reply.name.as_deref(), Some("room/1"));
    }

    #[test]
    fn not_subscribed_echoes_original_action() {
        let req = WireMessage::unsubscribe_request("event", "room/1", Some("k".to_string()));
        let reply = req.not_subscribed(ActionCode::NotSubscribed, "room/1");
        assert_eq!(reply.action, ActionCode::NotSubscribed);
        assert_eq!(reply.original_action, Some(ActionCode::Unsubscribe));
        assert_eq!(reply.name.as_deref(), Some("room/1"));
    }
}
