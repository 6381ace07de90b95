//! The inbound wire payload: what gets published to the `inbox` queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CodecError;

/// Canonical projection of one chat message.
///
/// Mirrors the gateway event field-for-field plus the three derived
/// relevance booleans. Every optional field serializes as an explicit
/// `null` rather than being omitted, so consumers never have to probe for
/// key presence. The timestamp is always an absolute instant (RFC 3339),
/// never a platform-relative value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMessage {
    pub id: Option<String>,
    pub content: Option<String>,
    pub clean_content: Option<String>,
    pub author_id: Option<String>,
    pub author_username: Option<String>,
    pub author_nickname: Option<String>,
    pub channel_id: Option<String>,
    pub guild_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub mentioned_user_ids: Vec<String>,
    pub mentioned_role_ids: Vec<String>,
    pub reply_to_message_id: Option<String>,
    pub mentions_me: bool,
    pub is_reply_to_me: bool,
    pub mentions_my_role: bool,
}

/// Reduced projection of one past message shipped as channel history.
///
/// At most 100 entries accompany an envelope, in whatever recency order
/// the platform returned them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub message_id: Option<String>,
    pub author_id: Option<String>,
    pub author_username: Option<String>,
    pub author_nickname: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub content: Option<String>,
}

/// One unit of work for an external consumer: the message that fired, the
/// channel history behind it, and enough routing identity (`my_id`,
/// `rsvp`) for a relevance-agnostic consumer to correlate and reply.
///
/// Built fresh per relevant event, never mutated after construction, and
/// discarded once serialized onto the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxEnvelope {
    /// The publishing bot's own platform identity.
    pub my_id: String,
    /// Queue name answers should be sent to, always `discord_<my_id>`.
    pub rsvp: String,
    /// The event author's role ids, in platform order.
    pub author_roles: Vec<String>,
    pub message: NormalizedMessage,
    pub history: Vec<HistoryEntry>,
}

impl InboxEnvelope {
    /// Serialize for the wire. The single encode point for the inbound
    /// direction.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(self).map_err(CodecError::Encode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn empty_envelope() -> InboxEnvelope {
        InboxEnvelope {
            my_id: "42".into(),
            rsvp: "discord_42".into(),
            author_roles: Vec::new(),
            message: NormalizedMessage::default(),
            history: Vec::new(),
        }
    }

    #[test]
    fn absent_fields_serialize_as_null_not_dropped() {
        let value = serde_json::to_value(empty_envelope()).unwrap();
        let message = &value["message"];
        for key in [
            "id",
            "content",
            "cleanContent",
            "authorId",
            "authorUsername",
            "authorNickname",
            "channelId",
            "guildId",
            "timestamp",
            "replyToMessageId",
        ] {
            assert_eq!(message[key], Value::Null, "expected null `{key}`");
            assert!(message.as_object().unwrap().contains_key(key));
        }
        assert_eq!(message["mentionedUserIds"], json!([]));
        assert_eq!(message["mentionsMe"], json!(false));
    }

    #[test]
    fn wire_names_are_camel_case() {
        let value = serde_json::to_value(empty_envelope()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 5);
        for key in ["myId", "rsvp", "authorRoles", "message", "history"] {
            assert!(object.contains_key(key), "missing wire key `{key}`");
        }
    }

    #[test]
    fn timestamp_serializes_as_rfc3339() {
        let mut envelope = empty_envelope();
        envelope.message.timestamp = DateTime::from_timestamp_millis(1_700_000_000_000);
        let value = serde_json::to_value(envelope).unwrap();
        let rendered = value["message"]["timestamp"].as_str().unwrap();
        assert!(rendered.starts_with("2023-11-14T22:13:20"), "{rendered}");
    }

    #[test]
    fn to_bytes_round_trips() {
        let bytes = empty_envelope().to_bytes().unwrap();
        let back: InboxEnvelope = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, empty_envelope());
    }
}
