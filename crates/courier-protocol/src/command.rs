//! The outbound wire payload: commands consumed from the per-bot queue.

use serde_json::{Value, json};

use crate::CodecError;

/// The action a command asks the bot to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandMethod {
    SendMessage,
    SendTyping,
    /// Anything else found on the wire. Carried verbatim so the rejection
    /// can name the method; not a decode error, because an unknown method
    /// on a well-shaped command is the dispatcher's call to refuse.
    Unknown(String),
}

impl CommandMethod {
    fn parse(raw: &str) -> Self {
        match raw {
            "sendMessage" => Self::SendMessage,
            "sendTyping" => Self::SendTyping,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The method's name as it appears on the wire.
    pub fn wire_name(&self) -> &str {
        match self {
            Self::SendMessage => "sendMessage",
            Self::SendTyping => "sendTyping",
            Self::Unknown(other) => other,
        }
    }
}

/// One command addressed to a live bot instance.
///
/// `content` is only meaningful for `sendMessage`; its presence is checked
/// at execution time, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundCommand {
    pub method: CommandMethod,
    pub guild_id: String,
    pub channel_id: String,
    pub content: Option<String>,
}

impl OutboundCommand {
    /// Decode and shape-check a payload taken off the command queue.
    ///
    /// A payload that is not a JSON object, or is missing `method`,
    /// `guildId`, or `channelId`, is rejected before any resolution is
    /// attempted.
    pub fn from_value(payload: &Value) -> Result<Self, CodecError> {
        let object = payload.as_object().ok_or(CodecError::NotAnObject)?;
        let field = |name: &'static str| {
            object
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_owned)
                .ok_or(CodecError::MissingField(name))
        };
        Ok(Self {
            method: CommandMethod::parse(&field("method")?),
            guild_id: field("guildId")?,
            channel_id: field("channelId")?,
            content: object
                .get("content")
                .and_then(Value::as_str)
                .map(str::to_owned),
        })
    }

    /// Encode for the wire, the inverse of [`OutboundCommand::from_value`].
    pub fn to_value(&self) -> Value {
        json!({
            "method": self.method.wire_name(),
            "guildId": self.guild_id,
            "channelId": self.channel_id,
            "content": self.content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_send_message() {
        let payload = json!({
            "method": "sendMessage",
            "guildId": "1",
            "channelId": "2",
            "content": "hi",
        });
        let command = OutboundCommand::from_value(&payload).unwrap();
        assert_eq!(command.method, CommandMethod::SendMessage);
        assert_eq!(command.guild_id, "1");
        assert_eq!(command.channel_id, "2");
        assert_eq!(command.content.as_deref(), Some("hi"));
    }

    #[test]
    fn decodes_send_typing_without_content() {
        let payload = json!({"method": "sendTyping", "guildId": "1", "channelId": "2"});
        let command = OutboundCommand::from_value(&payload).unwrap();
        assert_eq!(command.method, CommandMethod::SendTyping);
        assert_eq!(command.content, None);
    }

    #[test]
    fn rejects_each_missing_required_field() {
        for missing in ["method", "guildId", "channelId"] {
            let mut payload = json!({"method": "sendTyping", "guildId": "1", "channelId": "2"});
            payload.as_object_mut().unwrap().remove(missing);
            let error = OutboundCommand::from_value(&payload).unwrap_err();
            assert!(
                matches!(error, CodecError::MissingField(name) if name == missing),
                "expected rejection for missing `{missing}`, got {error}"
            );
        }
    }

    #[test]
    fn rejects_non_string_required_field() {
        let payload = json!({"method": "sendTyping", "guildId": 1, "channelId": "2"});
        let error = OutboundCommand::from_value(&payload).unwrap_err();
        assert!(matches!(error, CodecError::MissingField("guildId")));
    }

    #[test]
    fn rejects_non_object_payload() {
        let error = OutboundCommand::from_value(&json!("not json at all")).unwrap_err();
        assert!(matches!(error, CodecError::NotAnObject));
    }

    #[test]
    fn unknown_method_decodes_and_keeps_its_name() {
        let payload = json!({"method": "dance", "guildId": "1", "channelId": "2"});
        let command = OutboundCommand::from_value(&payload).unwrap();
        assert_eq!(command.method, CommandMethod::Unknown("dance".into()));
        assert_eq!(command.method.wire_name(), "dance");
    }

    #[test]
    fn to_value_round_trips() {
        let command = OutboundCommand {
            method: CommandMethod::SendMessage,
            guild_id: "10".into(),
            channel_id: "20".into(),
            content: Some("hello".into()),
        };
        assert_eq!(
            OutboundCommand::from_value(&command.to_value()).unwrap(),
            command
        );
    }
}
