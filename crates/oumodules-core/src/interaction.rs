//! Inbound interaction parsing.
//!
//! Only the `type` field is read for pings and unrecognized kinds. Message
//! command interactions are parsed strictly: a missing id, token, target or
//! resolved message is a [`CoreError::MalformedRequest`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// Guild id used when the interaction comes from a direct message.
pub const DEFAULT_GUILD_ID: &str = "@me";

/// Interaction type codes.
pub mod interaction_type {
    pub const PING: u64 = 1;
    pub const APPLICATION_COMMAND: u64 = 2;
}

/// A parsed interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    Ping,
    Command(CommandInteraction),
    /// Any other interaction type, carried for logging.
    Unknown(u64),
}

impl Interaction {
    /// Parse a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, CoreError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| CoreError::MalformedRequest(e.to_string()))?;
        Self::from_value(value)
    }

    /// Interpret an already parsed JSON document.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        let kind = value
            .get("type")
            .and_then(Value::as_u64)
            .ok_or_else(|| CoreError::missing("type"))?;

        match kind {
            interaction_type::PING => Ok(Interaction::Ping),
            interaction_type::APPLICATION_COMMAND => {
                CommandInteraction::from_value(value).map(Interaction::Command)
            }
            other => Ok(Interaction::Unknown(other)),
        }
    }
}

/// A message command: the user asked about the codes in `target_message`.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandInteraction {
    pub id: String,
    pub token: String,
    pub guild_id: String,
    pub target_id: String,
    pub target_message: TargetMessage,
}

impl CommandInteraction {
    fn from_value(value: Value) -> Result<Self, CoreError> {
        let raw: RawCommand =
            serde_json::from_value(value).map_err(|e| CoreError::MalformedRequest(e.to_string()))?;

        let RawCommand {
            id,
            token,
            guild_id,
            data: RawCommandData {
                target_id,
                resolved: RawResolved { mut messages },
            },
        } = raw;

        let target_message = messages
            .remove(&target_id)
            .ok_or_else(|| CoreError::missing("data.resolved.messages[target_id]"))?;

        Ok(Self {
            id,
            token,
            guild_id: guild_id.unwrap_or_else(|| DEFAULT_GUILD_ID.to_string()),
            target_id,
            target_message,
        })
    }
}

/// The message the command was invoked on.
///
/// Only `channel_id` is typed. Every other field, `content` included, stays
/// in `fields` exactly as received so the message can be forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetMessage {
    pub channel_id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl TargetMessage {
    pub fn new(channel_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("content".to_string(), Value::String(content.into()));
        Self {
            channel_id: channel_id.into(),
            fields,
        }
    }

    /// Message text, empty when absent or not a string.
    pub fn content(&self) -> &str {
        self.fields
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or("")
    }
}

#[derive(Deserialize)]
struct RawCommand {
    id: String,
    token: String,
    #[serde(default)]
    guild_id: Option<String>,
    data: RawCommandData,
}

#[derive(Deserialize)]
struct RawCommandData {
    target_id: String,
    resolved: RawResolved,
}

#[derive(Deserialize)]
struct RawResolved {
    messages: HashMap<String, TargetMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn command(content: &str) -> Value {
        json!({
            "type": 2,
            "data": {
                "target_id": "foo",
                "resolved": {
                    "messages": {
                        "foo": {"channel_id": "fake_channel_id", "content": content}
                    }
                }
            },
            "guild_id": "fake_guild_id",
            "token": "fake_token",
            "id": "fake_request_id"
        })
    }

    #[test]
    fn test_parse_command() {
        let Interaction::Command(cmd) = Interaction::from_value(command("M208")).unwrap() else {
            panic!("expected command");
        };
        assert_eq!(cmd.id, "fake_request_id");
        assert_eq!(cmd.token, "fake_token");
        assert_eq!(cmd.guild_id, "fake_guild_id");
        assert_eq!(cmd.target_id, "foo");
        assert_eq!(cmd.target_message.channel_id, "fake_channel_id");
        assert_eq!(cmd.target_message.content(), "M208");
    }

    #[test]
    fn test_guild_defaults_to_direct_messages() {
        let mut value = command("M208");
        value.as_object_mut().unwrap().remove("guild_id");

        let Interaction::Command(cmd) = Interaction::from_value(value).unwrap() else {
            panic!("expected command");
        };
        assert_eq!(cmd.guild_id, DEFAULT_GUILD_ID);
    }

    #[test]
    fn test_missing_content_is_empty() {
        let mut value = command("");
        value["data"]["resolved"]["messages"]["foo"]
            .as_object_mut()
            .unwrap()
            .remove("content");

        let Interaction::Command(cmd) = Interaction::from_value(value).unwrap() else {
            panic!("expected command");
        };
        assert!(!cmd.target_message.fields.contains_key("content"));
        assert_eq!(cmd.target_message.content(), "");
    }

    #[test]
    fn test_null_content_is_forwarded_as_null() {
        let mut value = command("");
        value["data"]["resolved"]["messages"]["foo"]["content"] = Value::Null;

        let Interaction::Command(cmd) = Interaction::from_value(value).unwrap() else {
            panic!("expected command");
        };
        assert_eq!(cmd.target_message.content(), "");
        assert_eq!(
            serde_json::to_value(&cmd.target_message).unwrap(),
            json!({"channel_id": "fake_channel_id", "content": null})
        );
    }

    #[test]
    fn test_ping_ignores_other_fields() {
        let body = br#"{"type": 1, "data": "not an object", "token": 7}"#;
        assert_eq!(Interaction::from_slice(body).unwrap(), Interaction::Ping);
    }

    #[test]
    fn test_unknown_type() {
        assert_eq!(
            Interaction::from_slice(br#"{"type": 3}"#).unwrap(),
            Interaction::Unknown(3)
        );
    }

    #[test]
    fn test_malformed_requests() {
        assert!(matches!(
            Interaction::from_slice(b"not json"),
            Err(CoreError::MalformedRequest(_))
        ));
        assert!(matches!(
            Interaction::from_slice(br#"{"id": "1"}"#),
            Err(CoreError::MalformedRequest(_))
        ));

        let mut no_target = command("M208");
        no_target["data"].as_object_mut().unwrap().remove("target_id");
        assert!(matches!(
            Interaction::from_value(no_target),
            Err(CoreError::MalformedRequest(_))
        ));

        let mut wrong_target = command("M208");
        wrong_target["data"]["target_id"] = json!("bar");
        assert!(matches!(
            Interaction::from_value(wrong_target),
            Err(CoreError::MalformedRequest(_))
        ));

        let mut no_token = command("M208");
        no_token.as_object_mut().unwrap().remove("token");
        assert!(matches!(
            Interaction::from_value(no_token),
            Err(CoreError::MalformedRequest(_))
        ));
    }

    #[test]
    fn test_target_message_keeps_extra_fields() {
        let message: TargetMessage = serde_json::from_value(json!({
            "channel_id": "c",
            "content": "M208",
            "author": {"id": "42"}
        }))
        .unwrap();

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({"channel_id": "c", "content": "M208", "author": {"id": "42"}})
        );
    }
}
