//! Hook input parsing from stdin.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Read};

/// Payload delivered by the host on the `message:received` hook.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageReceived {
    /// Message text after host-side normalization
    #[serde(default)]
    pub body: Option<String>,

    /// Message text exactly as received
    #[serde(default)]
    pub raw_body: Option<String>,

    /// Sender identifier
    #[serde(default)]
    pub sender_id: Option<String>,

    /// Channel name (e.g., "telegram", "discord")
    #[serde(default)]
    pub channel: Option<String>,

    /// Chat type (e.g., "direct", "group")
    #[serde(default)]
    pub chat_type: Option<String>,

    /// Host message id
    #[serde(default)]
    pub message_id: Option<String>,

    /// Id of the message this one replies to
    #[serde(default)]
    pub reply_to_id: Option<String>,

    /// Whether the agent was mentioned
    #[serde(default)]
    pub was_mentioned: bool,

    /// Workspace root configured in the host
    #[serde(default)]
    pub workspace_dir: Option<String>,

    /// Additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl MessageReceived {
    /// Read and parse the hook payload from stdin.
    pub fn from_stdin() -> anyhow::Result<Self> {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input)?;
        Self::parse(&input)
    }

    /// Parse a payload. Blank input yields an empty payload.
    pub fn parse(input: &str) -> anyhow::Result<Self> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(input)?)
    }

    /// Message text, preferring the normalized body over the raw one.
    pub fn text(&self) -> &str {
        self.body
            .as_deref()
            .filter(|b| !b.trim().is_empty())
            .or(self.raw_body.as_deref())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_payload() {
        let json = r#"{
            "body": "hello there",
            "rawBody": "hello there!",
            "senderId": "42",
            "channel": "telegram",
            "chatType": "direct",
            "messageId": "m-1",
            "replyToId": "m-0",
            "wasMentioned": true,
            "workspaceDir": "/home/me/clawd",
            "accountId": "acc"
        }"#;
        let input = MessageReceived::parse(json).unwrap();
        assert_eq!(input.text(), "hello there");
        assert_eq!(input.sender_id.as_deref(), Some("42"));
        assert_eq!(input.chat_type.as_deref(), Some("direct"));
        assert!(input.was_mentioned);
        assert_eq!(input.workspace_dir.as_deref(), Some("/home/me/clawd"));
        assert!(input.extra.contains_key("accountId"));
    }

    #[test]
    fn test_falls_back_to_raw_body() {
        let input = MessageReceived::parse(r#"{"body": "  ", "rawBody": "raw"}"#).unwrap();
        assert_eq!(input.text(), "raw");
    }

    #[test]
    fn test_empty_input() {
        let input = MessageReceived::parse("").unwrap();
        assert_eq!(input.text(), "");
        assert!(!input.was_mentioned);
    }
}
