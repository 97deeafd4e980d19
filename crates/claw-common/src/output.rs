//! Hook output generation for stdout.

use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Hook-specific output structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSpecificOutput {
    /// Hook event name
    pub hook_event_name: String,

    /// Additional context message (the rendered debug tag)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,

    /// Structured payload for the host
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Main hook output structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookOutput {
    /// Hook-specific output
    pub hook_specific_output: HookSpecificOutput,
}

impl HookOutput {
    /// Create a new hook output for the given event.
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            hook_specific_output: HookSpecificOutput {
                hook_event_name: event.into(),
                additional_context: None,
                data: None,
            },
        }
    }

    /// Create a new hook output for `message:received`.
    pub fn message_received() -> Self {
        Self::new("message:received")
    }

    /// Add additional context message.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.hook_specific_output.additional_context = Some(context.into());
        self
    }

    /// Attach a structured payload.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.hook_specific_output.data = Some(data);
        self
    }

    /// Write the output to stdout.
    pub fn write_stdout(&self) -> anyhow::Result<()> {
        let json = serde_json::to_string(self)?;
        let mut stdout = io::stdout().lock();
        stdout.write_all(json.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_received_output() {
        let output = HookOutput::message_received().with_context("[🔥 7.5 ctx:3⟳]");
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"hookEventName\":\"message:received\""));
        assert!(json.contains("\"additionalContext\":\"[🔥 7.5 ctx:3⟳]\""));
        assert!(!json.contains("\"data\""));
    }

    #[test]
    fn test_with_data() {
        let output = HookOutput::message_received().with_data(serde_json::json!({"score": 4.0}));
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"data\":{\"score\":4.0}"));
    }
}
