// ABOUTME: Defines the ToolResult envelope returned by every invocation and
// ABOUTME: the ToolOutput a handler produces on success.

use serde::{Deserialize, Serialize};

use crate::error::ToolError;
use crate::llm::{ContentBlock, Metrics};

/// Severity of a diagnostic message attached to a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A structured diagnostic carried alongside the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolMessage {
    pub severity: Severity,
    /// Where the message came from, usually the tool name.
    pub origin: String,
    pub text: String,
}

impl ToolMessage {
    pub fn info(origin: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            origin: origin.into(),
            text: text.into(),
        }
    }

    pub fn warning(origin: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            origin: origin.into(),
            text: text.into(),
        }
    }

    pub fn error(origin: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            origin: origin.into(),
            text: text.into(),
        }
    }
}

/// What a handler returns on success.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub payload: serde_json::Value,
    pub metrics: Option<Metrics>,
    pub messages: Vec<ToolMessage>,
}

impl ToolOutput {
    /// Output carrying just a payload.
    pub fn new(payload: impl Serialize) -> Self {
        Self {
            payload: serde_json::to_value(payload).unwrap_or(serde_json::Value::Null),
            metrics: None,
            messages: Vec::new(),
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_message(mut self, message: ToolMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_messages(mut self, messages: impl IntoIterator<Item = ToolMessage>) -> Self {
        self.messages.extend(messages);
        self
    }
}

/// Result of a tool invocation: exactly one per invocation, success or error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub success: bool,
    pub payload: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub metrics: Option<Metrics>,
    #[serde(default)]
    pub messages: Vec<ToolMessage>,
}

impl ToolResult {
    /// Wrap a handler's output.
    pub fn from_output(output: ToolOutput) -> Self {
        Self {
            success: true,
            payload: Some(output.payload),
            error_message: None,
            metrics: output.metrics,
            messages: output.messages,
        }
    }

    /// Create an error result from a message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: None,
            error_message: Some(message.into()),
            metrics: None,
            messages: Vec::new(),
        }
    }

    /// Create an error result from a ToolError, keeping its kind as a message.
    pub fn from_error(origin: &str, err: &ToolError) -> Self {
        let text = err.to_string();
        Self {
            messages: vec![ToolMessage::error(origin, format!("{}: {}", err.kind(), text))],
            ..Self::error(text)
        }
    }

    /// Add a message to the result.
    pub fn with_message(mut self, message: ToolMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Serialize the envelope for a "tool" conversation turn.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                "{{\"success\":false,\"errorMessage\":\"unserializable result: {}\"}}",
                e
            )
        })
    }

    /// Turn this result into a tool result block answering `tool_use_id`.
    pub fn to_content_block(&self, tool_use_id: &str) -> ContentBlock {
        if self.success {
            ContentBlock::tool_result(tool_use_id, self.to_json_string())
        } else {
            ContentBlock::tool_error(tool_use_id, self.to_json_string())
        }
    }
}
