// ABOUTME: Per-item bookkeeping shared by the batch canvas tools.
// ABOUTME: Items succeed or fail independently; the report keeps caller order.

use serde::Serialize;
use serde_json::{json, Value};

use crate::canvas::Guid;
use crate::tool::{ToolMessage, ToolOutput};

/// Outcome of a batch where every item is processed independently.
///
/// A batch in which every item failed is still a successful invocation;
/// the failures are the payload.
#[derive(Debug, Default)]
pub struct BatchReport {
    successful: Vec<Value>,
    failed: Vec<Value>,
    warnings: Vec<String>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn succeed(&mut self, item: impl Serialize) {
        self.successful
            .push(serde_json::to_value(item).unwrap_or(Value::Null));
    }

    /// Record a failed item. `item` identifies it as the caller gave it.
    pub fn fail(&mut self, item: impl Serialize, error: impl Into<String>) {
        self.failed.push(json!({
            "item": serde_json::to_value(item).unwrap_or(Value::Null),
            "error": error.into(),
        }));
    }

    pub fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn success_count(&self) -> usize {
        self.successful.len()
    }

    pub fn fail_count(&self) -> usize {
        self.failed.len()
    }

    /// Turn the report into tool output, attributing messages to `tool`.
    pub fn into_output(self, tool: &str) -> ToolOutput {
        let total = self.successful.len() + self.failed.len();
        let mut messages: Vec<ToolMessage> = self
            .warnings
            .into_iter()
            .map(|w| ToolMessage::warning(tool, w))
            .collect();
        if !self.failed.is_empty() {
            messages.push(ToolMessage::warning(
                tool,
                format!("{} of {} items failed", self.failed.len(), total),
            ));
        }

        ToolOutput::new(json!({
            "successCount": self.successful.len(),
            "failCount": self.failed.len(),
            "successful": self.successful,
            "failed": self.failed,
        }))
        .with_messages(messages)
    }
}

/// Parse a GUID given as a tool argument.
pub fn parse_guid(text: &str) -> Result<Guid, String> {
    text.parse().map_err(|_| format!("Invalid GUID: {}", text))
}
