// ABOUTME: Stateful transcript over a stateless completion capability.
// ABOUTME: Every send carries the full history; usage accumulates into Metrics.

use super::{
    ContentBlock, JsonSchemaFormat, LlmClient, Message, Metrics, Request, Response, Role,
    ToolDefinition,
};
use crate::error::LlmError;

/// A multi-turn exchange with a completion backend.
#[derive(Debug, Clone)]
pub struct Conversation {
    system: String,
    model: String,
    messages: Vec<Message>,
    tools: Vec<ToolDefinition>,
    json_schema: Option<JsonSchemaFormat>,
    max_tokens: Option<u32>,
    metrics: Metrics,
}

impl Conversation {
    pub fn new(
        system: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let model = model.into();
        Self {
            system: system.into(),
            metrics: Metrics::new(provider, model.clone()),
            model,
            messages: Vec::new(),
            tools: Vec::new(),
            json_schema: None,
            max_tokens: None,
        }
    }

    /// Offer tools to the model on every turn.
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// Constrain every reply to a JSON schema.
    pub fn with_json_schema(mut self, name: impl Into<String>, schema: serde_json::Value) -> Self {
        self.json_schema = Some(JsonSchemaFormat {
            name: name.into(),
            schema,
        });
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Append a user turn.
    pub fn user(&mut self, text: impl Into<String>) {
        self.messages.push(Message::user(text));
    }

    /// Append tool results answering the previous assistant turn.
    pub fn tool_results(&mut self, results: Vec<ContentBlock>) {
        self.messages.push(Message::tool_results(results));
    }

    /// Send the whole transcript and record the reply as an assistant turn.
    pub async fn send(&mut self, client: &dyn LlmClient) -> Result<Response, LlmError> {
        let mut request = Request::new(&self.model)
            .system(&self.system)
            .messages(self.messages.iter().cloned())
            .tools(self.tools.iter().cloned());
        request.json_schema = self.json_schema.clone();
        request.max_tokens = self.max_tokens;

        let response = client.create_message(&request).await?;
        self.metrics.record(&response);

        if !response.content.is_empty() {
            self.messages.push(Message {
                role: Role::Assistant,
                content: response.content.clone(),
            });
        }

        Ok(response)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn into_metrics(self) -> Metrics {
        self.metrics
    }
}
