// ABOUTME: Defines the Tool trait - a named, schema-described capability an
// ABOUTME: agent can invoke - and the typed argument helper handlers use.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Capabilities, ToolContext, ToolOutput};
use crate::error::ToolError;

/// A tool that can be invoked by an agent.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the unique name of this tool.
    fn name(&self) -> &str;

    /// Returns a human-readable description for the model.
    fn description(&self) -> &str;

    /// Returns the JSON Schema for the tool's input parameters.
    fn schema(&self) -> serde_json::Value;

    /// Capabilities the invocation context must provide.
    fn required_capabilities(&self) -> Capabilities {
        Capabilities::none()
    }

    /// Execute the tool. `params` have already been validated against
    /// [`Tool::schema`].
    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolOutput, ToolError>;
}

/// The published, immutable view of a registered tool.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameter_schema: serde_json::Value,
    pub required_capabilities: Capabilities,
}

impl ToolDescriptor {
    pub fn of(tool: &dyn Tool) -> Self {
        Self {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            parameter_schema: tool.schema(),
            required_capabilities: tool.required_capabilities(),
        }
    }
}

/// Deserialize validated arguments into a handler's argument struct.
pub fn parse_args<T: DeserializeOwned>(params: serde_json::Value) -> Result<T, ToolError> {
    serde_json::from_value(params).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}
