// ABOUTME: Implements the Registry - the table of tools built once at startup -
// ABOUTME: and invoke(), which turns any invocation into exactly one ToolResult.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error, info, warn};

use super::{schema, Capability, Tool, ToolContext, ToolDescriptor, ToolMessage, ToolResult};
use crate::error::ToolError;
use crate::llm::ToolDefinition;

/// One request to run a tool.
#[derive(Debug, Clone, Default)]
pub struct ToolInvocation {
    pub tool_name: String,
    /// Provider to report and use; falls back to the context's.
    pub provider: Option<String>,
    /// Model to use; falls back to the context's.
    pub model: Option<String>,
    pub arguments: serde_json::Value,
    /// Don't warn when a completion-backed tool reports no usage metrics.
    pub skip_metrics_validation: bool,
}

impl ToolInvocation {
    pub fn new(tool_name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
            ..Default::default()
        }
    }

    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn skip_metrics_validation(mut self) -> Self {
        self.skip_metrics_validation = true;
        self
    }
}

/// Collects tools before the registry is frozen.
#[derive(Default)]
pub struct RegistryBuilder {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Fails if the name is taken.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<&mut Self, ToolError> {
        self.register_arc(Arc::new(tool))
    }

    /// Register a tool from an Arc. Fails if the name is taken.
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<&mut Self, ToolError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(ToolError::Registration(name));
        }
        debug!(tool = %name, "Registered tool");
        self.tools.insert(name, tool);
        Ok(self)
    }

    /// Freeze the table.
    pub fn build(self) -> Registry {
        Registry {
            tools: Arc::new(self.tools),
        }
    }
}

/// An immutable, cheaply cloneable table of tools.
#[derive(Clone, Default)]
pub struct Registry {
    tools: Arc<HashMap<String, Arc<dyn Tool>>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List all tool names, sorted alphabetically.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<_> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the number of registered tools.
    pub fn count(&self) -> usize {
        self.tools.len()
    }

    /// Published descriptors, sorted by name.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.list()
            .iter()
            .filter_map(|name| self.descriptor(name))
            .collect()
    }

    pub fn descriptor(&self, name: &str) -> Option<ToolDescriptor> {
        self.tools.get(name).map(|t| ToolDescriptor::of(t.as_ref()))
    }

    /// Tool definitions for the completion capability, sorted by name.
    pub fn to_definitions(&self) -> Vec<ToolDefinition> {
        self.descriptors().into_iter().map(to_definition).collect()
    }

    /// Tool definitions for just the named tools that exist.
    pub fn to_definitions_for(&self, names: &[&str]) -> Vec<ToolDefinition> {
        names
            .iter()
            .filter_map(|name| self.descriptor(name))
            .map(to_definition)
            .collect()
    }

    /// Run a tool. Never fails: every outcome, including panics inside the
    /// handler, comes back as a ToolResult.
    pub async fn invoke(&self, invocation: &ToolInvocation, ctx: &ToolContext) -> ToolResult {
        let name = invocation.tool_name.as_str();

        let Some(tool) = self.get(name) else {
            warn!(tool = %name, "Unknown tool");
            return ToolResult::from_error(name, &ToolError::UnknownTool(name.to_string()));
        };

        if let Err(violation) = schema::validate(&tool.schema(), &invocation.arguments) {
            warn!(tool = %name, %violation, "Rejected arguments");
            return ToolResult::from_error(
                name,
                &ToolError::InvalidArguments(violation.to_string()),
            );
        }

        let required = tool.required_capabilities();
        let missing = ctx.capabilities().missing(&required);
        if !missing.is_empty() {
            warn!(tool = %name, ?missing, "Missing capabilities");
            return ToolResult::from_error(
                name,
                &ToolError::UnsupportedCapability {
                    tool: name.to_string(),
                    missing,
                },
            );
        }

        let call_ctx = ctx.for_invocation(invocation, self.clone());
        debug!(tool = %name, model = %call_ctx.model, "Invoking tool");

        let outcome = AssertUnwindSafe(tool.execute(invocation.arguments.clone(), &call_ctx))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(output)) => {
                let mut result = ToolResult::from_output(output);
                if required.contains(Capability::TextCompletion)
                    && !invocation.skip_metrics_validation
                {
                    check_metrics(name, &mut result);
                }
                info!(
                    tool = %name,
                    messages = result.messages.len(),
                    "Tool succeeded"
                );
                result
            }
            Ok(Err(err)) => {
                warn!(tool = %name, kind = err.kind(), error = %err, "Tool failed");
                ToolResult::from_error(name, &err)
            }
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(tool = %name, %reason, "Tool panicked");
                ToolResult::from_error(
                    name,
                    &ToolError::Execution(anyhow::anyhow!("handler panicked: {}", reason)),
                )
            }
        }
    }

    /// Shorthand for invoking by name with default invocation settings.
    pub async fn invoke_named(
        &self,
        name: &str,
        arguments: serde_json::Value,
        ctx: &ToolContext,
    ) -> ToolResult {
        self.invoke(&ToolInvocation::new(name, arguments), ctx).await
    }
}

fn to_definition(descriptor: ToolDescriptor) -> ToolDefinition {
    ToolDefinition {
        name: descriptor.name,
        description: descriptor.description,
        input_schema: descriptor.parameter_schema,
    }
}

fn check_metrics(name: &str, result: &mut ToolResult) {
    let problem = match &result.metrics {
        None => Some("no usage metrics reported"),
        Some(m) if m.calls == 0 => Some("usage metrics report zero completion calls"),
        Some(m) if m.model.is_empty() => Some("usage metrics do not name a model"),
        Some(_) => None,
    };
    if let Some(problem) = problem {
        debug!(tool = %name, problem, "Metrics validation");
        result.messages.push(ToolMessage::warning(name, problem));
    }
}
