// ABOUTME: Tests for Registry - registration, lookup, and the invoke contract.
// ABOUTME: Uses small mock tools covering every failure path.

use std::sync::Arc;

use super::*;
use crate::config::Config;
use crate::error::ToolError;
use crate::llm::{Metrics, ScriptedClient};

/// Echoes its message back.
struct EchoTool;

#[async_trait::async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echoes input back"
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "message": { "type": "string" }
            },
            "required": ["message"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        #[derive(serde::Deserialize)]
        struct Params {
            message: String,
        }
        let params: Params = parse_args(params)?;
        Ok(ToolOutput::new(params.message))
    }
}

/// Fails, errors, or panics depending on `mode`.
struct FaultyTool;

#[async_trait::async_trait]
impl Tool for FaultyTool {
    fn name(&self) -> &str {
        "faulty"
    }

    fn description(&self) -> &str {
        "Misbehaves on request"
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "mode": { "type": "string", "enum": ["error", "panic"] }
            },
            "required": ["mode"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        match params["mode"].as_str() {
            Some("panic") => panic!("handler blew up"),
            _ => Err(ToolError::InvalidReference("Component not found: x".into())),
        }
    }
}

/// Requires a completion backend and reports (or omits) metrics.
struct CompletionTool {
    with_metrics: bool,
}

#[async_trait::async_trait]
impl Tool for CompletionTool {
    fn name(&self) -> &str {
        "completion"
    }

    fn description(&self) -> &str {
        "Pretends to call the model"
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object" })
    }

    fn required_capabilities(&self) -> Capabilities {
        Capabilities::from([Capability::TextCompletion])
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        let output = ToolOutput::new(serde_json::json!({ "model": ctx.model }));
        if self.with_metrics {
            let mut metrics = Metrics::new(&ctx.provider, &ctx.model);
            metrics.calls = 1;
            Ok(output.with_metrics(metrics))
        } else {
            Ok(output)
        }
    }
}

fn registry() -> Registry {
    let mut builder = Registry::builder();
    builder.register(EchoTool).unwrap();
    builder.register(FaultyTool).unwrap();
    builder.build()
}

fn llm_context() -> ToolContext {
    ToolContext::new(Config::default()).with_llm(
        Arc::new(ScriptedClient::new(vec![])),
        Capabilities::none(),
    )
}

#[test]
fn test_register_and_get() {
    let registry = registry();
    assert_eq!(registry.get("echo").unwrap().name(), "echo");
    assert!(registry.get("nonexistent").is_none());
    assert_eq!(registry.list(), vec!["echo", "faulty"]);
}

#[test]
fn test_duplicate_registration_rejected() {
    let mut builder = Registry::builder();
    builder.register(EchoTool).unwrap();
    let err = builder.register(EchoTool).err().unwrap();
    assert!(matches!(err, ToolError::Registration(name) if name == "echo"));
}

#[test]
fn test_descriptors_and_definitions() {
    let registry = registry();
    let descriptors = registry.descriptors();
    assert_eq!(descriptors.len(), 2);
    assert_eq!(descriptors[0].name, "echo");
    assert_eq!(descriptors[0].parameter_schema["required"][0], "message");

    let defs = registry.to_definitions_for(&["faulty", "missing"]);
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].description, "Misbehaves on request");
}

#[test]
fn test_clone_shares_table() {
    let registry = registry();
    let clone = registry.clone();
    assert_eq!(clone.count(), registry.count());
}

#[tokio::test]
async fn test_invoke_success() {
    let result = registry()
        .invoke_named("echo", serde_json::json!({ "message": "hi" }), &ToolContext::default())
        .await;

    assert!(result.success);
    assert_eq!(result.payload, Some(serde_json::json!("hi")));
    assert!(result.error_message.is_none());
}

#[tokio::test]
async fn test_invoke_unknown_tool() {
    let result = registry()
        .invoke_named("nope", serde_json::json!({}), &ToolContext::default())
        .await;

    assert!(!result.success);
    assert_eq!(result.error_message.as_deref(), Some("Unknown tool: nope"));
}

#[tokio::test]
async fn test_invoke_invalid_arguments_names_violation() {
    let result = registry()
        .invoke_named("echo", serde_json::json!({ "message": 5 }), &ToolContext::default())
        .await;

    assert!(!result.success);
    let message = result.error_message.unwrap();
    assert!(message.starts_with("Invalid arguments"));
    assert!(message.contains("/message"));
}

#[tokio::test]
async fn test_invoke_unsupported_capability() {
    let mut builder = Registry::builder();
    builder.register(CompletionTool { with_metrics: true }).unwrap();
    let registry = builder.build();

    let result = registry
        .invoke_named("completion", serde_json::json!({}), &ToolContext::default())
        .await;

    assert!(!result.success);
    assert!(result.error_message.unwrap().contains("text_completion"));
}

#[tokio::test]
async fn test_handler_error_becomes_result() {
    let result = registry()
        .invoke_named("faulty", serde_json::json!({ "mode": "error" }), &ToolContext::default())
        .await;

    assert!(!result.success);
    assert_eq!(
        result.error_message.as_deref(),
        Some("Invalid reference: Component not found: x")
    );
}

#[tokio::test]
async fn test_handler_panic_becomes_result() {
    let result = registry()
        .invoke_named("faulty", serde_json::json!({ "mode": "panic" }), &ToolContext::default())
        .await;

    assert!(!result.success);
    assert!(result.error_message.unwrap().contains("handler blew up"));
}

#[tokio::test]
async fn test_invocation_overrides_model() {
    let mut builder = Registry::builder();
    builder.register(CompletionTool { with_metrics: true }).unwrap();
    let registry = builder.build();

    let invocation = ToolInvocation::new("completion", serde_json::json!({}))
        .provider("stub")
        .model("tiny");
    let result = registry.invoke(&invocation, &llm_context()).await;

    assert!(result.success);
    assert_eq!(result.payload.unwrap()["model"], "tiny");
    assert_eq!(result.metrics.unwrap().provider, "stub");
    assert!(result.messages.is_empty());
}

#[tokio::test]
async fn test_missing_metrics_warns_unless_skipped() {
    let mut builder = Registry::builder();
    builder.register(CompletionTool { with_metrics: false }).unwrap();
    let registry = builder.build();
    let ctx = llm_context();

    let result = registry
        .invoke(&ToolInvocation::new("completion", serde_json::json!({})), &ctx)
        .await;
    assert!(result.success);
    assert_eq!(result.messages.len(), 1);
    assert_eq!(result.messages[0].severity, Severity::Warning);

    let skipped = registry
        .invoke(
            &ToolInvocation::new("completion", serde_json::json!({})).skip_metrics_validation(),
            &ctx,
        )
        .await;
    assert!(skipped.messages.is_empty());
}
