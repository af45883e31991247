// ABOUTME: Tests for ToolResult - constructors, serialization, tool turns.
// ABOUTME: Verifies the envelope shape consumers rely on.

use super::*;
use crate::error::ToolError;
use crate::llm::{ContentBlock, Metrics};

#[test]
fn test_from_output() {
    let output = ToolOutput::new(serde_json::json!({ "count": 2 }))
        .with_message(ToolMessage::info("test", "two items"));
    let result = ToolResult::from_output(output);

    assert!(result.success);
    assert_eq!(result.payload.unwrap()["count"], 2);
    assert!(result.error_message.is_none());
    assert_eq!(result.messages.len(), 1);
}

#[test]
fn test_error_result() {
    let result = ToolResult::error("Something went wrong");
    assert!(!result.success);
    assert!(result.payload.is_none());
    assert_eq!(result.error_message.as_deref(), Some("Something went wrong"));
}

#[test]
fn test_from_error_keeps_kind() {
    let err = ToolError::InvalidReference("Component not found: x".into());
    let result = ToolResult::from_error("gh_get", &err);

    assert!(!result.success);
    assert_eq!(
        result.error_message.as_deref(),
        Some("Invalid reference: Component not found: x")
    );
    assert_eq!(result.messages[0].severity, Severity::Error);
    assert!(result.messages[0].text.starts_with("InvalidReference"));
}

#[test]
fn test_serializes_camel_case() {
    let result = ToolResult::from_output(
        ToolOutput::new("ok").with_metrics(Metrics {
            provider: "stub".into(),
            model: "m".into(),
            input_tokens: 3,
            output_tokens: 4,
            calls: 1,
            finish_reason: None,
        }),
    );
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["payload"], "ok");
    assert!(json["errorMessage"].is_null());
    assert_eq!(json["metrics"]["inputTokens"], 3);
}

#[test]
fn test_content_block_marks_errors() {
    let block = ToolResult::error("nope").to_content_block("call_1");
    match block {
        ContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error,
        } => {
            assert_eq!(tool_use_id, "call_1");
            assert!(is_error);
            assert!(content.contains("nope"));
        }
        other => panic!("Expected tool result block, got {:?}", other),
    }
}
