// ABOUTME: OpenAI-compatible chat completions client.
// ABOUTME: Implements LlmClient, mapping JSON-schema requests to response_format.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ContentBlock, Message, Request, Response, Role, StopReason, ToolDefinition, Usage};
use crate::config::Config;
use crate::error::LlmError;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI API request format.
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    pub model: String,
    pub messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<OpenAITool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<serde_json::Value>,
}

/// OpenAI message format.
#[derive(Debug, Serialize, Deserialize)]
pub struct OpenAIMessage {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<OpenAIToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// OpenAI tool call in a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: OpenAIFunctionCall,
}

/// OpenAI function call details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIFunctionCall {
    pub name: String,
    pub arguments: String,
}

/// OpenAI tool definition.
#[derive(Debug, Serialize)]
pub struct OpenAITool {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: OpenAIFunction,
}

/// OpenAI function definition.
#[derive(Debug, Serialize)]
pub struct OpenAIFunction {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    pub id: String,
    pub model: String,
    pub choices: Vec<OpenAIChoice>,
    pub usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIResponseMessage {
    pub content: Option<String>,
    pub tool_calls: Option<Vec<OpenAIToolCall>>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// OpenAI API error response.
#[derive(Debug, Deserialize)]
pub struct OpenAIError {
    pub error: OpenAIErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIErrorDetail {
    pub message: String,
}

/// Client for OpenAI-compatible chat completion endpoints.
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    api_key: String,
    url: String,
    http: reqwest::Client,
}

impl OpenAIClient {
    /// Create a new client for the public OpenAI endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            url: OPENAI_API_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Point the client at another compatible endpoint.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Create a client from configuration.
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            LlmError::Configuration(
                "no API key configured (set HOPPER_API_KEY or OPENAI_API_KEY)".to_string(),
            )
        })?;
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()?;
        Ok(Self {
            api_key,
            url: config.completion_url.clone(),
            http,
        })
    }
}

impl From<&ToolDefinition> for OpenAITool {
    fn from(tool: &ToolDefinition) -> Self {
        OpenAITool {
            tool_type: "function".to_string(),
            function: OpenAIFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.input_schema.clone(),
            },
        }
    }
}

fn convert_message(msg: &Message, out: &mut Vec<OpenAIMessage>) {
    // Tool results become one "tool" message each.
    let mut has_results = false;
    for block in &msg.content {
        if let ContentBlock::ToolResult {
            tool_use_id,
            content,
            ..
        } = block
        {
            has_results = true;
            out.push(OpenAIMessage {
                role: "tool".to_string(),
                content: Some(content.clone()),
                tool_calls: None,
                tool_call_id: Some(tool_use_id.clone()),
            });
        }
    }
    if has_results {
        return;
    }

    let tool_calls: Vec<OpenAIToolCall> = msg
        .content
        .iter()
        .filter_map(|b| match b {
            ContentBlock::ToolUse { id, name, input } => Some(OpenAIToolCall {
                id: id.clone(),
                call_type: "function".to_string(),
                function: OpenAIFunctionCall {
                    name: name.clone(),
                    arguments: input.to_string(),
                },
            }),
            _ => None,
        })
        .collect();

    let text: String = msg
        .content
        .iter()
        .filter_map(|b| match b {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect();

    out.push(OpenAIMessage {
        role: match msg.role {
            Role::User => "user".to_string(),
            Role::Assistant => "assistant".to_string(),
        },
        content: if text.is_empty() { None } else { Some(text) },
        tool_calls: if tool_calls.is_empty() {
            None
        } else {
            Some(tool_calls)
        },
        tool_call_id: None,
    });
}

impl From<&Request> for OpenAIRequest {
    fn from(req: &Request) -> Self {
        let mut messages = Vec::new();

        if let Some(ref system) = req.system {
            messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: Some(system.clone()),
                tool_calls: None,
                tool_call_id: None,
            });
        }
        for msg in &req.messages {
            convert_message(msg, &mut messages);
        }

        let response_format = req.json_schema.as_ref().map(|format| {
            serde_json::json!({
                "type": "json_schema",
                "json_schema": {
                    "name": format.name,
                    "schema": format.schema,
                    "strict": false
                }
            })
        });

        OpenAIRequest {
            model: req.model.clone(),
            messages,
            max_tokens: req.max_tokens,
            temperature: req.temperature,
            tools: req.tools.iter().map(OpenAITool::from).collect(),
            response_format,
        }
    }
}

fn parse_stop_reason(s: Option<&str>) -> StopReason {
    match s {
        Some("tool_calls") => StopReason::ToolUse,
        Some("length") => StopReason::MaxTokens,
        _ => StopReason::EndTurn,
    }
}

impl TryFrom<OpenAIResponse> for Response {
    type Error = LlmError;

    fn try_from(resp: OpenAIResponse) -> Result<Self, Self::Error> {
        let choice = resp.choices.into_iter().next().ok_or_else(|| LlmError::Api {
            status: 0,
            message: "response contained no choices".to_string(),
        })?;

        let mut content = Vec::new();
        if let Some(text) = choice.message.content {
            if !text.is_empty() {
                content.push(ContentBlock::Text { text });
            }
        }
        for call in choice.message.tool_calls.unwrap_or_default() {
            let input: serde_json::Value = serde_json::from_str(&call.function.arguments)?;
            content.push(ContentBlock::ToolUse {
                id: call.id,
                name: call.function.name,
                input,
            });
        }

        let usage = resp
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(Response {
            id: resp.id,
            content,
            stop_reason: parse_stop_reason(choice.finish_reason.as_deref()),
            model: resp.model,
            usage,
        })
    }
}

#[async_trait]
impl super::client::LlmClient for OpenAIClient {
    async fn create_message(&self, req: &Request) -> Result<Response, LlmError> {
        let openai_req = OpenAIRequest::from(req);
        debug!(
            model = %openai_req.model,
            messages = openai_req.messages.len(),
            tools = openai_req.tools.len(),
            "Sending completion request"
        );

        let response = self
            .http
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&openai_req)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            let message = serde_json::from_str::<OpenAIError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let openai_resp: OpenAIResponse = response.json().await?;
        Response::try_from(openai_resp)
    }
}

#[cfg(test)]
mod openai_test {
    use super::*;

    #[test]
    fn test_from_config_requires_key() {
        let result = OpenAIClient::from_config(&Config::default());
        assert!(matches!(result, Err(LlmError::Configuration(_))));
    }

    #[test]
    fn test_request_serialization() {
        let req = Request::new("gpt-4o")
            .message(Message::user("Hello"))
            .system("Be helpful")
            .json_schema("list", serde_json::json!({"type": "array"}));

        let openai_req = OpenAIRequest::from(&req);
        assert_eq!(openai_req.messages.len(), 2);
        assert_eq!(openai_req.messages[0].role, "system");

        let json = serde_json::to_value(&openai_req).unwrap();
        assert_eq!(json["response_format"]["type"], "json_schema");
        assert_eq!(json["response_format"]["json_schema"]["name"], "list");
        assert!(json.get("tools").is_none());
    }

    #[test]
    fn test_tool_results_split_into_tool_messages() {
        let req = Request::new("gpt-4o").message(Message::tool_results(vec![
            ContentBlock::tool_result("a", "one"),
            ContentBlock::tool_error("b", "two"),
        ]));

        let openai_req = OpenAIRequest::from(&req);
        assert_eq!(openai_req.messages.len(), 2);
        assert_eq!(openai_req.messages[1].role, "tool");
        assert_eq!(openai_req.messages[1].tool_call_id.as_deref(), Some("b"));
    }

    #[test]
    fn test_response_conversion() {
        let raw = serde_json::json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o",
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": "gh_get", "arguments": "{\"guids\":[]}" }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 3 }
        });

        let resp: OpenAIResponse = serde_json::from_value(raw).unwrap();
        let response = Response::try_from(resp).unwrap();
        assert_eq!(response.stop_reason, StopReason::ToolUse);
        assert!(response.has_tool_use());
        assert_eq!(response.usage.input_tokens, 12);
    }

    #[test]
    fn test_empty_choices_is_error() {
        let resp: OpenAIResponse = serde_json::from_value(serde_json::json!({
            "id": "x", "model": "m", "choices": []
        }))
        .unwrap();
        assert!(Response::try_from(resp).is_err());
    }
}
