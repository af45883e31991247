// ABOUTME: TextGenerateTool and TextEvaluateTool - single-turn completion tools.
// ABOUTME: Generate free text, or answer a yes/no question about a text.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::ToolError;
use crate::llm::parse_bool;
use crate::tool::{parse_args, Capabilities, Capability, Tool, ToolContext, ToolOutput};

const GENERATE_SYSTEM: &str = "You are a concise assistant embedded in a visual programming \
environment. Answer with the requested text only, without preamble.";

const EVALUATE_SYSTEM: &str = "You evaluate a text against a question. \
Answer with the single word true or false.";

/// Tool for generating text from a prompt.
pub struct TextGenerateTool;

#[async_trait]
impl Tool for TextGenerateTool {
    fn name(&self) -> &str {
        "text_generate"
    }

    fn description(&self) -> &str {
        "Generate text from a prompt, optionally following extra instructions."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "prompt": { "type": "string", "minLength": 1 },
                "instructions": {
                    "type": "string",
                    "description": "Style or format instructions"
                }
            },
            "required": ["prompt"]
        })
    }

    fn required_capabilities(&self) -> Capabilities {
        Capabilities::from([Capability::TextCompletion])
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        #[derive(Deserialize)]
        struct Params {
            prompt: String,
            #[serde(default)]
            instructions: Option<String>,
        }

        let params: Params = parse_args(params)?;
        let system = match &params.instructions {
            Some(instructions) => format!("{}\n\n{}", GENERATE_SYSTEM, instructions),
            None => GENERATE_SYSTEM.to_string(),
        };

        let mut convo = ctx.conversation(system);
        convo.user(params.prompt);
        let reply = convo.send(ctx.llm()?).await?;
        let text = reply.text().trim().to_string();
        if text.is_empty() {
            return Err(ToolError::UpstreamFailure(
                "completion returned no text".to_string(),
            ));
        }

        Ok(ToolOutput::new(serde_json::json!({ "text": text })).with_metrics(convo.into_metrics()))
    }
}

/// Tool for answering a true/false question about a text.
pub struct TextEvaluateTool;

#[async_trait]
impl Tool for TextEvaluateTool {
    fn name(&self) -> &str {
        "text_evaluate"
    }

    fn description(&self) -> &str {
        "Decide whether a question holds for a text. Returns a boolean."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "text": { "type": "string" },
                "question": { "type": "string", "minLength": 1 }
            },
            "required": ["text", "question"]
        })
    }

    fn required_capabilities(&self) -> Capabilities {
        Capabilities::from([Capability::TextCompletion])
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        #[derive(Deserialize)]
        struct Params {
            text: String,
            question: String,
        }

        let params: Params = parse_args(params)?;

        let mut convo = ctx.conversation(EVALUATE_SYSTEM);
        convo.user(format!(
            "Text:\n{}\n\nQuestion: {}\n\nAnswer true or false.",
            params.text, params.question
        ));
        let reply = convo.send(ctx.llm()?).await?.text();
        debug!(%reply, "Evaluation reply");

        let result = parse_bool(&reply).ok_or_else(|| {
            ToolError::UpstreamFailure(format!("reply contained neither true nor false: {}", reply))
        })?;

        Ok(ToolOutput::new(serde_json::json!({ "result": result }))
            .with_metrics(convo.into_metrics()))
    }
}
