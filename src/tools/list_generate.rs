// ABOUTME: ListGenerateTool - builds a list of N items over a bounded number of
// ABOUTME: completion turns, asking only for what is still missing each time.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::llm::parse_string_list;
use crate::tool::{
    parse_args, Capabilities, Capability, Tool, ToolContext, ToolMessage, ToolOutput,
};

const SYSTEM: &str = "You generate lists. Always reply with a JSON array of strings and \
nothing else. Never repeat an item you already gave.";

/// Tool for generating a list of items.
pub struct ListGenerateTool;

#[async_trait]
impl Tool for ListGenerateTool {
    fn name(&self) -> &str {
        "list_generate"
    }

    fn description(&self) -> &str {
        "Generate a list of exactly `count` items matching a prompt."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "prompt": { "type": "string", "minLength": 1 },
                "count": { "type": "integer", "minimum": 1, "maximum": 500 },
                "type": {
                    "type": "string",
                    "description": "What each item should be, e.g. 'number' or 'color name'"
                }
            },
            "required": ["prompt", "count"]
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
            count: usize,
            #[serde(default, rename = "type")]
            item_type: Option<String>,
        }

        let params: Params = parse_args(params)?;
        let max_iterations = ctx.config().list_generate_max_iterations;
        let llm = ctx.llm()?;
        let kind = params
            .item_type
            .as_deref()
            .map(|t| format!(" Each item is a {}.", t))
            .unwrap_or_default();

        let mut convo = ctx.conversation(SYSTEM);
        convo.user(format!(
            "{}\n\nGenerate {} items.{}",
            params.prompt, params.count, kind
        ));

        let mut items: Vec<String> = Vec::new();
        let mut iterations = 0;
        let mut upstream_error = None;

        while iterations < max_iterations {
            iterations += 1;
            let reply = match convo.send(llm).await {
                Ok(response) => response.text(),
                Err(e) if !items.is_empty() => {
                    warn!(iterations, have = items.len(), error = %e, "Completion failed mid-list");
                    upstream_error = Some(e.to_string());
                    break;
                }
                Err(e) => return Err(e.into()),
            };

            match parse_string_list(&reply) {
                Some(batch) => {
                    for item in batch {
                        if !items.contains(&item) {
                            items.push(item);
                        }
                    }
                    debug!(iterations, have = items.len(), want = params.count, "List progress");
                    if items.len() >= params.count {
                        items.truncate(params.count);
                        return Ok(ToolOutput::new(serde_json::json!({
                            "items": items,
                            "count": items.len(),
                            "iterations": iterations,
                        }))
                        .with_metrics(convo.into_metrics()));
                    }
                    convo.user(format!(
                        "You have given {} of {} items. Generate {} more new items.{}",
                        items.len(),
                        params.count,
                        params.count - items.len(),
                        kind
                    ));
                }
                None => {
                    convo.user(format!(
                        "That was not a JSON array of strings. Reply with only a JSON array \
                         of {} items.",
                        params.count - items.len()
                    ));
                }
            }
        }

        let message = match upstream_error {
            Some(error) => format!(
                "Generated {} of {} items before the completion failed: {}",
                items.len(),
                params.count,
                error
            ),
            None => {
                warn!(iterations, have = items.len(), want = params.count, "List generation ran out of turns");
                if items.is_empty() {
                    return Err(ToolError::ExceededRetryBudget {
                        iterations,
                        reason: "no parseable list was produced".to_string(),
                    });
                }
                format!(
                    "Generated {} of {} items within {} iterations",
                    items.len(),
                    params.count,
                    iterations
                )
            }
        };
        let message = ToolMessage::warning(self.name(), message);

        Ok(ToolOutput::new(serde_json::json!({
            "items": items,
            "count": items.len(),
            "iterations": iterations,
        }))
        .with_metrics(convo.into_metrics())
        .with_message(message))
    }
}
