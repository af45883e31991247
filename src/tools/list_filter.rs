// ABOUTME: ListFilterTool - asks the completion capability which list items
// ABOUTME: satisfy a criterion, and returns their indices and values.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ToolError;
use crate::llm::parse_indices;
use crate::tool::{
    parse_args, Capabilities, Capability, Tool, ToolContext, ToolMessage, ToolOutput,
};

const SYSTEM: &str = "You filter numbered lists. Reply with a JSON array of the zero-based \
indices of the items that satisfy the criteria, e.g. [0, 3]. Reply [] when none do.";

/// Tool for filtering a list by a natural-language criterion.
pub struct ListFilterTool;

#[async_trait]
impl Tool for ListFilterTool {
    fn name(&self) -> &str {
        "list_filter"
    }

    fn description(&self) -> &str {
        "Filter a list by natural-language criteria. Returns the indices and values of the \
         matching items, in list order."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "list": { "type": "array", "minItems": 1 },
                "criteria": { "type": "string", "minLength": 1 }
            },
            "required": ["list", "criteria"]
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
            list: Vec<serde_json::Value>,
            criteria: String,
        }

        let params: Params = parse_args(params)?;

        let numbered = params
            .list
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}: {}", i, render(item)))
            .collect::<Vec<_>>()
            .join("\n");

        let mut convo = ctx.conversation(SYSTEM);
        convo.user(format!("Criteria: {}\n\nList:\n{}", params.criteria, numbered));
        let reply = convo.send(ctx.llm()?).await?.text();

        let raw = parse_indices(&reply).ok_or_else(|| {
            ToolError::UpstreamFailure(format!("reply contained no index list: {}", reply))
        })?;
        let (indices, dropped) = select_indices(&raw, params.list.len());
        let items: Vec<&serde_json::Value> = indices.iter().map(|&i| &params.list[i]).collect();

        let mut output = ToolOutput::new(serde_json::json!({
            "indices": indices,
            "items": items,
        }));
        if !dropped.is_empty() {
            output = output.with_message(ToolMessage::warning(
                self.name(),
                format!("Ignored out-of-range indices: {:?}", dropped),
            ));
        }
        Ok(output.with_metrics(convo.into_metrics()))
    }
}

/// Keep in-range indices once each, in list order; return the rest separately.
fn select_indices(raw: &[i64], len: usize) -> (Vec<usize>, Vec<i64>) {
    let mut seen = HashSet::new();
    let mut kept = Vec::new();
    let mut dropped = Vec::new();
    for &i in raw {
        match usize::try_from(i).ok().filter(|&i| i < len) {
            Some(i) => {
                if seen.insert(i) {
                    kept.push(i);
                }
            }
            None => dropped.push(i),
        }
    }
    kept.sort_unstable();
    (kept, dropped)
}

fn render(item: &serde_json::Value) -> String {
    match item {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
