// ABOUTME: GhGenerateTool - drives a multi-turn exchange in which the model may
// ABOUTME: call read-only tools and must end with a GhJSON document that validates.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::canvas::GhDocument;
use crate::error::ToolError;
use crate::llm::ContentBlock;
use crate::tool::{
    parse_args, Capabilities, Capability, Tool, ToolContext, ToolInvocation, ToolOutput,
};

/// Tools the model may call while designing a definition.
pub const GH_GENERATE_NESTED_TOOLS: [&str; 3] =
    ["gh_list_components", "gh_get", "mcneel_forum_search"];

const SYSTEM: &str = "You design Grasshopper definitions. Use gh_list_components to find \
components and their parameter names before using them. When you are done, reply with a \
single GhJSON document and nothing else:
{\"components\": [{\"name\": \"<component name>\", \"instanceGuid\": \"<unique id>\", \
\"nickname\": \"<optional>\"}], \
\"connections\": [{\"from\": {\"instanceGuid\": \"<id>\", \"paramName\": \"<output>\"}, \
\"to\": {\"instanceGuid\": \"<id>\", \"paramName\": \"<input>\"}}]}";

/// Tool for generating a GhJSON document from a description.
pub struct GhGenerateTool;

#[async_trait]
impl Tool for GhGenerateTool {
    fn name(&self) -> &str {
        "gh_generate"
    }

    fn description(&self) -> &str {
        "Design a Grasshopper definition from a description. Returns a validated GhJSON \
         document that gh_put can place."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "prompt": { "type": "string", "minLength": 1 },
                "maxIterations": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 50,
                    "description": "Completion turns allowed (default from configuration)"
                }
            },
            "required": ["prompt"]
        })
    }

    fn required_capabilities(&self) -> Capabilities {
        Capabilities::from([
            Capability::Canvas,
            Capability::TextCompletion,
            Capability::ToolCalling,
        ])
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Params {
            prompt: String,
            #[serde(default)]
            max_iterations: Option<usize>,
        }

        let params: Params = parse_args(params)?;
        let max_iterations = params
            .max_iterations
            .unwrap_or(ctx.config().gh_generate_max_iterations);
        let llm = ctx.llm()?;
        let canvas = ctx.canvas()?;
        let registry = ctx.registry().cloned().unwrap_or_default();

        let mut convo = ctx
            .conversation(SYSTEM)
            .with_tools(registry.to_definitions_for(&GH_GENERATE_NESTED_TOOLS));
        convo.user(params.prompt);

        let mut nested_calls = 0usize;
        let mut last_problem = "the model never produced a document".to_string();

        for iteration in 1..=max_iterations {
            let response = convo.send(llm).await?;

            if response.has_tool_use() {
                let mut results = Vec::new();
                for block in &response.content {
                    let ContentBlock::ToolUse { id, name, input } = block else {
                        continue;
                    };
                    nested_calls += 1;
                    if !GH_GENERATE_NESTED_TOOLS.contains(&name.as_str()) {
                        results.push(ContentBlock::tool_error(
                            id,
                            format!("Tool '{}' not found or not allowed", name),
                        ));
                        continue;
                    }
                    debug!(iteration, tool = %name, "Nested tool call");
                    let invocation = ToolInvocation::new(name, input.clone())
                        .provider(&ctx.provider)
                        .model(&ctx.model)
                        .skip_metrics_validation();
                    let result = registry.invoke(&invocation, ctx).await;
                    results.push(result.to_content_block(id));
                }
                convo.tool_results(results);
                continue;
            }

            let problems = match GhDocument::from_text(&response.text()) {
                Ok(document) => {
                    let (document, problems) = canvas
                        .query(move |canvas| {
                            let problems = document.validate(canvas.catalog());
                            (document, problems)
                        })
                        .await?;
                    if problems.is_empty() {
                        info!(
                            iteration,
                            components = document.components.len(),
                            "Generated GhJSON document"
                        );
                        return Ok(ToolOutput::new(serde_json::json!({
                            "ghjson": document,
                            "iterations": iteration,
                            "toolCalls": nested_calls,
                        }))
                        .with_metrics(convo.into_metrics()));
                    }
                    problems
                }
                Err(e) => vec![e],
            };

            warn!(iteration, problems = problems.len(), "Rejected generated document");
            last_problem = problems.join("; ");
            convo.user(format!(
                "The document is not valid:\n- {}\n\nFix every problem and reply with the \
                 corrected GhJSON document only.",
                problems.join("\n- ")
            ));
        }

        Err(ToolError::ExceededRetryBudget {
            iterations: max_iterations,
            reason: last_problem,
        })
    }
}
