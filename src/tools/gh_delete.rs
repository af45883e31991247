// ABOUTME: GhDeleteTool - removes components and their wires from the canvas.
// ABOUTME: Each GUID is removed independently.

use async_trait::async_trait;
use serde::Deserialize;

use super::batch::{parse_guid, BatchReport};
use crate::error::ToolError;
use crate::tool::{parse_args, Capabilities, Capability, Tool, ToolContext, ToolOutput};

/// Tool for deleting components.
pub struct GhDeleteTool;

#[async_trait]
impl Tool for GhDeleteTool {
    fn name(&self) -> &str {
        "gh_delete"
    }

    fn description(&self) -> &str {
        "Delete components from the canvas, along with every wire attached to them."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "guids": {
                    "type": "array",
                    "minItems": 1,
                    "items": { "type": "string" },
                    "description": "Instance GUIDs to delete"
                }
            },
            "required": ["guids"]
        })
    }

    fn required_capabilities(&self) -> Capabilities {
        Capabilities::from([Capability::Canvas])
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        #[derive(Deserialize)]
        struct Params {
            guids: Vec<String>,
        }

        let params: Params = parse_args(params)?;

        let report = ctx
            .canvas()?
            .mutate("Delete components", move |canvas| {
                let mut report = BatchReport::new();
                for text in params.guids {
                    let removed = parse_guid(&text)
                        .and_then(|guid| canvas.remove(guid).map_err(|_| not_found(&text)));
                    match removed {
                        Ok(object) => report.succeed(serde_json::json!({
                            "guid": text,
                            "name": object.name,
                        })),
                        Err(error) => report.fail(&text, error),
                    }
                }
                report
            })
            .await?;

        Ok(report.into_output(self.name()))
    }
}

fn not_found(guid: &str) -> String {
    format!("Component not found: {}", guid)
}
