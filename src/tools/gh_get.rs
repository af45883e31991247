// ABOUTME: GhGetTool - reads canvas objects back as a GhJSON document.
// ABOUTME: Read-only; unresolved GUIDs are reported rather than failing.

use async_trait::async_trait;
use serde::Deserialize;

use super::batch::parse_guid;
use crate::canvas::GhDocument;
use crate::error::ToolError;
use crate::tool::{parse_args, Capabilities, Capability, Tool, ToolContext, ToolOutput};

/// Tool for reading components from the canvas.
pub struct GhGetTool;

#[async_trait]
impl Tool for GhGetTool {
    fn name(&self) -> &str {
        "gh_get"
    }

    fn description(&self) -> &str {
        "Read components from the canvas as a GhJSON document. \
         Reads every component when no GUIDs are given."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "guids": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Instance GUIDs to read (default: all)"
                },
                "includeConnections": {
                    "type": "boolean",
                    "description": "Include wires between the selected components (default: true)"
                }
            }
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
        #[serde(rename_all = "camelCase")]
        struct Params {
            #[serde(default)]
            guids: Option<Vec<String>>,
            #[serde(default = "default_include_connections")]
            include_connections: bool,
        }

        fn default_include_connections() -> bool {
            true
        }

        let params: Params = parse_args(params)?;

        let (document, not_found) = ctx
            .canvas()?
            .query(move |canvas| {
                let Some(guids) = params.guids else {
                    let objects = canvas.list_objects();
                    return (
                        GhDocument::from_objects(&objects, params.include_connections),
                        Vec::new(),
                    );
                };

                let mut objects = Vec::new();
                let mut not_found = Vec::new();
                for text in guids {
                    match parse_guid(&text).ok().and_then(|guid| canvas.find(guid)) {
                        Some(object) => objects.push(object),
                        None => not_found.push(text),
                    }
                }
                (
                    GhDocument::from_objects(&objects, params.include_connections),
                    not_found,
                )
            })
            .await?;

        let count = document.components.len();
        Ok(ToolOutput::new(serde_json::json!({
            "ghjson": document,
            "count": count,
            "notFound": not_found,
        })))
    }
}
