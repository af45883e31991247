// ABOUTME: GhTidyUpTool - arranges components on a grid that follows their
// ABOUTME: dependency graph, upstream on the left and downstream on the right.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::batch::parse_guid;
use crate::canvas::layout::{grid_layout, top_left};
use crate::canvas::{Guid, Point};
use crate::error::ToolError;
use crate::tool::{
    parse_args, Capabilities, Capability, Tool, ToolContext, ToolMessage, ToolOutput,
};

#[derive(Debug, Serialize)]
struct Moved {
    guid: String,
    from: Point,
    to: Point,
}

/// Tool for laying out a selection of components.
pub struct GhTidyUpTool;

#[async_trait]
impl Tool for GhTidyUpTool {
    fn name(&self) -> &str {
        "gh_tidy_up"
    }

    fn description(&self) -> &str {
        "Arrange components in columns by dependency depth. The layout starts at startPoint, \
         or at the top-left of the selection when omitted."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "guids": {
                    "type": "array",
                    "minItems": 1,
                    "items": { "type": "string" }
                },
                "startPoint": {
                    "type": "object",
                    "properties": {
                        "x": { "type": "number" },
                        "y": { "type": "number" }
                    },
                    "required": ["x", "y"]
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
        #[serde(rename_all = "camelCase")]
        struct Params {
            guids: Vec<String>,
            #[serde(default)]
            start_point: Option<Point>,
        }

        let params: Params = parse_args(params)?;
        let spacing = ctx.config().layout_spacing();

        let (moved, not_found) = ctx
            .canvas()?
            .mutate("Tidy up components", move |canvas| {
                let mut nodes: Vec<Guid> = Vec::new();
                let mut not_found = Vec::new();
                for text in &params.guids {
                    match parse_guid(text).ok().filter(|g| canvas.find(*g).is_some()) {
                        Some(guid) if !nodes.contains(&guid) => nodes.push(guid),
                        Some(_) => {}
                        None => not_found.push(text.clone()),
                    }
                }

                let selected: HashSet<Guid> = nodes.iter().copied().collect();
                let mut edges = Vec::new();
                let mut pivots = Vec::new();
                for guid in &nodes {
                    if let Some(object) = canvas.find(*guid) {
                        pivots.push(object.pivot);
                        edges.extend(
                            object
                                .upstream()
                                .filter(|up| selected.contains(up))
                                .map(|up| (up, *guid)),
                        );
                    }
                }

                let origin = params
                    .start_point
                    .or_else(|| top_left(pivots.iter().copied()))
                    .unwrap_or_default();
                debug!(nodes = nodes.len(), edges = edges.len(), "Tidying up");

                let mut moved = Vec::new();
                for ((guid, to), from) in grid_layout(&nodes, &edges, origin, spacing)
                    .into_iter()
                    .zip(pivots)
                {
                    if canvas.move_to(guid, to).is_ok() {
                        moved.push(Moved {
                            guid: guid.to_string(),
                            from,
                            to,
                        });
                    }
                }
                (moved, not_found)
            })
            .await?;

        let messages = not_found
            .iter()
            .map(|g| ToolMessage::warning(self.name(), format!("Component not found: {}", g)))
            .collect::<Vec<_>>();
        Ok(ToolOutput::new(serde_json::json!({
            "moved": moved,
            "notFound": not_found,
        }))
        .with_messages(messages))
    }
}
