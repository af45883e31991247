// ABOUTME: GhMoveTool - moves component pivots to absolute or relative positions.
// ABOUTME: Each target moves independently.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::batch::{parse_guid, BatchReport};
use crate::canvas::Point;
use crate::error::ToolError;
use crate::tool::{parse_args, Capabilities, Capability, Tool, ToolContext, ToolOutput};

#[derive(Debug, Serialize, Deserialize)]
struct MoveTarget {
    guid: String,
    x: f64,
    y: f64,
}

/// Tool for moving components on the canvas.
pub struct GhMoveTool;

#[async_trait]
impl Tool for GhMoveTool {
    fn name(&self) -> &str {
        "gh_move"
    }

    fn description(&self) -> &str {
        "Move components to new canvas positions. With relative=true, x and y are offsets \
         from the current position."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "targets": {
                    "type": "array",
                    "minItems": 1,
                    "items": {
                        "type": "object",
                        "properties": {
                            "guid": { "type": "string" },
                            "x": { "type": "number" },
                            "y": { "type": "number" }
                        },
                        "required": ["guid", "x", "y"]
                    }
                },
                "relative": {
                    "type": "boolean",
                    "description": "Treat x and y as offsets (default: false)"
                }
            },
            "required": ["targets"]
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
            targets: Vec<MoveTarget>,
            #[serde(default)]
            relative: bool,
        }

        let params: Params = parse_args(params)?;

        let report = ctx
            .canvas()?
            .mutate("Move components", move |canvas| {
                let mut report = BatchReport::new();
                for target in &params.targets {
                    let moved = parse_guid(&target.guid).and_then(|guid| {
                        let from = canvas
                            .find(guid)
                            .map(|o| o.pivot)
                            .ok_or_else(|| format!("Component not found: {}", target.guid))?;
                        let to = if params.relative {
                            from.offset(target.x, target.y)
                        } else {
                            Point::new(target.x, target.y)
                        };
                        canvas.move_to(guid, to).map_err(|e| e.to_string())?;
                        Ok((from, to))
                    });
                    match moved {
                        Ok((from, to)) => report.succeed(serde_json::json!({
                            "guid": target.guid,
                            "from": from,
                            "to": to,
                        })),
                        Err(error) => report.fail(target, error),
                    }
                }
                report
            })
            .await?;

        Ok(report.into_output(self.name()))
    }
}
