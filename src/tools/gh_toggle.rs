// ABOUTME: GhToggleLockTool and GhTogglePreviewTool - set a boolean flag on
// ABOUTME: many components at once. Setting a flag to its current value is a no-op.

use async_trait::async_trait;
use serde::Deserialize;

use super::batch::{parse_guid, BatchReport};
use crate::canvas::{Canvas, Guid};
use crate::error::{CanvasError, ToolError};
use crate::tool::{parse_args, Capabilities, Capability, Tool, ToolContext, ToolOutput};

type Setter = fn(&mut dyn Canvas, Guid, bool) -> Result<(), CanvasError>;

/// Apply `setter` to every GUID as one undoable mutation.
async fn set_flag(
    ctx: &ToolContext,
    tool: &str,
    label: &'static str,
    guids: Vec<String>,
    value: bool,
    setter: Setter,
) -> Result<ToolOutput, ToolError> {
    let report = ctx
        .canvas()?
        .mutate(label, move |canvas| {
            let mut report = BatchReport::new();
            for text in guids {
                let applied = parse_guid(&text).and_then(|guid| {
                    setter(canvas, guid, value)
                        .map_err(|_| format!("Component not found: {}", text))
                });
                match applied {
                    Ok(()) => report.succeed(&text),
                    Err(error) => report.fail(&text, error),
                }
            }
            report
        })
        .await?;

    Ok(report.into_output(tool))
}

/// Tool for locking or unlocking components.
pub struct GhToggleLockTool;

#[async_trait]
impl Tool for GhToggleLockTool {
    fn name(&self) -> &str {
        "gh_toggle_lock"
    }

    fn description(&self) -> &str {
        "Lock (disable) or unlock (enable) components. Locked components do not compute."
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
                "locked": {
                    "type": "boolean",
                    "description": "true to lock, false to unlock"
                }
            },
            "required": ["guids", "locked"]
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
            locked: bool,
        }

        let params: Params = parse_args(params)?;
        let label = if params.locked {
            "Lock components"
        } else {
            "Unlock components"
        };
        set_flag(ctx, self.name(), label, params.guids, params.locked, |c, g, v| {
            c.set_locked(g, v)
        })
        .await
    }
}

/// Tool for showing or hiding component previews.
pub struct GhTogglePreviewTool;

#[async_trait]
impl Tool for GhTogglePreviewTool {
    fn name(&self) -> &str {
        "gh_toggle_preview"
    }

    fn description(&self) -> &str {
        "Show or hide the geometry preview of components."
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
                "previewOn": {
                    "type": "boolean",
                    "description": "true to show the preview, false to hide it"
                }
            },
            "required": ["guids", "previewOn"]
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
            preview_on: bool,
        }

        let params: Params = parse_args(params)?;
        let label = if params.preview_on {
            "Show previews"
        } else {
            "Hide previews"
        };
        set_flag(ctx, self.name(), label, params.guids, params.preview_on, |c, g, v| {
            c.set_preview(g, v)
        })
        .await
    }
}
