// ABOUTME: GhConnectTool - wires output parameters into input parameters.
// ABOUTME: Each requested connection succeeds or fails on its own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::batch::{parse_guid, BatchReport};
use crate::canvas::{types_compatible, Canvas, ParamRef};
use crate::error::ToolError;
use crate::tool::{parse_args, Capabilities, Capability, Tool, ToolContext, ToolOutput};

/// One requested wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionSpec {
    source_guid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_param: Option<String>,
    target_guid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_param: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Connected {
    source_guid: String,
    source_param: String,
    target_guid: String,
    target_param: String,
}

/// Tool for connecting component parameters on the canvas.
pub struct GhConnectTool;

#[async_trait]
impl Tool for GhConnectTool {
    fn name(&self) -> &str {
        "gh_connect"
    }

    fn description(&self) -> &str {
        "Connect component outputs to component inputs. Parameters are matched by name or nickname; \
         when omitted, the first output and first input are used."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "connections": {
                    "type": "array",
                    "minItems": 1,
                    "items": {
                        "type": "object",
                        "properties": {
                            "sourceGuid": { "type": "string", "description": "Component providing the data" },
                            "sourceParam": { "type": "string", "description": "Output name or nickname" },
                            "targetGuid": { "type": "string", "description": "Component receiving the data" },
                            "targetParam": { "type": "string", "description": "Input name or nickname" }
                        },
                        "required": ["sourceGuid", "targetGuid"]
                    }
                }
            },
            "required": ["connections"]
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
            connections: Vec<ConnectionSpec>,
        }

        let params: Params = parse_args(params)?;
        debug!(count = params.connections.len(), "Connecting components");

        let report = ctx
            .canvas()?
            .mutate("Connect components", move |canvas| {
                let mut report = BatchReport::new();
                for spec in &params.connections {
                    match connect_one(canvas, spec) {
                        Ok((connected, warning)) => {
                            if let Some(warning) = warning {
                                report.warn(warning);
                            }
                            report.succeed(connected);
                        }
                        Err(error) => report.fail(spec, error),
                    }
                }
                report
            })
            .await?;

        Ok(report.into_output(self.name()))
    }
}

fn connect_one(
    canvas: &mut dyn Canvas,
    spec: &ConnectionSpec,
) -> Result<(Connected, Option<String>), String> {
    let source_guid = parse_guid(&spec.source_guid).map_err(|_| {
        format!("Source component not found: {} (not a valid GUID)", spec.source_guid)
    })?;
    let target_guid = parse_guid(&spec.target_guid).map_err(|_| {
        format!("Target component not found: {} (not a valid GUID)", spec.target_guid)
    })?;

    let source = canvas
        .find(source_guid)
        .ok_or_else(|| format!("Source component not found: {}", spec.source_guid))?;
    let source_index = match &spec.source_param {
        Some(name) => source.output_index(name).ok_or_else(|| {
            format!(
                "Source parameter '{}' not found on '{}'",
                name, source.nickname
            )
        })?,
        None if source.outputs.is_empty() => {
            return Err(format!("Source component '{}' has no outputs", source.nickname));
        }
        None => 0,
    };
    let source_param = source.outputs[source_index].clone();

    let target = canvas
        .find(target_guid)
        .ok_or_else(|| format!("Target component not found: {}", spec.target_guid))?;
    let target_index = match &spec.target_param {
        Some(name) => target.input_index(name).ok_or_else(|| {
            format!(
                "Target parameter '{}' not found on '{}'",
                name, target.nickname
            )
        })?,
        None if target.inputs.is_empty() => {
            return Err(format!("Target component '{}' has no inputs", target.nickname));
        }
        None => 0,
    };
    let target_param = target.inputs[target_index].clone();

    let warning = (!types_compatible(
        source_param.type_hint.as_deref(),
        target_param.type_hint.as_deref(),
    ))
    .then(|| {
        format!(
            "Type mismatch: {} ({}) -> {} ({}); the connection was made anyway",
            source_param.name,
            source_param.type_hint.as_deref().unwrap_or("?"),
            target_param.name,
            target_param.type_hint.as_deref().unwrap_or("?"),
        )
    });

    canvas
        .connect(
            ParamRef::new(source_guid, source_index),
            ParamRef::new(target_guid, target_index),
        )
        .map_err(|e| e.to_string())?;

    Ok((
        Connected {
            source_guid: source_guid.to_string(),
            source_param: source_param.name,
            target_guid: target_guid.to_string(),
            target_param: target_param.name,
        },
        warning,
    ))
}
