// ABOUTME: GhPutTool - places a GhJSON document on the canvas.
// ABOUTME: The whole document is validated before anything is added.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::canvas::layout::{grid_layout, Spacing};
use crate::canvas::{Canvas, GhDocument, Guid, ParamRef, Point, ScriptBody};
use crate::error::ToolError;
use crate::tool::{
    parse_args, Capabilities, Capability, Tool, ToolContext, ToolMessage, ToolOutput,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Placed {
    name: String,
    nickname: String,
    instance_guid: String,
    source_guid: String,
    pivot: Point,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct Placement {
    components: Vec<Placed>,
    connections_created: usize,
    connections_failed: Vec<String>,
}

/// Tool for placing components described by a GhJSON document.
pub struct GhPutTool;

#[async_trait]
impl Tool for GhPutTool {
    fn name(&self) -> &str {
        "gh_put"
    }

    fn description(&self) -> &str {
        "Place the components and connections of a GhJSON document on the canvas. \
         Components get fresh instance GUIDs; those without a pivot are laid out automatically."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "ghjson": {
                    "type": ["object", "string"],
                    "description": "GhJSON document: {components: [...], connections: [...]}"
                },
                "pivot": {
                    "type": "object",
                    "description": "Origin for automatically placed components",
                    "properties": {
                        "x": { "type": "number" },
                        "y": { "type": "number" }
                    },
                    "required": ["x", "y"]
                }
            },
            "required": ["ghjson"]
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
            ghjson: serde_json::Value,
            #[serde(default)]
            pivot: Option<Point>,
        }

        let params: Params = parse_args(params)?;
        if params.ghjson.as_str().is_some_and(|text| text.trim().is_empty()) {
            return Err(ToolError::MissingArgument("ghjson is empty".to_string()));
        }
        let document = GhDocument::from_value(&params.ghjson).map_err(ToolError::InvalidArguments)?;
        let canvas = ctx.canvas()?;

        let (document, problems) = canvas
            .query(move |canvas| {
                let problems = document.validate(canvas.catalog());
                (document, problems)
            })
            .await?;
        if !problems.is_empty() {
            return Err(ToolError::InvalidArguments(format!(
                "GhJSON document is invalid: {}",
                problems.join("; ")
            )));
        }

        let origin = params.pivot.unwrap_or_default();
        let spacing = ctx.config().layout_spacing();
        let count = document.components.len();
        let placement = canvas
            .mutate("Place components", move |canvas| {
                place(canvas, &document, origin, spacing)
            })
            .await?;

        info!(
            components = count,
            connections = placement.connections_created,
            "Placed GhJSON document"
        );
        let messages: Vec<ToolMessage> = placement
            .connections_failed
            .iter()
            .map(|e| ToolMessage::warning(self.name(), e.clone()))
            .collect();
        Ok(ToolOutput::new(placement).with_messages(messages))
    }
}

fn place(canvas: &mut dyn Canvas, document: &GhDocument, origin: Point, spacing: Spacing) -> Placement {
    let mut placement = Placement::default();
    let mut guids: HashMap<&str, Guid> = HashMap::new();
    let mut unplaced = Vec::new();

    for component in &document.components {
        // Validated above; a missing template here means the catalog changed underneath us.
        let Some(template) = canvas.catalog().get(&component.name).cloned() else {
            continue;
        };
        let guid = Guid::new();
        let mut object = template.instantiate(guid, component.pivot.unwrap_or(origin));
        object.inputs = component.effective_inputs(&template);
        object.outputs = component.effective_outputs(&template);
        if let Some(nickname) = &component.nickname {
            object.nickname = nickname.clone();
        }
        if let Some(locked) = component.locked {
            object.locked = locked;
        }
        if let Some(preview) = component.preview {
            object.preview = preview;
        }
        if let (Some(language), Some(script)) = (&template.script_language, &component.script) {
            object.script = Some(ScriptBody {
                language: language.clone(),
                code: script.code.clone(),
            });
        }
        if component.pivot.is_none() {
            unplaced.push(guid);
        }

        debug!(name = %object.name, %guid, "Adding component");
        canvas.add(object);
        guids.insert(component.instance_guid.as_str(), guid);
        placement.components.push(Placed {
            name: template.name.clone(),
            nickname: component.nickname.clone().unwrap_or(template.nickname),
            instance_guid: guid.to_string(),
            source_guid: component.instance_guid.clone(),
            pivot: component.pivot.unwrap_or(origin),
        });
    }

    let mut edges = Vec::new();
    for (i, connection) in document.connections.iter().enumerate() {
        let (Some(&from), Some(&to)) = (
            guids.get(connection.from.instance_guid.as_str()),
            guids.get(connection.to.instance_guid.as_str()),
        ) else {
            placement
                .connections_failed
                .push(format!("connection {}: endpoint was not placed", i));
            continue;
        };
        let source = canvas
            .find(from)
            .and_then(|o| o.output_index(&connection.from.param_name));
        let target = canvas
            .find(to)
            .and_then(|o| o.input_index(&connection.to.param_name));
        let (Some(source), Some(target)) = (source, target) else {
            placement.connections_failed.push(format!(
                "connection {}: parameter '{}' or '{}' not found",
                i, connection.from.param_name, connection.to.param_name
            ));
            continue;
        };
        match canvas.connect(ParamRef::new(from, source), ParamRef::new(to, target)) {
            Ok(()) => {
                placement.connections_created += 1;
                edges.push((from, to));
            }
            Err(e) => placement
                .connections_failed
                .push(format!("connection {}: {}", i, e)),
        }
    }

    if !unplaced.is_empty() {
        for (guid, pivot) in grid_layout(&unplaced, &edges, origin, spacing) {
            if canvas.move_to(guid, pivot).is_ok() {
                if let Some(placed) = placement
                    .components
                    .iter_mut()
                    .find(|p| p.instance_guid == guid.to_string())
                {
                    placed.pivot = pivot;
                }
            }
        }
    }

    placement
}
