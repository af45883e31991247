// ABOUTME: GhListComponentsTool - lists the component templates the canvas
// ABOUTME: can instantiate, optionally filtered by text and category.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::canvas::{ComponentTemplate, Param};
use crate::error::ToolError;
use crate::tool::{parse_args, Capabilities, Capability, Tool, ToolContext, ToolOutput};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ParamInfo {
    name: String,
    nickname: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    type_hint: Option<String>,
}

impl From<&Param> for ParamInfo {
    fn from(param: &Param) -> Self {
        Self {
            name: param.name.clone(),
            nickname: param.nickname.clone(),
            type_hint: param.type_hint.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ComponentInfo {
    name: String,
    nickname: String,
    category: String,
    description: String,
    inputs: Vec<ParamInfo>,
    outputs: Vec<ParamInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    script_language: Option<String>,
}

impl From<&ComponentTemplate> for ComponentInfo {
    fn from(template: &ComponentTemplate) -> Self {
        Self {
            name: template.name.clone(),
            nickname: template.nickname.clone(),
            category: template.category.clone(),
            description: template.description.clone(),
            inputs: template.inputs.iter().map(ParamInfo::from).collect(),
            outputs: template.outputs.iter().map(ParamInfo::from).collect(),
            script_language: template.script_language.clone(),
        }
    }
}

/// Tool for browsing the component catalog.
pub struct GhListComponentsTool;

#[async_trait]
impl Tool for GhListComponentsTool {
    fn name(&self) -> &str {
        "gh_list_components"
    }

    fn description(&self) -> &str {
        "List available components with their inputs and outputs. \
         Filter matches name, nickname, or description."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "filter": { "type": "string", "description": "Case-insensitive text filter" },
                "category": { "type": "string", "description": "Exact category, e.g. Curve" }
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
        struct Params {
            #[serde(default)]
            filter: Option<String>,
            #[serde(default)]
            category: Option<String>,
        }

        let params: Params = parse_args(params)?;

        let components = ctx
            .canvas()?
            .query(move |canvas| {
                canvas
                    .catalog()
                    .search(params.filter.as_deref(), params.category.as_deref())
                    .into_iter()
                    .map(ComponentInfo::from)
                    .collect::<Vec<_>>()
            })
            .await?;

        Ok(ToolOutput::new(serde_json::json!({
            "count": components.len(),
            "components": components,
        })))
    }
}
