// ABOUTME: ScriptGenerateTool and ScriptEditTool - write new script components
// ABOUTME: as GhJSON, or rewrite the code of a script already on the canvas.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use super::batch::parse_guid;
use crate::canvas::{
    normalize_language, CanvasObject, ComponentCatalog, ComponentDoc, GhDocument, ParamDoc,
    ScriptBody,
};
use crate::error::ToolError;
use crate::llm::{extract_code, extract_json};
use crate::tool::{parse_args, Capabilities, Capability, Tool, ToolContext, ToolOutput};

#[derive(Debug, Deserialize)]
struct ScriptReply {
    code: String,
    #[serde(default)]
    inputs: Vec<ScriptParam>,
    #[serde(default)]
    outputs: Vec<ScriptParam>,
    #[serde(default)]
    nickname: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScriptParam {
    name: String,
    #[serde(default, rename = "type")]
    type_hint: Option<String>,
}

impl ScriptParam {
    fn to_doc(&self) -> ParamDoc {
        ParamDoc {
            name: self.name.clone(),
            nickname: None,
            type_hint: self.type_hint.clone(),
        }
    }
}

fn reply_schema() -> serde_json::Value {
    let param = serde_json::json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "type": { "type": "string" }
        },
        "required": ["name"]
    });
    serde_json::json!({
        "type": "object",
        "properties": {
            "code": { "type": "string" },
            "inputs": { "type": "array", "items": param },
            "outputs": { "type": "array", "items": param },
            "nickname": { "type": "string" }
        },
        "required": ["code", "inputs", "outputs"]
    })
}

fn display_language(language: &str) -> &'static str {
    match language {
        "csharp" => "C#",
        _ => "Python 3",
    }
}

/// Tool for generating a script component.
pub struct ScriptGenerateTool;

#[async_trait]
impl Tool for ScriptGenerateTool {
    fn name(&self) -> &str {
        "script_generate"
    }

    fn description(&self) -> &str {
        "Write a script component from instructions. Returns a GhJSON document with one \
         script component that gh_put can place."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "instructions": { "type": "string", "minLength": 1 },
                "language": {
                    "type": "string",
                    "enum": ["python", "csharp", "c#"],
                    "description": "Script language (default: python)"
                }
            },
            "required": ["instructions"]
        })
    }

    fn required_capabilities(&self) -> Capabilities {
        Capabilities::from([Capability::TextCompletion, Capability::JsonOutput])
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        #[derive(Deserialize)]
        struct Params {
            instructions: String,
            #[serde(default)]
            language: Option<String>,
        }

        let params: Params = parse_args(params)?;
        let language = normalize_language(params.language.as_deref().unwrap_or("python"));
        let template = ComponentCatalog::standard()
            .script_template(language)
            .map(|t| t.name.clone())
            .ok_or_else(|| {
                ToolError::Execution(anyhow::anyhow!("no script component for {}", language))
            })?;

        let mut convo = ctx
            .conversation(format!(
                "You write {} scripts for script components in a visual programming \
                 environment. Script inputs arrive as variables named after the inputs; \
                 assign each output variable. Reply with JSON: code, inputs, outputs, nickname.",
                display_language(language)
            ))
            .with_json_schema("script_component", reply_schema());
        convo.user(params.instructions);
        let reply = convo.send(ctx.llm()?).await?.text();

        let script: ScriptReply = extract_json(&reply)
            .and_then(|json| serde_json::from_str(json).ok())
            .ok_or_else(|| {
                ToolError::UpstreamFailure(format!("reply is not a script description: {}", reply))
            })?;
        if script.code.trim().is_empty() {
            return Err(ToolError::UpstreamFailure("generated script is empty".to_string()));
        }

        let document = GhDocument {
            components: vec![ComponentDoc {
                name: template,
                nickname: script.nickname.clone(),
                instance_guid: "script".to_string(),
                pivot: None,
                locked: None,
                preview: None,
                inputs: script.inputs.iter().map(ScriptParam::to_doc).collect(),
                outputs: script.outputs.iter().map(ScriptParam::to_doc).collect(),
                script: Some(ScriptBody {
                    language: language.to_string(),
                    code: script.code.clone(),
                }),
            }],
            connections: Vec::new(),
        };

        Ok(ToolOutput::new(serde_json::json!({
            "ghjson": document,
            "language": language,
            "code": script.code,
        }))
        .with_metrics(convo.into_metrics()))
    }
}

/// Tool for rewriting the code of a script component on the canvas.
pub struct ScriptEditTool;

#[async_trait]
impl Tool for ScriptEditTool {
    fn name(&self) -> &str {
        "script_edit"
    }

    fn description(&self) -> &str {
        "Modify the code of a script component on the canvas according to instructions."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "guid": { "type": "string", "description": "Script component instance GUID" },
                "instructions": { "type": "string", "minLength": 1 }
            },
            "required": ["guid", "instructions"]
        })
    }

    fn required_capabilities(&self) -> Capabilities {
        Capabilities::from([Capability::Canvas, Capability::TextCompletion])
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        #[derive(Deserialize)]
        struct Params {
            guid: String,
            instructions: String,
        }

        let params: Params = parse_args(params)?;
        let guid = parse_guid(&params.guid).map_err(ToolError::InvalidReference)?;
        let canvas = ctx.canvas()?;

        let object: CanvasObject = canvas
            .query(move |canvas| canvas.find(guid).cloned())
            .await?
            .ok_or_else(|| ToolError::InvalidReference(format!("Component not found: {}", guid)))?;
        let Some(current) = object.script.clone() else {
            return Err(ToolError::InvalidReference(format!(
                "Component {} ('{}') is not a script component",
                guid, object.name
            )));
        };

        let describe = |params: &[crate::canvas::Param]| {
            params
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let mut convo = ctx.conversation(format!(
            "You edit {} scripts in script components. Inputs: {}. Outputs: {}. \
             Keep the same input and output variables. Reply with the complete updated \
             code in a single code block.",
            display_language(&current.language),
            describe(&object.inputs),
            describe(&object.outputs),
        ));
        convo.user(format!(
            "Current code:\n```\n{}\n```\n\nInstructions: {}",
            current.code, params.instructions
        ));
        let reply = convo.send(ctx.llm()?).await?.text();
        let code = extract_code(&reply);
        if code.is_empty() {
            return Err(ToolError::UpstreamFailure("reply contained no code".to_string()));
        }

        let body = ScriptBody {
            language: current.language.clone(),
            code: code.clone(),
        };
        canvas
            .mutate("Edit script", move |canvas| canvas.set_script(guid, body, None))
            .await??;
        info!(%guid, "Script updated");

        Ok(ToolOutput::new(serde_json::json!({
            "guid": guid.to_string(),
            "language": current.language,
            "code": code,
            "previousCode": current.code,
        }))
        .with_metrics(convo.into_metrics()))
    }
}
