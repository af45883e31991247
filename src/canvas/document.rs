// ABOUTME: GhJSON - the structural description of components and wires
// ABOUTME: exchanged by gh_get, gh_put, gh_generate, and script_generate.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::catalog::{ComponentCatalog, ComponentTemplate};
use super::model::{CanvasObject, Guid, Param, Point, ScriptBody};

/// A set of components and the wires between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GhDocument {
    #[serde(default)]
    pub components: Vec<ComponentDoc>,
    #[serde(default)]
    pub connections: Vec<ConnectionDoc>,
}

/// One component in a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDoc {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    /// Identity within the document. On the canvas side it is the object guid.
    #[serde(alias = "id")]
    pub instance_guid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<bool>,
    /// Overrides the template's inputs; only honoured for script components.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<ParamDoc>,
    /// Overrides the template's outputs; only honoured for script components.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<ParamDoc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<ScriptBody>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamDoc {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<String>,
}

impl ParamDoc {
    pub fn to_param(&self) -> Param {
        let mut param = Param::new(
            &self.name,
            self.nickname.clone().unwrap_or_else(|| self.name.clone()),
        );
        param.type_hint = self.type_hint.clone();
        param
    }

    fn from_param(param: &Param) -> Self {
        Self {
            name: param.name.clone(),
            nickname: (param.nickname != param.name).then(|| param.nickname.clone()),
            type_hint: param.type_hint.clone(),
        }
    }
}

/// A wire from an output to an input, by component id and parameter name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDoc {
    pub from: Endpoint,
    pub to: Endpoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    #[serde(alias = "id")]
    pub instance_guid: String,
    pub param_name: String,
}

impl ComponentDoc {
    /// The inputs this component will have once placed.
    pub fn effective_inputs(&self, template: &ComponentTemplate) -> Vec<Param> {
        if template.script_language.is_some() && !self.inputs.is_empty() {
            self.inputs.iter().map(ParamDoc::to_param).collect()
        } else {
            template.inputs.clone()
        }
    }

    /// The outputs this component will have once placed.
    pub fn effective_outputs(&self, template: &ComponentTemplate) -> Vec<Param> {
        if template.script_language.is_some() && !self.outputs.is_empty() {
            self.outputs.iter().map(ParamDoc::to_param).collect()
        } else {
            template.outputs.clone()
        }
    }

    fn from_object(object: &CanvasObject) -> Self {
        let is_script = object.is_script();
        Self {
            name: object.name.clone(),
            nickname: (object.nickname != object.name).then(|| object.nickname.clone()),
            instance_guid: object.guid.to_string(),
            pivot: Some(object.pivot),
            locked: object.locked.then_some(true),
            preview: (!object.preview).then_some(false),
            inputs: if is_script {
                object.inputs.iter().map(ParamDoc::from_param).collect()
            } else {
                Vec::new()
            },
            outputs: if is_script {
                object.outputs.iter().map(ParamDoc::from_param).collect()
            } else {
                Vec::new()
            },
            script: object.script.clone(),
        }
    }
}

impl GhDocument {
    /// Parse a document given either as a JSON object or as JSON text.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, String> {
        match value {
            serde_json::Value::String(text) => Self::from_text(text),
            other => serde_json::from_value(other.clone())
                .map_err(|e| format!("not a valid GhJSON document: {}", e)),
        }
    }

    /// Parse a document from text, tolerating code fences and surrounding prose.
    pub fn from_text(text: &str) -> Result<Self, String> {
        let json = crate::llm::extract_json(text)
            .ok_or_else(|| "no JSON object found in text".to_string())?;
        serde_json::from_str(json).map_err(|e| format!("not a valid GhJSON document: {}", e))
    }

    /// Describe canvas objects, with the wires among them when asked.
    pub fn from_objects(objects: &[&CanvasObject], include_connections: bool) -> Self {
        let components = objects.iter().map(|o| ComponentDoc::from_object(o)).collect();

        let mut connections = Vec::new();
        if include_connections {
            let by_guid: HashMap<Guid, &CanvasObject> =
                objects.iter().map(|o| (o.guid, *o)).collect();
            for target in objects {
                for input in &target.inputs {
                    for source in &input.sources {
                        let Some(upstream) = by_guid.get(&source.guid) else {
                            continue;
                        };
                        let Some(output) = upstream.outputs.get(source.index) else {
                            continue;
                        };
                        connections.push(ConnectionDoc {
                            from: Endpoint {
                                instance_guid: source.guid.to_string(),
                                param_name: output.name.clone(),
                            },
                            to: Endpoint {
                                instance_guid: target.guid.to_string(),
                                param_name: input.name.clone(),
                            },
                        });
                    }
                }
            }
        }

        Self {
            components,
            connections,
        }
    }

    /// Every problem that would stop this document from being placed.
    pub fn validate(&self, catalog: &ComponentCatalog) -> Vec<String> {
        let mut problems = Vec::new();
        if self.components.is_empty() {
            problems.push("document contains no components".to_string());
        }

        let mut seen = HashSet::new();
        let mut resolved: HashMap<&str, (&ComponentDoc, &ComponentTemplate)> = HashMap::new();
        for component in &self.components {
            if !seen.insert(component.instance_guid.as_str()) {
                problems.push(format!(
                    "duplicate instanceGuid '{}'",
                    component.instance_guid
                ));
            }
            match catalog.get(&component.name) {
                Some(template) => {
                    resolved.insert(component.instance_guid.as_str(), (component, template));
                }
                None => problems.push(format!("unknown component '{}'", component.name)),
            }
        }

        for (i, connection) in self.connections.iter().enumerate() {
            match resolved.get(connection.from.instance_guid.as_str()) {
                Some((doc, template)) => {
                    let outputs = doc.effective_outputs(template);
                    if !outputs.iter().any(|p| p.matches(&connection.from.param_name)) {
                        problems.push(format!(
                            "connection {}: '{}' has no output '{}'",
                            i, doc.name, connection.from.param_name
                        ));
                    }
                }
                None if !seen.contains(connection.from.instance_guid.as_str()) => {
                    problems.push(format!(
                        "connection {}: source '{}' is not a component in the document",
                        i, connection.from.instance_guid
                    ));
                }
                None => {}
            }
            match resolved.get(connection.to.instance_guid.as_str()) {
                Some((doc, template)) => {
                    let inputs = doc.effective_inputs(template);
                    if !inputs.iter().any(|p| p.matches(&connection.to.param_name)) {
                        problems.push(format!(
                            "connection {}: '{}' has no input '{}'",
                            i, doc.name, connection.to.param_name
                        ));
                    }
                }
                None if !seen.contains(connection.to.instance_guid.as_str()) => {
                    problems.push(format!(
                        "connection {}: target '{}' is not a component in the document",
                        i, connection.to.instance_guid
                    ));
                }
                None => {}
            }
        }

        problems
    }
}
