// ABOUTME: Object model of the canvas as seen through the capability interface.
// ABOUTME: Guids, pivots, parameters, wires, and script bodies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of an object on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Guid(Uuid);

impl Guid {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Guid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Guid {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// A canvas location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Reference to the `index`-th input or output parameter of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamRef {
    pub guid: Guid,
    pub index: usize,
}

impl ParamRef {
    pub fn new(guid: Guid, index: usize) -> Self {
        Self { guid, index }
    }
}

/// An input or output parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub nickname: String,
    /// Data type the parameter carries, when known ("Number", "Curve", ...).
    pub type_hint: Option<String>,
    /// Outputs wired into this parameter. Always empty on outputs.
    pub sources: Vec<ParamRef>,
}

impl Param {
    pub fn new(name: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nickname: nickname.into(),
            type_hint: None,
            sources: Vec::new(),
        }
    }

    pub fn typed(mut self, type_hint: impl Into<String>) -> Self {
        self.type_hint = Some(type_hint.into());
        self
    }

    /// Match by name or nickname, ignoring case.
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name) || self.nickname.eq_ignore_ascii_case(name)
    }
}

/// Source code held by a script component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptBody {
    pub language: String,
    pub code: String,
}

/// A node on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasObject {
    pub guid: Guid,
    pub name: String,
    pub nickname: String,
    pub category: String,
    pub pivot: Point,
    pub inputs: Vec<Param>,
    pub outputs: Vec<Param>,
    pub locked: bool,
    /// Whether geometry preview is on.
    pub preview: bool,
    pub script: Option<ScriptBody>,
}

impl CanvasObject {
    /// Find an input by name or nickname.
    pub fn input_index(&self, name: &str) -> Option<usize> {
        self.inputs.iter().position(|p| p.matches(name))
    }

    /// Find an output by name or nickname.
    pub fn output_index(&self, name: &str) -> Option<usize> {
        self.outputs.iter().position(|p| p.matches(name))
    }

    /// Objects this one receives wires from.
    pub fn upstream(&self) -> impl Iterator<Item = Guid> + '_ {
        self.inputs
            .iter()
            .flat_map(|p| p.sources.iter().map(|s| s.guid))
    }

    pub fn is_script(&self) -> bool {
        self.script.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guid_round_trips_through_string() {
        let guid = Guid::new();
        let parsed: Guid = guid.to_string().parse().unwrap();
        assert_eq!(guid, parsed);
        assert!("not-a-guid".parse::<Guid>().is_err());
    }

    #[test]
    fn test_param_matches_name_or_nickname() {
        let param = Param::new("Radius", "R");
        assert!(param.matches("radius"));
        assert!(param.matches("R"));
        assert!(!param.matches("Plane"));
    }
}
