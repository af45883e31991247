// ABOUTME: Component catalog - templates the canvas can instantiate by name.
// ABOUTME: Also holds the advisory data-type compatibility table used when wiring.

use serde::Serialize;

use super::model::{CanvasObject, Guid, Param, Point, ScriptBody};

/// A component the canvas knows how to create.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentTemplate {
    pub name: String,
    pub nickname: String,
    pub category: String,
    pub description: String,
    pub inputs: Vec<Param>,
    pub outputs: Vec<Param>,
    /// Set for script components; the language their code is written in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_language: Option<String>,
}

impl ComponentTemplate {
    pub fn new(
        name: impl Into<String>,
        nickname: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            nickname: nickname.into(),
            category: category.into(),
            description: description.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            script_language: None,
        }
    }

    pub fn input(mut self, param: Param) -> Self {
        self.inputs.push(param);
        self
    }

    pub fn output(mut self, param: Param) -> Self {
        self.outputs.push(param);
        self
    }

    pub fn script(mut self, language: impl Into<String>) -> Self {
        self.script_language = Some(language.into());
        self
    }

    /// Whether `name` refers to this template (name or nickname, any case).
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name) || self.nickname.eq_ignore_ascii_case(name)
    }

    /// Create a fresh canvas object from this template.
    pub fn instantiate(&self, guid: Guid, pivot: Point) -> CanvasObject {
        CanvasObject {
            guid,
            name: self.name.clone(),
            nickname: self.nickname.clone(),
            category: self.category.clone(),
            pivot,
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
            locked: false,
            preview: true,
            script: self.script_language.as_ref().map(|language| ScriptBody {
                language: language.clone(),
                code: String::new(),
            }),
        }
    }
}

/// The set of templates available to a canvas.
#[derive(Debug, Clone, Default)]
pub struct ComponentCatalog {
    templates: Vec<ComponentTemplate>,
}

impl ComponentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A representative set of stock components.
    pub fn standard() -> Self {
        let number = |name: &str, nick: &str| Param::new(name, nick).typed("Number");
        let point = |name: &str, nick: &str| Param::new(name, nick).typed("Point");
        let generic = |name: &str, nick: &str| Param::new(name, nick).typed("Generic");

        let mut catalog = Self::new();
        catalog
            .insert(
                ComponentTemplate::new("Number Slider", "Slider", "Params", "Numeric slider")
                    .output(number("Number", "N")),
            )
            .insert(
                ComponentTemplate::new("Boolean Toggle", "Toggle", "Params", "Boolean switch")
                    .output(Param::new("Boolean", "B").typed("Boolean")),
            )
            .insert(
                ComponentTemplate::new("Panel", "Panel", "Params", "Text display and input")
                    .input(generic("Input", "I"))
                    .output(Param::new("Output", "O").typed("Text")),
            )
            .insert(
                ComponentTemplate::new("Addition", "A+B", "Maths", "Add two numbers")
                    .input(number("A", "A"))
                    .input(number("B", "B"))
                    .output(number("Result", "R")),
            )
            .insert(
                ComponentTemplate::new("Multiplication", "A×B", "Maths", "Multiply two numbers")
                    .input(number("A", "A"))
                    .input(number("B", "B"))
                    .output(number("Result", "R")),
            )
            .insert(
                ComponentTemplate::new("Series", "Series", "Sets", "Arithmetic sequence")
                    .input(number("Start", "S"))
                    .input(number("Step", "N"))
                    .input(Param::new("Count", "C").typed("Integer"))
                    .output(number("Series", "S")),
            )
            .insert(
                ComponentTemplate::new("Construct Point", "Pt", "Vector", "Point from coordinates")
                    .input(number("X coordinate", "X"))
                    .input(number("Y coordinate", "Y"))
                    .input(number("Z coordinate", "Z"))
                    .output(point("Point", "Pt")),
            )
            .insert(
                ComponentTemplate::new("Unit Z", "Z", "Vector", "Unit vector along Z")
                    .input(number("Factor", "F"))
                    .output(Param::new("Unit vector", "V").typed("Vector")),
            )
            .insert(
                ComponentTemplate::new("XY Plane", "XY", "Vector", "World XY plane")
                    .input(point("Origin", "O"))
                    .output(Param::new("Plane", "P").typed("Plane")),
            )
            .insert(
                ComponentTemplate::new("Line", "Ln", "Curve", "Line between two points")
                    .input(point("Start Point", "A"))
                    .input(point("End Point", "B"))
                    .output(Param::new("Line", "L").typed("Curve")),
            )
            .insert(
                ComponentTemplate::new("Circle", "Cir", "Curve", "Circle from plane and radius")
                    .input(Param::new("Plane", "P").typed("Plane"))
                    .input(number("Radius", "R"))
                    .output(Param::new("Circle", "C").typed("Curve")),
            )
            .insert(
                ComponentTemplate::new("Extrude", "Extr", "Surface", "Extrude along a vector")
                    .input(Param::new("Base", "B").typed("Geometry"))
                    .input(Param::new("Direction", "D").typed("Vector"))
                    .output(Param::new("Extrusion", "E").typed("Brep")),
            )
            .insert(
                ComponentTemplate::new("Python 3 Script", "Py3", "Maths", "Python script")
                    .input(generic("x", "x"))
                    .input(generic("y", "y"))
                    .output(generic("a", "a"))
                    .script("python"),
            )
            .insert(
                ComponentTemplate::new("C# Script", "C#", "Maths", "C# script")
                    .input(generic("x", "x"))
                    .input(generic("y", "y"))
                    .output(generic("a", "a"))
                    .script("csharp"),
            );
        catalog
    }

    /// Add a template, replacing one with the same name.
    pub fn insert(&mut self, template: ComponentTemplate) -> &mut Self {
        self.templates.retain(|t| t.name != template.name);
        self.templates.push(template);
        self
    }

    /// Look up a template by name or nickname. Exact names win over nicknames.
    pub fn get(&self, name: &str) -> Option<&ComponentTemplate> {
        self.templates
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .or_else(|| self.templates.iter().find(|t| t.matches(name)))
    }

    /// The script template for a language ("python", "csharp").
    pub fn script_template(&self, language: &str) -> Option<&ComponentTemplate> {
        let wanted = normalize_language(language);
        self.templates
            .iter()
            .find(|t| t.script_language.as_deref() == Some(wanted))
    }

    /// Templates whose name, nickname, or description contains `filter`,
    /// optionally restricted to a category.
    pub fn search(&self, filter: Option<&str>, category: Option<&str>) -> Vec<&ComponentTemplate> {
        let filter = filter.map(str::to_lowercase);
        self.templates
            .iter()
            .filter(|t| category.is_none_or(|c| t.category.eq_ignore_ascii_case(c)))
            .filter(|t| {
                filter.as_ref().is_none_or(|f| {
                    t.name.to_lowercase().contains(f)
                        || t.nickname.to_lowercase().contains(f)
                        || t.description.to_lowercase().contains(f)
                })
            })
            .collect()
    }

    pub fn templates(&self) -> &[ComponentTemplate] {
        &self.templates
    }
}

/// Canonical spelling of a script language name.
pub fn normalize_language(language: &str) -> &'static str {
    match language.trim().to_lowercase().as_str() {
        "c#" | "cs" | "csharp" => "csharp",
        _ => "python",
    }
}

/// Best-effort check whether data of `source` type can flow into `target`.
///
/// Unknown or generic types are always compatible; the host coerces at
/// runtime, so callers treat a `false` as a warning, never a refusal.
pub fn types_compatible(source: Option<&str>, target: Option<&str>) -> bool {
    let (Some(source), Some(target)) = (source, target) else {
        return true;
    };
    if source.eq_ignore_ascii_case(target) {
        return true;
    }

    matches!(
        (source, target),
        ("Generic", _)
            | (_, "Generic")
            | (_, "Text")
            | ("Integer", "Number")
            | ("Number", "Integer")
            | ("Point", "Vector")
            | ("Vector", "Point")
            | ("Point", "Plane")
            | ("Curve" | "Brep" | "Point" | "Plane", "Geometry")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name_and_nickname() {
        let catalog = ComponentCatalog::standard();
        assert_eq!(catalog.get("addition").unwrap().name, "Addition");
        assert_eq!(catalog.get("Pt").unwrap().name, "Construct Point");
        assert!(catalog.get("Teleporter").is_none());
    }

    #[test]
    fn test_search_by_category() {
        let catalog = ComponentCatalog::standard();
        let curves = catalog.search(None, Some("curve"));
        assert!(curves.iter().all(|t| t.category == "Curve"));
        assert_eq!(curves.len(), 2);

        let sliders = catalog.search(Some("slider"), None);
        assert_eq!(sliders[0].name, "Number Slider");
    }

    #[test]
    fn test_script_template() {
        let catalog = ComponentCatalog::standard();
        assert_eq!(catalog.script_template("Python").unwrap().name, "Python 3 Script");
        assert_eq!(catalog.script_template("c#").unwrap().name, "C# Script");
    }

    #[test]
    fn test_instantiate_script_has_empty_body() {
        let catalog = ComponentCatalog::standard();
        let obj = catalog
            .get("Python 3 Script")
            .unwrap()
            .instantiate(Guid::new(), Point::new(1.0, 2.0));
        assert_eq!(obj.script.unwrap().language, "python");
        assert!(obj.preview);
        assert!(!obj.locked);
    }

    #[test]
    fn test_types_compatible_is_permissive() {
        assert!(types_compatible(None, Some("Curve")));
        assert!(types_compatible(Some("Number"), Some("Number")));
        assert!(types_compatible(Some("Curve"), Some("Geometry")));
        assert!(types_compatible(Some("Number"), Some("Text")));
        assert!(!types_compatible(Some("Curve"), Some("Number")));
    }
}
