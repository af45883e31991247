// ABOUTME: Validates tool arguments against the JSON Schema a tool publishes.
// ABOUTME: Covers the keyword subset tool schemas use; reports the first violation.

use serde_json::{Map, Value};

/// A single schema violation, located by JSON pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{}: {}", path, self.message)
    }
}

/// Validate `value` against `schema`, returning the first violation found.
///
/// Supported keywords: `type`, `properties`, `required`,
/// `additionalProperties` (boolean or schema), `enum`, `items`, `minItems`,
/// `maxItems`, `minLength`, `minimum`, `maximum`. Others are ignored.
pub fn validate(schema: &Value, value: &Value) -> Result<(), Violation> {
    check(schema, value, "")
}

fn violation(path: &str, message: impl Into<String>) -> Violation {
    Violation {
        path: path.to_string(),
        message: message.into(),
    }
}

fn check(schema: &Value, value: &Value, path: &str) -> Result<(), Violation> {
    let Some(schema) = schema.as_object() else {
        // `true`, `{}` and anything non-object accept all values.
        return Ok(());
    };

    if let Some(ty) = schema.get("type") {
        check_type(ty, value, path)?;
    }

    if let Some(Value::Array(options)) = schema.get("enum") {
        if !options.contains(value) {
            let allowed: Vec<String> = options.iter().map(|o| o.to_string()).collect();
            return Err(violation(
                path,
                format!("value {} is not one of [{}]", value, allowed.join(", ")),
            ));
        }
    }

    match value {
        Value::Object(map) => check_object(schema, map, path)?,
        Value::Array(items) => check_array(schema, items, path)?,
        Value::String(s) => {
            if let Some(min) = schema.get("minLength").and_then(Value::as_u64) {
                if (s.chars().count() as u64) < min {
                    return Err(violation(
                        path,
                        format!("string is shorter than {} characters", min),
                    ));
                }
            }
        }
        Value::Number(n) => {
            let n = n.as_f64().unwrap_or(f64::NAN);
            if let Some(min) = schema.get("minimum").and_then(Value::as_f64) {
                if n < min {
                    return Err(violation(path, format!("{} is less than minimum {}", n, min)));
                }
            }
            if let Some(max) = schema.get("maximum").and_then(Value::as_f64) {
                if n > max {
                    return Err(violation(
                        path,
                        format!("{} is greater than maximum {}", n, max),
                    ));
                }
            }
        }
        _ => {}
    }

    Ok(())
}

fn check_type(ty: &Value, value: &Value, path: &str) -> Result<(), Violation> {
    let accepted: Vec<&str> = match ty {
        Value::String(s) => vec![s.as_str()],
        Value::Array(list) => list.iter().filter_map(Value::as_str).collect(),
        _ => return Ok(()),
    };

    if accepted.iter().any(|t| type_matches(t, value)) {
        Ok(())
    } else {
        Err(violation(
            path,
            format!(
                "expected {}, got {}",
                accepted.join(" or "),
                type_name(value)
            ),
        ))
    }
}

fn type_matches(ty: &str, value: &Value) -> bool {
    match ty {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        "number" => value.is_number(),
        "integer" => match value {
            Value::Number(n) => {
                n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            _ => false,
        },
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn check_object(
    schema: &Map<String, Value>,
    map: &Map<String, Value>,
    path: &str,
) -> Result<(), Violation> {
    if let Some(Value::Array(required)) = schema.get("required") {
        for key in required.iter().filter_map(Value::as_str) {
            if !map.contains_key(key) {
                return Err(violation(
                    path,
                    format!("missing required property '{}'", key),
                ));
            }
        }
    }

    let properties = schema.get("properties").and_then(Value::as_object);
    let additional = schema.get("additionalProperties");

    // Iterate in key order so the reported violation is deterministic.
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();

    for key in keys {
        let child_path = format!("{}/{}", path, escape_pointer(key));
        let child = &map[key];

        match properties.and_then(|p| p.get(key)) {
            Some(prop_schema) => check(prop_schema, child, &child_path)?,
            None => match additional {
                Some(Value::Bool(false)) => {
                    return Err(violation(
                        path,
                        format!("unexpected property '{}'", key),
                    ));
                }
                Some(extra @ Value::Object(_)) => check(extra, child, &child_path)?,
                _ => {}
            },
        }
    }

    Ok(())
}

fn check_array(
    schema: &Map<String, Value>,
    items: &[Value],
    path: &str,
) -> Result<(), Violation> {
    if let Some(min) = schema.get("minItems").and_then(Value::as_u64) {
        if (items.len() as u64) < min {
            return Err(violation(
                path,
                format!("array has {} items, at least {} required", items.len(), min),
            ));
        }
    }
    if let Some(max) = schema.get("maxItems").and_then(Value::as_u64) {
        if (items.len() as u64) > max {
            return Err(violation(
                path,
                format!("array has {} items, at most {} allowed", items.len(), max),
            ));
        }
    }

    if let Some(item_schema) = schema.get("items") {
        for (i, item) in items.iter().enumerate() {
            check(item_schema, item, &format!("{}/{}", path, i))?;
        }
    }

    Ok(())
}

fn escape_pointer(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}
