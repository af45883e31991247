// ABOUTME: Tests for the argument schema validator.
// ABOUTME: Uses schemas shaped like the ones the canvas tools publish.

use serde_json::json;

use super::schema::validate;

fn connect_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "connections": {
                "type": "array",
                "minItems": 1,
                "items": {
                    "type": "object",
                    "properties": {
                        "sourceGuid": { "type": "string" },
                        "targetGuid": { "type": "string" },
                        "sourceParam": { "type": "string" }
                    },
                    "required": ["sourceGuid", "targetGuid"]
                }
            },
            "mode": { "type": "string", "enum": ["append", "replace"] }
        },
        "required": ["connections"],
        "additionalProperties": false
    })
}

#[test]
fn test_valid_arguments() {
    let args = json!({
        "connections": [{ "sourceGuid": "a", "targetGuid": "b" }],
        "mode": "append"
    });
    assert!(validate(&connect_schema(), &args).is_ok());
}

#[test]
fn test_missing_required() {
    let err = validate(&connect_schema(), &json!({})).unwrap_err();
    assert_eq!(err.path, "");
    assert!(err.message.contains("connections"));
}

#[test]
fn test_nested_path_in_violation() {
    let args = json!({ "connections": [{ "sourceGuid": "a", "targetGuid": 7 }] });
    let err = validate(&connect_schema(), &args).unwrap_err();
    assert_eq!(err.path, "/connections/0/targetGuid");
    assert!(err.message.contains("expected string"));
}

#[test]
fn test_enum_violation() {
    let args = json!({
        "connections": [{ "sourceGuid": "a", "targetGuid": "b" }],
        "mode": "merge"
    });
    let err = validate(&connect_schema(), &args).unwrap_err();
    assert_eq!(err.path, "/mode");
}

#[test]
fn test_additional_properties_rejected() {
    let args = json!({
        "connections": [{ "sourceGuid": "a", "targetGuid": "b" }],
        "extra": true
    });
    let err = validate(&connect_schema(), &args).unwrap_err();
    assert!(err.message.contains("extra"));
}

#[test]
fn test_min_items() {
    let err = validate(&connect_schema(), &json!({ "connections": [] })).unwrap_err();
    assert_eq!(err.path, "/connections");
}

#[test]
fn test_integer_and_bounds() {
    let schema = json!({ "type": "integer", "minimum": 1, "maximum": 5 });
    assert!(validate(&schema, &json!(3)).is_ok());
    assert!(validate(&schema, &json!(3.0)).is_ok());
    assert!(validate(&schema, &json!(3.5)).is_err());
    assert!(validate(&schema, &json!(0)).is_err());
    assert!(validate(&schema, &json!(6)).is_err());
}

#[test]
fn test_type_union() {
    let schema = json!({ "type": ["object", "string"] });
    assert!(validate(&schema, &json!("{}")).is_ok());
    assert!(validate(&schema, &json!({})).is_ok());
    assert!(validate(&schema, &json!(1)).is_err());
}

#[test]
fn test_display_includes_path() {
    let err = validate(&json!({ "type": "string" }), &json!(1)).unwrap_err();
    assert_eq!(err.to_string(), "/: expected string, got integer");
}
