// ABOUTME: Helpers for pulling structured values out of model replies.
// ABOUTME: Replies may wrap JSON in code fences or surround it with prose.

use std::sync::LazyLock;

use regex::Regex;

static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:[A-Za-z0-9_+-]*)\s*\n?(.*?)```").expect("valid fence regex")
});

static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+").expect("valid integer regex"));

static INDEX_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-?\b\d+\b(?:\s*,\s*-?\b\d+\b)*").expect("valid index list regex")
});

static BOOLEAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(true|false)\b").expect("valid boolean regex"));

/// Find the JSON value in a reply.
///
/// Prefers the body of the first code fence; otherwise takes the span from
/// the first `{` or `[` to the matching last `}` or `]`.
pub fn extract_json(text: &str) -> Option<&str> {
    let text = match FENCE.captures(text).and_then(|c| c.get(1)) {
        Some(body) => body.as_str(),
        None => text,
    };
    let trimmed = text.trim();

    let start = trimmed.find(['{', '['])?;
    let close = if trimmed[start..].starts_with('{') {
        '}'
    } else {
        ']'
    };
    let end = trimmed.rfind(close)?;
    (end > start).then(|| &trimmed[start..=end])
}

/// Parse a JSON array of strings out of a reply.
///
/// Non-string elements are rendered as their JSON text.
pub fn parse_string_list(text: &str) -> Option<Vec<String>> {
    let json = extract_json(text)?;
    let value: serde_json::Value = serde_json::from_str(json).ok()?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        // Some models wrap the list: {"items": [...]}
        serde_json::Value::Object(map) => map.into_iter().find_map(|(_, v)| match v {
            serde_json::Value::Array(items) => Some(items),
            _ => None,
        })?,
        _ => return None,
    };

    Some(
        items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
    )
}

/// The index list in a reply, or `None` when there isn't one.
///
/// A JSON array of integers wins, including one wrapped in an object such as
/// `{"indices": [0, 2]}`. Without JSON, the first bare comma list (`0, 2`) is
/// used. `[]` is a valid empty answer.
pub fn parse_indices(text: &str) -> Option<Vec<i64>> {
    let json = extract_json(text)
        .and_then(|span| serde_json::from_str::<serde_json::Value>(span).ok());
    match json {
        Some(serde_json::Value::Array(items)) => integer_array(&items),
        Some(serde_json::Value::Object(map)) => map.values().find_map(|v| match v {
            serde_json::Value::Array(items) => integer_array(items),
            _ => None,
        }),
        Some(_) => None,
        None => INDEX_LIST.find(text).map(|m| {
            INTEGER
                .find_iter(m.as_str())
                .filter_map(|i| i.as_str().parse().ok())
                .collect()
        }),
    }
}

fn integer_array(items: &[serde_json::Value]) -> Option<Vec<i64>> {
    items.iter().map(serde_json::Value::as_i64).collect()
}

/// The body of the first code fence, or the whole reply trimmed.
pub fn extract_code(text: &str) -> String {
    FENCE
        .captures(text)
        .and_then(|c| c.get(1))
        .map_or(text, |m| m.as_str())
        .trim()
        .to_string()
}

/// The first `true` or `false` word in the reply.
pub fn parse_bool(text: &str) -> Option<bool> {
    BOOLEAN
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().eq_ignore_ascii_case("true"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_fence() {
        let text = "Sure!\n```json\n{\"a\": 1}\n```\nAnything else?";
        assert_eq!(extract_json(text), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_extract_code_prefers_fence() {
        let text = "Here:\n```python\na = x + y\n```";
        assert_eq!(extract_code(text), "a = x + y");
        assert_eq!(extract_code("  a = 1  "), "a = 1");
    }

    #[test]
    fn test_extract_from_prose() {
        assert_eq!(extract_json("Result: [1, 2] done"), Some("[1, 2]"));
        assert_eq!(extract_json("no json here"), None);
    }

    #[test]
    fn test_parse_string_list() {
        assert_eq!(
            parse_string_list("[\"a\", \"b\", 3]"),
            Some(vec!["a".to_string(), "b".to_string(), "3".to_string()])
        );
        assert_eq!(
            parse_string_list("{\"items\": [\"x\"]}"),
            Some(vec!["x".to_string()])
        );
        assert_eq!(parse_string_list("just words"), None);
    }

    #[test]
    fn test_parse_indices() {
        assert_eq!(parse_indices("[0]"), Some(vec![0]));
        assert_eq!(parse_indices("0, 2,5"), Some(vec![0, 2, 5]));
        assert_eq!(parse_indices("The matching indices are [1, 3]."), Some(vec![1, 3]));
        assert_eq!(parse_indices("[]"), Some(vec![]));
    }

    #[test]
    fn test_parse_indices_ignores_sibling_fields() {
        assert_eq!(
            parse_indices("{\"indices\": [0], \"count\": 1}"),
            Some(vec![0])
        );
        assert_eq!(
            parse_indices("```json\n{\"count\": 2, \"matches\": [1, 2]}\n```"),
            Some(vec![1, 2])
        );
    }

    #[test]
    fn test_parse_indices_without_a_list() {
        assert_eq!(parse_indices("Only apple starts with a."), None);
        assert_eq!(parse_indices("none"), None);
        assert_eq!(parse_indices("[\"apple\"]"), None);
        assert_eq!(parse_indices("{\"answer\": \"apple\"}"), None);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("The answer is false."), Some(false));
        assert_eq!(parse_bool("untrue"), None);
    }
}
