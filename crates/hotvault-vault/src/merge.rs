// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Partial updates to JSON-shaped secrets.

use hotvault_core::HotvaultError;
use serde_json::{Map, Value};

/// Key used to wrap secrets that are not JSON.
pub const RAW_CONTENT_KEY: &str = "raw_content";

/// Interpret decrypted secret text as JSON, wrapping anything else as
/// `{"raw_content": text}`.
pub fn parse_secret(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| {
        let mut map = Map::new();
        map.insert(RAW_CONTENT_KEY.to_string(), Value::String(text.to_string()));
        Value::Object(map)
    })
}

/// Apply an update to a parsed secret.
///
/// Without a key path the value replaces the secret; a string value that
/// itself parses as JSON is used as that JSON. With a dotted path such as
/// `db.primary.password` the value is set at that location, creating
/// intermediate objects and replacing any non-object found on the way.
pub fn apply_update(
    current: Value,
    key_path: Option<&str>,
    value: Value,
) -> Result<Value, HotvaultError> {
    let Some(path) = key_path.filter(|p| !p.is_empty()) else {
        return Ok(match value {
            Value::String(s) => serde_json::from_str(&s).unwrap_or(Value::String(s)),
            other => other,
        });
    };

    let mut root = current;
    let Value::Object(map) = &mut root else {
        return Err(HotvaultError::Usage(
            "key_path can only be applied to a JSON object secret".into(),
        ));
    };

    let mut keys: Vec<&str> = path.split('.').collect();
    let last = keys.pop().unwrap_or(path);
    let mut cursor = map;
    for key in keys {
        let slot = cursor
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        cursor = match slot {
            Value::Object(next) => next,
            _ => return Err(HotvaultError::Internal("path segment is not an object".into())),
        };
    }
    cursor.insert(last.to_string(), value);
    Ok(root)
}

/// Serialize an updated secret for re-encryption: pretty JSON for objects
/// and arrays, the bare text for strings, compact JSON for anything else.
pub fn render_secret(value: &Value) -> Result<String, HotvaultError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Object(_) | Value::Array(_) => Ok(serde_json::to_string_pretty(value)?),
        other => Ok(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn non_json_text_is_wrapped() {
        assert_eq!(parse_secret("hunter2"), json!({"raw_content": "hunter2"}));
        assert_eq!(parse_secret(r#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(parse_secret("42"), json!(42));
    }

    #[test]
    fn dotted_path_creates_and_replaces_intermediates() {
        let current = json!({"db": "flat", "keep": true});
        let updated = apply_update(current, Some("db.primary.password"), json!("s3cr3t")).unwrap();
        assert_eq!(
            updated,
            json!({"db": {"primary": {"password": "s3cr3t"}}, "keep": true})
        );
    }

    #[test]
    fn single_segment_path_sets_top_level_key() {
        let updated = apply_update(json!({"raw_content": "x"}), Some("top"), json!("v")).unwrap();
        assert_eq!(updated, json!({"raw_content": "x", "top": "v"}));
    }

    #[test]
    fn no_path_overwrites_and_parses_json_strings() {
        assert_eq!(
            apply_update(json!({"a": 1}), None, json!(r#"{"b":2}"#)).unwrap(),
            json!({"b": 2})
        );
        assert_eq!(
            apply_update(json!({"a": 1}), Some(""), json!("plain text")).unwrap(),
            json!("plain text")
        );
        assert_eq!(apply_update(json!(1), None, json!([1, 2])).unwrap(), json!([1, 2]));
    }

    #[test]
    fn path_into_non_object_root_is_usage_error() {
        assert!(matches!(
            apply_update(json!([1, 2]), Some("a"), json!(1)),
            Err(HotvaultError::Usage(_))
        ));
    }

    #[test]
    fn rendering_rules() {
        assert_eq!(render_secret(&json!("bare")).unwrap(), "bare");
        assert_eq!(render_secret(&json!(true)).unwrap(), "true");
        assert_eq!(render_secret(&json!({"a": 1})).unwrap(), "{\n  \"a\": 1\n}");
    }
}
