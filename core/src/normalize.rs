//! Canonical list form for recipe text fields.
//!
//! Ingredients and instructions arrive from the backend as `null`, a single
//! delimited string, a string holding a JSON array, or a JSON array. Every
//! shape is collapsed into `Vec<String>` here so nothing downstream ever sees
//! the union.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Normalize any JSON value into an ordered list of non-empty trimmed strings.
#[must_use]
pub fn normalize_list_field(field: &Value) -> Vec<String> {
    match field {
        Value::Array(items) => normalize_items(items),
        Value::String(text) => normalize_text(text),
        _ => Vec::new(),
    }
}

/// Normalize free text. A JSON array literal wins over delimiter splitting.
#[must_use]
pub fn normalize_text(text: &str) -> Vec<String> {
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text) {
        return normalize_items(&items);
    }
    text.split(['\n', ',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trim and drop empties from an already list-shaped field.
#[must_use]
pub fn normalize_list<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_items(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect()
}

/// Serde adapter: `#[serde(default, deserialize_with = "deserialize_list_field")]`.
pub fn deserialize_list_field<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(normalize_list_field(&value))
}
