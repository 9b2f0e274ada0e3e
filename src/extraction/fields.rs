//! Declarative field resolution over loosely-shaped backend JSON.
//!
//! The backend names the same logical field differently across endpoints and
//! versions. Each logical field gets a `FieldRule`: an ordered list of key paths,
//! evaluated in priority order, where the first present and non-empty value wins.

use serde_json::Value;

/// A path of object keys, e.g. `&["medico", "nome"]`.
pub type KeyPath = &'static [&'static str];

/// Ordered candidates for one logical field, plus the sentinel used when none match.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub candidates: &'static [KeyPath],
    pub fallback: Option<&'static str>,
}

impl FieldRule {
    /// First candidate value that is present and non-empty.
    pub fn resolve<'a>(&self, raw: &'a Value) -> Option<&'a Value> {
        self.candidates
            .iter()
            .filter_map(|path| lookup(raw, path))
            .find(|value| is_present(value))
    }

    /// Resolved value rendered as text, else the fallback, else empty.
    pub fn resolve_text(&self, raw: &Value) -> String {
        match self.resolve(raw) {
            Some(value) => value_to_text(value),
            None => self.fallback.unwrap_or_default().to_string(),
        }
    }
}

/// Follow a key path through nested objects.
pub fn lookup<'a>(raw: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(raw, |current, key| current.get(*key))
}

/// Null, `false`, zero, empty strings and empty containers count as absent.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
    }
}

/// Render any JSON value as text: strings as-is, scalars in JSON form,
/// containers as compact JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Optional text field: `None` when missing or null.
pub fn optional_text(raw: &Value, key: &str) -> Option<String> {
    match raw.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value_to_text(value)),
    }
}

/// Text field defaulting to empty.
pub fn text_or_empty(raw: &Value, key: &str) -> String {
    optional_text(raw, key).unwrap_or_default()
}

/// Boolean field; anything but a JSON `true` is `false`.
pub fn flag(raw: &Value, key: &str) -> bool {
    raw.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Non-negative count; accepts numbers and numeric strings, otherwise 0.
pub fn count(raw: &Value, key: &str) -> u64 {
    match raw.get(key) {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// List of text values from the first key holding an array.
pub fn text_list(raw: &Value, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .find_map(|key| raw.get(*key).and_then(Value::as_array))
        .map(|items| {
            items
                .iter()
                .filter(|item| !item.is_null())
                .map(value_to_text)
                .collect()
        })
        .unwrap_or_default()
}

/// Human-readable JSON type name for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
