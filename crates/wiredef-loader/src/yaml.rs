//! Small helpers over `serde_yaml` values.

use serde_yaml::{Mapping, Value as YamlValue};

/// Human-readable YAML type of a value, used in error messages.
pub const fn type_name(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "null",
        YamlValue::Bool(_) => "boolean",
        YamlValue::Number(_) => "number",
        YamlValue::String(_) => "string",
        YamlValue::Sequence(_) => "sequence",
        YamlValue::Mapping(_) => "mapping",
        YamlValue::Tagged(_) => "tagged value",
    }
}

/// Renders a mapping key the way it is written in the document.
pub fn display_key(key: &YamlValue) -> String {
    match key {
        YamlValue::String(s) => s.clone(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Null => "~".to_owned(),
        other => render(other),
    }
}

/// Renders an arbitrary value as inline YAML.
pub fn render(value: &YamlValue) -> String {
    match value {
        YamlValue::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map_or_else(|_| format!("{other:?}"), |s| s.trim_end().to_owned()),
    }
}

/// Returns the value under `key` unless it is absent or null.
pub fn non_null<'a>(map: &'a Mapping, key: &str) -> Option<&'a YamlValue> {
    map.get(key).filter(|v| !v.is_null())
}

/// Returns `true` if `key` is present with a non-null value.
pub fn is_set(map: &Mapping, key: &str) -> bool {
    non_null(map, key).is_some()
}
