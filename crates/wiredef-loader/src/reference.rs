//! The `@` reference grammar.
//!
//! | Form          | Result                                  |
//! |---------------|-----------------------------------------|
//! | `@name`       | [`Value::Reference`] to `name`          |
//! | `@@text`      | the literal string `@text`              |
//! | `@=expr`      | rejected, expressions                   |
//! | `@?name`      | rejected, optional references           |
//! | `@name=`      | rejected, non-strict references         |
//!
//! Any other value passes through unchanged. Sequences and mappings are
//! walked recursively.

use serde_yaml::Value as YamlValue;
use wiredef_common::constants::REFERENCE_PREFIX;
use wiredef_common::types::Value;

/// A value form the loader recognises and refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedForm {
    /// `@=...`
    Expression,
    /// `@?...`
    OptionalReference,
    /// `@...=`
    NonStrictReference,
    /// `!tag value`
    TaggedValue,
    /// A sequence or mapping used as a mapping key.
    ComplexKey,
}

impl UnsupportedForm {
    /// Feature label reported in [`UnsupportedFeature`] errors.
    ///
    /// [`UnsupportedFeature`]: wiredef_common::error::DefinitionError::UnsupportedFeature
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Expression => "expression",
            Self::OptionalReference => "optional-reference",
            Self::NonStrictReference => "non-strict-reference",
            Self::TaggedValue => "tagged-value",
            Self::ComplexKey => "complex-key",
        }
    }
}

/// Resolves references anywhere inside `value`.
///
/// # Errors
///
/// Returns the first unsupported form encountered.
pub fn resolve_references(value: &YamlValue) -> Result<Value, UnsupportedForm> {
    convert(value, resolve_str)
}

/// Converts `value` without producing references.
///
/// Used for parameters: `@@text` still unescapes to `@text`, every other
/// string is kept as written.
///
/// # Errors
///
/// Returns an error for tagged values and complex mapping keys.
pub fn literal_value(value: &YamlValue) -> Result<Value, UnsupportedForm> {
    convert(value, |s| Ok(Value::string(unescape(s))))
}

/// Strips one marker from an escaped `@@text` string.
fn unescape(value: &str) -> &str {
    value
        .strip_prefix(REFERENCE_PREFIX)
        .filter(|rest| rest.starts_with(REFERENCE_PREFIX))
        .unwrap_or(value)
}

/// Applies the reference grammar to a single string.
///
/// # Errors
///
/// Returns the unsupported form if the string uses one.
pub fn resolve_str(value: &str) -> Result<Value, UnsupportedForm> {
    let Some(rest) = value.strip_prefix(REFERENCE_PREFIX) else {
        return Ok(Value::string(value));
    };
    if rest.starts_with('=') {
        return Err(UnsupportedForm::Expression);
    }
    if rest.starts_with(REFERENCE_PREFIX) {
        return Ok(Value::string(rest));
    }
    if rest.starts_with('?') {
        return Err(UnsupportedForm::OptionalReference);
    }
    if rest.ends_with('=') {
        return Err(UnsupportedForm::NonStrictReference);
    }
    Ok(Value::reference(rest))
}

fn convert<F>(value: &YamlValue, on_string: F) -> Result<Value, UnsupportedForm>
where
    F: Fn(&str) -> Result<Value, UnsupportedForm> + Copy,
{
    match value {
        YamlValue::Null => Ok(Value::Null),
        YamlValue::Bool(b) => Ok(Value::Bool(*b)),
        YamlValue::Number(n) => Ok(Value::Number(n.clone())),
        YamlValue::String(s) => on_string(s),
        YamlValue::Sequence(items) => items
            .iter()
            .map(|item| convert(item, on_string))
            .collect::<Result<Vec<_>, UnsupportedForm>>()
            .map(Value::Sequence),
        YamlValue::Mapping(map) => map
            .iter()
            .map(|(k, v)| Ok((mapping_key(k)?, convert(v, on_string)?)))
            .collect::<Result<Vec<_>, UnsupportedForm>>()
            .map(Value::Mapping),
        YamlValue::Tagged(_) => Err(UnsupportedForm::TaggedValue),
    }
}

/// Renders a scalar mapping key to a string.
///
/// # Errors
///
/// Returns [`UnsupportedForm::ComplexKey`] or [`UnsupportedForm::TaggedValue`]
/// for non-scalar keys.
pub fn mapping_key(key: &YamlValue) -> Result<String, UnsupportedForm> {
    match key {
        YamlValue::String(s) => Ok(s.clone()),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Null => Ok(String::new()),
        YamlValue::Sequence(_) | YamlValue::Mapping(_) => Err(UnsupportedForm::ComplexKey),
        YamlValue::Tagged(_) => Err(UnsupportedForm::TaggedValue),
    }
}
