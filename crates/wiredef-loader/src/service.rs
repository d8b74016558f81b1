//! Service definition parsing.
//!
//! Each entry under `services` becomes exactly one [`Definition`]. The raw
//! value is first decoded by shape ([`ServiceShape`]), then dispatched on
//! the directive keys it carries.

use std::path::Path;

use serde_yaml::{Mapping, Value as YamlValue};
use wiredef_common::constants::{Presence, REFERENCE_PREFIX, UNSUPPORTED_DIRECTIVES};
use wiredef_common::error::{DefinitionError, Result};
use wiredef_common::types::{
    AliasDefinition, Definition, DefinitionSet, FactoryCallable, FactoryDefinition,
    InstanceDefinition, Value,
};

use crate::document::Document;
use crate::reference;
use crate::yaml;

const KEY_ALIAS: &str = "alias";
const KEY_PARENT: &str = "parent";
const KEY_PUBLIC: &str = "public";
const KEY_CLASS: &str = "class";
const KEY_FACTORY: &str = "factory";
const KEY_ARGUMENTS: &str = "arguments";
const KEY_PROPERTIES: &str = "properties";
const KEY_CALLS: &str = "calls";
const KEY_METHOD: &str = "method";

/// Outer shape of a raw `services` entry.
#[derive(Debug, Clone, Copy)]
pub enum ServiceShape<'a> {
    /// `id: '@target'` shorthand; holds the text after the marker.
    AliasShorthand(&'a str),
    /// `id: { ... }` declaration.
    Declaration(&'a Mapping),
}

impl<'a> ServiceShape<'a> {
    /// Decodes the outer shape, or returns the YAML type that did not fit.
    ///
    /// # Errors
    ///
    /// Returns the type name of any value that is neither an `@`-prefixed
    /// string nor a mapping.
    pub fn decode(raw: &'a YamlValue) -> std::result::Result<Self, &'static str> {
        match raw {
            YamlValue::String(s) => s
                .strip_prefix(REFERENCE_PREFIX)
                .map(Self::AliasShorthand)
                .ok_or("string"),
            YamlValue::Mapping(map) => Ok(Self::Declaration(map)),
            other => Err(yaml::type_name(other)),
        }
    }
}

/// Error context for one service entry.
#[derive(Debug, Clone, Copy)]
struct ServiceContext<'a> {
    path: &'a Path,
    id: &'a str,
}

impl ServiceContext<'_> {
    fn unsupported(self, feature: &'static str) -> DefinitionError {
        DefinitionError::UnsupportedFeature {
            path: self.path.to_path_buf(),
            subject: format!("service \"{}\"", self.id),
            feature,
        }
    }

    fn invalid_value(self, key: &'static str, expected: &'static str) -> DefinitionError {
        DefinitionError::InvalidDirectiveValue {
            path: self.path.to_path_buf(),
            id: self.id.to_owned(),
            key,
            expected,
        }
    }

    fn invalid_calls(self, reason: String) -> DefinitionError {
        DefinitionError::InvalidCallsList {
            path: self.path.to_path_buf(),
            id: self.id.to_owned(),
            reason,
        }
    }

    fn invalid_factory(self, factory: &YamlValue) -> DefinitionError {
        DefinitionError::InvalidFactoryFormat {
            path: self.path.to_path_buf(),
            id: self.id.to_owned(),
            factory: yaml::render(factory),
        }
    }

    fn resolve(self, value: &YamlValue) -> Result<Value> {
        reference::resolve_references(value).map_err(|form| self.unsupported(form.label()))
    }

    /// Resolves a sequence, or the values of a mapping, into an ordered list.
    ///
    /// Returns `Ok(None)` if `value` is neither.
    fn resolve_list(self, value: &YamlValue) -> Result<Option<Vec<Value>>> {
        let items: Vec<&YamlValue> = match value {
            YamlValue::Sequence(items) => items.iter().collect(),
            YamlValue::Mapping(map) => map.values().collect(),
            _ => return Ok(None),
        };
        items
            .into_iter()
            .map(|item| self.resolve(item))
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    fn string_directive<'v>(self, key: &'static str, value: &'v YamlValue) -> Result<&'v str> {
        value
            .as_str()
            .ok_or_else(|| self.invalid_value(key, "a string"))
    }
}

/// Parses the `services` section of a document.
///
/// # Errors
///
/// Returns [`DefinitionError::InvalidServicesSection`] if the section is not a
/// mapping, or the first error raised by [`parse_service`].
pub fn parse_services(document: &Document) -> Result<DefinitionSet> {
    let mut definitions = DefinitionSet::new();
    let Some(section) = &document.services else {
        return Ok(definitions);
    };
    let YamlValue::Mapping(services) = section else {
        return Err(DefinitionError::InvalidServicesSection {
            path: document.path.clone(),
        });
    };

    for (key, raw) in services {
        let id = yaml::display_key(key);
        tracing::debug!(service = %id, "parsing service definition");
        let _ = definitions.insert(parse_service(&document.path, &id, raw)?);
    }
    Ok(definitions)
}

/// Parses one `services` entry into a definition.
///
/// # Errors
///
/// Returns the first structural or unsupported-feature error of the entry.
pub fn parse_service(path: &Path, id: &str, raw: &YamlValue) -> Result<Definition> {
    let ctx = ServiceContext { path, id };

    let service = match ServiceShape::decode(raw) {
        // The shorthand is taken verbatim: `'@@x'` aliases `@x`.
        Ok(ServiceShape::AliasShorthand(target)) => return Ok(alias(id, target)),
        Ok(ServiceShape::Declaration(map)) => map,
        Err(found) => {
            return Err(DefinitionError::InvalidServiceDeclaration {
                path: path.to_path_buf(),
                id: id.to_owned(),
                found,
            });
        }
    };

    if let Some(target) = yaml::non_null(service, KEY_ALIAS) {
        if yaml::is_set(service, KEY_PUBLIC) {
            return Err(ctx.unsupported(KEY_PUBLIC));
        }
        return Ok(alias(id, ctx.string_directive(KEY_ALIAS, target)?));
    }

    if yaml::is_set(service, KEY_PARENT) {
        return Err(ctx.unsupported(KEY_PARENT));
    }

    let mut definition = None;

    if let Some(class) = yaml::non_null(service, KEY_CLASS) {
        let class = ctx.string_directive(KEY_CLASS, class)?;
        definition = Some(Definition::Instance(parse_instance(ctx, service, class)?));
    }

    // A factory replaces an instance built from a co-present `class`.
    if let Some(factory) = yaml::non_null(service, KEY_FACTORY) {
        definition = Some(Definition::Factory(parse_factory(ctx, service, factory)?));
    }

    reject_unsupported(ctx, service)?;

    definition.ok_or_else(|| DefinitionError::MissingDefinitionKind {
        path: path.to_path_buf(),
        id: id.to_owned(),
    })
}

fn alias(id: &str, target: &str) -> Definition {
    Definition::Alias(AliasDefinition {
        id: id.to_owned(),
        target: target.to_owned(),
    })
}

fn parse_instance(
    ctx: ServiceContext<'_>,
    service: &Mapping,
    class: &str,
) -> Result<InstanceDefinition> {
    let mut instance = InstanceDefinition::new(ctx.id, class);

    if let Some(arguments) = yaml::non_null(service, KEY_ARGUMENTS) {
        let arguments = ctx
            .resolve_list(arguments)?
            .ok_or_else(|| ctx.invalid_value(KEY_ARGUMENTS, "a sequence or a mapping"))?;
        for argument in arguments {
            instance.add_constructor_argument(argument);
        }
    }

    if let Some(properties) = yaml::non_null(service, KEY_PROPERTIES) {
        let YamlValue::Mapping(properties) = properties else {
            return Err(ctx.invalid_value(KEY_PROPERTIES, "a mapping"));
        };
        for (name, value) in properties {
            let name =
                reference::mapping_key(name).map_err(|form| ctx.unsupported(form.label()))?;
            instance.add_property_assignment(name, ctx.resolve(value)?);
        }
    }

    if let Some(calls) = yaml::non_null(service, KEY_CALLS) {
        let YamlValue::Sequence(calls) = calls else {
            return Err(ctx.invalid_calls(format!(
                "expected a sequence, found {}",
                yaml::type_name(calls)
            )));
        };
        for (index, call) in calls.iter().enumerate() {
            let (method, arguments) = parse_call(ctx, index, call)?;
            instance.add_method_call(method, arguments);
        }
    }

    Ok(instance)
}

/// Accepts `{ method: m, arguments: [...] }` or `[m, [...]]`.
fn parse_call<'v>(
    ctx: ServiceContext<'_>,
    index: usize,
    call: &'v YamlValue,
) -> Result<(&'v str, Vec<Value>)> {
    let (method, arguments) = match call {
        YamlValue::Mapping(map) if yaml::is_set(map, KEY_METHOD) => (
            yaml::non_null(map, KEY_METHOD),
            yaml::non_null(map, KEY_ARGUMENTS),
        ),
        YamlValue::Sequence(items) if !items.is_empty() => {
            (items.first(), items.get(1).filter(|v| !v.is_null()))
        }
        _ => {
            return Err(ctx.invalid_calls(format!(
                "call #{index} must be a mapping with a \"method\" key or a [method, arguments] sequence"
            )));
        }
    };

    let method = method.and_then(YamlValue::as_str).ok_or_else(|| {
        ctx.invalid_calls(format!("method name of call #{index} must be a string"))
    })?;

    let arguments = match arguments {
        Some(arguments) => ctx.resolve_list(arguments)?.ok_or_else(|| {
            ctx.invalid_calls(format!("arguments of call #{index} must be a sequence"))
        })?,
        None => Vec::new(),
    };

    Ok((method, arguments))
}

fn parse_factory(
    ctx: ServiceContext<'_>,
    service: &Mapping,
    factory: &YamlValue,
) -> Result<FactoryDefinition> {
    let callable = match factory {
        YamlValue::String(spec) => parse_factory_string(ctx, factory, spec)?,
        YamlValue::Sequence(items) if items.len() == 2 => {
            let method = items[1]
                .as_str()
                .filter(|m| !m.is_empty())
                .ok_or_else(|| ctx.invalid_factory(factory))?
                .to_owned();
            match ctx.resolve(&items[0])? {
                Value::Reference(reference) => FactoryCallable::Service { reference, method },
                Value::String(type_name) if !type_name.is_empty() => {
                    FactoryCallable::Static { type_name, method }
                }
                _ => return Err(ctx.invalid_factory(factory)),
            }
        }
        _ => return Err(ctx.invalid_factory(factory)),
    };

    let mut definition = FactoryDefinition::new(ctx.id, callable);
    if let Some(arguments) = yaml::non_null(service, KEY_ARGUMENTS) {
        let arguments = ctx
            .resolve_list(arguments)?
            .ok_or_else(|| ctx.invalid_value(KEY_ARGUMENTS, "a sequence or a mapping"))?;
        definition.set_arguments(arguments);
    }
    Ok(definition)
}

/// Parses `Type::method` or `service:method`.
fn parse_factory_string(
    ctx: ServiceContext<'_>,
    factory: &YamlValue,
    spec: &str,
) -> Result<FactoryCallable> {
    let well_formed =
        |left: &str, right: &str| !left.is_empty() && !right.is_empty() && !right.contains(':');

    if let Some((type_name, method)) = spec.split_once("::") {
        if !well_formed(type_name, method) {
            return Err(ctx.invalid_factory(factory));
        }
        return Ok(FactoryCallable::Static {
            type_name: type_name.to_owned(),
            method: method.to_owned(),
        });
    }

    let Some((service, method)) = spec.split_once(':').filter(|&(s, m)| well_formed(s, m)) else {
        return Err(ctx.invalid_factory(factory));
    };

    // The service part goes through the reference grammar as `@service`.
    match reference::resolve_str(&format!("{REFERENCE_PREFIX}{service}")) {
        Ok(Value::Reference(reference)) => Ok(FactoryCallable::Service {
            reference,
            method: method.to_owned(),
        }),
        Ok(_) => Err(ctx.invalid_factory(factory)),
        Err(form) => Err(ctx.unsupported(form.label())),
    }
}

fn reject_unsupported(ctx: ServiceContext<'_>, service: &Mapping) -> Result<()> {
    for (key, presence) in UNSUPPORTED_DIRECTIVES {
        let found = match presence {
            Presence::NonNull => yaml::is_set(service, key),
            Presence::AnyValue => service.contains_key(key),
        };
        if found {
            return Err(ctx.unsupported(key));
        }
    }
    Ok(())
}
