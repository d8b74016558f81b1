//! Definition model populated by the loader.
//!
//! A [`DefinitionSet`] maps identifiers to [`Definition`] directives. The
//! container that consumes the set resolves [`Reference`]s; nothing in this
//! crate follows them.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// A typed pointer to another definition, resolved by the consuming container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Reference {
    target: String,
}

impl Reference {
    /// Creates a reference to the definition named `target`.
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// Returns the identifier this reference points at.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.target)
    }
}

/// A resolved configuration value.
///
/// Mirrors the YAML data model, with mapping keys rendered to strings and an
/// extra [`Value::Reference`] variant produced by reference resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `~` / `null`.
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer or floating point scalar.
    Number(serde_yaml::Number),
    /// String scalar.
    String(String),
    /// Ordered sequence.
    Sequence(Vec<Self>),
    /// Mapping in document order.
    Mapping(Vec<(String, Self)>),
    /// Pointer to another definition.
    Reference(Reference),
}

impl Value {
    /// Shorthand for a string value.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Shorthand for a reference value.
    #[must_use]
    pub fn reference(target: impl Into<String>) -> Self {
        Self::Reference(Reference::new(target))
    }

    /// Returns the string slice if this is a string scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the reference if this value is one.
    #[must_use]
    pub const fn as_reference(&self) -> Option<&Reference> {
        match self {
            Self::Reference(r) => Some(r),
            _ => None,
        }
    }

    /// Returns `true` if a reference appears anywhere in this value.
    #[must_use]
    pub fn contains_reference(&self) -> bool {
        match self {
            Self::Reference(_) => true,
            Self::Sequence(items) => items.iter().any(Self::contains_reference),
            Self::Mapping(entries) => entries.iter().any(|(_, v)| v.contains_reference()),
            Self::Null | Self::Bool(_) | Self::Number(_) | Self::String(_) => false,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<Reference> for Value {
    fn from(value: Reference) -> Self {
        Self::Reference(value)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Sequence(items) => serializer.collect_seq(items),
            Self::Mapping(entries) => serializer.collect_map(entries.iter().map(|(k, v)| (k, v))),
            Self::Reference(r) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$ref", r.target())?;
                map.end()
            }
        }
    }
}

/// A named value that is not a reference to another definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDefinition {
    /// Identifier of the parameter.
    pub id: String,
    /// The parameter value, taken verbatim from the document.
    pub value: Value,
}

/// An identifier that stands for another definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasDefinition {
    /// Identifier of the alias.
    pub id: String,
    /// Identifier the alias resolves to.
    pub target: String,
}

/// A property assignment applied after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyAssignment {
    /// Property name.
    pub name: String,
    /// Assigned value.
    pub value: Value,
}

/// A method invoked after construction, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodCall {
    /// Method name.
    pub method: String,
    /// Ordered call arguments.
    pub arguments: Vec<Value>,
}

/// An object built by calling a type's constructor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceDefinition {
    /// Identifier of the instance.
    pub id: String,
    /// Type to construct.
    pub class: String,
    /// Ordered constructor arguments.
    pub arguments: Vec<Value>,
    /// Ordered property assignments.
    pub properties: Vec<PropertyAssignment>,
    /// Ordered method calls.
    pub calls: Vec<MethodCall>,
}

impl InstanceDefinition {
    /// Creates an instance definition with no arguments, properties, or calls.
    #[must_use]
    pub fn new(id: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            class: class.into(),
            arguments: Vec::new(),
            properties: Vec::new(),
            calls: Vec::new(),
        }
    }

    /// Appends a constructor argument.
    pub fn add_constructor_argument(&mut self, value: Value) {
        self.arguments.push(value);
    }

    /// Appends a property assignment.
    pub fn add_property_assignment(&mut self, name: impl Into<String>, value: Value) {
        self.properties.push(PropertyAssignment {
            name: name.into(),
            value,
        });
    }

    /// Appends a method call.
    pub fn add_method_call(&mut self, method: impl Into<String>, arguments: Vec<Value>) {
        self.calls.push(MethodCall {
            method: method.into(),
            arguments,
        });
    }
}

/// The callable a factory definition invokes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FactoryCallable {
    /// A method on another definition (`service:method`).
    Service {
        /// Definition providing the method.
        reference: Reference,
        /// Method name.
        method: String,
    },
    /// A static method on a named type (`Type::method`).
    Static {
        /// Type name, used literally.
        type_name: String,
        /// Method name.
        method: String,
    },
}

impl FactoryCallable {
    /// Returns the method name of the callable.
    #[must_use]
    pub fn method(&self) -> &str {
        match self {
            Self::Service { method, .. } | Self::Static { method, .. } => method,
        }
    }
}

/// An object produced by calling a factory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactoryDefinition {
    /// Identifier of the produced object.
    pub id: String,
    /// The factory to call.
    pub callable: FactoryCallable,
    /// Ordered call arguments.
    pub arguments: Vec<Value>,
}

impl FactoryDefinition {
    /// Creates a factory definition without arguments.
    #[must_use]
    pub fn new(id: impl Into<String>, callable: FactoryCallable) -> Self {
        Self {
            id: id.into(),
            callable,
            arguments: Vec::new(),
        }
    }

    /// Replaces the call arguments.
    pub fn set_arguments(&mut self, arguments: Vec<Value>) {
        self.arguments = arguments;
    }
}

/// A directive describing how to produce or name one configured object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Definition {
    /// A literal value.
    Parameter(ParameterDefinition),
    /// Another name for an existing definition.
    Alias(AliasDefinition),
    /// A constructed object.
    Instance(InstanceDefinition),
    /// A factory-produced object.
    Factory(FactoryDefinition),
}

/// Fieldless discriminant of [`Definition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DefinitionKind {
    /// [`Definition::Parameter`].
    Parameter,
    /// [`Definition::Alias`].
    Alias,
    /// [`Definition::Instance`].
    Instance,
    /// [`Definition::Factory`].
    Factory,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parameter => write!(f, "parameter"),
            Self::Alias => write!(f, "alias"),
            Self::Instance => write!(f, "instance"),
            Self::Factory => write!(f, "factory"),
        }
    }
}

impl Definition {
    /// Returns the identifier the definition is registered under.
    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            Self::Parameter(d) => &d.id,
            Self::Alias(d) => &d.id,
            Self::Instance(d) => &d.id,
            Self::Factory(d) => &d.id,
        }
    }

    /// Returns the variant of this definition.
    #[must_use]
    pub const fn kind(&self) -> DefinitionKind {
        match self {
            Self::Parameter(_) => DefinitionKind::Parameter,
            Self::Alias(_) => DefinitionKind::Alias,
            Self::Instance(_) => DefinitionKind::Instance,
            Self::Factory(_) => DefinitionKind::Factory,
        }
    }
}

/// How [`DefinitionSet::merge`] treats an identifier present on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// The incoming definition replaces the existing one.
    Replace,
    /// The existing definition is kept; the incoming one is dropped.
    KeepExisting,
}

/// Mapping of identifier to definition produced by one load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DefinitionSet {
    entries: BTreeMap<String, Definition>,
}

impl DefinitionSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the set holds no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a definition by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Definition> {
        self.entries.get(id)
    }

    /// Returns `true` if `id` is defined.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Inserts a definition under its own identifier, returning any replaced one.
    pub fn insert(&mut self, definition: Definition) -> Option<Definition> {
        self.entries
            .insert(definition.identifier().to_owned(), definition)
    }

    /// Folds `other` into this set.
    ///
    /// Returns the identifiers that were present on both sides.
    pub fn merge(&mut self, other: Self, policy: CollisionPolicy) -> Vec<String> {
        let mut collisions = Vec::new();
        for (id, definition) in other.entries {
            match self.entries.entry(id) {
                btree_map::Entry::Vacant(slot) => {
                    let _ = slot.insert(definition);
                }
                btree_map::Entry::Occupied(mut slot) => {
                    collisions.push(slot.key().clone());
                    if policy == CollisionPolicy::Replace {
                        let _ = slot.insert(definition);
                    }
                }
            }
        }
        collisions
    }

    /// Iterates over definitions ordered by identifier.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Definition)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Counts definitions of the given kind.
    #[must_use]
    pub fn count_kind(&self, kind: DefinitionKind) -> usize {
        self.entries.values().filter(|d| d.kind() == kind).count()
    }
}

impl IntoIterator for DefinitionSet {
    type Item = (String, Definition);
    type IntoIter = btree_map::IntoIter<String, Definition>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<Definition> for DefinitionSet {
    fn from_iter<I: IntoIterator<Item = Definition>>(iter: I) -> Self {
        let mut set = Self::new();
        for definition in iter {
            let _ = set.insert(definition);
        }
        set
    }
}
