//! Document grammar constants and directive tables.

/// Top-level key listing imported documents.
pub const KEY_IMPORTS: &str = "imports";
/// Top-level key holding parameter values.
pub const KEY_PARAMETERS: &str = "parameters";
/// Top-level key holding service declarations.
pub const KEY_SERVICES: &str = "services";

/// Import entry key naming the imported document.
pub const KEY_RESOURCE: &str = "resource";
/// Import entry key for soft-failing imports (rejected).
pub const KEY_IGNORE_ERRORS: &str = "ignore_errors";

/// Marker that introduces a reference to another definition.
pub const REFERENCE_PREFIX: char = '@';

/// Default bound on nested imports.
pub const DEFAULT_MAX_IMPORT_DEPTH: usize = 64;

/// How a rejected directive key is detected in a service mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// The key is present with a non-null value.
    NonNull,
    /// The key is present at all, even with an explicit null.
    AnyValue,
}

/// Service directive keys that are recognised and rejected.
///
/// Checked in table order after the definition itself has been built, so
/// the first matching key names the reported feature.
pub const UNSUPPORTED_DIRECTIVES: [(&str, Presence); 12] = [
    ("shared", Presence::NonNull),
    ("synthetic", Presence::NonNull),
    ("lazy", Presence::NonNull),
    ("public", Presence::NonNull),
    ("abstract", Presence::NonNull),
    ("deprecated", Presence::AnyValue),
    ("file", Presence::NonNull),
    ("configurator", Presence::NonNull),
    ("tags", Presence::NonNull),
    ("decorates", Presence::NonNull),
    ("autowire", Presence::NonNull),
    ("autowiring_types", Presence::NonNull),
];
