//! `imports` resolution.
//!
//! Each import is loaded through the full pipeline, recursively. Imports
//! are folded in document order, so a later import overrides an earlier
//! one on identifier collisions.

use std::path::{Path, PathBuf};

use serde_yaml::Value as YamlValue;
use wiredef_common::constants::{KEY_IGNORE_ERRORS, KEY_RESOURCE};
use wiredef_common::error::{DefinitionError, Result};
use wiredef_common::types::{CollisionPolicy, DefinitionSet};

use crate::document::Document;
use crate::loader::{self, ImportStack};
use crate::locator;
use crate::yaml;

/// How definitions of a later import fold over earlier ones.
pub const IMPORT_PRECEDENCE: CollisionPolicy = CollisionPolicy::Replace;

/// Loads and merges every import of `document`.
///
/// # Errors
///
/// Returns [`DefinitionError::InvalidImportList`] or
/// [`DefinitionError::InvalidImportEntry`] for malformed imports, or any
/// error raised while loading an imported document.
pub(crate) fn parse_imports(document: &Document, stack: &mut ImportStack) -> Result<DefinitionSet> {
    let mut merged = DefinitionSet::new();
    let Some(section) = &document.imports else {
        return Ok(merged);
    };
    let YamlValue::Sequence(entries) = section else {
        return Err(DefinitionError::InvalidImportList {
            path: document.path.clone(),
        });
    };

    for (index, entry) in entries.iter().enumerate() {
        let path = import_path(&document.path, index, entry)?;
        tracing::debug!(
            from = %document.path.display(),
            import = %path.display(),
            "loading import"
        );
        let imported = loader::load_path(&path, stack)?;
        let overridden = merged.merge(imported, IMPORT_PRECEDENCE);
        if !overridden.is_empty() {
            tracing::debug!(
                import = %path.display(),
                ids = ?overridden,
                "import overrides earlier imports"
            );
        }
    }
    Ok(merged)
}

fn import_path(importing: &Path, index: usize, entry: &YamlValue) -> Result<PathBuf> {
    let invalid = |reason: String| DefinitionError::InvalidImportEntry {
        path: importing.to_path_buf(),
        index,
        reason,
    };

    let YamlValue::Mapping(entry) = entry else {
        return Err(invalid(format!(
            "expected a mapping, found {}",
            yaml::type_name(entry)
        )));
    };

    if yaml::is_set(entry, KEY_IGNORE_ERRORS) {
        return Err(DefinitionError::UnsupportedFeature {
            path: importing.to_path_buf(),
            subject: format!("import #{index}"),
            feature: KEY_IGNORE_ERRORS,
        });
    }

    let resource = yaml::non_null(entry, KEY_RESOURCE)
        .ok_or_else(|| invalid("missing \"resource\" key".into()))?
        .as_str()
        .ok_or_else(|| invalid("\"resource\" must be a string".into()))?;

    locator::resolve_import(resource, importing)
}
