//! Reading and validating a single definition document.
//!
//! A document is a YAML mapping with at most the keys `imports`,
//! `parameters`, and `services`. An empty document yields no definitions.

use std::path::{Path, PathBuf};

use serde_yaml::Value as YamlValue;
use wiredef_common::constants::{KEY_IMPORTS, KEY_PARAMETERS, KEY_SERVICES};
use wiredef_common::error::{DefinitionError, Result, SyntaxError};

use crate::yaml;

/// The validated top-level sections of a document.
///
/// Sections that are absent or explicitly null are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Path the document was read from; relative imports resolve against it.
    pub path: PathBuf,
    /// Raw `imports` section.
    pub imports: Option<YamlValue>,
    /// Raw `parameters` section.
    pub parameters: Option<YamlValue>,
    /// Raw `services` section.
    pub services: Option<YamlValue>,
}

/// Reads and validates the document at `path`.
///
/// Returns `Ok(None)` for an empty document.
///
/// # Errors
///
/// Returns [`DefinitionError::ResourceNotFound`] if the file cannot be read,
/// [`DefinitionError::MalformedDocument`] if it is not UTF-8, or any error
/// from [`parse_document`].
pub fn read_document(path: &Path) -> Result<Option<Document>> {
    let bytes = std::fs::read(path).map_err(|source| DefinitionError::ResourceNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    let content = std::str::from_utf8(&bytes).map_err(|e| malformed(path, e.into()))?;
    parse_document(path, content)
}

/// Parses and validates document text; `path` is used for error context.
///
/// # Errors
///
/// Returns [`DefinitionError::MalformedDocument`] for invalid YAML or merge
/// keys (`<<`) that cannot be applied, [`DefinitionError::NotAMapping`] if the root is not a mapping, and
/// [`DefinitionError::UnexpectedTopLevelKey`] for unknown sections.
pub fn parse_document(path: &Path, content: &str) -> Result<Option<Document>> {
    if is_blank(content) {
        return Ok(None);
    }
    let mut root: YamlValue =
        serde_yaml::from_str(content).map_err(|e| malformed(path, e.into()))?;
    // Merge keys are expanded before any key is inspected.
    root.apply_merge().map_err(|e| malformed(path, e.into()))?;
    validate(path, root)
}

fn malformed(path: &Path, source: SyntaxError) -> DefinitionError {
    DefinitionError::MalformedDocument {
        path: path.to_path_buf(),
        source,
    }
}

fn validate(path: &Path, root: YamlValue) -> Result<Option<Document>> {
    let map = match root {
        YamlValue::Null => return Ok(None),
        YamlValue::Mapping(map) => map,
        _ => {
            return Err(DefinitionError::NotAMapping {
                path: path.to_path_buf(),
            });
        }
    };

    let mut document = Document {
        path: path.to_path_buf(),
        ..Document::default()
    };

    for (key, value) in map {
        let section = match key.as_str() {
            Some(KEY_IMPORTS) => &mut document.imports,
            Some(KEY_PARAMETERS) => &mut document.parameters,
            Some(KEY_SERVICES) => &mut document.services,
            _ => {
                return Err(DefinitionError::UnexpectedTopLevelKey {
                    path: path.to_path_buf(),
                    key: yaml::display_key(&key),
                });
            }
        };
        *section = Some(value).filter(|v| !v.is_null());
    }

    Ok(Some(document))
}

/// `true` for content made only of whitespace and comments.
fn is_blank(content: &str) -> bool {
    content.lines().map(str::trim).all(|line| line.is_empty() || line.starts_with('#'))
}
