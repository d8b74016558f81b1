//! Top-level assembly of one document.
//!
//! 1. Imports are merged into a base set.
//! 2. Local parameters overwrite base entries.
//! 3. Local services are added under [`LOCAL_SERVICE_PRECEDENCE`].

use std::path::{Path, PathBuf};

use serde_yaml::Value as YamlValue;
use wiredef_common::config::LoaderConfig;
use wiredef_common::error::{DefinitionError, Result};
use wiredef_common::types::{CollisionPolicy, Definition, DefinitionSet, ParameterDefinition};

use crate::document::{self, Document};
use crate::provider::DefinitionProvider;
use crate::{import, locator, reference, service, yaml};

/// How local services fold into the imported and parameter definitions.
///
/// With `KeepExisting`, an import or a local parameter wins over a local
/// service of the same identifier. Existing documents rely on this;
/// `Replace` would let local services win.
pub const LOCAL_SERVICE_PRECEDENCE: CollisionPolicy = CollisionPolicy::KeepExisting;

/// Loads one definition document and everything it imports.
#[derive(Debug, Clone)]
pub struct YamlDefinitionLoader {
    locator: String,
    config: LoaderConfig,
}

impl YamlDefinitionLoader {
    /// Creates a loader for `locator` with the default configuration.
    #[must_use]
    pub fn new(locator: impl Into<String>) -> Self {
        Self::with_config(locator, LoaderConfig::default())
    }

    /// Creates a loader for `locator` with an explicit configuration.
    #[must_use]
    pub fn with_config(locator: impl Into<String>, config: LoaderConfig) -> Self {
        Self {
            locator: locator.into(),
            config,
        }
    }

    /// Loads the document and returns its merged definitions.
    ///
    /// Each call re-reads the document; no state is kept between loads.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the document or any of its imports.
    pub fn load(&self) -> Result<DefinitionSet> {
        let path = locator::local_path(&self.locator)?;
        let mut stack = ImportStack::new(self.config.max_import_depth);
        let definitions = load_path(&path, &mut stack)?;
        tracing::info!(
            locator = %self.locator,
            definitions = definitions.len(),
            "loaded definition document"
        );
        Ok(definitions)
    }
}

impl DefinitionProvider for YamlDefinitionLoader {
    fn definitions(&self) -> Result<DefinitionSet> {
        self.load()
    }
}

/// Documents currently being loaded, outermost first.
#[derive(Debug)]
pub(crate) struct ImportStack {
    active: Vec<PathBuf>,
    max_depth: usize,
}

impl ImportStack {
    fn new(max_depth: usize) -> Self {
        Self {
            active: Vec::new(),
            max_depth,
        }
    }

    fn enter(&mut self, path: &Path) -> Result<()> {
        let key = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if self.active.contains(&key) {
            let chain = self
                .active
                .iter()
                .chain(std::iter::once(&key))
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(DefinitionError::CyclicImport { chain });
        }
        if self.active.len() > self.max_depth {
            return Err(DefinitionError::ImportTooDeep {
                path: path.to_path_buf(),
                limit: self.max_depth,
            });
        }
        self.active.push(key);
        Ok(())
    }

    fn leave(&mut self) {
        let _ = self.active.pop();
    }
}

/// Runs the full pipeline for the document at `path`.
pub(crate) fn load_path(path: &Path, stack: &mut ImportStack) -> Result<DefinitionSet> {
    stack.enter(path)?;
    let result = document::read_document(path).and_then(|document| match document {
        Some(document) => assemble(&document, stack),
        None => Ok(DefinitionSet::new()),
    });
    stack.leave();
    result
}

/// Combines imports, parameters, and services of a validated document.
///
/// # Errors
///
/// Returns the first error raised by any section.
pub(crate) fn assemble(document: &Document, stack: &mut ImportStack) -> Result<DefinitionSet> {
    let mut definitions = import::parse_imports(document, stack)?;

    for parameter in parse_parameters(document)? {
        let _ = definitions.insert(parameter);
    }

    let services = service::parse_services(document)?;
    let shadowed = definitions.merge(services, LOCAL_SERVICE_PRECEDENCE);
    if !shadowed.is_empty() {
        tracing::warn!(
            path = %document.path.display(),
            ids = ?shadowed,
            "local services shadowed by imported or parameter definitions"
        );
    }

    Ok(definitions)
}

fn parse_parameters(document: &Document) -> Result<Vec<Definition>> {
    let Some(section) = &document.parameters else {
        return Ok(Vec::new());
    };
    let YamlValue::Mapping(parameters) = section else {
        return Err(DefinitionError::InvalidParametersSection {
            path: document.path.clone(),
        });
    };

    parameters
        .iter()
        .map(|(key, value)| {
            let id = yaml::display_key(key);
            let value = reference::literal_value(value).map_err(|form| {
                DefinitionError::UnsupportedFeature {
                    path: document.path.clone(),
                    subject: format!("parameter \"{id}\""),
                    feature: form.label(),
                }
            })?;
            Ok(Definition::Parameter(ParameterDefinition { id, value }))
        })
        .collect()
}
