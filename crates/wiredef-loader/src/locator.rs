//! Resource locator handling.
//!
//! Only local files can be loaded. Plain paths and `file://` locators are
//! local; any other `scheme://` locator is rejected.

use std::path::{Path, PathBuf};

use wiredef_common::error::{DefinitionError, Result};

const FILE_SCHEME: &str = "file";

/// Converts a locator into a local filesystem path.
///
/// # Errors
///
/// Returns [`DefinitionError::NotLocalResource`] for network and other
/// non-file schemes.
pub fn local_path(locator: &str) -> Result<PathBuf> {
    match scheme(locator) {
        None => Ok(PathBuf::from(locator)),
        Some((FILE_SCHEME, rest)) => Ok(PathBuf::from(rest)),
        Some(_) => Err(DefinitionError::NotLocalResource {
            locator: locator.to_owned(),
        }),
    }
}

/// Resolves an import `resource` against the document that imports it.
///
/// Relative paths are taken from the importing document's directory.
///
/// # Errors
///
/// Returns [`DefinitionError::NotLocalResource`] if the resource is not local.
pub fn resolve_import(resource: &str, importing: &Path) -> Result<PathBuf> {
    let path = local_path(resource)?;
    if path.is_absolute() {
        return Ok(path);
    }
    let base = importing.parent().unwrap_or_else(|| Path::new(""));
    Ok(base.join(path))
}

/// Splits `scheme://rest`, if the locator has a syntactically valid scheme.
fn scheme(locator: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = locator.split_once("://")?;
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some((scheme, rest))
}
