//! Loader configuration model.

use serde::{Deserialize, Serialize};

/// Tunables for a definition load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Maximum nesting of `imports` before the load is aborted.
    pub max_import_depth: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_import_depth: crate::constants::DEFAULT_MAX_IMPORT_DEPTH,
        }
    }
}

impl LoaderConfig {
    /// Returns a copy of this configuration with a different import depth limit.
    #[must_use]
    pub const fn with_max_import_depth(mut self, depth: usize) -> Self {
        self.max_import_depth = depth;
        self
    }
}
