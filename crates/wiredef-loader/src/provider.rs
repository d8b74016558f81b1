//! Definition providers.
//!
//! A provider hands a complete [`DefinitionSet`] to the container. Several
//! independent top-level documents are combined with [`ChainedProvider`],
//! where the first provider to define an identifier wins.

use wiredef_common::config::LoaderConfig;
use wiredef_common::error::Result;
use wiredef_common::types::{CollisionPolicy, DefinitionSet};

use crate::loader::YamlDefinitionLoader;

/// How definitions of independent top-level documents are combined.
pub const PROVIDER_PRECEDENCE: CollisionPolicy = CollisionPolicy::KeepExisting;

/// Source of definitions for a container.
pub trait DefinitionProvider {
    /// Returns the definitions this provider contributes.
    ///
    /// # Errors
    ///
    /// Returns an error if the definitions cannot be produced.
    fn definitions(&self) -> Result<DefinitionSet>;
}

/// A provider over an already-built set.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    definitions: DefinitionSet,
}

impl StaticProvider {
    /// Wraps `definitions`.
    #[must_use]
    pub const fn new(definitions: DefinitionSet) -> Self {
        Self { definitions }
    }
}

impl DefinitionProvider for StaticProvider {
    fn definitions(&self) -> Result<DefinitionSet> {
        Ok(self.definitions.clone())
    }
}

/// Merges several providers, first writer wins.
#[derive(Default)]
pub struct ChainedProvider {
    providers: Vec<Box<dyn DefinitionProvider>>,
}

impl ChainedProvider {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a chain with one YAML loader per locator, in order.
    pub fn from_locators<I, S>(locators: I, config: &LoaderConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut chain = Self::new();
        for locator in locators {
            chain.push(YamlDefinitionLoader::with_config(locator, config.clone()));
        }
        chain
    }

    /// Appends a provider; earlier providers take precedence.
    pub fn push(&mut self, provider: impl DefinitionProvider + 'static) {
        self.providers.push(Box::new(provider));
    }

    /// Number of chained providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Returns `true` if no provider is chained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl DefinitionProvider for ChainedProvider {
    fn definitions(&self) -> Result<DefinitionSet> {
        let mut merged = DefinitionSet::new();
        for provider in &self.providers {
            let ignored = merged.merge(provider.definitions()?, PROVIDER_PRECEDENCE);
            if !ignored.is_empty() {
                tracing::debug!(ids = ?ignored, "definitions already provided earlier");
            }
        }
        tracing::info!(
            providers = self.providers.len(),
            definitions = merged.len(),
            "merged definition providers"
        );
        Ok(merged)
    }
}

impl std::fmt::Debug for ChainedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainedProvider")
            .field("providers", &self.providers.len())
            .finish()
    }
}
