//! # wiredef-loader
//!
//! Turns YAML definition documents into [`DefinitionSet`]s for a
//! dependency-injection container.
//!
//! Handles:
//! - **Document**: reading a local file and checking its top-level keys.
//! - **Reference**: the `@name` / `@@literal` reference grammar.
//! - **Service**: mapping one `services` entry to an alias, instance, or factory.
//! - **Import**: recursive loading of `imports` with cycle detection.
//! - **Loader**: assembling imports, parameters, and services of one document.
//! - **Provider**: merging independent top-level documents.
//!
//! [`DefinitionSet`]: wiredef_common::types::DefinitionSet

pub mod document;
pub mod import;
pub mod loader;
pub mod locator;
pub mod provider;
pub mod reference;
pub mod service;

mod yaml;

pub use loader::{LOCAL_SERVICE_PRECEDENCE, YamlDefinitionLoader};
pub use provider::{ChainedProvider, DefinitionProvider, StaticProvider};
