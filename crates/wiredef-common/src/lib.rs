//! # wiredef-common
//!
//! Shared types, error definitions, configuration models, and constants
//! used across the wiredef workspace.
//!
//! This crate is the leaf of the dependency graph. It holds the definition
//! model that the loader populates and that downstream containers consume.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
