//! CLI command definitions and dispatch.

pub mod check;
pub mod dump;

use clap::{Parser, Subcommand};
use wiredef_common::config::LoaderConfig;
use wiredef_common::constants::DEFAULT_MAX_IMPORT_DEPTH;
use wiredef_common::types::DefinitionSet;
use wiredef_loader::{ChainedProvider, DefinitionProvider};

/// wiredef — resolve YAML definition documents for a DI container.
#[derive(Parser, Debug)]
#[command(name = "wiredef", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Maximum nesting of imports before a load is aborted.
    #[arg(
        long,
        global = true,
        env = "WIREDEF_MAX_IMPORT_DEPTH",
        default_value_t = DEFAULT_MAX_IMPORT_DEPTH
    )]
    pub max_import_depth: usize,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load documents and report a summary of their definitions.
    Check(check::CheckArgs),
    /// Load documents and print the merged definition set.
    Dump(dump::DumpArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = LoaderConfig::default().with_max_import_depth(cli.max_import_depth);
    match cli.command {
        Command::Check(args) => check::execute(args, &config),
        Command::Dump(args) => dump::execute(args, &config),
    }
}

/// Loads `files` in order, first document to define an identifier wins.
fn load_all(files: &[String], config: &LoaderConfig) -> anyhow::Result<DefinitionSet> {
    let provider = ChainedProvider::from_locators(files.iter().cloned(), config);
    Ok(provider.definitions()?)
}
