//! `wiredef check` — Validate documents and summarise their definitions.

use clap::Args;
use wiredef_common::config::LoaderConfig;

use crate::output;

/// Arguments for the `check` command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Definition documents, in precedence order.
    #[arg(required = true)]
    pub files: Vec<String>,

    /// List every definition, not just the totals.
    #[arg(short, long)]
    pub list: bool,
}

/// Executes the `check` command.
///
/// # Errors
///
/// Returns the first load error of any document.
pub fn execute(args: CheckArgs, config: &LoaderConfig) -> anyhow::Result<()> {
    tracing::info!(files = args.files.len(), "checking definition documents");
    let definitions = super::load_all(&args.files, config)?;

    if args.list {
        for (id, definition) in definitions.iter() {
            println!("  {}", output::describe(id, definition));
        }
        println!();
    }
    println!("{}", output::summary(&definitions));
    Ok(())
}
