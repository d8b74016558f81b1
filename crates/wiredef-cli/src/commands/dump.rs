//! `wiredef dump` — Print the merged definition set.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use wiredef_common::config::LoaderConfig;

/// Serialisation format for `dump`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Pretty-printed JSON.
    Json,
    /// YAML.
    Yaml,
}

/// Arguments for the `dump` command.
#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Definition documents, in precedence order.
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    pub format: Format,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Executes the `dump` command.
///
/// # Errors
///
/// Returns an error if a document fails to load or the output cannot be written.
pub fn execute(args: DumpArgs, config: &LoaderConfig) -> anyhow::Result<()> {
    let definitions = super::load_all(&args.files, config)?;

    let rendered = match args.format {
        Format::Json => serde_json::to_string_pretty(&definitions)? + "\n",
        Format::Yaml => serde_yaml::to_string(&definitions)?,
    };

    if let Some(ref out_path) = args.output {
        std::fs::write(out_path, &rendered)?;
        tracing::info!(path = %out_path.display(), definitions = definitions.len(), "wrote definitions");
    } else {
        print!("{rendered}");
    }
    Ok(())
}
