#![deny(missing_docs)]

//! # Generate Command
//!
//! Loads the bundle, adapts every operation and writes the binding manifest.

use std::fs;
use std::path::PathBuf;

use harbor_gen_core::{generate, CollisionPolicy, GenerationReport, TracingSink};
use serde::Serialize;
use tracing::info;

use crate::error::{CliError, CliResult};
use crate::source::SourceArgs;

/// Manifest serialization format.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// YAML.
    Yaml,
}

/// Arguments for the generate command.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Spec location and config.
    #[clap(flatten)]
    pub source: SourceArgs,

    /// Fail when two operations derive the same handler name.
    #[clap(long)]
    pub deny_collisions: bool,

    /// Manifest format.
    #[clap(long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Output file. Prints to stdout when omitted.
    #[clap(long)]
    pub output: Option<PathBuf>,

    /// API base URL; adds the full client URL to every binding.
    #[clap(long, env = "HARBOR_GEN_BASE_URL")]
    pub base_url: Option<String>,
}

/// Serializes a value in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).map_err(|e| CliError::Render(e.to_string()))
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| CliError::Render(e.to_string()))
        }
    }
}

/// Executes the generation run.
pub async fn execute(args: &GenerateArgs) -> CliResult<GenerationReport> {
    let mut config = args.source.generator_config()?;
    if args.deny_collisions {
        config.collision_policy = CollisionPolicy::Deny;
    }
    let context = args.source.context(config).await?;

    let mut report = generate(&context, &TracingSink)?;
    if let Some(base) = &args.base_url {
        report.attach_client_urls(base)?;
    }

    let manifest = render(&report, args.format)?;
    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, manifest)?;
            info!(output = %path.display(), bindings = report.bindings.len(), "Wrote binding manifest");
        }
        None => println!("{}", manifest),
    }

    Ok(report)
}
