#![deny(missing_docs)]

//! # Harbor Gen CLI
//!
//! Command Line Interface for the API binding generator.
//!
//! Supported Commands:
//! - `generate`: Bundle -> binding manifest (JSON or YAML).
//! - `adapt`: One operation -> binding descriptor.

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::CliResult;

mod adapt;
mod error;
mod fetch;
mod generate;
mod source;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Harbor API binding generator")]
struct Cli {
    /// Log at debug level regardless of `RUST_LOG`.
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate bindings for every operation of an API description.
    Generate(generate::GenerateArgs),
    /// Adapt a single operation and print its binding descriptor.
    Adapt(adapt::AdaptArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(filter);

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Generate(args) => {
            generate::execute(args).await?;
        }
        Commands::Adapt(args) => {
            adapt::execute(args).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate_flags() {
        let cli = Cli::parse_from([
            "harbor-gen",
            "generate",
            "--spec",
            "openapi.yaml",
            "--format",
            "yaml",
            "--deny-collisions",
            "-v",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.source.spec, "openapi.yaml");
                assert_eq!(args.format, generate::OutputFormat::Yaml);
                assert!(args.deny_collisions);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_adapt_method() {
        let cli = Cli::parse_from([
            "harbor-gen",
            "adapt",
            "--spec",
            "openapi.yaml",
            "--path",
            "/api/v1/team/{teamId}",
            "--method",
            "DELETE",
        ]);
        match cli.command {
            Commands::Adapt(args) => {
                assert_eq!(args.method, harbor_gen_core::HttpMethod::Delete);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
