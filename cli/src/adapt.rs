#![deny(missing_docs)]

//! # Adapt Command
//!
//! Adapts a single operation and prints its binding descriptor.

use harbor_gen_core::generator::resource_for;
use harbor_gen_core::{Adaptation, AppError, HttpMethod, OperationAdapter, TracingSink};

use crate::error::CliResult;
use crate::generate::{render, OutputFormat};
use crate::source::SourceArgs;

/// Arguments for the adapt command.
#[derive(clap::Args, Debug, Clone)]
pub struct AdaptArgs {
    /// Spec location and config.
    #[clap(flatten)]
    pub source: SourceArgs,

    /// Path template exactly as declared, e.g. `/api/v1/team/{teamId}`.
    #[clap(long)]
    pub path: String,

    /// HTTP method.
    #[clap(long, default_value = "get")]
    pub method: HttpMethod,

    /// Output format.
    #[clap(long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

/// Executes the single-operation adaptation.
pub async fn execute(args: &AdaptArgs) -> CliResult<Adaptation> {
    let config = args.source.generator_config()?;
    let context = args.source.context(config).await?;
    let bundle = context.bundle();

    let operation = bundle.operation(&args.path, args.method).ok_or_else(|| {
        AppError::General(format!(
            "No operation {} {} in '{}'",
            args.method.as_str().to_uppercase(),
            args.path,
            args.source.spec
        ))
    })?;
    let resource = resource_for(
        context.config().resource.as_deref(),
        operation,
        &args.path,
        bundle.common_prefix(),
    );

    let adaptation = OperationAdapter::new(
        &TracingSink,
        &resource,
        args.method,
        &args.path,
        operation,
        &context,
    )
    .adapt();
    println!("{}", render(&adaptation.descriptor, args.format)?);
    Ok(adaptation)
}
